mod handler;
mod model;

pub use handler::{create_news, delete_news, get_news, list_news};
