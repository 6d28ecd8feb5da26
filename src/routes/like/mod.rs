mod handler;
mod model;

pub use handler::{count_likes, toggle_like};
