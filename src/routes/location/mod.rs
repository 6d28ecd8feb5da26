mod handler;
mod model;

pub use handler::{create_location, get_location, list_locations};
pub use model::Location;
