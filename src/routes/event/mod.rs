mod handler;
mod model;

pub use model::Event;

pub use handler::{
    create_event, delete_event, get_event, list_past_events, list_upcoming_events, load_event,
    update_event,
};
