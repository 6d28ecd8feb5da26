mod handler;
mod model;

pub use handler::{
    admin_cancel_participation, admin_list_participants, list_participants, sign_up_for_event,
    unsign_from_event,
};
