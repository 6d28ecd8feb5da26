mod handler;
mod model;

pub use handler::{list_users, login, register};
pub use model::{User, UserSummary};
