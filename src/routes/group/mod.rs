mod handler;
mod membership;
mod model;

pub use handler::{
    approve_member, create_group, get_group, invite_member, leave_group, list_groups,
    list_members, list_memberships, list_pending_requests, load_group, reject_member,
    request_join,
};
pub use membership::GroupMembership;
