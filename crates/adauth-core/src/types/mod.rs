//! Directory records returned to callers

mod group;
mod user;

pub use group::Group;
pub use user::User;
