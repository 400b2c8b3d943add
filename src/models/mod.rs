mod store;
mod user;

pub use store::{Store, TagCount};
pub use user::{normalize_email, User};
