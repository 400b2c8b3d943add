pub mod stores;
pub mod users;
