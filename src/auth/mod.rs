pub mod credentials;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod session;
