pub mod auth;
pub mod credentials;
pub mod password;
pub mod review;
pub mod session;
