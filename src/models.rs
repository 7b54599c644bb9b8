pub mod admin;
pub mod faq;
pub mod review;
pub mod session;
