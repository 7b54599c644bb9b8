pub mod admin;
pub mod error;
pub mod faq;
pub mod health;
pub mod review;
