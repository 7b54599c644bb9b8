pub mod admin;
pub mod faq;
pub mod postgres_repository;
pub mod review;
pub mod session;
