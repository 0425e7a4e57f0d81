pub mod car;
pub mod error;
pub mod notification;
pub mod payment;
pub mod rental;
pub mod repository;
pub mod user;
