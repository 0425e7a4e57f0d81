pub mod auth_service;
pub mod car_service;
pub mod notification_service;
pub mod payment_service;
pub mod rental_service;
pub mod user_service;
