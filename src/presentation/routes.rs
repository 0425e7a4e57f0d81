use crate::presentation::handlers::health_check;
use crate::presentation::{auth, cars, payments, rentals, users};
use actix_web::web;

pub const ROUTES_SUMMARY: &str = "GET /api/health, POST /api/auth/registration, POST /api/auth/login, \
GET|PUT /api/users/me, PUT /api/users/{id}/role, POST|GET /api/cars, GET /api/cars/{id}, \
PATCH /api/cars/{id}/inventory, POST|GET /api/rentals, GET /api/rentals/{id}, \
POST /api/rentals/{id}/return, POST|GET /api/payments, GET /api/payments/success, \
GET /api/payments/cancel, DELETE /api/payments/{id}";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/auth/registration", web::post().to(auth::register))
            .route("/auth/login", web::post().to(auth::login))
            .route("/users/me", web::get().to(users::get_profile))
            .route("/users/me", web::put().to(users::update_profile))
            .route("/users/{id}/role", web::put().to(users::toggle_role))
            .route("/cars", web::post().to(cars::add_car))
            .route("/cars", web::get().to(cars::list_cars))
            .route("/cars/{id}", web::get().to(cars::get_car))
            .route("/cars/{id}/inventory", web::patch().to(cars::update_inventory))
            .route("/rentals", web::post().to(rentals::create_rental))
            .route("/rentals", web::get().to(rentals::list_rentals))
            .route("/rentals/{id}", web::get().to(rentals::get_rental))
            .route("/rentals/{id}/return", web::post().to(rentals::return_rental))
            .route("/payments", web::post().to(payments::create_payment))
            .route("/payments", web::get().to(payments::list_payments))
            .route("/payments/success", web::get().to(payments::payment_success))
            .route("/payments/cancel", web::get().to(payments::payment_cancel))
            .route("/payments/{id}", web::delete().to(payments::delete_payment)),
    );
}
