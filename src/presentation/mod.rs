pub mod auth;
pub mod cars;
pub mod handlers;
pub mod middleware;
pub mod payments;
pub mod rentals;
pub mod routes;
pub mod users;
