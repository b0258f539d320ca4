pub mod api;
pub mod auth;
pub mod error;
pub mod hitos;
pub mod services;
pub mod state;
pub mod types;
