pub mod admin;
pub mod auth;
pub mod server;
pub mod tournaments;
