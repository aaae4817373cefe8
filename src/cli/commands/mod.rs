pub mod auth;
pub mod cv;
pub mod resource;
pub mod server;
