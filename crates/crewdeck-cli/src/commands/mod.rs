pub mod auth;
pub mod chat;
pub mod config;
pub mod crm;
pub mod events;
pub mod utils;
