pub mod build;
pub mod chat;
pub mod server;
