// Frameworks layer: settings and server bootstrap.

pub mod config;
pub mod server;
