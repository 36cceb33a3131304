// Infrastructure module - Sockets, settings files and logging
pub mod config;
pub mod http;
pub mod logging;
pub mod tcp;
