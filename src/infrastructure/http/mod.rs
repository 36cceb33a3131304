// HTTP module - Catch-all greeting stub
pub mod server;

pub use server::{greeting, HttpStubServer};
