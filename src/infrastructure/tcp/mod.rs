// TCP module - Relay client, echo server and throughput bench
pub mod bench;
pub mod client;
pub mod server;

pub use bench::{run_bench, BenchReport};
pub use client::{dial, RelayClient, RelayTarget};
pub use server::EchoServer;
