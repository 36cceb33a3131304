//! Tunnel harness library
//!
//! Manual connectivity harnesses for a TCP tunnel under test: a line relay
//! client, a TCP echo server, an HTTP greeting stub and a throughput bench.

pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use domain::config::HarnessConfig;
pub use domain::error::{HarnessError, HarnessResult};
pub use infrastructure::http::{greeting, HttpStubServer};
pub use infrastructure::tcp::{run_bench, BenchReport, EchoServer, RelayClient, RelayTarget};
