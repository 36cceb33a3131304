use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Command line arguments for tunnel-harness
#[derive(Parser, Debug)]
#[command(
    name = "tunnel-harness",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manual connectivity harnesses for a TCP tunnel",
    long_about = "Disposable tools for checking that traffic reaches a tunnel endpoint: a line relay client, a TCP echo server, an HTTP greeting stub and a throughput bench."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dial 127.0.0.1:<port>, send stdin lines, print whatever comes back
    RemoteTester(RemoteTesterArgs),
    /// Echo every received byte back to its sender (port 8080)
    EchoServer(ListenerArgs),
    /// Answer every HTTP request with a greeting naming the path (port 8080)
    HttpServer(ListenerArgs),
    /// Push zero-filled data at 127.0.0.1:<port> and report throughput
    Bench(BenchArgs),
    /// Configuration commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Relay client arguments.
///
/// Collected as a list so a wrong argument count gets the usage line
/// instead of a clap error.
#[derive(ClapArgs, Debug)]
pub struct RemoteTesterArgs {
    /// Local port the tunnel exposes
    #[arg(value_name = "PORT", num_args = 0..)]
    pub args: Vec<String>,
}

/// Listener arguments shared by the echo and HTTP servers
#[derive(ClapArgs, Debug)]
pub struct ListenerArgs {
    /// Bind address, overriding the configured one
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Throughput bench arguments
#[derive(ClapArgs, Debug)]
pub struct BenchArgs {
    /// Local port the tunnel exposes
    pub port: String,

    /// Bytes per write
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Stop after this many MiB
    #[arg(long)]
    pub limit_mb: Option<u64>,
}

/// Configuration arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show,
    /// Write a default project configuration
    Init {
        /// Directory to create `.tunnel-harness/config.toml` in
        #[arg(short, long)]
        dir: Option<String>,
    },
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}
