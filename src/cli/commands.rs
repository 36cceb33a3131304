use crate::cli::args::{
    Args, BenchArgs, Command, ConfigArgs, ConfigCommand, ListenerArgs, RemoteTesterArgs,
};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::domain::config::{BenchConfig, HarnessConfig};
use crate::domain::error::{HarnessError, HarnessResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::http::HttpStubServer;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::tcp::{dial, run_bench, EchoServer, RelayClient, RelayTarget};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::debug;

/// Execute CLI command
pub async fn execute_command(args: Args) -> HarnessResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config_manager = ConfigManager::new();
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path.as_ref())?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose)?;
    }

    match args.command {
        Command::RemoteTester(relay_args) => {
            execute_remote_tester(relay_args, &writer, &config).await
        }
        Command::EchoServer(listener_args) => {
            execute_echo_server(listener_args, &writer, &config).await
        }
        Command::HttpServer(listener_args) => {
            execute_http_server(listener_args, &writer, &config).await
        }
        Command::Bench(bench_args) => execute_bench(bench_args, &writer, &config).await,
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Command::Version => {
            writer.write_message(&format!("tunnel-harness {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Line relay. Usage and dial problems are reported and end the command
/// successfully; only output failures propagate.
async fn execute_remote_tester(
    args: RemoteTesterArgs,
    writer: &ConsoleWriter,
    config: &HarnessConfig,
) -> HarnessResult<()> {
    let [port] = args.args.as_slice() else {
        writer.write_message("Usage: tunnel-harness remote-tester <port>")?;
        return Ok(());
    };

    let target = match RelayTarget::new(config.relay.host.clone(), port) {
        Ok(target) => target,
        Err(e) => {
            writer.write_message(&format!("Connection error: {}", e))?;
            return Ok(());
        }
    };

    writer.write_message(&format!("Connecting to {}...", target))?;

    let client = match RelayClient::connect(&target).await {
        Ok(client) => client,
        Err(e) => {
            writer.write_message(&format!("Connection error: {}", e))?;
            return Ok(());
        }
    };

    writer.write_message("Connected! Type and press Enter. Ctrl+C to exit.")?;

    let stdin = BufReader::new(tokio::io::stdin());
    match client.run(stdin, tokio::io::stdout()).await {
        Ok(lines) => debug!(lines, "Input closed"),
        Err(e) => writer.write_message(&format!("Send error: {}", e))?,
    }

    Ok(())
}

async fn execute_echo_server(
    args: ListenerArgs,
    writer: &ConsoleWriter,
    config: &HarnessConfig,
) -> HarnessResult<()> {
    let bind = args.bind.unwrap_or_else(|| config.echo.bind.clone());
    let server = EchoServer::new(&bind).await?;

    writer.write_message(&format!("Echo server listening on {}", server.get_bind_addr()))?;
    server.run().await
}

async fn execute_http_server(
    args: ListenerArgs,
    writer: &ConsoleWriter,
    config: &HarnessConfig,
) -> HarnessResult<()> {
    let bind = args.bind.unwrap_or_else(|| config.http.bind.clone());
    let server = HttpStubServer::new(&bind).await?;

    writer.write_message(&format!("HTTP server listening on {}", server.get_bind_addr()))?;
    server.run().await
}

async fn execute_bench(
    args: BenchArgs,
    writer: &ConsoleWriter,
    config: &HarnessConfig,
) -> HarnessResult<()> {
    let settings = BenchConfig {
        chunk_size: args.chunk_size.unwrap_or(config.bench.chunk_size),
        limit_mb: args.limit_mb.unwrap_or(config.bench.limit_mb),
    };
    let limit = settings.validate()?;
    let target = RelayTarget::new(config.relay.host.clone(), &args.port)?;

    let mut stream = dial(&target).await?;
    let report = run_bench(&mut stream, settings.chunk_size, limit).await?;

    if let Some(e) = &report.write_error {
        writer.write_message(&format!("Write error: {}", e))?;
    }
    writer.write_bench_report(&report)?;

    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &HarnessConfig,
    config_manager: &ConfigManager,
) -> HarnessResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init { dir } => {
            let dir = match dir {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir().map_err(|e| HarnessError::Config {
                    message: format!("Failed to get current directory: {}", e),
                })?,
            };

            let config_file = config_manager.init_project_config(&dir)?;
            writer.write_message(&format!(
                "Project configuration initialized at '{}'",
                config_file.display()
            ))?;
            Ok(())
        }
    }
}
