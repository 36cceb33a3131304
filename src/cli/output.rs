use crate::cli::args::OutputFormat;
use crate::domain::config::HarnessConfig;
use crate::infrastructure::tcp::BenchReport;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_config(&self, config: &HarnessConfig) -> Result<(), OutputError>;
    fn write_bench_report(&self, report: &BenchReport) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::HarnessError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn render_config(&self, config: &HarnessConfig) -> Result<String, OutputError> {
        let rendered = match self.format {
            OutputFormat::Text => toml::to_string_pretty(config)?,
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            OutputFormat::Table => Table::new(ConfigTableRow::rows(config)).to_string(),
        };
        Ok(rendered)
    }

    pub fn render_bench_report(&self, report: &BenchReport) -> Result<String, OutputError> {
        let rendered = match self.format {
            OutputFormat::Text => report.summary(),
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
            OutputFormat::Table => Table::new([BenchTableRow::from(report)]).to_string(),
        };
        Ok(rendered)
    }

    pub fn render_message(&self, message: &str) -> Result<String, OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                Ok(serde_json::to_string_pretty(&output)?)
            }
            _ => Ok(message.to_string()),
        }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_config(&self, config: &HarnessConfig) -> Result<(), OutputError> {
        println!("{}", self.render_config(config)?);
        Ok(())
    }

    fn write_bench_report(&self, report: &BenchReport) -> Result<(), OutputError> {
        println!("{}", self.render_bench_report(report)?);
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        println!("{}", self.render_message(message)?);
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Table row for one configuration value
#[derive(Tabled)]
struct ConfigTableRow {
    section: &'static str,
    key: &'static str,
    value: String,
}

impl ConfigTableRow {
    fn rows(config: &HarnessConfig) -> Vec<Self> {
        let row = |section: &'static str, key: &'static str, value: String| Self {
            section,
            key,
            value,
        };
        vec![
            row("global", "log_level", config.global.log_level.clone()),
            row("relay", "host", config.relay.host.clone()),
            row("echo", "bind", config.echo.bind.clone()),
            row("http", "bind", config.http.bind.clone()),
            row("bench", "chunk_size", config.bench.chunk_size.to_string()),
            row("bench", "limit_mb", config.bench.limit_mb.to_string()),
        ]
    }
}

/// Table row for a bench report
#[derive(Tabled)]
struct BenchTableRow {
    bytes: u64,
    megabytes: String,
    seconds: String,
    mb_per_sec: String,
    error: String,
}

impl From<&BenchReport> for BenchTableRow {
    fn from(report: &BenchReport) -> Self {
        Self {
            bytes: report.bytes_sent,
            megabytes: format!("{:.2}", report.megabytes()),
            seconds: format!("{:.2}", report.elapsed.as_secs_f64()),
            mb_per_sec: format!("{:.2}", report.throughput_mb_per_sec()),
            error: report.write_error.clone().unwrap_or_default(),
        }
    }
}
