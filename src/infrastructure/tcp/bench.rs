use crate::domain::config::MAX_CHUNK_SIZE;
use crate::domain::error::{HarnessError, HarnessResult};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const MEBIBYTE: f64 = 1024.0 * 1024.0;

/// Outcome of one throughput run
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub bytes_sent: u64,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Write failure that ended the run early, if any
    pub write_error: Option<String>,
}

impl BenchReport {
    pub fn megabytes(&self) -> f64 {
        self.bytes_sent as f64 / MEBIBYTE
    }

    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.megabytes() / secs
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Sent {:.2} MB in {:.2} s ({:.2} MB/s)",
            self.megabytes(),
            self.elapsed.as_secs_f64(),
            self.throughput_mb_per_sec()
        )
    }
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64())
}

/// Write zero-filled `chunk_size` buffers to `sink` until `limit` bytes are out.
///
/// The final write is trimmed so exactly `limit` bytes are sent. A write
/// error ends the run early and is recorded in the report.
pub async fn run_bench<W>(sink: &mut W, chunk_size: usize, limit: u64) -> HarnessResult<BenchReport>
where
    W: AsyncWrite + Unpin,
{
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(HarnessError::InvalidInput(format!(
            "chunk size must be between 1 and {} bytes, got {}",
            MAX_CHUNK_SIZE, chunk_size
        )));
    }

    let buf = vec![0u8; chunk_size];
    let start = Instant::now();
    let mut sent = 0u64;
    let mut write_error = None;

    while sent < limit {
        let want = (limit - sent).min(chunk_size as u64) as usize;
        match sink.write(&buf[..want]).await {
            Ok(0) => {
                write_error = Some("connection closed by peer".to_string());
                break;
            }
            Ok(n) => sent += n as u64,
            Err(e) => {
                warn!(error = %e, sent, "Bench write failed");
                write_error = Some(e.to_string());
                break;
            }
        }
    }

    if write_error.is_none() {
        if let Err(e) = sink.flush().await {
            write_error = Some(e.to_string());
        }
    }

    let report = BenchReport {
        bytes_sent: sent,
        elapsed: start.elapsed(),
        write_error,
    };
    debug!(bytes = report.bytes_sent, "Bench finished");
    Ok(report)
}
