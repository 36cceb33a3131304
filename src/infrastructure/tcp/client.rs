use crate::domain::error::{HarnessError, HarnessResult};
use std::fmt;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Address the relay and bench clients dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub host: String,
    pub port: u16,
}

impl RelayTarget {
    /// Build a target from the raw `<port>` argument.
    pub fn new(host: impl Into<String>, port: &str) -> HarnessResult<Self> {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| HarnessError::InvalidInput(format!("invalid port '{}': {}", port, e)))?;

        Ok(Self {
            host: host.into(),
            port,
        })
    }
}

impl fmt::Display for RelayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Open a TCP connection to `target`.
pub async fn dial(target: &RelayTarget) -> HarnessResult<TcpStream> {
    let stream = TcpStream::connect((target.host.as_str(), target.port))
        .await
        .map_err(|source| HarnessError::Connect {
            addr: target.to_string(),
            source,
        })?;

    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "Failed to set TCP_NODELAY");
    }

    info!(addr = %target, "TCP connection established");
    Ok(stream)
}

/// Line relay client: stdin lines go out, socket bytes come back.
pub struct RelayClient {
    stream: TcpStream,
}

impl RelayClient {
    pub async fn connect(target: &RelayTarget) -> HarnessResult<Self> {
        Ok(Self {
            stream: dial(target).await?,
        })
    }

    /// Relay until `input` is exhausted or a socket write fails.
    ///
    /// Socket bytes are copied to `output` by a background task for the whole
    /// session. Returns the number of lines sent; the error, if any, is the
    /// write failure that stopped the loop. The connection is closed on return.
    pub async fn run<I, O>(self, input: I, output: O) -> io::Result<u64>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let (reader, writer) = self.stream.into_split();
        let rx_handle = tokio::spawn(copy_to_output(reader, output));

        let result = relay_lines(input, writer).await;

        rx_handle.abort();
        result
    }
}

/// Copy everything the peer sends into `output`. Errors end the copy quietly.
async fn copy_to_output<R, O>(mut reader: R, mut output: O)
where
    R: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    match tokio::io::copy(&mut reader, &mut output).await {
        Ok(bytes) => debug!(bytes, "Peer closed connection"),
        Err(e) => debug!(error = %e, "Receive copy ended"),
    }
    let _ = output.flush().await;
}

/// Write each input line, with a single `\n` terminator, to `socket`.
///
/// Line endings are normalised: a trailing `\r` before `\n` is dropped, and
/// a final line without a terminator still gets one. Input read errors end
/// the loop like end of input does; only socket write errors are returned.
pub async fn relay_lines<R, W>(input: R, mut socket: W) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.split(b'\n');
    let mut sent = 0u64;

    loop {
        let mut frame = match lines.next_segment().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Input read failed");
                break;
            }
        };

        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
        frame.push(b'\n');

        socket.write_all(&frame).await?;
        socket.flush().await?;
        sent += 1;
        debug!(bytes = frame.len(), "Sent line");
    }

    Ok(sent)
}
