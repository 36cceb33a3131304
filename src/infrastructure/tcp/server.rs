use crate::domain::error::{HarnessError, HarnessResult};
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Identifies one accepted connection in log output.
pub type ConnectionId = Uuid;

/// TCP echo server: every byte a client sends is written back to it.
pub struct EchoServer {
    listener: TcpListener,
    bind_addr: SocketAddr,
}

impl EchoServer {
    pub async fn new(bind_addr: &str) -> HarnessResult<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| HarnessError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        let actual_addr = listener.local_addr()?;

        info!("Echo server created on {}", actual_addr);

        Ok(Self {
            listener,
            bind_addr: actual_addr,
        })
    }

    pub fn get_bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Accept connections forever, one task per connection.
    ///
    /// Accept errors are logged and skipped; they never stop the server.
    pub async fn run(self) -> HarnessResult<()> {
        debug!("Echo server listening on {}", self.bind_addr);

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let conn_id: ConnectionId = Uuid::new_v4();
                    info!(%conn_id, peer = %addr, "New client connected");

                    tokio::spawn(async move {
                        match Self::handle_client(stream).await {
                            Ok(bytes) => {
                                info!(%conn_id, peer = %addr, bytes, "Client disconnected");
                            }
                            Err(e) => {
                                warn!(%conn_id, peer = %addr, error = %e, "Echo ended with error");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Copy the connection back onto itself until EOF or error.
    ///
    /// The stream is dropped, and so closed, when this returns.
    async fn handle_client(mut stream: TcpStream) -> io::Result<u64> {
        let (mut reader, mut writer) = stream.split();
        let echoed = tokio::io::copy(&mut reader, &mut writer).await?;
        debug!(bytes = echoed, "Echo copy finished");
        Ok(echoed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn spawn_server() -> SocketAddr {
        let server = EchoServer::new("127.0.0.1:0").await.unwrap();
        let addr = server.get_bind_addr();
        tokio::spawn(server.run());
        addr
    }

    #[tokio::test]
    async fn test_echo_server_creation() {
        let server = EchoServer::new("127.0.0.1:0").await.unwrap();
        assert_ne!(server.get_bind_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let first = EchoServer::new("127.0.0.1:0").await.unwrap();
        let taken = first.get_bind_addr().to_string();

        let second = EchoServer::new(&taken).await;
        assert!(matches!(second, Err(HarnessError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_echo_functionality() {
        let addr = spawn_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        let test_data = b"Hello, Echo Server!";
        client.write_all(test_data).await.unwrap();
        client.flush().await.unwrap();

        let mut response = vec![0u8; test_data.len()];
        client.read_exact(&mut response).await.unwrap();

        assert_eq!(response, test_data);
    }

    #[tokio::test]
    async fn test_server_closes_after_client_eof() {
        let addr = spawn_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"last words").await.unwrap();
        client.shutdown().await.unwrap();

        let mut response = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut response))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response, b"last words");
    }

    #[tokio::test]
    async fn test_multiple_clients() {
        let addr = spawn_server().await;

        let mut clients = Vec::new();
        for i in 0..3 {
            let mut client = TcpStream::connect(addr).await.unwrap();
            let test_data = format!("Message from client {}", i);

            client.write_all(test_data.as_bytes()).await.unwrap();

            let mut response = vec![0u8; test_data.len()];
            client.read_exact(&mut response).await.unwrap();

            assert_eq!(response, test_data.as_bytes());
            clients.push(client);
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listening_banner_not_logged_at_info() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = EchoServer::new("127.0.0.1:0").await.unwrap();
        let addr = server.get_bind_addr();
        tokio::spawn(server.run());

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"x").await.unwrap();
        let mut response = [0u8; 1];
        client.read_exact(&mut response).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("New client connected"));
        assert!(!output.contains("listening on"));
    }
}
