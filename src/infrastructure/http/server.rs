use crate::domain::error::{HarnessError, HarnessResult};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// Body returned for every request.
pub fn greeting(path: &str) -> String {
    format!("Hello from tunnel! You requested: {}\n", path)
}

/// HTTP stub: a single catch-all route answering with [`greeting`].
pub struct HttpStubServer {
    listener: TcpListener,
    bind_addr: SocketAddr,
}

impl HttpStubServer {
    pub async fn new(bind_addr: &str) -> HarnessResult<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| HarnessError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        let actual_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            bind_addr: actual_addr,
        })
    }

    pub fn get_bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Serve HTTP/1 forever, one task per connection.
    pub async fn run(self) -> HarnessResult<()> {
        debug!("HTTP server listening on {}", self.bind_addr);

        loop {
            match self.listener.accept().await {
                Ok((stream, remote_addr)) => {
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream).await {
                            debug!(error = %e, remote_addr = %remote_addr, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    async fn handle_connection(stream: TcpStream) -> HarnessResult<()> {
        let io = TokioIo::new(stream);

        http1::Builder::new()
            .serve_connection(io, service_fn(handle_request))
            .await?;

        Ok(())
    }
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();
    info!(method = %req.method(), path = %path, "Request received");

    let mut response = Response::new(Full::new(Bytes::from(greeting(path))));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Empty};
    use hyper::header::HOST;
    use hyper::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn spawn_server() -> SocketAddr {
        let server = HttpStubServer::new("127.0.0.1:0").await.unwrap();
        let addr = server.get_bind_addr();
        tokio::spawn(server.run());
        addr
    }

    async fn get(addr: SocketAddr, path: &str) -> (StatusCode, String) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .uri(path)
            .header(HOST, addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();

        let res = sender.send_request(req).await.unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_greeting_format() {
        assert_eq!(greeting("/"), "Hello from tunnel! You requested: /\n");
        assert_eq!(
            greeting("/a/b"),
            "Hello from tunnel! You requested: /a/b\n"
        );
    }

    #[tokio::test]
    async fn test_root_path() {
        let addr = spawn_server().await;
        let (status, body) = get(addr, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello from tunnel! You requested: /\n");
    }

    #[tokio::test]
    async fn test_any_path_is_echoed() {
        let addr = spawn_server().await;

        for path in ["/health", "/deep/nested/route", "/with%20space"] {
            let (status, body) = get(addr, path).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains(path), "body {:?} missing {}", body, path);
        }
    }

    #[tokio::test]
    async fn test_query_is_not_part_of_path() {
        let addr = spawn_server().await;
        let (_, body) = get(addr, "/search?q=tunnel").await;

        assert_eq!(body, "Hello from tunnel! You requested: /search\n");
    }

    #[tokio::test]
    async fn test_raw_request() {
        let addr = spawn_server().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream
            .write_all(b"GET /raw HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("text/plain"));
        assert!(response.ends_with("Hello from tunnel! You requested: /raw\n"));
    }
}
