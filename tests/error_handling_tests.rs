use std::error::Error;
use tunnel_harness::{HarnessError, HarnessResult};

/// Error handling tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let errors = vec![
            HarnessError::Config { message: "Config error".to_string() },
            HarnessError::InvalidInput("Invalid input".to_string()),
            HarnessError::Output("Output error".to_string()),
            HarnessError::Bind {
                addr: "0.0.0.0:8080".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
            },
            HarnessError::Connect {
                addr: "127.0.0.1:9".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            },
        ];

        for error in errors {
            assert!(!error.to_string().is_empty(), "Error display should not be empty");
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HarnessError>();
    }

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let harness_error: HarnessError = io_error.into();
        assert!(matches!(harness_error, HarnessError::Network(_)));
    }

    #[test]
    fn test_bind_error_names_address_and_keeps_source() {
        let error = HarnessError::Bind {
            addr: "0.0.0.0:8080".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "Address already in use"),
        };

        let display = error.to_string();
        assert!(display.contains("0.0.0.0:8080"));
        assert!(display.contains("Address already in use"));

        let source = error.source().expect("bind error should carry its io error");
        assert!(source.to_string().contains("Address already in use"));
    }

    #[test]
    fn test_error_chain() {
        let root_cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let error = HarnessError::Connect {
            addr: "127.0.0.1:22".to_string(),
            source: root_cause,
        };

        let mut current_error: &dyn Error = &error;
        let mut depth = 0;

        while let Some(source) = current_error.source() {
            current_error = source;
            depth += 1;
            if depth > 10 {
                break;
            }
        }

        assert!(depth > 0, "Should have at least one source error");
    }

    #[tokio::test]
    async fn test_async_error_propagation() {
        async fn failing_async_function() -> HarnessResult<()> {
            Err(HarnessError::InvalidInput("bad port".to_string()))
        }

        async fn calling_function() -> HarnessResult<()> {
            failing_async_function().await?;
            Ok(())
        }

        let error = calling_function().await.unwrap_err();
        assert!(error.to_string().contains("Invalid input"));
        assert!(error.to_string().contains("bad port"));
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<HarnessError>();
        assert!(error_size <= 128, "HarnessError too large: {} bytes", error_size);
    }
}
