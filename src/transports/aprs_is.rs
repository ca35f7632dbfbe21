//! APRS-IS transport
//!
//! Keeps one TCP connection to an APRS-IS server. The connection is opened on
//! the first send and dropped after any I/O failure, so the next send logs in
//! again from scratch.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::aprs::PositionReport;
use crate::transport::Transport;
use crate::{Result, TrackerError};

/// Round-robin APRS-IS server pool.
pub const DEFAULT_SERVER: &str = "rotate.aprs.net";

/// User-defined filter port.
pub const DEFAULT_PORT: u16 = 14580;

/// Passcode accepted by servers for receive-only (unverified) logins.
pub const UNVERIFIED_PASSCODE: &str = "-1";

/// Prefix of the server's reply to a login line.
const LOGIN_RESPONSE: &str = "# logresp";

/// APRS-IS network client
pub struct AprsIsTransport {
    address: String,
    login: String,
    passcode: String,
    timeout: Duration,
    stream: Option<BufReader<TcpStream>>,
}

impl AprsIsTransport {
    pub fn new(host: &str, port: u16, login: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            address: format!("{host}:{port}"),
            login: login.into(),
            passcode: passcode.into(),
            timeout: Duration::from_secs(10),
            stream: None,
        }
    }

    /// Override the connect/login timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Line sent to log in after the server banner
    pub fn login_line(&self) -> String {
        format!(
            "user {} pass {} vers {} {}\r\n",
            self.login,
            self.passcode,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn failure(&self, reason: impl Into<String>, source: std::io::Error) -> TrackerError {
        TrackerError::delivery_failed_with_source(self.name(), reason, Box::new(source))
    }

    /// Read one server line; end of stream means the server hung up.
    async fn read_server_line(&self, stream: &mut BufReader<TcpStream>, what: &str) -> Result<String> {
        let mut line = String::new();
        let read = stream.read_line(&mut line).await.map_err(|e| self.failure(format!("no {what}"), e))?;
        if read == 0 {
            return Err(TrackerError::delivery_failed(
                self.name(),
                format!("server closed connection before {what}"),
            ));
        }
        Ok(line)
    }

    async fn connect(&mut self) -> Result<BufReader<TcpStream>> {
        let timeout = self.timeout;
        let login_line = self.login_line();

        let session = async {
            let socket = TcpStream::connect(&self.address)
                .await
                .map_err(|e| self.failure(format!("cannot connect to {}", self.address), e))?;
            let mut stream = BufReader::new(socket);

            let banner = self.read_server_line(&mut stream, "server banner").await?;
            debug!(banner = banner.trim(), "APRS-IS server banner");

            stream
                .get_mut()
                .write_all(login_line.as_bytes())
                .await
                .map_err(|e| self.failure("login failed", e))?;

            let response = self.read_server_line(&mut stream, "login response").await?;
            if !response.starts_with(LOGIN_RESPONSE) {
                return Err(TrackerError::delivery_failed(
                    self.name(),
                    format!("unexpected login response {:?}", response.trim()),
                ));
            }
            if response.contains("unverified") {
                warn!("APRS-IS login for {} is unverified, reports will not be gated", self.login);
            }
            info!(address = %self.address, response = response.trim(), "Logged in to APRS-IS");

            Ok::<_, TrackerError>(stream)
        };

        tokio::time::timeout(timeout, session).await.map_err(|elapsed| {
            TrackerError::delivery_failed_with_source(
                self.name(),
                format!("login timed out after {timeout:?}"),
                Box::new(elapsed),
            )
        })?
    }
}

#[async_trait::async_trait]
impl Transport for AprsIsTransport {
    async fn send(&mut self, report: &PositionReport) -> Result<()> {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        let line = format!("{report}\r\n");
        let written = async {
            stream.get_mut().write_all(line.as_bytes()).await?;
            stream.get_mut().flush().await
        }
        .await;

        match written {
            Ok(()) => {
                self.stream = Some(stream);
                info!("frame sent via {}: {}", self.name(), report);
                Ok(())
            }
            // Connection is dropped here and rebuilt on the next send
            Err(e) => Err(self.failure("write failed", e)),
        }
    }

    fn name(&self) -> &str {
        "aprs-is"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::origin_report;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Fake APRS-IS server forwarding every line it receives
    async fn fake_server() -> (u16, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            socket.get_mut().write_all(b"# aprsc 2.1.10\r\n").await.unwrap();

            let mut line = String::new();
            while socket.read_line(&mut line).await.unwrap() > 0 {
                if line.starts_with("user ") {
                    socket
                        .get_mut()
                        .write_all(b"# logresp N0CALL-9 verified, server T2TEST\r\n")
                        .await
                        .unwrap();
                }
                let _ = tx.send(std::mem::take(&mut line));
            }
        });

        (port, rx)
    }

    #[test]
    fn login_line_format() {
        let transport = AprsIsTransport::new("localhost", DEFAULT_PORT, "N0CALL-9", "12345");
        let line = transport.login_line();

        assert!(line.starts_with("user N0CALL-9 pass 12345 vers prismtracker "));
        assert!(line.ends_with("\r\n"));
    }

    #[tokio::test]
    async fn logs_in_then_sends_frames() {
        let (port, mut lines) = fake_server().await;
        let mut transport = AprsIsTransport::new("127.0.0.1", port, "N0CALL-9", "12345");
        let report = origin_report(vec!["TCPIP*".into()]);

        assert!(!transport.is_connected());
        transport.send(&report).await.unwrap();
        transport.send(&report).await.unwrap();
        assert!(transport.is_connected());

        assert!(lines.recv().await.unwrap().starts_with("user N0CALL-9 pass 12345"));
        assert_eq!(lines.recv().await.unwrap(), format!("{}\r\n", report.render()));
        assert_eq!(lines.recv().await.unwrap(), format!("{}\r\n", report.render()));
    }

    /// Fake server that sends a banner, reads the login line and hangs up
    async fn hang_up_after_login() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            socket.get_mut().write_all(b"# aprsc 2.1.10\r\n").await.unwrap();

            let mut line = String::new();
            socket.read_line(&mut line).await.unwrap();
        });

        port
    }

    #[tokio::test]
    async fn server_closing_after_login_is_delivery_failure() {
        let port = hang_up_after_login().await;
        let mut transport = AprsIsTransport::new("127.0.0.1", port, "N0CALL-9", "12345");

        let err = transport.send(&origin_report(vec![])).await.unwrap_err();
        assert!(matches!(err, TrackerError::DeliveryFailed { .. }));
        assert!(err.to_string().contains("closed connection"));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn unexpected_login_response_is_delivery_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            socket.get_mut().write_all(b"# aprsc 2.1.10\r\n").await.unwrap();
            let mut line = String::new();
            socket.read_line(&mut line).await.unwrap();
            socket.get_mut().write_all(b"# port full\r\n").await.unwrap();
            // Keep the socket open until the client gives up
            let _ = socket.read_line(&mut line).await;
        });

        let mut transport = AprsIsTransport::new("127.0.0.1", port, "N0CALL-9", "12345");
        let err = transport.send(&origin_report(vec![])).await.unwrap_err();

        assert!(matches!(err, TrackerError::DeliveryFailed { .. }));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn silent_server_times_out_as_delivery_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut transport = AprsIsTransport::new("127.0.0.1", port, "N0CALL-9", "12345")
            .with_timeout(Duration::from_millis(50));
        let err = transport.send(&origin_report(vec![])).await.unwrap_err();

        assert!(matches!(err, TrackerError::DeliveryFailed { source: Some(_), .. }));
        assert!(err.to_string().contains("aprs-is"));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn unreachable_server_is_delivery_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut transport = AprsIsTransport::new("127.0.0.1", port, "N0CALL-9", UNVERIFIED_PASSCODE);
        let err = transport.send(&origin_report(vec![])).await.unwrap_err();

        assert!(matches!(err, TrackerError::DeliveryFailed { .. }));
        assert!(!transport.is_connected());
    }
}
