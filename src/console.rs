use std::io;

use log::{debug, error, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};

use crate::config::ConsoleConfig;
use crate::error::SourceQueryError;
use crate::framer::{frame, unknown_command_echo};

/// Sent before the command. Must never be a real console command.
pub const START_MARKER: &str = "startcommand";
/// Sent after the command. Must never be a real console command.
pub const END_MARKER: &str = "endcommand";

const READ_SIZE: usize = 10 * 1024;

/// Client for the server's telnet console.
///
/// The console has no reply framing of its own, so every command is wrapped
/// in two unknown commands and the output is whatever the server prints
/// between their error echoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleClient {
    config: ConsoleConfig,
}

impl ConsoleClient {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }

    /// Run `command` and return its output, or whatever was read before an
    /// I/O error (possibly nothing). Errors are logged, never returned.
    pub async fn send_command(&self, host: &str, port: u16, command: &str) -> String {
        let mut raw = Vec::new();
        if let Err(e) = self.exchange(host, port, command, &mut raw).await {
            error!("[{}:{}] console command {:?} failed: {}", host, port, command, e);
        }
        frame(&String::from_utf8_lossy(&raw), START_MARKER, END_MARKER)
    }

    /// Like [ConsoleClient::send_command], but an I/O error discards the output.
    pub async fn try_send_command(
        &self,
        host: &str,
        port: u16,
        command: &str,
    ) -> Result<String, SourceQueryError> {
        let mut raw = Vec::new();
        self.exchange(host, port, command, &mut raw).await?;
        Ok(frame(&String::from_utf8_lossy(&raw), START_MARKER, END_MARKER))
    }

    /// Write the framed command and read into `raw` until the end echo,
    /// end of stream or the read deadline.
    async fn exchange(
        &self,
        host: &str,
        port: u16,
        command: &str,
        raw: &mut Vec<u8>,
    ) -> Result<(), SourceQueryError> {
        let mut stream = timeout(self.config.connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

        let command = command.trim_end_matches(['\r', '\n']);
        let request = format!("{}\n{}\n{}\n", START_MARKER, command, END_MARKER);
        stream.write_all(request.as_bytes()).await?;

        let end_echo = unknown_command_echo(END_MARKER);
        let deadline = Instant::now() + self.config.read_timeout;
        let mut buf = vec![0u8; READ_SIZE];
        loop {
            let len = match timeout_at(deadline, stream.read(&mut buf)).await {
                Ok(read) => read?,
                Err(_) => {
                    warn!(
                        "[{}:{}] no end of output within {:?}, keeping {} bytes",
                        host,
                        port,
                        self.config.read_timeout,
                        raw.len()
                    );
                    break;
                }
            };
            if len == 0 {
                debug!("[{}:{}] console closed the connection", host, port);
                break;
            }
            raw.extend_from_slice(&buf[..len]);

            if let Some(end) = find(raw, end_echo.as_bytes()) {
                raw.truncate(end);
                break;
            }
        }

        Ok(())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Run `command` on the console at `host:port` with the default time limits.
pub async fn send_command(host: &str, port: u16, command: &str) -> String {
    ConsoleClient::default().send_command(host, port, command).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    const START_ECHO: &str = "*** ERROR: unknown command 'startcommand'\r\n";
    const END_ECHO: &str = "*** ERROR: unknown command 'endcommand'\r\n";

    fn client(read_timeout: Duration) -> ConsoleClient {
        ConsoleClient::new(ConsoleConfig {
            connect_timeout: Duration::from_secs(2),
            read_timeout,
        })
    }

    /// Console that checks the three request lines, writes `reply` in
    /// `chunks`, then holds the connection open until `release` fires.
    async fn fake_console(reply: String, chunks: usize) -> (u16, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (release, held) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (rd, mut wr) = socket.into_split();
            let mut lines = BufReader::new(rd).lines();
            assert_eq!(lines.next_line().await.unwrap().unwrap(), "startcommand");
            assert_eq!(lines.next_line().await.unwrap().unwrap(), "gettime");
            assert_eq!(lines.next_line().await.unwrap().unwrap(), "endcommand");

            let bytes = reply.into_bytes();
            let size = bytes.len().div_ceil(chunks.max(1)).max(1);
            for chunk in bytes.chunks(size) {
                wr.write_all(chunk).await.unwrap();
                wr.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            let _ = held.await;
        });

        (port, release)
    }

    #[tokio::test]
    async fn stops_at_end_echo() {
        let reply = format!(
            "2024-05-01T10:00:00 1.000 INF Telnet connection\r\n{}Day 7, 22:00\r\n\
             2024-05-01T10:00:01 1.100 INF Executing command 'gettime'\r\n{}",
            START_ECHO, END_ECHO
        );
        let (port, _release) = fake_console(reply, 4).await;

        let started = std::time::Instant::now();
        let output = client(Duration::from_secs(5))
            .send_command("127.0.0.1", port, "gettime\n")
            .await;
        assert_eq!(output, "Day 7, 22:00");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn end_of_stream_returns_output() {
        let reply = format!("{}Day 7, 22:00\r\n", START_ECHO);
        let (port, release) = fake_console(reply, 1).await;
        drop(release);

        let output = client(Duration::from_secs(5))
            .try_send_command("127.0.0.1", port, "gettime")
            .await
            .unwrap();
        assert_eq!(output, "Day 7, 22:00");
    }

    #[tokio::test]
    async fn read_deadline_keeps_partial_output() {
        let reply = format!("{}Day 7, 22:00\r\n", START_ECHO);
        let (port, _release) = fake_console(reply, 1).await;

        let started = std::time::Instant::now();
        let output = client(Duration::from_millis(300))
            .send_command("127.0.0.1", port, "gettime")
            .await;
        assert_eq!(output, "Day 7, 22:00");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    /// Console that prints the start echo and one line, then resets every connection.
    async fn resetting_console(connections: usize) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            for _ in 0..connections {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 256];
                while !request.ends_with(b"endcommand\n") {
                    let len = socket.read(&mut buf).await.unwrap();
                    assert!(len > 0, "client hung up early");
                    request.extend_from_slice(&buf[..len]);
                }

                socket
                    .write_all(format!("{}partial line\r\n", START_ECHO).as_bytes())
                    .await
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                // closing with a zero linger sends RST instead of FIN
                #[allow(deprecated)]
                socket.set_linger(Some(Duration::ZERO)).unwrap();
                drop(socket);
            }
        });

        port
    }

    #[tokio::test]
    async fn reset_keeps_partial_output() {
        let port = resetting_console(2).await;
        let console = client(Duration::from_secs(5));

        let output = console.send_command("127.0.0.1", port, "gettime").await;
        assert_eq!(output, "partial line");

        assert!(matches!(
            console.try_send_command("127.0.0.1", port, "gettime").await,
            Err(SourceQueryError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn refused_connection_is_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let console = client(Duration::from_secs(1));
        assert_eq!(console.send_command("127.0.0.1", port, "gettime").await, "");
        assert!(matches!(
            console.try_send_command("127.0.0.1", port, "gettime").await,
            Err(SourceQueryError::Connection(_))
        ));
    }

    #[test]
    fn finds_bytes() {
        assert_eq!(find(b"abcabc", b"ca"), Some(2));
        assert_eq!(find(b"abc", b"x"), None);
        assert_eq!(find(b"ab", b"abc"), None);
    }
}
