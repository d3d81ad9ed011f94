//! Scripted MPD server on a loopback socket

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the server answers one command
#[derive(Debug, Clone)]
pub enum Reply {
    /// `key: value` lines (each ending in `\n`) followed by `OK`
    Ok(&'static str),
    /// `ACK [50@0] {command} message`
    Ack(&'static str),
    /// Say nothing
    Hang,
    /// Close the connection without answering
    Close,
}

pub const GREETING: &str = "OK MPD 0.23.5\n";

/// Accepts one connection per session and plays its script
///
/// Each script entry is the command line expected from the client and the
/// reply to send. When a script is done the server keeps the connection
/// open until the client hangs up, then accepts the next session.
pub struct FakeMpdServer {
    addr: SocketAddr,
    handle: JoinHandle<Vec<String>>,
}

impl FakeMpdServer {
    pub async fn start(sessions: Vec<Vec<(&'static str, Reply)>>) -> Self {
        Self::with_greeting(GREETING, sessions).await
    }

    pub async fn with_greeting(greeting: &'static str, sessions: Vec<Vec<(&'static str, Reply)>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for script in sessions {
                let (socket, _) = listener.accept().await.unwrap();
                let mut stream = BufStream::new(socket);
                stream.write_all(greeting.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();

                let mut closed = false;
                for (expected, reply) in script {
                    let mut line = String::new();
                    if stream.read_line(&mut line).await.unwrap() == 0 {
                        closed = true;
                        break;
                    }
                    let line = line.trim_end().to_string();
                    assert_eq!(line, expected, "unexpected command");
                    let name = line.split_whitespace().next().unwrap_or_default().to_string();
                    seen.push(line);

                    match reply {
                        Reply::Ok(body) => {
                            stream.write_all(body.as_bytes()).await.unwrap();
                            stream.write_all(b"OK\n").await.unwrap();
                        }
                        Reply::Ack(message) => {
                            let ack = format!("ACK [50@0] {{{}}} {}\n", name, message);
                            stream.write_all(ack.as_bytes()).await.unwrap();
                        }
                        Reply::Hang => {}
                        Reply::Close => {
                            closed = true;
                            break;
                        }
                    }
                    stream.flush().await.unwrap();
                }

                if !closed {
                    // Linger until the client drops the connection
                    let mut rest = String::new();
                    while stream.read_line(&mut rest).await.unwrap_or(0) > 0 {
                        rest.clear();
                    }
                }
            }
            seen
        });

        Self { addr, handle }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Wait for every session to finish; returns the commands received
    pub async fn finish(self) -> Vec<String> {
        self.handle.await.unwrap()
    }
}
