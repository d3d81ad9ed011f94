//! MPD (Music Player Daemon) client
//!
//! Speaks the MPD text protocol over TCP:
//! - on connect the server greets with `OK MPD <version>`
//! - each command is one line; the reply is zero or more `key: value` lines
//!   terminated by `OK`, or a single `ACK [error@index] {command} message`
//!
//! Every command runs under the configured timeout. A timeout, I/O failure
//! or garbled reply drops the connection; the next command reconnects, so a
//! caller that retries a transient failure gets a fresh session.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

use super::{PlaybackService, PlayerStatus, TrackEntry};
use crate::error::{Error, Result};

/// Default MPD port
pub const MPD_DEFAULT_PORT: u16 = 6600;

/// Default per-command timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const GREETING_PREFIX: &str = "OK MPD ";

/// Async MPD session with lazy reconnect
#[derive(Debug)]
pub struct MpdClient {
    host: String,
    port: u16,
    timeout: Duration,
    conn: Option<BufStream<TcpStream>>,
    server_version: Option<String>,
}

impl MpdClient {
    /// Create a client without connecting; the first command connects
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            conn: None,
            server_version: None,
        }
    }

    /// Create a client and open the session immediately
    pub async fn connect(host: impl Into<String>, port: u16, timeout: Duration) -> Result<Self> {
        let mut client = Self::new(host, port, timeout);
        let deadline = client.timeout;
        match tokio::time::timeout(deadline, client.ensure_connected()).await {
            Ok(result) => {
                result?;
            }
            Err(_) => {
                return Err(Error::transient(
                    "connect",
                    io::Error::new(io::ErrorKind::TimedOut, "timed out waiting for MPD greeting"),
                ));
            }
        }
        Ok(client)
    }

    /// Protocol version from the last greeting
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn ensure_connected(&mut self) -> Result<&mut BufStream<TcpStream>> {
        if self.conn.is_none() {
            let stream = TcpStream::connect((self.host.as_str(), self.port))
                .await
                .map_err(|e| Error::transient("connect", e))?;
            let mut stream = BufStream::new(stream);

            let mut greeting = String::new();
            let n = stream
                .read_line(&mut greeting)
                .await
                .map_err(|e| io_error("connect", e))?;
            if n == 0 {
                return Err(Error::transient(
                    "connect",
                    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before greeting"),
                ));
            }

            let version = greeting
                .trim_end()
                .strip_prefix(GREETING_PREFIX)
                .ok_or_else(|| Error::Protocol(format!("unexpected greeting: {}", greeting.trim_end())))?;

            info!("Connected to MPD {} at {}:{}", version, self.host, self.port);
            self.server_version = Some(version.to_string());
            self.conn = Some(stream);
        }

        self.conn
            .as_mut()
            .ok_or_else(|| Error::InternalInvariant("MPD connection missing after connect".to_string()))
    }

    /// Send one command and collect its `key: value` reply
    async fn command(&mut self, cmd: &str) -> Result<Vec<(String, String)>> {
        let name = command_name(cmd).to_string();
        let deadline = self.timeout;

        let result = match tokio::time::timeout(deadline, self.exchange(cmd, &name)).await {
            Ok(result) => result,
            Err(_) => Err(Error::transient(
                name.clone(),
                io::Error::new(io::ErrorKind::TimedOut, format!("no reply within {:?}", deadline)),
            )),
        };

        if let Err(e) = &result {
            if e.is_transient() || matches!(e, Error::Protocol(_)) {
                if self.conn.take().is_some() {
                    warn!("Dropping MPD connection after '{}' failed: {}", name, e);
                }
            }
        }
        result
    }

    async fn exchange(&mut self, cmd: &str, name: &str) -> Result<Vec<(String, String)>> {
        let stream = self.ensure_connected().await?;

        trace!("MPD >> {}", cmd);
        stream
            .write_all(format!("{}\n", cmd).as_bytes())
            .await
            .map_err(|e| io_error(name, e))?;
        stream.flush().await.map_err(|e| io_error(name, e))?;

        let mut pairs = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            let n = stream
                .read_line(&mut line)
                .await
                .map_err(|e| io_error(name, e))?;
            if n == 0 {
                return Err(Error::transient(
                    name,
                    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by server"),
                ));
            }

            let line = line.trim_end_matches(['\r', '\n']);
            trace!("MPD << {}", line);

            if line == "OK" {
                return Ok(pairs);
            }
            if let Some(ack) = line.strip_prefix("ACK ") {
                return Err(Error::Command {
                    command: name.to_string(),
                    message: parse_ack(ack).to_string(),
                });
            }
            let (key, value) = split_pair(line)?;
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    async fn simple(&mut self, cmd: &str) -> Result<()> {
        self.command(cmd).await.map(|_| ())
    }
}

impl PlaybackService for MpdClient {
    async fn play(&mut self) -> Result<()> {
        self.simple("play").await
    }

    async fn pause(&mut self) -> Result<()> {
        self.simple("pause 1").await
    }

    async fn clear(&mut self) -> Result<()> {
        self.simple("clear").await
    }

    async fn load(&mut self, name: &str) -> Result<()> {
        self.simple(&format!("load {}", quote(name))).await
    }

    async fn seek(&mut self, track_index: usize, offset_seconds: u64) -> Result<()> {
        self.simple(&format!("seek {} {}", track_index, offset_seconds))
            .await
    }

    async fn set_volume(&mut self, percent: u8) -> Result<()> {
        self.simple(&format!("setvol {}", percent.min(100))).await
    }

    async fn status(&mut self) -> Result<PlayerStatus> {
        self.command("status").await.map(PlayerStatus::new)
    }

    async fn list_playlists(&mut self) -> Result<Vec<String>> {
        let pairs = self.command("listplaylists").await?;
        let names: Vec<String> = pairs
            .into_iter()
            .filter(|(k, _)| k == "playlist")
            .map(|(_, v)| v)
            .collect();
        debug!("MPD reports {} stored playlists", names.len());
        Ok(names)
    }

    async fn list_tracks(&mut self, name: &str) -> Result<Vec<TrackEntry>> {
        let pairs = self
            .command(&format!("listplaylistinfo {}", quote(name)))
            .await?;
        Ok(group_tracks(pairs))
    }
}

/// Map an I/O failure: undecodable bytes are a protocol fault, anything
/// else is a connectivity hiccup
fn io_error(operation: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::InvalidData {
        Error::Protocol(format!("{}: {}", operation, e))
    } else {
        Error::transient(operation, e)
    }
}

/// First word of a command line
fn command_name(cmd: &str) -> &str {
    cmd.split_whitespace().next().unwrap_or(cmd)
}

/// Quote a command argument: wrap in double quotes, escape `\` and `"`
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Message part of an ACK line (`[50@0] {load} No such playlist`)
fn parse_ack(ack: &str) -> &str {
    match ack.find("} ") {
        Some(pos) => &ack[pos + 2..],
        None => ack,
    }
}

fn split_pair(line: &str) -> Result<(&str, &str)> {
    line.split_once(": ")
        .ok_or_else(|| Error::Protocol(format!("malformed response line: {}", line)))
}

/// Group a flat `listplaylistinfo` reply into entries; each `file` key
/// starts a new entry
fn group_tracks(pairs: Vec<(String, String)>) -> Vec<TrackEntry> {
    let mut tracks: Vec<TrackEntry> = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "file" => tracks.push(TrackEntry {
                uri: value,
                time: None,
            }),
            "Time" => {
                if let Some(track) = tracks.last_mut() {
                    track.time = Some(value);
                }
            }
            _ => {}
        }
    }
    tracks
}
