//! Serial-line sensor board
//!
//! Handshake: the host writes a single ACK byte, the board answers with a
//! line whose first three bytes are the raw channel values. A reply shorter
//! than three bytes, or no reply within the read timeout, repeats the
//! handshake. The port is opened raw (no echo, no CR/LF translation) at
//! 8N1 without flow control.

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilder, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{info, trace};

use super::{SensorReading, SensorSource};
use crate::error::{Error, Result};

/// Any byte acknowledges; the board firmware expects `1`
const ACK: &[u8] = b"1";

/// Sensor board reached over a byte stream
///
/// Reads and writes use separate handles.
pub struct SerialSensor<R, W> {
    reader: BufReader<R>,
    writer: W,
    read_timeout: Duration,
    line: Vec<u8>,
}

/// Sensor on a real serial port
pub type SerialPortSensor = SerialSensor<ReadHalf<SerialStream>, WriteHalf<SerialStream>>;

impl SerialPortSensor {
    /// Open a serial device raw at `baud`, 8N1
    ///
    /// # Errors
    /// - `InvalidConfig` if `baud` is zero
    /// - `Sensor` if the device cannot be opened or configured
    pub fn open(path: &Path, baud: u32, read_timeout: Duration) -> Result<Self> {
        if baud == 0 {
            return Err(Error::InvalidConfig("baud rate must be greater than 0".to_string()));
        }

        let port = port_builder(path, baud)
            .open_native_async()
            .map_err(|e| Error::Sensor(format!("cannot open {} at {} baud: {}", path.display(), baud, e)))?;
        let (reader, writer) = tokio::io::split(port);

        info!("Opened sensor device {} at {} baud", path.display(), baud);
        Ok(Self::new(reader, writer, read_timeout))
    }
}

fn port_builder(path: &Path, baud: u32) -> SerialPortBuilder {
    tokio_serial::new(path.to_string_lossy(), baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
}

impl<R, W> SerialSensor<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, read_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            read_timeout,
            line: Vec::with_capacity(8),
        }
    }

    async fn send_ack(&mut self) -> Result<()> {
        self.writer
            .write_all(ACK)
            .await
            .map_err(|e| Error::Sensor(format!("ACK write failed: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| Error::Sensor(format!("ACK flush failed: {}", e)))
    }
}

impl<R, W> SensorSource for SerialSensor<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn read(&mut self) -> Result<SensorReading> {
        loop {
            self.send_ack().await?;

            self.line.clear();
            let read = tokio::time::timeout(
                self.read_timeout,
                self.reader.read_until(b'\n', &mut self.line),
            )
            .await;

            match read {
                Err(_) => {
                    trace!("No sensor reply within {:?}, re-sending ACK", self.read_timeout);
                    continue;
                }
                Ok(Err(e)) => return Err(Error::Sensor(format!("read failed: {}", e))),
                Ok(Ok(0)) => return Err(Error::Sensor("sensor stream closed".to_string())),
                Ok(Ok(_)) => {}
            }

            let payload = self.line.strip_suffix(b"\n").unwrap_or(self.line.as_slice());
            if payload.len() < 3 {
                trace!("Short sensor reply ({} bytes), retrying", payload.len());
                continue;
            }

            return Ok(SensorReading::new(payload[0], payload[1], payload[2]));
        }
    }
}
