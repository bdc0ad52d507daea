//! The byte transport abstraction (§3, §5) and a serial-port implementation.
//!
//! spec.md treats the serial port and a BLE GATT pair as interchangeable:
//! "a byte-stream object exposing `open()`, `close()`, `is_open()`, a
//! readable byte source, a writable byte sink, and a 'bytes available'
//! signal". [`ByteTransport`] is that interface; [`SerialTransport`] is the
//! one concrete implementation this crate ships, grounded in the teacher's
//! `src/mbus/serial.rs` (the `tokio_serial` open/connect dance) and
//! `src/mbus/serial_testable.rs` (the `async_trait` dependency-injection
//! pattern that lets a mock stand in during tests).

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;

use crate::error::XBeeError;

#[async_trait]
pub trait ByteTransport: Send {
    async fn open(&mut self) -> Result<(), XBeeError>;
    async fn close(&mut self) -> Result<(), XBeeError>;
    fn is_open(&self) -> bool;

    /// Read at least one byte into `buf`, returning the number read.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, XBeeError>;

    /// Write the entire buffer, serialized relative to other writers by the
    /// caller (the framer holds a write mutex per spec.md §5).
    async fn write_all(&mut self, data: &[u8]) -> Result<(), XBeeError>;

    /// How many bytes are queued and ready to read without blocking. Used
    /// by the reader loop's "byte available" wait (§4.4).
    async fn bytes_available(&mut self) -> Result<usize, XBeeError>;
}

/// A serial-port-backed transport using `tokio-serial`.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    timeout: Duration,
    stream: Option<tokio_serial::SerialStream>,
}

impl SerialTransport {
    pub fn new(port_name: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            timeout,
            stream: None,
        }
    }

    fn stream_mut(&mut self) -> Result<&mut tokio_serial::SerialStream, XBeeError> {
        self.stream.as_mut().ok_or(XBeeError::NotOpen)
    }
}

#[async_trait]
impl ByteTransport for SerialTransport {
    async fn open(&mut self) -> Result<(), XBeeError> {
        let stream = tokio_serial::new(&self.port_name, self.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .timeout(self.timeout)
            .open_native_async()
            .map_err(|e| XBeeError::Transport(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), XBeeError> {
        // Dropping the stream closes the underlying file descriptor; no
        // explicit close call exists on SerialStream.
        self.stream = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, XBeeError> {
        let n = self.stream_mut()?.read(buf).await?;
        Ok(n)
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), XBeeError> {
        let stream = self.stream_mut()?;
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn bytes_available(&mut self) -> Result<usize, XBeeError> {
        use tokio_serial::SerialPort;
        let stream = self.stream_mut()?;
        Ok(stream.bytes_to_read()? as usize)
    }
}
