//! Shared test transport for the integration suite, ported from the
//! teacher's `serial_testable.rs` dependency-injection mock: a
//! `ByteTransport` impl backed by in-memory queues instead of a real port.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use xbee_rs::{ByteTransport, XBeeError};

pub struct MockTransport {
    rx: VecDeque<u8>,
    tx: Arc<Mutex<Vec<u8>>>,
}

impl MockTransport {
    pub fn new(inbound: Vec<u8>) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let tx = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                rx: inbound.into(),
                tx: tx.clone(),
            },
            tx,
        )
    }
}

#[async_trait]
impl ByteTransport for MockTransport {
    async fn open(&mut self) -> Result<(), XBeeError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), XBeeError> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        true
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, XBeeError> {
        match self.rx.pop_front() {
            Some(b) => {
                buf[0] = b;
                Ok(1)
            }
            // A real transport blocks when nothing is available; mimic
            // that so the reader loop's select! behaves the same way.
            None => std::future::pending().await,
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), XBeeError> {
        self.tx.lock().await.extend_from_slice(data);
        Ok(())
    }

    async fn bytes_available(&mut self) -> Result<usize, XBeeError> {
        Ok(self.rx.len())
    }
}
