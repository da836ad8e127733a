//! Transport abstraction for wire bytes.
//!
//! Implementations:
//! - `LocalLoopbackTransport`: in-proc channels for tests/local server
//! - (future) a real socket transport owned by the host application

use crate::channel::{self, Rx, Tx};

#[derive(Debug)]
pub enum TrySendError {
    Disconnected,
}

/// Minimal transport trait for byte messages.
pub trait Transport {
    fn try_send(&self, bytes: Vec<u8>) -> Result<(), TrySendError>;
    fn try_recv(&self) -> Option<Vec<u8>>;
}

/// In-process loopback: two ends, each sends into the other's receive queue.
pub struct LocalLoopbackTransport {
    tx: Tx,
    rx: Rx,
}

impl LocalLoopbackTransport {
    /// Build a connected pair of ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = channel::channel();
        let (tx_b, rx_b) = channel::channel();
        (Self { tx: tx_a, rx: rx_b }, Self { tx: tx_b, rx: rx_a })
    }
}

impl Transport for LocalLoopbackTransport {
    fn try_send(&self, bytes: Vec<u8>) -> Result<(), TrySendError> {
        if self.tx.try_send(bytes) {
            Ok(())
        } else {
            Err(TrySendError::Disconnected)
        }
    }
    fn try_recv(&self) -> Option<Vec<u8>> {
        self.rx.try_recv()
    }
}
