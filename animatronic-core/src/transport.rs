//! Datagram transport trait and error types.

use core::future::Future;

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Radio or bus I/O error.
    Io,
    /// Radio not initialized or not yet joined.
    NotReady,
    /// Transmit queue full.
    Busy,
    /// Datagram larger than the transport's maximum payload.
    Oversize,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "transport i/o error"),
            Self::NotReady => write!(f, "transport not ready"),
            Self::Busy => write!(f, "transport busy"),
            Self::Oversize => write!(f, "datagram too large"),
        }
    }
}

/// Async trait for the connectionless datagram link.
///
/// Delivery is best effort: datagrams may be lost, duplicated, or reordered.
/// Implementations must not allocate.
pub trait Transport {
    /// Broadcast one datagram.
    fn send(&mut self, payload: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Wait a bounded time for one datagram.
    ///
    /// Returns `Ok(Some(len))` with the datagram copied into `buf`, or
    /// `Ok(None)` if nothing arrived within the wait.
    fn receive(&mut self, buf: &mut [u8])
        -> impl Future<Output = Result<Option<usize>, TransportError>>;
}
