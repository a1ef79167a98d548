//! Newline-framed datagrams over a transparent UART radio modem.
//!
//! The modem broadcasts whatever bytes it is given, so one frame line is one
//! datagram. Received bytes accumulate in a line buffer that survives
//! receive timeouts: a frame that straddles two receive windows is still
//! delivered whole.
//!
//! # Pins
//!
//! UART1 on both nodes:
//! - GPIO 8: TX
//! - GPIO 9: RX

use animatronic_core::{Transport, TransportError};
use animatronic_proto::MAX_FRAME_SIZE;
use defmt::debug;
use embassy_rp::uart::{Async, Config as UartConfig, Error as UartError, Uart};
use embassy_time::{with_timeout, Duration};
use heapless::Vec;

/// Modem line rate.
pub const RADIO_BAUDRATE: u32 = 9_600;

/// UART settings the modems are configured for.
#[must_use]
pub fn radio_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = RADIO_BAUDRATE;
    config
}

/// Map UART errors onto [`TransportError`].
///
/// A helper rather than a `From` impl: both types are foreign to this crate.
#[inline]
fn uart_error_to_transport_error(e: UartError) -> TransportError {
    match e {
        UartError::Overrun => TransportError::Busy,
        _ => TransportError::Io,
    }
}

/// [`Transport`] over the radio UART.
pub struct UartRadio<'d> {
    uart: Uart<'d, Async>,
    line: Vec<u8, MAX_FRAME_SIZE>,
    /// Set while the tail of an overlong line is being skipped.
    discarding: bool,
    window: Duration,
}

impl<'d> UartRadio<'d> {
    /// `window` bounds how long one `receive` call waits for a line.
    #[must_use]
    pub fn new(uart: Uart<'d, Async>, window: Duration) -> Self {
        Self {
            uart,
            line: Vec::new(),
            discarding: false,
            window,
        }
    }

    /// Read until the buffered line is terminated.
    ///
    /// Lines longer than [`MAX_FRAME_SIZE`] are dropped up to their
    /// newline and reported as [`TransportError::Oversize`].
    async fn read_line(&mut self) -> Result<(), TransportError> {
        let mut byte = [0u8; 1];

        loop {
            self.uart
                .read(&mut byte)
                .await
                .map_err(uart_error_to_transport_error)?;

            if self.discarding {
                if byte[0] == b'\n' {
                    self.discarding = false;
                    return Err(TransportError::Oversize);
                }
                continue;
            }

            if self.line.push(byte[0]).is_err() {
                self.line.clear();
                self.discarding = byte[0] != b'\n';
                if !self.discarding {
                    return Err(TransportError::Oversize);
                }
                continue;
            }

            if byte[0] == b'\n' {
                return Ok(());
            }
        }
    }
}

impl Transport for UartRadio<'_> {
    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(TransportError::Oversize);
        }
        self.uart
            .write(payload)
            .await
            .map_err(uart_error_to_transport_error)
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        match with_timeout(self.window, self.read_line()).await {
            Ok(Ok(())) => {
                let len = self.line.len();
                let result = match buf.get_mut(..len) {
                    Some(dst) => {
                        dst.copy_from_slice(&self.line);
                        Ok(Some(len))
                    }
                    None => Err(TransportError::Oversize),
                };
                self.line.clear();
                result
            }
            Ok(Err(e)) => {
                debug!("radio line dropped: {}", e);
                self.line.clear();
                Err(e)
            }
            // Partial line stays buffered for the next window.
            Err(_) => Ok(None),
        }
    }
}
