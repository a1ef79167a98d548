//! Sequenced, resend-once-per-tick frame sending for the controller.

use animatronic_proto::{Command, ControlFrame, Serialize, MAX_FRAME_SIZE};

use crate::transport::{Transport, TransportError};

/// Link state as seen from the sending side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkHealth {
    Healthy,
    /// Several consecutive sends failed.
    Degraded,
}

impl Default for LinkHealth {
    fn default() -> Self {
        LinkHealth::Healthy
    }
}

/// Wraps a [`Transport`] with the sequence counter and a one-frame resend slot.
///
/// Data frames carry the current counter, which advances only once a data
/// frame has been handed to the transport. Heartbeats carry the current value
/// without advancing it. A failed data, emergency, or unlock frame is held as
/// pending and resent verbatim by [`ReliableSender::flush_pending`].
pub struct ReliableSender<T> {
    transport: T,
    seq: u16,
    pending: Option<ControlFrame>,
    consecutive_failures: u8,
    degraded_after: u8,
    health: LinkHealth,
}

impl<T: Transport> ReliableSender<T> {
    pub fn new(transport: T, degraded_after: u8) -> Self {
        Self {
            transport,
            seq: 0,
            pending: None,
            consecutive_failures: 0,
            degraded_after: degraded_after.max(1),
            health: LinkHealth::Healthy,
        }
    }

    /// Counter value the next data frame will carry.
    #[must_use]
    pub fn seq(&self) -> u16 {
        self.seq
    }

    #[must_use]
    pub fn pending(&self) -> Option<&ControlFrame> {
        self.pending.as_ref()
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn health(&self) -> LinkHealth {
        self.health
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Stamp `frame` with the counter and send it.
    pub async fn send_data(&mut self, mut frame: ControlFrame) -> Result<u16, TransportError> {
        let seq = self.seq;
        frame.seq = Some(seq);
        self.send_queued(frame).await?;
        Ok(seq)
    }

    /// Send an emergency stop or unlock frame. On failure it replaces any
    /// pending frame.
    pub async fn send_control(&mut self, frame: ControlFrame) -> Result<(), TransportError> {
        self.send_queued(frame).await
    }

    /// Send a heartbeat carrying the current counter. Never queued.
    pub async fn send_heartbeat(&mut self) -> Result<(), TransportError> {
        self.transmit(&ControlFrame::heartbeat(Some(self.seq))).await
    }

    /// Resend the pending frame, if any.
    ///
    /// Returns `None` when nothing was pending, otherwise the outcome. The
    /// frame stays pending after a failure.
    pub async fn flush_pending(&mut self) -> Option<Result<ControlFrame, TransportError>> {
        let frame = self.pending?;
        match self.transmit(&frame).await {
            Ok(()) => {
                debug!("pending frame resent");
                self.pending = None;
                self.committed(&frame);
                Some(Ok(frame))
            }
            Err(e) => Some(Err(e)),
        }
    }

    async fn send_queued(&mut self, frame: ControlFrame) -> Result<(), TransportError> {
        match self.transmit(&frame).await {
            Ok(()) => {
                self.committed(&frame);
                Ok(())
            }
            Err(e) => {
                self.pending = Some(frame);
                Err(e)
            }
        }
    }

    /// Bookkeeping after a queued frame reached the transport.
    fn committed(&mut self, frame: &ControlFrame) {
        if let Command::Data(_) = frame.command() {
            self.seq = self.seq.wrapping_add(1);
        }
    }

    async fn transmit(&mut self, frame: &ControlFrame) -> Result<(), TransportError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame
            .serialize(&mut buf)
            .map_err(|_| TransportError::Oversize)?;

        let result = self.transport.send(&buf[..len]).await;
        self.record(result);
        result
    }

    fn record(&mut self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                if self.health == LinkHealth::Degraded {
                    info!("link restored");
                    self.health = LinkHealth::Healthy;
                }
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                debug!("send failed: {}", e);
                if self.consecutive_failures >= self.degraded_after
                    && self.health == LinkHealth::Healthy
                {
                    warn!("link degraded after {} failed sends", self.consecutive_failures);
                    self.health = LinkHealth::Degraded;
                }
            }
        }
    }
}
