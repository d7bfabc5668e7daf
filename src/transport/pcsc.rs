use std::sync::Mutex;

use crate::error::TransportError;
use crate::transport::Transport;

/// Wraps a card handle the host already connected (T=0 or T=1).
///
/// The handle is released with `LeaveCard` when the transport drops;
/// powering down or resetting is up to whoever opened it.
pub struct PcscTransport {
    card: Mutex<pcsc::Card>,
}

impl PcscTransport {
    pub fn new(card: pcsc::Card) -> Self {
        Self {
            card: Mutex::new(card),
        }
    }

    /// Answer-to-reset of the connected card.
    pub fn atr(&self) -> Result<Vec<u8>, TransportError> {
        let card = self
            .card
            .lock()
            .map_err(|e| TransportError::Comm(format!("mutex poisoned: {e}")))?;
        Ok(card.get_attribute_owned(pcsc::Attribute::AtrString)?)
    }

    pub fn into_inner(self) -> Result<pcsc::Card, TransportError> {
        self.card
            .into_inner()
            .map_err(|e| TransportError::Comm(format!("mutex poisoned: {e}")))
    }
}

impl Transport for PcscTransport {
    fn transmit(&self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        let card = self
            .card
            .lock()
            .map_err(|e| TransportError::Comm(format!("mutex poisoned: {e}")))?;
        let mut buf = [0u8; pcsc::MAX_BUFFER_SIZE];
        let response = card.transmit(apdu, &mut buf)?;
        Ok(response.to_vec())
    }
}
