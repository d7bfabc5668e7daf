//! Channel adapters for talking to the card.
//!
//! - [`pcsc::PcscTransport`] -- PC/SC reader connection (feature `pcsc`)
//!
//! Reader discovery and connect/disconnect stay with the host: a transport
//! wraps a channel that is already open.

#[cfg(feature = "pcsc")]
pub mod pcsc;

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::TransportError;

/// One command in flight at a time. Implementations serialize access to
/// the underlying channel themselves.
pub trait Transport: Send + Sync {
    /// Send raw command bytes, return raw response bytes (data + SW).
    fn transmit(&self, apdu: &[u8]) -> Result<Vec<u8>, TransportError>;

    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError> {
        let raw = self.transmit(&command.serialize())?;
        ApduAnswer::from_raw(raw)
    }
}
