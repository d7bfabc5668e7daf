//! Cardholder PIN verification.
//!
//! A wrong PIN is reported with the card's remaining-attempts counter and
//! never resubmitted here: each attempt burns a try, so only the caller
//! decides whether to ask again.

use crate::apdu::StatusOutcome;
use crate::commands::verify;
use crate::error::CardError;
use crate::transport::Transport;

const MAX_PIN_DIGITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEncoding {
    /// One ASCII digit per byte: `"1234"` -> `31 32 33 34`.
    Ascii,
    /// Two digits per byte, odd length padded with `F`: `"123"` -> `12 3F`.
    PackedBcd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStatus {
    Verified,
    Rejected { retries_remaining: u8 },
    /// No attempts left; the PIN must be unblocked out of band.
    Blocked,
}

pub fn encode_pin(pin: &str, encoding: PinEncoding) -> Result<Vec<u8>, CardError> {
    if pin.is_empty() || pin.len() > MAX_PIN_DIGITS {
        return Err(CardError::InvalidPin(format!(
            "expected 1 to {MAX_PIN_DIGITS} digits, got {}",
            pin.len()
        )));
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::InvalidPin("PIN must contain only digits".into()));
    }

    Ok(match encoding {
        PinEncoding::Ascii => pin.as_bytes().to_vec(),
        PinEncoding::PackedBcd => pin
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let hi = pair[0] - b'0';
                let lo = pair.get(1).map_or(0x0F, |d| d - b'0');
                (hi << 4) | lo
            })
            .collect(),
    })
}

/// Send VERIFY and map the outcome. Card refusals other than a wrong or
/// blocked PIN come back as `Err`.
pub fn verify(
    transport: &dyn Transport,
    pin: &str,
    encoding: PinEncoding,
    reference: u8,
) -> Result<PinStatus, CardError> {
    let block = encode_pin(pin, encoding)?;
    let outcome = verify::exec(transport, reference, block)?;
    let status = match outcome {
        StatusOutcome::Success => PinStatus::Verified,
        StatusOutcome::PinVerificationFailed { retries: 0 } | StatusOutcome::AuthenticationBlocked => {
            PinStatus::Blocked
        }
        StatusOutcome::PinVerificationFailed { retries } => PinStatus::Rejected {
            retries_remaining: retries,
        },
        other => return Err(CardError::Status(other)),
    };

    match status {
        PinStatus::Verified => log::debug!("PIN verified"),
        PinStatus::Rejected { retries_remaining } => {
            log::warn!("PIN rejected, {retries_remaining} attempts left");
        }
        PinStatus::Blocked => log::warn!("PIN blocked"),
    }
    Ok(status)
}
