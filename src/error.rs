//! Error types.

use iso7816_tlv::TlvError;
use thiserror::Error;
use time::OffsetDateTime;

use crate::apdu::StatusOutcome;

/// Errors returned by the library.
///
/// Nothing here is retried internally. Whether an outcome such as a wrong
/// PIN is worth another attempt is the caller's call.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("channel error: {0}")]
    Transport(#[from] TransportError),

    #[error("card returned {0}")]
    Status(StatusOutcome),

    #[error("cannot select {target}: {outcome}")]
    Navigation {
        target: String,
        outcome: StatusOutcome,
    },

    #[error("READ BINARY at offset {offset} failed: {outcome}")]
    FragmentRead { offset: u16, outcome: StatusOutcome },

    #[error("fragment at offset {offset} returned {received} of {expected} bytes before the end of the plan")]
    TruncatedFragment {
        offset: u16,
        expected: u16,
        received: usize,
    },

    #[error("invalid fragment plan: {0}")]
    InvalidFragmentPlan(String),

    #[error("certificate parse error: {0}")]
    CertificateParse(String),

    #[error("certificate expired on {not_after}")]
    CertificateExpired { not_after: OffsetDateTime },

    #[error("certificate not valid before {not_before}")]
    CertificateNotYetValid { not_before: OffsetDateTime },

    #[error("invalid PIN: {0}")]
    InvalidPin(String),

    #[error("{step} failed: {outcome}")]
    Signing {
        step: &'static str,
        outcome: StatusOutcome,
    },

    #[error("signature does not verify against the certificate key")]
    SignatureVerificationFailed,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("DF name must be 1 to 16 bytes, got {0}")]
    InvalidDfName(usize),

    #[error("TLV encoding error: {0}")]
    Tlv(TlvError),
}

impl From<TlvError> for CardError {
    fn from(error: TlvError) -> Self {
        CardError::Tlv(error)
    }
}

/// Transport-level errors (reader, PC/SC).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("communication error: {0}")]
    Comm(String),

    #[error("response too short to carry a status word ({0} bytes)")]
    ShortResponse(usize),

    #[cfg(feature = "pcsc")]
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),
}
