//! Per-card configuration.
//!
//! Which padding scheme and PIN format a card expects depends on its
//! firmware and cannot be read back from the card, so it is set here by
//! the caller.

use crate::pin::PinEncoding;
use crate::protocol::FragmentPlan;
use crate::signature::PaddingProfile;

const DEFAULT_MAX_READ_LEN: u16 = 224;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardProfile {
    pub padding: PaddingProfile,
    /// Sent as `80 01 {alg}` in MSE:SET when present.
    pub algorithm_reference: Option<u8>,
    /// Sent as `84 01 {key}` in MSE:SET.
    pub key_reference: u8,
    pub pin_encoding: PinEncoding,
    /// P2 of VERIFY.
    pub pin_reference: u8,
    /// Largest READ BINARY chunk, 1..=256.
    pub max_read_len: u16,
    /// Fixed fragment plan for the certificate EF. When `None` the plan is
    /// sized from the DER header.
    pub certificate_plan: Option<FragmentPlan>,
}

impl CardProfile {
    /// Card pads internally, host sends DigestInfo-prefixed digests.
    pub fn pkcs1v15() -> Self {
        Self::default()
    }

    /// Card computes PSS encoding from a raw SHA-256 digest.
    pub fn pss() -> Self {
        Self {
            padding: PaddingProfile::Pss,
            algorithm_reference: Some(0x91),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pin_encoding(mut self, encoding: PinEncoding) -> Self {
        self.pin_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_max_read_len(mut self, len: u16) -> Self {
        self.max_read_len = len;
        self
    }

    #[must_use]
    pub fn with_certificate_plan(mut self, plan: FragmentPlan) -> Self {
        self.certificate_plan = Some(plan);
        self
    }
}

impl Default for CardProfile {
    fn default() -> Self {
        Self {
            padding: PaddingProfile::Pkcs1v15,
            algorithm_reference: None,
            key_reference: 0x81,
            pin_encoding: PinEncoding::Ascii,
            pin_reference: 0x01,
            max_read_len: DEFAULT_MAX_READ_LEN,
            certificate_plan: None,
        }
    }
}
