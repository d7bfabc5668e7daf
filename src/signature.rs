//! On-card signing and host-side verification.
//!
//! The card never sees the message. The host hashes it with SHA-256,
//! prepares the signing input for the configured padding, and asks the
//! card's private key to sign that.

use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Digest, Sha256};

use crate::apdu::StatusOutcome;
use crate::certificate::ParsedCertificate;
use crate::commands::{mse_set, pso};
use crate::error::CardError;
use crate::profile::CardProfile;
use crate::transport::Transport;

/// DER `DigestInfo` header for SHA-256, followed by the 32-byte hash.
pub const DIGEST_INFO_SHA256: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0D, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingProfile {
    /// RSASSA-PKCS1-v1_5; the card receives `DigestInfo || hash`.
    Pkcs1v15,
    /// RSASSA-PSS with SHA-256; the card receives the bare hash.
    Pss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerState {
    Unkeyed,
    KeySelected,
    Signed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMaterial {
    pub digest: [u8; 32],
    pub signing_input: Vec<u8>,
    pub signature: Vec<u8>,
}

pub fn digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Bytes handed to PSO for `digest` under `padding`.
pub fn signing_input(digest: &[u8; 32], padding: PaddingProfile) -> Vec<u8> {
    match padding {
        PaddingProfile::Pkcs1v15 => [&DIGEST_INFO_SHA256[..], digest].concat(),
        PaddingProfile::Pss => digest.to_vec(),
    }
}

/// Check `signature` over `message` with the certificate's public key.
/// Malformed signatures are a `false`, not an error.
pub fn verify(
    certificate: &ParsedCertificate,
    signature: &[u8],
    message: &[u8],
    padding: PaddingProfile,
) -> bool {
    let hashed = digest(message);
    let result = match padding {
        PaddingProfile::Pkcs1v15 => {
            certificate
                .public_key
                .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        }
        PaddingProfile::Pss => certificate
            .public_key
            .verify(Pss::new::<Sha256>(), &hashed, signature),
    };
    if let Err(e) = &result {
        log::debug!("signature rejected: {e}");
    }
    result.is_ok()
}

/// Two-step MSE:SET then PSO exchange.
///
/// A failed MSE:SET drops back to [`SignerState::Unkeyed`]; a failed PSO
/// leaves the key selected so the caller may retry after fixing the
/// precondition (usually the PIN).
#[derive(Debug)]
pub struct SignatureEngine {
    state: SignerState,
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureEngine {
    pub fn new() -> Self {
        Self {
            state: SignerState::Unkeyed,
        }
    }

    pub fn state(&self) -> SignerState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = SignerState::Unkeyed;
    }

    pub fn select_key(
        &mut self,
        transport: &dyn Transport,
        profile: &CardProfile,
    ) -> Result<(), CardError> {
        let template = mse_set::template(profile.algorithm_reference, profile.key_reference)?;
        match mse_set::exec(transport, template)? {
            StatusOutcome::Success => {
                self.state = SignerState::KeySelected;
                Ok(())
            }
            outcome => {
                self.state = SignerState::Unkeyed;
                Err(CardError::Signing {
                    step: "MSE:SET",
                    outcome,
                })
            }
        }
    }

    pub fn compute(
        &mut self,
        transport: &dyn Transport,
        input: Vec<u8>,
    ) -> Result<Vec<u8>, CardError> {
        if self.state == SignerState::Unkeyed {
            return Err(CardError::InvalidState("no signing key selected"));
        }
        let answer = pso::exec(transport, input)?;
        let outcome = answer.outcome();
        if !outcome.is_success() {
            return Err(CardError::Signing {
                step: "PSO:COMPUTE DIGITAL SIGNATURE",
                outcome,
            });
        }
        let signature = answer.into_data();
        if signature.is_empty() {
            return Err(CardError::InvalidResponse("card returned an empty signature".into()));
        }
        self.state = SignerState::Signed;
        Ok(signature)
    }

    /// Hash `message`, select the key, and have the card sign.
    pub fn sign(
        &mut self,
        transport: &dyn Transport,
        message: &[u8],
        profile: &CardProfile,
    ) -> Result<SignatureMaterial, CardError> {
        let digest = digest(message);
        let signing_input = signing_input(&digest, profile.padding);

        self.select_key(transport, profile)?;
        let signature = self.compute(transport, signing_input.clone())?;
        log::debug!("card produced {}-byte signature", signature.len());

        Ok(SignatureMaterial {
            digest,
            signing_input,
            signature,
        })
    }
}
