//! Cardholder certificate: parsing and the validity-window check.
//!
//! Only the temporal window is checked. The chain and issuer signature are
//! not verified; the certificate is trusted because it came off the card.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use picky_asn1_x509::{Certificate, PublicKey, Time};
use rsa::{BigUint, RsaPublicKey};
use time::OffsetDateTime;

use crate::error::CardError;
use crate::protocol::plan::der_total_len;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// X.509 certificate reduced to what signature checking needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub public_key: RsaPublicKey,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub serial_number: Vec<u8>,
    /// DER encoding, trailing filler removed.
    pub raw: Vec<u8>,
}

impl ParsedCertificate {
    /// Accepts raw DER (possibly followed by filler bytes), PEM, or bare
    /// base64 text.
    pub fn parse(bytes: &[u8]) -> Result<Self, CardError> {
        let mut der = if bytes.first() == Some(&0x30) {
            bytes.to_vec()
        } else {
            decode_text(bytes)?
        };

        let len = der_total_len(&der).ok_or_else(|| {
            CardError::CertificateParse("not a DER SEQUENCE".into())
        })?;
        if len > der.len() {
            return Err(CardError::CertificateParse(format!(
                "truncated: header announces {len} bytes, have {}",
                der.len()
            )));
        }
        der.truncate(len);

        let cert: Certificate = picky_asn1_der::from_bytes(&der)
            .map_err(|e| CardError::CertificateParse(format!("DER: {e}")))?;

        let tbs = &cert.tbs_certificate;
        let rsa = match &tbs.subject_public_key_info.subject_public_key {
            PublicKey::Rsa(rsa) => &rsa.0,
            _ => {
                return Err(CardError::CertificateParse(
                    "unsupported public key type, only RSA is supported".into(),
                ))
            }
        };
        let public_key = RsaPublicKey::new(
            BigUint::from_bytes_be(&rsa.modulus.0),
            BigUint::from_bytes_be(&rsa.public_exponent.0),
        )
        .map_err(|e| CardError::CertificateParse(format!("invalid RSA key: {e}")))?;

        let parsed = Self {
            public_key,
            not_before: to_datetime(&tbs.validity.not_before)?,
            not_after: to_datetime(&tbs.validity.not_after)?,
            serial_number: tbs.serial_number.0.clone(),
            raw: der,
        };
        log::debug!(
            "parsed certificate {} valid {} .. {}",
            hex::encode_upper(&parsed.serial_number),
            parsed.not_before,
            parsed.not_after
        );
        Ok(parsed)
    }

    /// Fails if `at` lies outside `[not_before, not_after]`.
    pub fn check_validity(&self, at: OffsetDateTime) -> Result<(), CardError> {
        if at < self.not_before {
            return Err(CardError::CertificateNotYetValid {
                not_before: self.not_before,
            });
        }
        if at > self.not_after {
            return Err(CardError::CertificateExpired {
                not_after: self.not_after,
            });
        }
        Ok(())
    }

    pub fn check_validity_now(&self) -> Result<(), CardError> {
        self.check_validity(OffsetDateTime::now_utc())
    }
}

/// Strip PEM armor if present and decode the base64 body. Anything
/// outside the base64 alphabet (line breaks, NUL/FF filler) is dropped.
fn decode_text(bytes: &[u8]) -> Result<Vec<u8>, CardError> {
    let text = String::from_utf8_lossy(bytes);
    let body = match text.find(PEM_BEGIN) {
        Some(start) => {
            let rest = &text[start + PEM_BEGIN.len()..];
            let end = rest.find(PEM_END).ok_or_else(|| {
                CardError::CertificateParse("PEM footer missing".into())
            })?;
            &rest[..end]
        }
        None => &text[..],
    };
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    if cleaned.is_empty() {
        return Err(CardError::CertificateParse("no certificate data".into()));
    }
    STANDARD
        .decode(cleaned)
        .map_err(|e| CardError::CertificateParse(format!("base64: {e}")))
}

fn to_datetime(time: &Time) -> Result<OffsetDateTime, CardError> {
    let converted = match time {
        Time::Utc(t) => OffsetDateTime::try_from(t.0.clone()),
        Time::Generalized(t) => OffsetDateTime::try_from(t.0.clone()),
    };
    converted.map_err(|e| CardError::CertificateParse(format!("invalid validity date: {e}")))
}
