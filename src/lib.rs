//! Rust driver for contact national eID smart cards.
//!
//! Talks ISO 7816-4 short APDUs over any [`Transport`]: walks the card's
//! file system, reassembles large files from READ BINARY fragments, pulls
//! the holder's identity fields and X.509 certificate, verifies the PIN,
//! and has the card sign with its private key.
//!
//! # Quick start
//!
//! ```no_run
//! use eid_card::{CardProfile, EidCard, PinStatus, Transport};
//!
//! # fn open_reader() -> Box<dyn Transport> { unimplemented!() }
//! let mut card = EidCard::with_profile(open_reader(), CardProfile::pkcs1v15());
//!
//! let record = card.read_citizen_record()?;
//! println!("{record}");
//!
//! let cert = card.read_certificate()?;
//! if card.verify_pin("123456")? == PinStatus::Verified {
//!     let material = card.sign_and_verify(b"Hello", &cert)?;
//!     println!("signature: {}", hex::encode(material.signature));
//! }
//! # Ok::<(), eid_card::CardError>(())
//! ```
//!
//! # Modules
//!
//! - [`api`] -- high-level [`EidCard`] session
//! - [`transport`] -- channel adapters ([`Transport`], PC/SC)
//! - [`fs`] -- file identifiers, paths and the [`Navigator`]
//! - [`protocol`] -- fragmented reads and [`FragmentPlan`]
//! - [`identity`] -- [`CitizenRecord`] extraction
//! - [`certificate`] -- [`ParsedCertificate`]
//! - [`pin`], [`signature`], [`profile`]
//!
//! # Feature flags
//!
//! - `pcsc` -- [`transport::pcsc::PcscTransport`] over a connected PC/SC card

pub mod apdu;
pub mod api;
pub mod certificate;
pub(crate) mod commands;
pub mod error;
pub mod fs;
pub mod identity;
pub mod pin;
pub mod profile;
pub mod protocol;
pub mod signature;
pub mod transport;

pub use apdu::StatusOutcome;
pub use api::EidCard;
pub use certificate::ParsedCertificate;
pub use error::{CardError, TransportError};
pub use fs::{FileId, FileKind, FilePath, KnownFile, Navigator};
pub use identity::{CitizenRecord, ExtractionWarning};
pub use pin::{PinEncoding, PinStatus};
pub use profile::CardProfile;
pub use protocol::{FragmentPlan, FragmentSpec};
pub use signature::{PaddingProfile, SignatureMaterial, SignerState};
pub use transport::Transport;
#[cfg(feature = "pcsc")]
pub use transport::pcsc::PcscTransport;
