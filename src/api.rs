//! High-level API - [`EidCard`] wraps a card channel and exposes the
//! identity, certificate and signing operations.

use crate::certificate::ParsedCertificate;
use crate::error::CardError;
use crate::fs::{FileId, FileKind, FilePath, KnownFile, Navigator};
use crate::identity::CitizenRecord;
use crate::pin::{self, PinStatus};
use crate::profile::CardProfile;
use crate::protocol::plan::der_total_len;
use crate::protocol::{self, FragmentPlan};
use crate::signature::{self, SignatureEngine, SignatureMaterial, SignerState};
use crate::transport::Transport;

/// Bytes of certificate header needed to size a DER SEQUENCE.
const DER_HEADER_LEN: u8 = 4;

/// One session with one inserted card.
///
/// Holds the channel plus everything the card itself forgets on power
/// loss: the selected path, whether the PIN was verified, and where the
/// signing exchange stands. All of it is reset by [`EidCard::end_session`].
pub struct EidCard {
    transport: Box<dyn Transport>,
    profile: CardProfile,
    navigator: Navigator,
    signer: SignatureEngine,
    authorized: bool,
}

impl EidCard {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_profile(transport, CardProfile::default())
    }

    pub fn with_profile(transport: Box<dyn Transport>, profile: CardProfile) -> Self {
        Self {
            transport,
            profile,
            navigator: Navigator::new(),
            signer: SignatureEngine::new(),
            authorized: false,
        }
    }

    pub fn profile(&self) -> &CardProfile {
        &self.profile
    }

    pub fn path(&self) -> &FilePath {
        self.navigator.path()
    }

    pub fn signer_state(&self) -> SignerState {
        self.signer.state()
    }

    /// Whether the PIN was verified in this session.
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Forget the selected path, PIN state and signer state. Call when the
    /// card is removed or reset.
    pub fn end_session(&mut self) {
        log::debug!("session ended");
        self.navigator.reset();
        self.signer.reset();
        self.authorized = false;
    }

    /// Hand the channel back, e.g. to disconnect the reader.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    pub fn select(&mut self, kind: FileKind, id: FileId) -> Result<(), CardError> {
        self.navigator.select(self.transport.as_ref(), kind, id)
    }

    pub fn select_by_name(&mut self, name: &[u8]) -> Result<(), CardError> {
        self.navigator.select_by_name(self.transport.as_ref(), name)
    }

    pub fn navigate(&mut self, file: KnownFile) -> Result<(), CardError> {
        self.navigator.navigate(self.transport.as_ref(), file)
    }

    /// Read the currently selected EF in one response.
    pub fn read_small(&self) -> Result<Vec<u8>, CardError> {
        protocol::read_small(self.transport.as_ref())
    }

    pub fn read_fragments(&self, plan: &FragmentPlan) -> Result<Vec<u8>, CardError> {
        protocol::read_fragments(self.transport.as_ref(), plan)
    }

    /// Read the current EF in `max_read_len` chunks until a short read.
    pub fn read_to_end(&self) -> Result<Vec<u8>, CardError> {
        protocol::read_to_end(self.transport.as_ref(), self.profile.max_read_len)
    }

    /// Select and read both identity files, then extract the holder's
    /// fields. Missing fields are reported in the record, not as errors.
    pub fn read_citizen_record(&mut self) -> Result<CitizenRecord, CardError> {
        self.navigate(KnownFile::PersonalInfo)?;
        let personal = self.read_small()?;
        self.navigate(KnownFile::DocumentInfo)?;
        let document = self.read_small()?;
        Ok(CitizenRecord::extract(&personal, &document))
    }

    /// Select the certificate EF and reassemble its bytes.
    ///
    /// Uses `plan` if given, then the profile's plan. Otherwise the size is
    /// taken from the DER header, and a file that is not DER is read until
    /// a short read.
    pub fn assemble_certificate(
        &mut self,
        plan: Option<&FragmentPlan>,
    ) -> Result<Vec<u8>, CardError> {
        self.navigate(KnownFile::Certificate)?;

        if let Some(plan) = plan.or(self.profile.certificate_plan.as_ref()) {
            return self.read_fragments(plan);
        }

        let header = protocol::read_fragments(
            self.transport.as_ref(),
            &FragmentPlan::uniform(usize::from(DER_HEADER_LEN), u16::from(DER_HEADER_LEN))?,
        )?;
        match der_total_len(&header) {
            Some(total) => {
                log::debug!("certificate DER announces {total} bytes");
                let plan = FragmentPlan::uniform(total, self.profile.max_read_len)?;
                self.read_fragments(&plan)
            }
            None => {
                log::debug!("certificate EF is not DER, reading until short read");
                self.read_to_end()
            }
        }
    }

    /// Assemble, parse and check the certificate against the current time.
    pub fn read_certificate(&mut self) -> Result<ParsedCertificate, CardError> {
        let bytes = self.assemble_certificate(None)?;
        let cert = ParsedCertificate::parse(&bytes)?;
        cert.check_validity_now()?;
        Ok(cert)
    }

    /// Submit the PIN once. A rejection is returned as
    /// [`PinStatus::Rejected`] and must not be retried without asking the
    /// holder again.
    pub fn verify_pin(&mut self, pin: &str) -> Result<PinStatus, CardError> {
        let status = pin::verify(
            self.transport.as_ref(),
            pin,
            self.profile.pin_encoding,
            self.profile.pin_reference,
        )?;
        self.authorized = status == PinStatus::Verified;
        Ok(status)
    }

    /// Have the card sign `message` with the configured padding profile.
    ///
    /// Not gated on [`EidCard::is_authorized`]: the card is the authority
    /// and answers `69 82` if the PIN is required.
    pub fn sign(&mut self, message: &[u8]) -> Result<SignatureMaterial, CardError> {
        self.signer
            .sign(self.transport.as_ref(), message, &self.profile)
    }

    /// Sign, then check the result against `certificate` with the same
    /// padding profile.
    pub fn sign_and_verify(
        &mut self,
        message: &[u8],
        certificate: &ParsedCertificate,
    ) -> Result<SignatureMaterial, CardError> {
        let material = self.sign(message)?;
        if !signature::verify(
            certificate,
            &material.signature,
            message,
            self.profile.padding,
        ) {
            return Err(CardError::SignatureVerificationFailed);
        }
        Ok(material)
    }
}
