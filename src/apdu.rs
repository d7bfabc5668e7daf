//! APDU command and response types.
//!
//! Short-form ISO 7816-4 only: `CLA INS P1 P2 [Lc DATA] [Le]` out,
//! `DATA... SW1 SW2` back.

use std::fmt;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    /// `Some(0)` asks for up to 256 bytes.
    pub le: Option<u8>,
}

impl ApduCommand {
    pub fn new(ins: Instruction, p1: u8, p2: u8) -> Self {
        Self {
            cla: 0x00,
            ins: ins as u8,
            p1,
            p2,
            data: Vec::new(),
            le: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Wire format: `[CLA][INS][P1][P2]`, then `[LC][DATA]` when data is
    /// present and `[LE]` when an expected length is set.
    ///
    /// # Panics
    ///
    /// Panics if `data` exceeds 255 bytes (short APDU LC limit).
    pub fn serialize(&self) -> Vec<u8> {
        assert!(
            self.data.len() <= 255,
            "APDU data too long: {} bytes (max 255)",
            self.data.len()
        );
        let mut buf = Vec::with_capacity(6 + self.data.len());
        buf.push(self.cla);
        buf.push(self.ins);
        buf.push(self.p1);
        buf.push(self.p2);
        if !self.data.is_empty() {
            buf.push(self.data.len() as u8);
            buf.extend_from_slice(&self.data);
        }
        if let Some(le) = self.le {
            buf.push(le);
        }
        buf
    }

    /// Header only, for logging commands whose payload is secret.
    pub(crate) fn redacted(&self) -> String {
        format!(
            "{:02X}{:02X}{:02X}{:02X} <{} bytes redacted>",
            self.cla,
            self.ins,
            self.p1,
            self.p2,
            self.data.len()
        )
    }
}

/// APDU response - last 2 bytes are the status word, everything before
/// that is the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduAnswer {
    raw: Vec<u8>,
}

impl ApduAnswer {
    /// Rejects anything shorter than a status word, so every answer
    /// carries one.
    pub fn from_raw(raw: Vec<u8>) -> Result<Self, TransportError> {
        if raw.len() < 2 {
            return Err(TransportError::ShortResponse(raw.len()));
        }
        Ok(Self { raw })
    }

    pub fn sw1(&self) -> u8 {
        self.raw[self.raw.len() - 2]
    }

    pub fn sw2(&self) -> u8 {
        self.raw[self.raw.len() - 1]
    }

    pub fn retcode(&self) -> u16 {
        u16::from_be_bytes([self.sw1(), self.sw2()])
    }

    /// Payload only - strips the trailing 2-byte status word.
    pub fn data(&self) -> &[u8] {
        &self.raw[..self.raw.len() - 2]
    }

    pub fn into_data(mut self) -> Vec<u8> {
        self.raw.truncate(self.raw.len() - 2);
        self.raw
    }

    pub fn outcome(&self) -> StatusOutcome {
        StatusOutcome::classify(self.sw1(), self.sw2())
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// What a status word means. Every component above the codec matches on
/// this instead of raw SW bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// `90 00`
    Success,
    /// `61 xx` - xx more bytes waiting for GET RESPONSE.
    MoreDataAvailable(u8),
    /// `6C xx` - reissue with `Le = xx`.
    WrongLength(u8),
    /// `69 82`
    SecurityConditionNotSatisfied,
    /// `69 83`
    AuthenticationBlocked,
    /// `63 Cx` - x attempts left.
    PinVerificationFailed { retries: u8 },
    /// `6A 82` / `6A 88`
    FileOrRecordNotFound,
    Other(u8, u8),
}

impl StatusOutcome {
    pub fn classify(sw1: u8, sw2: u8) -> Self {
        match (sw1, sw2) {
            (0x90, 0x00) => Self::Success,
            (0x61, n) => Self::MoreDataAvailable(n),
            (0x6C, n) => Self::WrongLength(n),
            (0x69, 0x82) => Self::SecurityConditionNotSatisfied,
            (0x69, 0x83) => Self::AuthenticationBlocked,
            (0x63, x) if x & 0xF0 == 0xC0 => Self::PinVerificationFailed { retries: x & 0x0F },
            (0x6A, 0x82) | (0x6A, 0x88) => Self::FileOrRecordNotFound,
            (a, b) => Self::Other(a, b),
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success (9000)"),
            Self::MoreDataAvailable(n) => write!(f, "{n} more bytes available (61{n:02X})"),
            Self::WrongLength(n) => write!(f, "wrong length, card expects Le={n} (6C{n:02X})"),
            Self::SecurityConditionNotSatisfied => {
                write!(f, "security condition not satisfied (6982)")
            }
            Self::AuthenticationBlocked => write!(f, "authentication method blocked (6983)"),
            Self::PinVerificationFailed { retries } => {
                write!(f, "PIN verification failed, {retries} tries left (63C{retries:X})")
            }
            Self::FileOrRecordNotFound => write!(f, "file or record not found"),
            Self::Other(a, b) => write!(f, "status {a:02X}{b:02X}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Instruction {
    Verify = 0x20,
    ManageSecurityEnvironment = 0x22,
    PerformSecurityOperation = 0x2A,
    Select = 0xA4,
    ReadBinary = 0xB0,
    GetResponse = 0xC0,
}
