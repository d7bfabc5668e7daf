//! On-card file system: identifiers, the current path and the navigator
//! that moves it.
//!
//! The card keeps exactly one current file. Selecting a child DF moves
//! into it; selecting an EF replaces any previously selected EF; selecting
//! the MF starts over from the root. The [`FilePath`] here mirrors that and
//! only changes when the card answers `90 00`.

use std::fmt;

use crate::apdu::StatusOutcome;
use crate::commands::select;
use crate::error::CardError;
use crate::transport::Transport;

const MAX_DF_NAME_LEN: usize = 16;

/// 2-byte file identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u16);

impl FileId {
    pub const MF: Self = Self(0x3F00);

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Master,
    Dedicated,
    Elementary,
}

impl FileKind {
    pub(crate) fn select_p1(self) -> u8 {
        match self {
            Self::Master => 0x00,
            Self::Dedicated => 0x01,
            Self::Elementary => 0x02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Id { id: FileId, kind: FileKind },
    /// DF selected by application name.
    DfName(Vec<u8>),
}

impl PathSegment {
    fn is_elementary(&self) -> bool {
        matches!(
            self,
            Self::Id {
                kind: FileKind::Elementary,
                ..
            }
        )
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { id, .. } => write!(f, "{id}"),
            Self::DfName(name) => write!(f, "'{}'", hex::encode_upper(name)),
        }
    }
}

/// Path from the root to the current file. Empty means nothing selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePath(Vec<PathSegment>);

impl FilePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// File identifiers along the path; DF-name segments are skipped.
    pub fn ids(&self) -> Vec<FileId> {
        self.0
            .iter()
            .filter_map(|s| match s {
                PathSegment::Id { id, .. } => Some(*id),
                PathSegment::DfName(_) => None,
            })
            .collect()
    }

    fn enter(&mut self, segment: PathSegment) {
        match segment {
            PathSegment::Id {
                kind: FileKind::Master,
                ..
            } => self.0.clear(),
            _ => {
                if self.0.last().is_some_and(PathSegment::is_elementary) {
                    self.0.pop();
                }
            }
        }
        self.0.push(segment);
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Files the identity card is known to carry, with their location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownFile {
    /// National ID number and holder name.
    PersonalInfo,
    /// Document serial number.
    DocumentInfo,
    /// Cardholder X.509 certificate.
    Certificate,
}

impl KnownFile {
    pub fn route(self) -> &'static [(FileKind, FileId)] {
        use FileKind::{Dedicated, Elementary, Master};
        match self {
            Self::PersonalInfo => &[
                (Master, FileId::MF),
                (Dedicated, FileId(0x3D00)),
                (Elementary, FileId(0x2F04)),
            ],
            Self::DocumentInfo => &[
                (Master, FileId::MF),
                (Dedicated, FileId(0x3D10)),
                (Dedicated, FileId(0x3D20)),
                (Elementary, FileId(0x2F1A)),
            ],
            Self::Certificate => &[(Master, FileId::MF), (Elementary, FileId(0x2F53))],
        }
    }
}

/// Owns the session's [`FilePath`] and issues the SELECTs that change it.
#[derive(Debug, Default)]
pub struct Navigator {
    path: FilePath,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn reset(&mut self) {
        self.path = FilePath::root();
    }

    pub fn select(
        &mut self,
        transport: &dyn Transport,
        kind: FileKind,
        id: FileId,
    ) -> Result<(), CardError> {
        if kind != FileKind::Master && self.path.is_root() {
            return Err(CardError::InvalidState(
                "select the master file before any DF or EF",
            ));
        }
        let outcome = select::exec(transport, &select::by_id(kind, id))?;
        self.commit(PathSegment::Id { id, kind }, outcome)
    }

    pub fn select_by_name(
        &mut self,
        transport: &dyn Transport,
        name: &[u8],
    ) -> Result<(), CardError> {
        if name.is_empty() || name.len() > MAX_DF_NAME_LEN {
            return Err(CardError::InvalidDfName(name.len()));
        }
        let outcome = select::exec(transport, &select::by_name(name))?;
        self.commit(PathSegment::DfName(name.to_vec()), outcome)
    }

    /// Walk the whole route from the MF. Stops at the first failing hop;
    /// the path then reflects the hops that did succeed.
    pub fn navigate(&mut self, transport: &dyn Transport, file: KnownFile) -> Result<(), CardError> {
        log::debug!("navigating to {file:?}");
        for &(kind, id) in file.route() {
            self.select(transport, kind, id)?;
        }
        Ok(())
    }

    fn commit(&mut self, segment: PathSegment, outcome: StatusOutcome) -> Result<(), CardError> {
        if !outcome.is_success() {
            log::debug!("SELECT {segment} under {} refused: {outcome}", self.path);
            return Err(CardError::Navigation {
                target: segment.to_string(),
                outcome,
            });
        }
        self.path.enter(segment);
        log::debug!("selected {}", self.path);
        Ok(())
    }
}
