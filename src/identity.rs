//! Cardholder identity fields pulled out of raw EF contents.
//!
//! The personal-info and document-info files are not parsed structurally.
//! Each field is found by a fixed lexical pattern, and a field that cannot
//! be found is reported as missing instead of failing the whole record.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Marks where document metadata starts in the personal-info file; the
/// holder's name sits somewhere before it.
pub const NAME_ANCHOR: &str = "TR1604";

const NATIONAL_ID_LEN: usize = 11;
const SERIAL_NUMBER_LEN: usize = 9;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit-run regex"));

static UPPER_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z0-9]+").expect("valid alphanumeric-run regex"));

static NAME_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-ZÇĞİÖŞÜ]+(?: [A-ZÇĞİÖŞÜ]+){0,3}").expect("valid name regex")
});

/// A field that could not be located. Not an error: the rest of the
/// record is still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionWarning {
    NationalIdNotFound,
    NameNotFound,
    SerialNumberNotFound,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NationalIdNotFound => write!(f, "national ID number not found"),
            Self::NameNotFound => write!(f, "name not found"),
            Self::SerialNumberNotFound => write!(f, "serial number not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenRecord {
    /// 11 digits.
    pub national_id: Option<String>,
    pub full_name: Option<String>,
    /// 9 uppercase alphanumerics.
    pub serial_number: Option<String>,
}

impl CitizenRecord {
    /// Build the record from the personal-info and document-info EFs.
    pub fn extract(personal_info: &[u8], document_info: &[u8]) -> Self {
        let personal = decode_text(personal_info);
        let document = decode_text(document_info);
        let record = Self {
            national_id: extract_national_id(&personal),
            full_name: extract_name(&personal),
            serial_number: extract_serial_number(&document),
        };
        for warning in record.warnings() {
            log::warn!("identity extraction: {warning}");
        }
        record
    }

    pub fn warnings(&self) -> Vec<ExtractionWarning> {
        let mut warnings = Vec::new();
        if self.national_id.is_none() {
            warnings.push(ExtractionWarning::NationalIdNotFound);
        }
        if self.full_name.is_none() {
            warnings.push(ExtractionWarning::NameNotFound);
        }
        if self.serial_number.is_none() {
            warnings.push(ExtractionWarning::SerialNumberNotFound);
        }
        warnings
    }

    pub fn is_complete(&self) -> bool {
        self.warnings().is_empty()
    }
}

impl fmt::Display for CitizenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "not found".into());
        writeln!(f, "national ID: {}", show(&self.national_id))?;
        writeln!(f, "name:        {}", show(&self.full_name))?;
        write!(f, "serial:      {}", show(&self.serial_number))
    }
}

/// First run of exactly 11 digits, not part of a longer digit run.
pub fn extract_national_id(text: &str) -> Option<String> {
    exact_run(&DIGIT_RUN, text, NATIONAL_ID_LEN)
}

/// Longest group of one to four space-separated uppercase tokens in the
/// text before [`NAME_ANCHOR`]. Ties go to the earliest.
pub fn extract_name(text: &str) -> Option<String> {
    let head = text.split(NAME_ANCHOR).next().unwrap_or_default();
    NAME_TOKENS
        .find_iter(head)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .fold(None, |best: Option<&str>, s| match best {
            Some(b) if b.chars().count() >= s.chars().count() => Some(b),
            _ => Some(s),
        })
        .map(str::to_owned)
}

/// First run of exactly 9 uppercase alphanumerics.
pub fn extract_serial_number(text: &str) -> Option<String> {
    exact_run(&UPPER_ALNUM_RUN, text, SERIAL_NUMBER_LEN)
}

fn exact_run(pattern: &Regex, text: &str, len: usize) -> Option<String> {
    pattern
        .find_iter(text)
        .find(|m| m.as_str().len() == len)
        .map(|m| m.as_str().to_owned())
}

/// UTF-8 when the bytes are valid UTF-8, ISO-8859-9 otherwise. Latin-5
/// only differs from Latin-1 in six code points, all Turkish letters.
fn decode_text(raw: &[u8]) -> Cow<'_, str> {
    if let Ok(s) = std::str::from_utf8(raw) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        raw.iter()
            .map(|&b| match b {
                0xD0 => 'Ğ',
                0xDD => 'İ',
                0xDE => 'Ş',
                0xF0 => 'ğ',
                0xFD => 'ı',
                0xFE => 'ş',
                _ => char::from(b),
            })
            .collect(),
    )
}
