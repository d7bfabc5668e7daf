use byteorder::{BigEndian, ByteOrder};

use crate::commands::read_binary::MAX_OFFSET;
use crate::error::CardError;

/// Largest chunk a short-form `Le` can ask for (`Le = 00`).
pub const MAX_CHUNK: u16 = 256;

/// One READ BINARY: `length` bytes starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentSpec {
    pub offset: u16,
    pub length: u16,
}

impl FragmentSpec {
    pub fn new(offset: u16, length: u16) -> Result<Self, CardError> {
        if length == 0 || length > MAX_CHUNK {
            return Err(CardError::InvalidFragmentPlan(format!(
                "fragment length {length} outside 1..={MAX_CHUNK}"
            )));
        }
        if offset > MAX_OFFSET {
            return Err(CardError::InvalidFragmentPlan(format!(
                "offset {offset} does not fit in 15 bits"
            )));
        }
        Ok(Self { offset, length })
    }

    /// `Le` byte for this fragment; 256 encodes as `00`.
    pub fn le(&self) -> u8 {
        (self.length & 0xFF) as u8
    }

    fn end(&self) -> usize {
        usize::from(self.offset) + usize::from(self.length)
    }
}

/// Ordered, contiguous, non-overlapping fragments covering one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentPlan(Vec<FragmentSpec>);

impl FragmentPlan {
    pub fn new(fragments: Vec<FragmentSpec>) -> Result<Self, CardError> {
        if fragments.is_empty() {
            return Err(CardError::InvalidFragmentPlan("plan has no fragments".into()));
        }
        for pair in fragments.windows(2) {
            if pair[0].end() != usize::from(pair[1].offset) {
                return Err(CardError::InvalidFragmentPlan(format!(
                    "fragment at {} does not start where the previous one ends ({})",
                    pair[1].offset,
                    pair[0].end()
                )));
            }
        }
        Ok(Self(fragments))
    }

    /// Split `total` bytes from offset 0 into `chunk`-sized fragments, the
    /// last one taking the remainder.
    pub fn uniform(total: usize, chunk: u16) -> Result<Self, CardError> {
        if chunk == 0 || chunk > MAX_CHUNK {
            return Err(CardError::InvalidFragmentPlan(format!(
                "chunk size {chunk} outside 1..={MAX_CHUNK}"
            )));
        }
        if total == 0 {
            return Err(CardError::InvalidFragmentPlan("file is empty".into()));
        }

        let mut fragments = Vec::with_capacity(total.div_ceil(usize::from(chunk)));
        let mut offset = 0usize;
        while offset < total {
            let length = (total - offset).min(usize::from(chunk));
            let start = u16::try_from(offset).map_err(|_| {
                CardError::InvalidFragmentPlan(format!("offset {offset} does not fit in 15 bits"))
            })?;
            fragments.push(FragmentSpec::new(start, length as u16)?);
            offset += length;
        }
        Self::new(fragments)
    }

    pub fn fragments(&self) -> &[FragmentSpec] {
        &self.0
    }

    pub fn total_len(&self) -> usize {
        self.0.iter().map(|f| usize::from(f.length)).sum()
    }
}

/// Total encoded size (header included) of the DER element whose first
/// bytes are `header`, or `None` if the header is not a definite-length
/// SEQUENCE.
pub fn der_total_len(header: &[u8]) -> Option<usize> {
    if header.len() < 2 || header[0] != 0x30 {
        return None;
    }
    match header[1] {
        n if n < 0x80 => Some(2 + usize::from(n)),
        0x81 if header.len() >= 3 => Some(3 + usize::from(header[2])),
        0x82 if header.len() >= 4 => Some(4 + usize::from(BigEndian::read_u16(&header[2..4]))),
        0x83 if header.len() >= 5 => Some(5 + BigEndian::read_u24(&header[2..5]) as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_covers_total() {
        let plan = FragmentPlan::uniform(2000, 208).unwrap();
        assert_eq!(plan.total_len(), 2000);
        assert_eq!(plan.fragments().len(), 10);
        assert_eq!(plan.fragments()[9], FragmentSpec { offset: 1872, length: 128 });
    }

    #[test]
    fn uniform_exact_multiple() {
        let plan = FragmentPlan::uniform(512, 256).unwrap();
        assert_eq!(plan.fragments().len(), 2);
        assert_eq!(plan.fragments()[1].le(), 0x00);
    }

    #[test]
    fn uniform_rejects_bad_input() {
        assert!(FragmentPlan::uniform(0, 100).is_err());
        assert!(FragmentPlan::uniform(100, 0).is_err());
        assert!(FragmentPlan::uniform(100, 257).is_err());
        assert!(FragmentPlan::uniform(0x9000, 256).is_err());
    }

    #[test]
    fn gap_or_overlap_rejected() {
        let a = FragmentSpec::new(0, 10).unwrap();
        let gap = FragmentSpec::new(12, 10).unwrap();
        let overlap = FragmentSpec::new(8, 10).unwrap();
        assert!(FragmentPlan::new(vec![a, gap]).is_err());
        assert!(FragmentPlan::new(vec![a, overlap]).is_err());
        assert!(FragmentPlan::new(vec![]).is_err());
    }

    #[test]
    fn irregular_contiguous_plan_accepted() {
        let plan = FragmentPlan::new(vec![
            FragmentSpec::new(0, 100).unwrap(),
            FragmentSpec::new(100, 7).unwrap(),
            FragmentSpec::new(107, 256).unwrap(),
        ])
        .unwrap();
        assert_eq!(plan.total_len(), 363);
    }

    #[test]
    fn spec_length_bounds() {
        assert!(FragmentSpec::new(0, 0).is_err());
        assert!(FragmentSpec::new(0, 257).is_err());
        assert!(FragmentSpec::new(0x8000, 1).is_err());
        assert_eq!(FragmentSpec::new(0, 208).unwrap().le(), 0xD0);
    }

    #[test]
    fn der_lengths() {
        assert_eq!(der_total_len(&[0x30, 0x05]), Some(7));
        assert_eq!(der_total_len(&[0x30, 0x81, 0xC8]), Some(203));
        assert_eq!(der_total_len(&[0x30, 0x82, 0x04, 0xD2]), Some(1238));
        assert_eq!(der_total_len(&[0x30, 0x83, 0x01, 0x00, 0x00]), Some(65541));
        assert_eq!(der_total_len(b"-----BEGIN"), None);
        assert_eq!(der_total_len(&[0x30, 0x80]), None);
        assert_eq!(der_total_len(&[0x30]), None);
    }
}
