//! Fragmented reads of transparent EFs.
//!
//! A file larger than one response is fetched as a [`FragmentPlan`]: a
//! list of contiguous `(offset, length)` READ BINARY calls whose results
//! are concatenated in order. Any failing fragment fails the whole read;
//! no partial buffer is ever handed back.

pub mod plan;

pub use plan::{FragmentPlan, FragmentSpec};

use crate::apdu::StatusOutcome;
use crate::commands::read_binary;
use crate::error::CardError;
use crate::transport::Transport;

const OFFSET_OUT_OF_RANGE: StatusOutcome = StatusOutcome::Other(0x6B, 0x00);

/// Single READ BINARY at offset 0 with `Le = 00`, for files that fit in
/// one response.
pub fn read_small(transport: &dyn Transport) -> Result<Vec<u8>, CardError> {
    let answer = read_binary::exec(transport, 0, 0)?;
    let outcome = answer.outcome();
    if !outcome.is_success() {
        return Err(CardError::FragmentRead { offset: 0, outcome });
    }
    Ok(answer.into_data())
}

/// Run every fragment of `plan` in order and concatenate the results.
///
/// Only the last fragment may come back short. A short answer anywhere
/// else means the plan does not match the file, and nothing is returned.
pub fn read_fragments(transport: &dyn Transport, plan: &FragmentPlan) -> Result<Vec<u8>, CardError> {
    let mut buf = Vec::with_capacity(plan.total_len());

    let last = plan.fragments().len() - 1;
    for (i, spec) in plan.fragments().iter().enumerate() {
        let answer = read_binary::exec(transport, spec.offset, spec.le())?;
        let outcome = answer.outcome();
        if !outcome.is_success() {
            log::debug!(
                "fragment at {} failed ({outcome}), dropping {} gathered bytes",
                spec.offset,
                buf.len()
            );
            return Err(CardError::FragmentRead {
                offset: spec.offset,
                outcome,
            });
        }

        let data = answer.data();
        if data.len() > usize::from(spec.length) {
            return Err(CardError::InvalidResponse(format!(
                "fragment at {} returned {} bytes, asked for {}",
                spec.offset,
                data.len(),
                spec.length
            )));
        }
        if data.len() < usize::from(spec.length) {
            if i != last {
                log::debug!(
                    "short fragment at {}, dropping {} gathered bytes",
                    spec.offset,
                    buf.len()
                );
                return Err(CardError::TruncatedFragment {
                    offset: spec.offset,
                    expected: spec.length,
                    received: data.len(),
                });
            }
            log::debug!("last fragment short, file ends at {}", buf.len() + data.len());
        }
        buf.extend_from_slice(data);
    }

    log::debug!(
        "reassembled {} bytes from {} fragments",
        buf.len(),
        plan.fragments().len()
    );
    Ok(buf)
}

/// Read `chunk`-sized pieces until one comes back short.
///
/// A file whose size is an exact multiple of `chunk` has no short piece;
/// the card then answers `6B 00` (offset outside the EF) and that ends the
/// file instead of failing it.
pub fn read_to_end(transport: &dyn Transport, chunk: u16) -> Result<Vec<u8>, CardError> {
    let le = FragmentSpec::new(0, chunk)?.le();
    let mut buf = Vec::new();

    loop {
        let offset = u16::try_from(buf.len())
            .ok()
            .filter(|o| *o <= read_binary::MAX_OFFSET)
            .ok_or_else(|| {
                CardError::InvalidResponse("file exceeds the 15-bit offset range".into())
            })?;

        let answer = read_binary::exec(transport, offset, le)?;
        let outcome = answer.outcome();
        if outcome == OFFSET_OUT_OF_RANGE && offset > 0 {
            return Ok(buf);
        }
        if !outcome.is_success() {
            return Err(CardError::FragmentRead { offset, outcome });
        }

        let data = answer.data();
        buf.extend_from_slice(data);
        if data.len() < usize::from(chunk) {
            return Ok(buf);
        }
    }
}
