//! Individual command implementations.
//!
//! You probably want [`EidCard`](crate::api::EidCard) instead.

pub mod get_response;
pub mod mse_set;
pub mod pso;
pub mod read_binary;
pub mod select;
pub mod verify;

use crate::apdu::{ApduAnswer, ApduCommand, Instruction, StatusOutcome};
use crate::error::CardError;
use crate::transport::Transport;

/// Single exchange with APDU tracing. A `61 xx` answer is drained through
/// GET RESPONSE before it is handed back.
pub(crate) fn transmit(
    transport: &dyn Transport,
    command: &ApduCommand,
) -> Result<ApduAnswer, CardError> {
    if log::log_enabled!(log::Level::Trace) {
        if command.ins == Instruction::Verify as u8 {
            log::trace!("> {}", command.redacted());
        } else {
            log::trace!("> {}", hex::encode_upper(command.serialize()));
        }
    }

    let answer = transport.exchange(command)?;
    log::trace!("< {}", hex::encode_upper(answer.raw()));

    match answer.outcome() {
        StatusOutcome::MoreDataAvailable(_) => get_response::drain(transport, answer),
        _ => Ok(answer),
    }
}
