use crate::apdu::{ApduAnswer, ApduCommand, Instruction, StatusOutcome};
use crate::error::CardError;
use crate::transport::Transport;

/// Upper bound on chained GET RESPONSE rounds for one command.
const MAX_ROUNDS: usize = 64;

/// `00 C0 00 00 {Le}`
pub fn command(le: u8) -> ApduCommand {
    ApduCommand::new(Instruction::GetResponse, 0x00, 0x00).with_le(le)
}

/// Keep fetching while the card reports `61 xx`, concatenating payloads.
/// The returned answer carries the final status word.
pub(crate) fn drain(
    transport: &dyn Transport,
    first: ApduAnswer,
) -> Result<ApduAnswer, CardError> {
    let mut data = first.data().to_vec();
    let mut outcome = first.outcome();
    let mut last = first;

    for _ in 0..MAX_ROUNDS {
        let StatusOutcome::MoreDataAvailable(remaining) = outcome else {
            let mut raw = data;
            raw.push(last.sw1());
            raw.push(last.sw2());
            return Ok(ApduAnswer::from_raw(raw)?);
        };

        let cmd = command(remaining);
        log::trace!("> {}", hex::encode_upper(cmd.serialize()));
        last = transport.exchange(&cmd)?;
        log::trace!("< {}", hex::encode_upper(last.raw()));

        data.extend_from_slice(last.data());
        outcome = last.outcome();
    }

    Err(CardError::InvalidResponse(format!(
        "card still reports pending data after {MAX_ROUNDS} GET RESPONSE rounds"
    )))
}
