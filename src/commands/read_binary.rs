use byteorder::{BigEndian, ByteOrder};

use crate::apdu::{ApduAnswer, ApduCommand, Instruction, StatusOutcome};
use crate::commands::transmit;
use crate::error::CardError;
use crate::transport::Transport;

/// Highest offset addressable with P1 bit 8 clear.
pub const MAX_OFFSET: u16 = 0x7FFF;

/// `00 B0 {offset_hi} {offset_lo} {Le}`. `le == 0` asks for up to 256.
pub fn command(offset: u16, le: u8) -> Result<ApduCommand, CardError> {
    if offset > MAX_OFFSET {
        return Err(CardError::InvalidFragmentPlan(format!(
            "offset {offset} does not fit in 15 bits"
        )));
    }
    let mut p = [0u8; 2];
    BigEndian::write_u16(&mut p, offset);
    Ok(ApduCommand::new(Instruction::ReadBinary, p[0], p[1]).with_le(le))
}

/// One READ BINARY. A `6C xx` answer is reissued once with the length the
/// card asked for.
pub fn exec(transport: &dyn Transport, offset: u16, le: u8) -> Result<ApduAnswer, CardError> {
    let answer = transmit(transport, &command(offset, le)?)?;
    match answer.outcome() {
        StatusOutcome::WrongLength(exact) => {
            log::debug!("READ BINARY at {offset}: card wants Le={exact}, reissuing");
            transmit(transport, &command(offset, exact)?)
        }
        _ => Ok(answer),
    }
}
