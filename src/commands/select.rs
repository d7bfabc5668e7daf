use crate::apdu::{ApduCommand, Instruction, StatusOutcome};
use crate::commands::transmit;
use crate::error::CardError;
use crate::fs::{FileId, FileKind};
use crate::transport::Transport;

const P1_BY_DF_NAME: u8 = 0x04;
const P2_FIRST_OR_ONLY: u8 = 0x00;

/// `00 A4 {P1} 00 02 {FID}` with P1 chosen by what is being selected.
pub fn by_id(kind: FileKind, id: FileId) -> ApduCommand {
    ApduCommand::new(Instruction::Select, kind.select_p1(), P2_FIRST_OR_ONLY)
        .with_data(id.to_bytes().to_vec())
}

/// `00 A4 04 00 {Lc} {DF name}`
pub fn by_name(name: &[u8]) -> ApduCommand {
    ApduCommand::new(Instruction::Select, P1_BY_DF_NAME, P2_FIRST_OR_ONLY).with_data(name.to_vec())
}

/// Any FCI the card returns is dropped; only the outcome matters here.
pub fn exec(transport: &dyn Transport, command: &ApduCommand) -> Result<StatusOutcome, CardError> {
    Ok(transmit(transport, command)?.outcome())
}
