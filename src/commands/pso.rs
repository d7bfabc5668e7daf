use crate::apdu::{ApduAnswer, ApduCommand, Instruction};
use crate::commands::transmit;
use crate::error::CardError;
use crate::transport::Transport;

const P1_DIGITAL_SIGNATURE: u8 = 0x9E;
const P2_DATA_TO_SIGN: u8 = 0x9A;

/// PSO:COMPUTE DIGITAL SIGNATURE, `00 2A 9E 9A {Lc} {input} 00`
pub fn compute_signature(input: Vec<u8>) -> ApduCommand {
    ApduCommand::new(
        Instruction::PerformSecurityOperation,
        P1_DIGITAL_SIGNATURE,
        P2_DATA_TO_SIGN,
    )
    .with_data(input)
    .with_le(0)
}

pub fn exec(transport: &dyn Transport, input: Vec<u8>) -> Result<ApduAnswer, CardError> {
    transmit(transport, &compute_signature(input))
}
