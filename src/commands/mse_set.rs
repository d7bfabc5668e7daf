use iso7816_tlv::simple::{Tag, Tlv};

use crate::apdu::{ApduCommand, Instruction, StatusOutcome};
use crate::commands::transmit;
use crate::error::CardError;
use crate::transport::Transport;

/// SET for computation, digital signature template.
const P1_SET_COMPUTE: u8 = 0x41;
const P2_DST: u8 = 0xB6;

const TAG_ALGORITHM_REFERENCE: u8 = 0x80;
const TAG_PRIVATE_KEY_REFERENCE: u8 = 0x84;

/// Control reference template: optional `80 01 {alg}` then `84 01 {key}`.
pub fn template(algorithm: Option<u8>, key_reference: u8) -> Result<Vec<u8>, CardError> {
    let mut data = Vec::with_capacity(6);
    if let Some(alg) = algorithm {
        data.extend(Tlv::new(Tag::try_from(TAG_ALGORITHM_REFERENCE)?, vec![alg])?.to_vec());
    }
    data.extend(Tlv::new(Tag::try_from(TAG_PRIVATE_KEY_REFERENCE)?, vec![key_reference])?.to_vec());
    Ok(data)
}

/// `00 22 41 B6 {Lc} {TLV objects}`
pub fn command(template: Vec<u8>) -> ApduCommand {
    ApduCommand::new(Instruction::ManageSecurityEnvironment, P1_SET_COMPUTE, P2_DST)
        .with_data(template)
}

pub fn exec(transport: &dyn Transport, template: Vec<u8>) -> Result<StatusOutcome, CardError> {
    Ok(transmit(transport, &command(template))?.outcome())
}
