use crate::apdu::{ApduCommand, Instruction, StatusOutcome};
use crate::commands::transmit;
use crate::error::CardError;
use crate::transport::Transport;

/// `00 20 00 {reference} {Lc} {PIN block}`
pub fn command(reference: u8, pin_block: Vec<u8>) -> ApduCommand {
    ApduCommand::new(Instruction::Verify, 0x00, reference).with_data(pin_block)
}

pub fn exec(
    transport: &dyn Transport,
    reference: u8,
    pin_block: Vec<u8>,
) -> Result<StatusOutcome, CardError> {
    Ok(transmit(transport, &command(reference, pin_block))?.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_template() {
        let cmd = command(0x01, b"155882".to_vec());
        assert_eq!(hex::encode_upper(cmd.serialize()), "0020000106313535383832");
    }
}
