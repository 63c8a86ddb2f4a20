use crate::constants::{PAYLOAD_LEN, PAYLOAD_START};
use crate::types::{Command, Payload};

pub fn encode(command: Command) -> Payload {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0] = PAYLOAD_START;
    payload[1] = command.opcode();
    payload
}

/// Recovers the command from a well-formed payload. Anything else yields `None`.
pub fn decode_opcode(payload: &Payload) -> Option<Command> {
    if payload[0] != PAYLOAD_START || payload[2..].iter().any(|&b| b != 0) {
        return None;
    }
    Command::from_opcode(payload[1])
}
