use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::*;

/// Wire payload for one control transfer: start marker, opcode, six zero bytes.
pub type Payload = [u8; PAYLOAD_LEN];

#[derive(Debug, EnumIter, EnumString, Display, Clone, Copy, Eq, PartialEq, Hash)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, EnumIter, Display, Clone, Copy, Eq, PartialEq, Hash)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Command {
    Down = CMD_DOWN,
    Up = CMD_UP,
    Left = CMD_LEFT,
    Right = CMD_RIGHT,
    Fire = CMD_FIRE,
    Stop = CMD_STOP,
}

impl Command {
    pub fn opcode(self) -> u8 {
        self as u8
    }

    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            CMD_DOWN => Some(Command::Down),
            CMD_UP => Some(Command::Up),
            CMD_LEFT => Some(Command::Left),
            CMD_RIGHT => Some(Command::Right),
            CMD_FIRE => Some(Command::Fire),
            CMD_STOP => Some(Command::Stop),
            _ => None,
        }
    }
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Command::Up,
            Direction::Down => Command::Down,
            Direction::Left => Command::Left,
            Direction::Right => Command::Right,
        }
    }
}

/// Press/release vocabulary a front end maps its own UI events onto.
#[derive(Debug, EnumString, Display, Clone, Copy, Eq, PartialEq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MoveMode {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const LAUNCHER: DeviceIdentity = DeviceIdentity {
        vendor_id: VENDOR_ID,
        product_id: PRODUCT_ID,
    };

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::LAUNCHER
    }
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Counts outside `1..=capacity` fall back to a single shot rather than erroring.
pub(crate) fn clamp_fire_count(count: i32, capacity: u8) -> u8 {
    if (1..=capacity as i32).contains(&count) {
        count as u8
    } else {
        1
    }
}
