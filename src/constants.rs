use std::time::Duration;

pub const VENDOR_ID: u16 = 0x2123;
pub const PRODUCT_ID: u16 = 0x1010;

// Control transfer parameters (class request, interface recipient, host-to-device)
pub const REQUEST_TYPE: u8 = 0x21;
pub const REQUEST: u8 = 0x09;
pub const REQUEST_VALUE: u16 = 0;
pub const REQUEST_INDEX: u16 = 0;
pub const LAUNCHER_INTERFACE: u8 = 0;

// Payload layout
pub const PAYLOAD_START: u8 = 0x02;
pub const PAYLOAD_LEN: usize = 8;

// Command opcodes
pub const CMD_DOWN: u8 = 0x01;
pub const CMD_UP: u8 = 0x02;
pub const CMD_LEFT: u8 = 0x04;
pub const CMD_RIGHT: u8 = 0x08;
pub const CMD_FIRE: u8 = 0x10;
pub const CMD_STOP: u8 = 0x20;

// Firing and movement timing
pub const MISSILE_CAPACITY: u8 = 4;
pub const RELOAD_DELAY: Duration = Duration::from_millis(4500);
pub const DEFAULT_MOVE_SECS: f64 = 0.5;
/// Any duration <= 0 keeps moving until `stop` is sent; this is the conventional value.
pub const HOLD: f64 = -1.0;
