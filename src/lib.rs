mod config;
mod constants;
mod controller;
mod encoder;
mod error;
mod transport;
mod types;
mod worker;

pub use config::{Backend, LauncherConfig, TransportConfig, ENV_BACKEND, ENV_TIMEOUT_MS};
pub use controller::{LauncherController, Sleeper, ThreadSleeper};
pub use encoder::{decode_opcode, encode};
pub use error::{LauncherError, LauncherResult, TransportError};
pub use transport::{
    first_match, mock, resolve_discovery, CommandSink, Sighting, Transport, UsbLink,
};
pub use types::{Command, DeviceIdentity, Direction, MoveMode, Payload};
pub use worker::{Action, LauncherRemote, LauncherWorker};

// Re-export commonly used items
pub use constants::{
    DEFAULT_MOVE_SECS, HOLD, MISSILE_CAPACITY, PAYLOAD_LEN, PRODUCT_ID, RELOAD_DELAY, VENDOR_ID,
};
