use std::str::FromStr;
use std::time::Duration;

use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::constants::{MISSILE_CAPACITY, RELOAD_DELAY};
use crate::types::DeviceIdentity;

pub const ENV_BACKEND: &str = "LAUNCHER_BACKEND";
pub const ENV_TIMEOUT_MS: &str = "LAUNCHER_TIMEOUT_MS";

#[derive(Debug, EnumString, Display, Clone, Copy, Eq, PartialEq, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    /// Raw libusb first, HID fallback second.
    #[default]
    Auto,
    Usb,
    Hid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub backend: Backend,
    /// `None` blocks until the bus completes the transfer. A stalled device hangs the
    /// caller forever in that mode.
    pub timeout: Option<Duration>,
    pub detach_kernel_driver: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            backend: Backend::Auto,
            timeout: None,
            detach_kernel_driver: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub identity: DeviceIdentity,
    pub missile_capacity: u8,
    pub reload_delay: Duration,
    pub transport: TransportConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        LauncherConfig {
            identity: DeviceIdentity::LAUNCHER,
            missile_capacity: MISSILE_CAPACITY,
            reload_delay: RELOAD_DELAY,
            transport: TransportConfig::default(),
        }
    }
}

impl LauncherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Layers overrides from `lookup` over the defaults. Unparsable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LauncherConfig::default();

        if let Some(raw) = lookup(ENV_BACKEND) {
            match Backend::from_str(raw.trim()) {
                Ok(backend) => config.transport.backend = backend,
                Err(_) => warn!(value = %raw, "ignoring unknown {}", ENV_BACKEND),
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.transport.timeout = None,
                Ok(ms) => config.transport.timeout = Some(Duration::from_millis(ms)),
                Err(_) => warn!(value = %raw, "ignoring unparsable {}", ENV_TIMEOUT_MS),
            }
        }

        config
    }
}
