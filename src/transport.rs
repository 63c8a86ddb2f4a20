use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use rusb::{Context, DeviceHandle, UsbContext};
use tracing::{debug, info, warn};

use crate::config::{Backend, TransportConfig};
use crate::constants::*;
use crate::error::{LauncherError, LauncherResult, TransportError};
use crate::types::{DeviceIdentity, Payload};

/// Anything that can carry an encoded command to the launcher.
pub trait CommandSink: Send {
    fn send(&mut self, payload: &Payload) -> Result<(), TransportError>;
}

/// Returns the first candidate whose ids match `identity` exactly.
pub fn first_match<T, I>(candidates: I, identity: &DeviceIdentity) -> Option<T>
where
    I: IntoIterator<Item = (u16, u16, T)>,
{
    candidates
        .into_iter()
        .find(|(vendor_id, product_id, _)| identity.matches(*vendor_id, *product_id))
        .map(|(_, _, item)| item)
}

pub struct UsbLink {
    handle: DeviceHandle<Context>,
    claimed: bool,
    timeout: Duration,
}

impl UsbLink {
    fn write(&mut self, payload: &Payload) -> Result<usize, TransportError> {
        Ok(self.handle.write_control(
            REQUEST_TYPE,
            REQUEST,
            REQUEST_VALUE,
            REQUEST_INDEX,
            payload,
            self.timeout,
        )?)
    }
}

impl Drop for UsbLink {
    fn drop(&mut self) {
        if self.claimed {
            if let Err(e) = self.handle.release_interface(LAUNCHER_INTERFACE) {
                debug!("Failed to release launcher interface: {}", e);
            }
        }
        debug!("Closed USB launcher handle");
    }
}

/// What one backend found while looking for the launcher.
#[derive(Debug)]
pub enum Sighting<T> {
    /// Enumeration failed or listed no matching device.
    NotSeen,
    Matched(T),
    /// A matching device exists but could not be opened or claimed.
    OpenFailed(TransportError),
}

/// Walks backend outcomes in order and settles on the first usable handle. Only a
/// matched device that failed to open turns into a transport error; otherwise
/// nothing found means `DeviceNotFound`.
pub fn resolve_discovery<T, I>(identity: &DeviceIdentity, outcomes: I) -> LauncherResult<T>
where
    I: IntoIterator<Item = (Backend, Sighting<T>)>,
{
    let mut open_error = None;
    for (backend, outcome) in outcomes {
        match outcome {
            Sighting::Matched(handle) => {
                info!("Connected to launcher {} via {}", identity, backend);
                return Ok(handle);
            }
            Sighting::NotSeen => debug!("No launcher {} visible via {}", identity, backend),
            Sighting::OpenFailed(e) => {
                warn!("Found launcher via {} but could not open it: {}", backend, e);
                open_error = Some(e);
            }
        }
    }

    match open_error {
        Some(e) => Err(LauncherError::Transport(e)),
        None => Err(LauncherError::DeviceNotFound(*identity)),
    }
}

pub enum Transport {
    Usb(UsbLink),
    Hid(HidDevice),
}

impl Transport {
    pub fn discover(identity: &DeviceIdentity, config: &TransportConfig) -> LauncherResult<Self> {
        let attempts: &[Backend] = match config.backend {
            Backend::Auto => &[Backend::Usb, Backend::Hid],
            Backend::Usb => &[Backend::Usb],
            Backend::Hid => &[Backend::Hid],
        };

        // Lazy, so later backends are only tried when earlier ones come up empty.
        let outcomes = attempts.iter().map(|&backend| {
            let outcome = match backend {
                Backend::Hid => Self::try_hid(identity),
                _ => Self::try_usb(identity, config),
            };
            (backend, outcome)
        });
        resolve_discovery(identity, outcomes)
    }

    fn try_usb(identity: &DeviceIdentity, config: &TransportConfig) -> Sighting<Self> {
        let devices = match Context::new().and_then(|context| context.devices()) {
            Ok(devices) => devices,
            Err(e) => {
                debug!("libusb enumeration unavailable: {}", e);
                return Sighting::NotSeen;
            }
        };
        let candidates = devices.iter().filter_map(|device| {
            let descriptor = device.device_descriptor().ok()?;
            Some((descriptor.vendor_id(), descriptor.product_id(), device))
        });

        let Some(device) = first_match(candidates, identity) else {
            return Sighting::NotSeen;
        };

        let mut handle = match device.open() {
            Ok(handle) => handle,
            Err(e) => return Sighting::OpenFailed(e.into()),
        };
        let mut claimed = false;
        if config.detach_kernel_driver {
            // Not supported off Linux; claiming decides whether the handle is usable.
            if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
                debug!("Kernel driver auto-detach unavailable: {}", e);
            }
            if let Err(e) = handle.claim_interface(LAUNCHER_INTERFACE) {
                return Sighting::OpenFailed(e.into());
            }
            claimed = true;
        }

        Sighting::Matched(Transport::Usb(UsbLink {
            handle,
            claimed,
            timeout: config.timeout.unwrap_or(Duration::ZERO),
        }))
    }

    fn try_hid(identity: &DeviceIdentity) -> Sighting<Self> {
        let api = match HidApi::new() {
            Ok(api) => api,
            Err(e) => {
                debug!("hidapi enumeration unavailable: {}", e);
                return Sighting::NotSeen;
            }
        };
        let candidates = api
            .device_list()
            .map(|info| (info.vendor_id(), info.product_id(), info));

        match first_match(candidates, identity).map(|info| info.open_device(&api)) {
            Some(Ok(device)) => Sighting::Matched(Transport::Hid(device)),
            Some(Err(e)) => Sighting::OpenFailed(e.into()),
            None => Sighting::NotSeen,
        }
    }
}

impl CommandSink for Transport {
    fn send(&mut self, payload: &Payload) -> Result<(), TransportError> {
        debug!("Sending payload {:02x?}", payload);
        let written = match self {
            Transport::Usb(link) => link.write(payload)?,
            Transport::Hid(device) => {
                // Report id 0 prefix, stripped again by the OS.
                let mut report = [0u8; PAYLOAD_LEN + 1];
                report[1..].copy_from_slice(payload);
                device.write(&report)?.saturating_sub(1)
            }
        };

        if written != PAYLOAD_LEN {
            return Err(TransportError::ShortWrite {
                expected: PAYLOAD_LEN,
                actual: written,
            });
        }
        Ok(())
    }
}

pub mod mock {
    use super::*;
    use crate::encoder::decode_opcode;
    use crate::types::Command;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Debug, Clone, Copy)]
    pub struct Transfer {
        pub payload: Payload,
        pub at: Instant,
    }

    /// In-memory sink recording every payload. Clones share the same history.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        history: Arc<Mutex<Vec<Transfer>>>,
        disconnected: Arc<Mutex<bool>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn transfers(&self) -> Vec<Transfer> {
            self.history.lock().clone()
        }

        pub fn payloads(&self) -> Vec<Payload> {
            self.history.lock().iter().map(|t| t.payload).collect()
        }

        /// Decoded commands, in send order. Malformed payloads are skipped.
        pub fn commands(&self) -> Vec<Command> {
            self.history
                .lock()
                .iter()
                .filter_map(|t| decode_opcode(&t.payload))
                .collect()
        }

        pub fn clear(&self) {
            self.history.lock().clear();
        }

        pub fn disconnect(&self) {
            *self.disconnected.lock() = true;
        }

        pub fn reconnect(&self) {
            *self.disconnected.lock() = false;
        }
    }

    impl CommandSink for RecordingSink {
        fn send(&mut self, payload: &Payload) -> Result<(), TransportError> {
            if *self.disconnected.lock() {
                return Err(TransportError::Disconnected);
            }
            self.history.lock().push(Transfer {
                payload: *payload,
                at: Instant::now(),
            });
            Ok(())
        }
    }
}
