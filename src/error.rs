use thiserror::Error;

use crate::types::DeviceIdentity;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("USB control transfer failed: {0}")]
    Usb(#[from] rusb::Error),

    #[error("HID write failed: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("Short write: expected {expected} bytes but device accepted {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Device disconnected")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error(
        "Launcher was not found (vendor={:#06x}, product={:#06x})",
        .0.vendor_id,
        .0.product_id
    )]
    DeviceNotFound(DeviceIdentity),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Launcher worker is no longer running")]
    WorkerGone,
}

impl LauncherError {
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, LauncherError::DeviceNotFound(_))
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;
