//! hidapi-backed [`RawDeviceSource`].

use crate::backends::RawDeviceSource;
use crate::error::DeviceError;
use hidapi::{HidApi, HidDevice};
use tracing::info;

/// An open HID handle in non-blocking mode.
pub struct HidSource {
    name: String,
    raw: HidDevice,
}

impl HidSource {
    /// Open the first interface matching `vendor:product`.
    pub fn open(api: &HidApi, vendor: u16, product: u16) -> Result<Self, DeviceError> {
        let info = api
            .device_list()
            .find(|d| d.vendor_id() == vendor && d.product_id() == product)
            .ok_or(DeviceError::NotFound { vendor, product })?;

        let raw = info
            .open_device(api)
            .map_err(|e| DeviceError::Open(e.to_string()))?;
        raw.set_blocking_mode(false)
            .map_err(|e| DeviceError::Open(e.to_string()))?;

        let name = info
            .product_string()
            .unwrap_or("unknown device")
            .to_string();
        info!(%name, "opened hid device {vendor:#06x}:{product:#06x}");
        Ok(Self { name, raw })
    }
}

impl RawDeviceSource for HidSource {
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        // Non-blocking: hidapi returns Ok(0) when no report is pending.
        Ok(self.raw.read(buf)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One enumerated HID interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceListing {
    pub vendor: u16,
    pub product: u16,
    pub name: String,
}

/// Enumerate attached HID devices for diagnostics.
///
/// Multi-interface devices appear once; the list is sorted by vendor then
/// product id.
pub fn list_devices(api: &HidApi) -> Vec<DeviceListing> {
    let mut found: Vec<DeviceListing> = Vec::new();
    for info in api.device_list() {
        let listing = DeviceListing {
            vendor: info.vendor_id(),
            product: info.product_id(),
            name: info.product_string().unwrap_or("unknown device").to_string(),
        };
        if !found
            .iter()
            .any(|d| d.vendor == listing.vendor && d.product == listing.product)
        {
            found.push(listing);
        }
    }
    found.sort_by_key(|d| (d.vendor, d.product));
    found
}
