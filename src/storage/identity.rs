//! Stable identity of one physical device across process restarts.
//!
//! These devices have no serial number, so the identity is built from the
//! USB ids and the HID path. Paths are long and differ in format between
//! Linux, Windows and macOS; only their digit runs vary between two devices
//! of the same model, so only those are kept.

/// Addressing tokens of one physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub address: String,
}

impl DeviceIdentity {
    pub fn new(vendor_id: u16, product_id: u16, address: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            address: address.into(),
        }
    }

    /// `vid<hex4>_pid<hex4>` token.
    pub fn ids_token(&self) -> String {
        format!("vid{:04x}_pid{:04x}", self.vendor_id, self.product_id)
    }

    /// `loc` token made of the digit runs of the address, joined by `_`.
    pub fn location_token(&self) -> String {
        let digits: Vec<&str> = self
            .address
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .collect();
        format!("loc{}", digits.join("_"))
    }

    /// Store key prefixes for this device.
    pub fn key_prefixes(&self) -> Vec<String> {
        vec![self.ids_token(), self.location_token()]
    }
}
