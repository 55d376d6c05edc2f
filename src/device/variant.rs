//! Supported device variants and channel name resolution.
//!
//! One driver serves several SKUs that only differ in how many fan,
//! temperature probe and LED channels they expose.

use crate::error::{CommanderError, Result};
use crate::protocol::{
    COMMANDER_PRO_PID, CORSAIR_VID, LIGHTING_NODE_CORE_PID, LIGHTING_NODE_PRO_PID,
};

// =============================================================================
// Device Variants
// =============================================================================

/// Capabilities of one physical SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceVariant {
    pub vendor_id: u16,
    pub product_id: u16,
    pub name: &'static str,
    pub fan_count: usize,
    pub temp_probe_count: usize,
    pub led_channel_count: usize,
}

/// All supported devices.
pub static SUPPORTED_DEVICES: [DeviceVariant; 3] = [
    DeviceVariant {
        vendor_id: CORSAIR_VID,
        product_id: COMMANDER_PRO_PID,
        name: "Corsair Commander Pro",
        fan_count: 6,
        temp_probe_count: 4,
        led_channel_count: 2,
    },
    DeviceVariant {
        vendor_id: CORSAIR_VID,
        product_id: LIGHTING_NODE_PRO_PID,
        name: "Corsair Lighting Node Pro",
        fan_count: 0,
        temp_probe_count: 0,
        led_channel_count: 2,
    },
    DeviceVariant {
        vendor_id: CORSAIR_VID,
        product_id: LIGHTING_NODE_CORE_PID,
        name: "Corsair Lighting Node Core",
        fan_count: 0,
        temp_probe_count: 0,
        led_channel_count: 1,
    },
];

impl DeviceVariant {
    /// Look up a supported device by USB ids.
    pub fn find(vendor_id: u16, product_id: u16) -> Option<&'static DeviceVariant> {
        SUPPORTED_DEVICES
            .iter()
            .find(|d| d.vendor_id == vendor_id && d.product_id == product_id)
    }

    /// Whether the device reports temperatures, voltages and fan speeds.
    pub const fn has_telemetry(&self) -> bool {
        self.fan_count > 0 || self.temp_probe_count > 0
    }
}

impl std::fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Channel Names
// =============================================================================

/// Alias addressing every channel of a kind.
pub const SYNC_CHANNEL: &str = "sync";

/// Logical names of the channels of one kind ("fan" or "led").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNames {
    names: Vec<String>,
}

impl ChannelNames {
    /// Names for `count` channels: `prefix` alone when there is a single
    /// channel, else `prefix1..prefixN`.
    pub fn new(prefix: &str, count: usize) -> Self {
        let names = if count == 1 {
            vec![prefix.to_string()]
        } else {
            (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
        };
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a logical channel name into physical indices.
    ///
    /// `sync` selects every channel in ascending order. An unknown name is
    /// an error when there is more than one channel; with a single channel
    /// (or none) it resolves to nothing.
    pub fn resolve(&self, channel: &str) -> Result<Vec<u8>> {
        if channel == SYNC_CHANNEL {
            return Ok((0..self.names.len() as u8).collect());
        }

        if let Some(index) = self.names.iter().position(|n| n == channel) {
            return Ok(vec![index as u8]);
        }

        if self.names.len() > 1 {
            let choices =
                std::iter::once(SYNC_CHANNEL).chain(self.names.iter().map(String::as_str));
            return Err(CommanderError::UnknownChannel {
                choices: quoted(choices),
            });
        }

        Ok(Vec::new())
    }
}

fn quoted<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commander_pro() -> &'static DeviceVariant {
        DeviceVariant::find(CORSAIR_VID, COMMANDER_PRO_PID).unwrap()
    }

    #[test]
    fn test_find_variant() {
        assert_eq!(commander_pro().fan_count, 6);
        let core = DeviceVariant::find(CORSAIR_VID, LIGHTING_NODE_CORE_PID).unwrap();
        assert_eq!(core.led_channel_count, 1);
        assert!(!core.has_telemetry());
        assert!(DeviceVariant::find(0x1e71, 0x3008).is_none());
    }

    #[test]
    fn test_fan_names() {
        let fans = ChannelNames::new("fan", commander_pro().fan_count);
        assert_eq!(fans.names()[0], "fan1");
        assert_eq!(fans.resolve("fan3").unwrap(), vec![2]);
        assert_eq!(fans.resolve("sync").unwrap(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unknown_channel_lists_choices() {
        let fans = ChannelNames::new("fan", 6);
        let err = fans.resolve("fan7").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown channel, should be one of: 'sync', 'fan1', 'fan2', 'fan3', 'fan4', 'fan5', 'fan6'"
        );
    }

    #[test]
    fn test_single_channel_alias() {
        let leds = ChannelNames::new("led", 1);
        assert_eq!(leds.names(), &["led".to_string()]);
        assert_eq!(leds.resolve("led").unwrap(), vec![0]);
        assert_eq!(leds.resolve("sync").unwrap(), vec![0]);
        // tolerant with a single channel
        assert!(leds.resolve("led2").unwrap().is_empty());
    }

    #[test]
    fn test_no_channels() {
        let fans = ChannelNames::new("fan", 0);
        assert!(fans.names().is_empty());
        assert!(fans.resolve("sync").unwrap().is_empty());
        assert!(fans.resolve("fan1").unwrap().is_empty());
    }
}
