//! HID command definitions and builders for the Commander Pro family.
//!
//! Every request is a 64-byte output report (plus the report id) and every
//! reply is read back as a 16-byte input report.

// =============================================================================
// Constants
// =============================================================================

/// HID report length for writes, not counting the report id byte.
pub const HID_REPORT_LENGTH: usize = 64;

/// Transmit buffer length: report id byte plus the report.
pub const TX_BUFFER_LENGTH: usize = HID_REPORT_LENGTH + 1;

/// Response length for reads.
pub const RESPONSE_LENGTH: usize = 16;

/// Offset of the first payload byte in a transmit buffer.
const PAYLOAD_OFFSET: usize = 2;

/// Corsair Vendor ID.
pub const CORSAIR_VID: u16 = 0x1B1C;

/// Commander Pro Product ID.
pub const COMMANDER_PRO_PID: u16 = 0x0C10;

/// Lighting Node Pro Product ID.
pub const LIGHTING_NODE_PRO_PID: u16 = 0x0C0B;

/// Lighting Node Core Product ID.
pub const LIGHTING_NODE_CORE_PID: u16 = 0x0C1A;

// =============================================================================
// HID Commands
// =============================================================================

pub const CMD_GET_FIRMWARE: u8 = 0x02;
pub const CMD_GET_BOOTLOADER: u8 = 0x06;
pub const CMD_GET_TEMP_CONFIG: u8 = 0x10;
pub const CMD_GET_TEMP: u8 = 0x11;
pub const CMD_GET_VOLTS: u8 = 0x12;
pub const CMD_GET_FAN_MODES: u8 = 0x20;
pub const CMD_GET_FAN_RPM: u8 = 0x21;
pub const CMD_SET_FAN_DUTY: u8 = 0x23;
pub const CMD_SET_FAN_PROFILE: u8 = 0x25;

pub const CMD_RESET_LED_CHANNEL: u8 = 0x37;
pub const CMD_BEGIN_LED_EFFECT: u8 = 0x34;
pub const CMD_SET_LED_CHANNEL_STATE: u8 = 0x38;
pub const CMD_LED_EFFECT: u8 = 0x35;
pub const CMD_LED_COMMIT: u8 = 0x33;

/// LED channel controlled by the device's own effect engine.
pub const LED_PORT_STATE_HARDWARE: u8 = 0x01;

/// Voltage rail selectors for CMD_GET_VOLTS.
pub const RAIL_12V: u8 = 0x00;
pub const RAIL_5V: u8 = 0x01;
pub const RAIL_3V3: u8 = 0x02;

// =============================================================================
// Fan Profiles
// =============================================================================

/// Number of points in a device fan profile.
pub const PROFILE_LENGTH: usize = 6;

/// Default critical temperature for fan profiles.
pub const CRITICAL_TEMPERATURE: u8 = 60;

/// Critical temperature when the high temperature override is requested.
pub const CRITICAL_TEMPERATURE_HIGH: u8 = 100;

/// Maximum value of a fan profile point.
pub const MAX_FAN_RPM: u16 = 5000;

/// Length of the CMD_SET_FAN_PROFILE payload.
pub const FAN_PROFILE_PAYLOAD_LENGTH: usize = 26;

// =============================================================================
// Fan Modes
// =============================================================================

/// How a fan header is populated, as reported by CMD_GET_FAN_MODES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FanMode {
    /// Nothing detected on the header (or auto mode).
    Disconnected,
    /// 3-pin voltage controlled fan.
    #[serde(rename = "DC")]
    Dc,
    /// 4-pin PWM fan.
    #[serde(rename = "PWM")]
    Pwm,
}

impl FanMode {
    /// Decode a fan mode byte.
    ///
    /// Returns `None` for codes outside the documented set.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(FanMode::Disconnected),
            0x01 => Some(FanMode::Dc),
            0x02 => Some(FanMode::Pwm),
            _ => None,
        }
    }

    /// Whether the fan on this header can be controlled.
    pub const fn is_controllable(&self) -> bool {
        matches!(self, FanMode::Dc | FanMode::Pwm)
    }

    /// Human-readable description used in status reports.
    pub const fn description(&self) -> &'static str {
        match self {
            FanMode::Disconnected => "Auto/Disconnected",
            FanMode::Dc => "DC",
            FanMode::Pwm => "PWM",
        }
    }
}

impl std::fmt::Display for FanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Command Builders
// =============================================================================

/// Build a transmit buffer for `command`.
///
/// Byte 0 is the (unused) report id, byte 1 the command, and the payload
/// starts at byte 2. Payloads longer than the report are truncated.
///
/// # Returns
/// A 65-byte buffer ready to write to the device.
pub fn build_command(command: u8, payload: &[u8]) -> [u8; TX_BUFFER_LENGTH] {
    let mut buf = [0u8; TX_BUFFER_LENGTH];
    buf[1] = command;

    let len = payload.len().min(TX_BUFFER_LENGTH - PAYLOAD_OFFSET);
    buf[PAYLOAD_OFFSET..PAYLOAD_OFFSET + len].copy_from_slice(&payload[..len]);

    buf
}

/// Build the CMD_SET_FAN_PROFILE payload.
///
/// Byte 0 is the fan index (set per fan before sending), byte 1 the
/// zero-based temperature sensor, then six big-endian temperatures in
/// hundredths of a degree and six big-endian values.
///
/// # Arguments
/// * `sensor` - Zero-based temperature sensor index
/// * `profile` - Exactly six (temperature, value) points
pub fn build_fan_profile_payload(
    sensor: u8,
    profile: &[(u8, u16); PROFILE_LENGTH],
) -> [u8; FAN_PROFILE_PAYLOAD_LENGTH] {
    let mut buf = [0u8; FAN_PROFILE_PAYLOAD_LENGTH];
    buf[1] = sensor;

    for (i, &(temp, value)) in profile.iter().enumerate() {
        let centi = temp as u16 * 100;
        buf[2 + i * 2..4 + i * 2].copy_from_slice(&centi.to_be_bytes());
        buf[14 + i * 2..16 + i * 2].copy_from_slice(&value.to_be_bytes());
    }

    buf
}
