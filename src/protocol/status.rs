//! Response parsing for the Commander Pro family.
//!
//! Parses 16-byte HID response buffers into structured values and defines
//! the `(label, value, unit)` status report shape.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{CommanderError, Result};
use crate::protocol::commands::FanMode;

// =============================================================================
// Response Parsing Offsets
// =============================================================================

/// Offset of the first data byte; byte 0 is a status byte.
const OFFSET_DATA: usize = 1;

fn ensure_len(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.len() < needed {
        return Err(CommanderError::InvalidResponse {
            message: format!(
                "{} response too short: {} bytes, expected at least {}",
                what,
                buf.len(),
                needed
            ),
        });
    }
    Ok(())
}

fn u16be_at_data(buf: &[u8], what: &str) -> Result<u16> {
    ensure_len(buf, OFFSET_DATA + 2, what)?;
    Ok(BigEndian::read_u16(&buf[OFFSET_DATA..]))
}

/// Parse a CMD_GET_TEMP response into degrees Celsius.
pub fn parse_temperature(buf: &[u8]) -> Result<f64> {
    Ok(u16be_at_data(buf, "Temperature")? as f64 / 100.0)
}

/// Parse a CMD_GET_VOLTS response into volts.
pub fn parse_voltage(buf: &[u8]) -> Result<f64> {
    Ok(u16be_at_data(buf, "Voltage")? as f64 / 1000.0)
}

/// Parse a CMD_GET_FAN_RPM response.
pub fn parse_fan_rpm(buf: &[u8]) -> Result<u16> {
    u16be_at_data(buf, "Fan speed")
}

/// Parse a CMD_GET_TEMP_CONFIG response into per-probe connection flags.
pub fn parse_temp_config(buf: &[u8], probes: usize) -> Result<Vec<bool>> {
    ensure_len(buf, OFFSET_DATA + probes, "Temperature config")?;
    Ok(buf[OFFSET_DATA..OFFSET_DATA + probes]
        .iter()
        .map(|&b| b == 1)
        .collect())
}

/// Parse a CMD_GET_FAN_MODES response.
///
/// Unknown mode codes are reported as disconnected.
pub fn parse_fan_modes(buf: &[u8], fans: usize) -> Result<Vec<FanMode>> {
    ensure_len(buf, OFFSET_DATA + fans, "Fan modes")?;
    Ok(buf[OFFSET_DATA..OFFSET_DATA + fans]
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            FanMode::from_byte(b).unwrap_or_else(|| {
                tracing::warn!(fan = i + 1, code = b, "unknown fan mode, treating as disconnected");
                FanMode::Disconnected
            })
        })
        .collect())
}

// =============================================================================
// Versions
// =============================================================================

/// Firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FirmwareVersion {
    /// Parse firmware version from a CMD_GET_FIRMWARE response.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, 4, "Firmware")?;
        Ok(FirmwareVersion {
            major: buf[1],
            minor: buf[2],
            patch: buf[3],
        })
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Bootloader version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootloaderVersion {
    pub major: u8,
    pub minor: u8,
}

impl BootloaderVersion {
    /// Parse bootloader version from a CMD_GET_BOOTLOADER response.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        ensure_len(buf, 3, "Bootloader")?;
        Ok(BootloaderVersion {
            major: buf[1],
            minor: buf[2],
        })
    }
}

impl std::fmt::Display for BootloaderVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// =============================================================================
// Status Report
// =============================================================================

/// Value of one status entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
    Text(String),
    Float(f64),
    Integer(u32),
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusValue::Text(s) => write!(f, "{}", s),
            StatusValue::Float(v) => write!(f, "{:.2}", v),
            StatusValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// One `(label, value, unit)` status entry.
///
/// The unit is empty for versions and other text values.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub label: String,
    pub value: StatusValue,
    pub unit: &'static str,
}

impl StatusEntry {
    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Text(value.into()),
            unit: "",
        }
    }

    pub fn float(label: impl Into<String>, value: f64, unit: &'static str) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Float(value),
            unit,
        }
    }

    pub fn integer(label: impl Into<String>, value: u32, unit: &'static str) -> Self {
        Self {
            label: label.into(),
            value: StatusValue::Integer(value),
            unit,
        }
    }
}

impl std::fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<22}{:>12}", self.label, self.value.to_string())?;
        if !self.unit.is_empty() {
            write!(f, "  {}", self.unit)?;
        }
        Ok(())
    }
}
