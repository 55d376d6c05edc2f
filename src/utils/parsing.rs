//! Parsing utilities for CLI arguments and configuration values.
//!
//! This module provides reusable parsing functions for common input formats
//! used throughout the application.

use crate::error::{CommanderError, Result};
use crate::protocol::Rgb;

/// Unsafe feature that raises the critical temperature of fan profiles.
pub const UNSAFE_HIGH_TEMPERATURE: &str = "high_temperature";

// =============================================================================
// Color Parsing
// =============================================================================

/// Parse a hex color string into RGB components.
///
/// Accepts formats: `#RRGGBB` or `RRGGBB`
///
/// # Example
/// ```
/// use commander_rust_devices::utils::parsing::parse_hex_color;
///
/// let [r, g, b] = parse_hex_color("#FF5500").unwrap();
/// assert_eq!(r, 255);
/// assert_eq!(g, 85);
/// assert_eq!(b, 0);
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Rgb> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(CommanderError::InvalidInput(format!(
            "Invalid color hex: {}",
            hex
        )));
    }

    let component = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| CommanderError::InvalidInput(format!("Invalid color hex: {}", hex)))
    };

    Ok([component(0..2)?, component(2..4)?, component(4..6)?])
}

// =============================================================================
// Duty Parsing
// =============================================================================

/// Clamp a user-supplied duty to 0-100%.
pub fn clamp_duty(duty: i64) -> u8 {
    duty.clamp(0, 100) as u8
}

// =============================================================================
// Fan Profile Parsing
// =============================================================================

/// Parse a fan profile given as `temp:value` pairs.
///
/// Pairs are separated by commas or whitespace, e.g. `20:800,30:1200`.
///
/// # Example
/// ```
/// use commander_rust_devices::utils::parsing::parse_profile;
///
/// let profile = parse_profile("20:800, 40:1500").unwrap();
/// assert_eq!(profile, vec![(20, 800), (40, 1500)]);
/// ```
pub fn parse_profile(points: &str) -> Result<Vec<(u8, u16)>> {
    points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let invalid = || {
                CommanderError::InvalidInput(format!(
                    "Invalid profile point '{}'. Use TEMP:VALUE, e.g. 30:1200",
                    pair
                ))
            };
            let (temp, value) = pair.split_once(':').ok_or_else(invalid)?;
            let temp: u8 = temp.trim().parse().map_err(|_| invalid())?;
            let value: u16 = value.trim().parse().map_err(|_| invalid())?;
            Ok((temp, value))
        })
        .collect()
}

// =============================================================================
// Unsafe Features
// =============================================================================

/// Parse a comma-separated list of unsafe feature names.
///
/// Unknown names are kept so callers can decide how to treat them.
pub fn parse_unsafe_features(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
