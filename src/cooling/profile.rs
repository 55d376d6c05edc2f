//! Fan profile normalization.
//!
//! The device takes exactly six (temperature, value) points per fan. User
//! profiles are clamped, made monotonic, capped by a critical-temperature
//! point and padded before they are serialized.

use crate::error::{CommanderError, Result};
use crate::protocol::{MAX_FAN_RPM, PROFILE_LENGTH};

/// Normalize a profile against a critical temperature.
///
/// Appends `(critical_temp, max_value)`, sorts by temperature (higher value
/// first on ties), drops repeated temperatures, forces values to be
/// non-decreasing and stops at the first point that reaches `max_value`.
///
/// # Example
/// ```
/// use commander_rust_devices::cooling::normalize_profile;
///
/// let normal = normalize_profile(&[(30, 40), (20, 50)], 60, 100);
/// assert_eq!(normal, vec![(20, 50), (30, 50), (60, 100)]);
/// ```
pub fn normalize_profile(
    profile: &[(u8, u16)],
    critical_temp: u8,
    max_value: u16,
) -> Vec<(u8, u16)> {
    let mut sorted: Vec<(u8, u16)> = profile.to_vec();
    sorted.push((critical_temp, max_value));
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut normal: Vec<(u8, u16)> = Vec::with_capacity(sorted.len());
    for (temp, value) in sorted {
        let value = match normal.last() {
            Some(&(last_temp, _)) if last_temp == temp => continue,
            Some(&(_, last_value)) => value.max(last_value),
            None => value,
        };

        normal.push((temp, value.min(max_value)));
        if value >= max_value {
            break;
        }
    }

    normal
}

/// Prepare a user profile for CMD_SET_FAN_PROFILE.
///
/// Values are clamped to [0, 5000], the profile is normalized and padded
/// with `(critical_temp, 5000)` points up to exactly six points.
///
/// # Errors
/// Returns `TooManyPoints` if the normalized profile is longer than six points.
pub fn prepare_profile(
    profile: &[(u8, u16)],
    critical_temp: u8,
) -> Result<[(u8, u16); PROFILE_LENGTH]> {
    let clamped: Vec<(u8, u16)> = profile
        .iter()
        .map(|&(temp, value)| (temp, value.min(MAX_FAN_RPM)))
        .collect();

    let normal = normalize_profile(&clamped, critical_temp, MAX_FAN_RPM);
    if normal.len() > PROFILE_LENGTH {
        return Err(CommanderError::TooManyPoints {
            excess: normal.len() - PROFILE_LENGTH,
        });
    }

    let mut points = [(critical_temp, MAX_FAN_RPM); PROFILE_LENGTH];
    points[..normal.len()].copy_from_slice(&normal);
    Ok(points)
}
