//! Lighting effect definitions for Commander Pro and Lighting Node devices.
//!
//! The device keeps a small program of hardware effects. Each effect is
//! described by a [`LightingEffect`] and sent with CMD_LED_EFFECT.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CommanderError, Result};

/// Number of addressable LEDs per channel.
pub const MAX_LEDS: u16 = 204;

/// Maximum number of effects the device accepts in one program.
pub const MAX_STAGED_EFFECTS: usize = 8;

/// Maximum number of colors per effect.
pub const MAX_EFFECT_COLORS: usize = 3;

/// An RGB color.
pub type Rgb = [u8; 3];

// =============================================================================
// Modes
// =============================================================================

/// Lighting modes, plus the administrative `Clear` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    Rainbow,
    ColorShift,
    ColorPulse,
    ColorWave,
    Fixed,
    Visor,
    Marquee,
    Blink,
    Sequential,
    Rainbow2,
    /// Forget all staged effects without touching the device.
    Clear,
}

impl LedMode {
    /// Device mode code, `None` for `Clear`.
    pub const fn code(&self) -> Option<u8> {
        match self {
            // off is a special case of fixed
            LedMode::Off => Some(0x04),
            LedMode::Rainbow => Some(0x00),
            LedMode::ColorShift => Some(0x01),
            LedMode::ColorPulse => Some(0x02),
            LedMode::ColorWave => Some(0x03),
            LedMode::Fixed => Some(0x04),
            LedMode::Visor => Some(0x06),
            LedMode::Marquee => Some(0x07),
            LedMode::Blink => Some(0x08),
            LedMode::Sequential => Some(0x09),
            LedMode::Rainbow2 => Some(0x0a),
            LedMode::Clear => None,
        }
    }

    /// Mode name as accepted by [`LedMode::from_str`].
    pub const fn name(&self) -> &'static str {
        match self {
            LedMode::Off => "off",
            LedMode::Rainbow => "rainbow",
            LedMode::ColorShift => "color_shift",
            LedMode::ColorPulse => "color_pulse",
            LedMode::ColorWave => "color_wave",
            LedMode::Fixed => "fixed",
            LedMode::Visor => "visor",
            LedMode::Marquee => "marquee",
            LedMode::Blink => "blink",
            LedMode::Sequential => "sequential",
            LedMode::Rainbow2 => "rainbow2",
            LedMode::Clear => "clear",
        }
    }
}

impl FromStr for LedMode {
    type Err = CommanderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(LedMode::Off),
            "rainbow" => Ok(LedMode::Rainbow),
            "color_shift" => Ok(LedMode::ColorShift),
            "color_pulse" => Ok(LedMode::ColorPulse),
            "color_wave" => Ok(LedMode::ColorWave),
            "fixed" => Ok(LedMode::Fixed),
            "visor" => Ok(LedMode::Visor),
            "marquee" => Ok(LedMode::Marquee),
            "blink" => Ok(LedMode::Blink),
            "sequential" => Ok(LedMode::Sequential),
            "rainbow2" => Ok(LedMode::Rainbow2),
            "clear" => Ok(LedMode::Clear),
            _ => Err(CommanderError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for LedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Speed and Direction
// =============================================================================

/// Animation speed of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl LedSpeed {
    /// Parse a speed name; unrecognized names fall back to `Medium`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "slow" => LedSpeed::Slow,
            "fast" => LedSpeed::Fast,
            _ => LedSpeed::Medium,
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            LedSpeed::Fast => 0x00,
            LedSpeed::Medium => 0x01,
            LedSpeed::Slow => 0x02,
        }
    }
}

/// Animation direction of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub const fn code(&self) -> u8 {
        match self {
            Direction::Forward => 0x01,
            Direction::Backward => 0x00,
        }
    }
}

impl FromStr for Direction {
    type Err = CommanderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            _ => Err(CommanderError::InvalidDirection(s.to_string())),
        }
    }
}

// =============================================================================
// Effects
// =============================================================================

/// Options of a `set_color` request besides channel, mode and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectOptions {
    pub direction: Direction,
    pub speed: LedSpeed,
    /// First LED, 1-indexed.
    pub start_led: u16,
    /// Number of LEDs the effect covers.
    pub maximum_leds: u16,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            speed: LedSpeed::Medium,
            start_led: 1,
            maximum_leds: 1,
        }
    }
}

/// One staged hardware lighting effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingEffect {
    pub channel: u8,
    /// First LED, zero-based.
    pub start_led: u8,
    pub num_leds: u8,
    pub mode: u8,
    pub speed: u8,
    pub direction: u8,
    pub random_colors: bool,
    /// Up to three colors flattened to RGB bytes.
    pub colors: Vec<u8>,
}

impl LightingEffect {
    /// Build the effect for `channel` from a user request.
    ///
    /// Clamps the LED range so that `start_led + num_leds` never exceeds
    /// [`MAX_LEDS`] and keeps only the first three colors. Random colors are
    /// used when no color is given, except for `off`.
    pub fn new(
        channel: u8,
        mode: LedMode,
        colors: &[Rgb],
        options: &EffectOptions,
    ) -> Result<Self> {
        let mode_code = mode.code().ok_or_else(|| {
            CommanderError::InvalidMode(format!("{} does not describe an effect", mode))
        })?;

        let colors: Vec<u8> = colors
            .iter()
            .take(MAX_EFFECT_COLORS)
            .flatten()
            .copied()
            .collect();

        let start_led = options.start_led.clamp(1, MAX_LEDS) - 1;
        // lower bound wins when start_led is the last LED
        let num_leds = options.maximum_leds.min(MAX_LEDS - start_led - 1).max(1);

        Ok(Self {
            channel,
            start_led: start_led as u8,
            num_leds: num_leds as u8,
            mode: mode_code,
            speed: options.speed.code(),
            direction: options.direction.code(),
            random_colors: mode != LedMode::Off && colors.is_empty(),
            colors,
        })
    }

    /// CMD_LED_EFFECT payload for this effect.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = vec![
            self.channel,
            self.start_led,
            self.num_leds,
            self.mode,
            self.speed,
            self.direction,
            self.random_colors as u8,
            0xff,
        ];
        payload.extend_from_slice(&self.colors);
        payload
    }
}
