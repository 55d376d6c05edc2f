//! Helpers shared by the library and the command-line tool.

pub mod parsing;

// Re-export commonly used items
pub use parsing::{clamp_duty, parse_hex_color, parse_profile, parse_unsafe_features};
