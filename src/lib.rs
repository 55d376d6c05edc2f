//! Corsair Commander Rust Devices Library
//!
//! A Rust driver for the Corsair Commander Pro and Lighting Node Pro/Core.
//!
//! # Features
//!
//! - Read device status (temperatures, rail voltages, fan speeds)
//! - Control fans with fixed duties or temperature profiles
//! - Stage and commit hardware lighting effects
//! - PMBus LINEAR11/ULINEAR16 and PEC codecs
//!
//! # Example
//!
//! ```no_run
//! use commander_rust_devices::device::CommanderPro;
//! use commander_rust_devices::protocol::EffectOptions;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open and initialize the device
//!     let mut commander = CommanderPro::open()?;
//!     for entry in commander.initialize()? {
//!         println!("{}", entry);
//!     }
//!
//!     // Read current status
//!     for entry in commander.get_status()? {
//!         println!("{}", entry);
//!     }
//!
//!     // Set fixed speeds
//!     commander.set_fixed_speed("sync", 50)?;
//!
//!     // Or use a profile following probe 1
//!     commander.set_speed_profile("fan1", &[(30, 800), (45, 1500)], 1, false)?;
//!
//!     // Light up the first LED channel
//!     commander.set_color("led1", "fixed", &[[0x00, 0x80, 0xff]], &EffectOptions::default())?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cooling;
pub mod device;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use device::{CommanderPro, DeviceVariant};
pub use error::{CommanderError, ErrorKind, Result};
pub use protocol::{EffectOptions, LedMode, Rgb};
