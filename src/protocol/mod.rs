//! HID protocol implementation for Commander Pro class devices.
//!
//! This module contains the low-level HID command constants, builders,
//! response parsing and the PMBus numeric codecs.

pub mod commands;
pub mod lighting;
pub mod pmbus;
pub mod status;

pub use commands::*;
pub use lighting::*;
pub use status::*;
