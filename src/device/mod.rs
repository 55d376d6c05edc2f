//! Device abstraction layer for Corsair Commander Pro and Lighting Node devices.
//!
//! Provides device discovery, the HID transport seam and the high-level
//! control interface.

pub mod commander;
pub mod transport;
pub mod variant;

pub use commander::{CommanderPro, DeviceEntry};
pub use transport::HidTransport;
pub use variant::{ChannelNames, DeviceVariant, SUPPORTED_DEVICES};
