//! Custom error types for Commander Pro class devices.
//!
//! This module provides fine-grained error handling for device communication,
//! argument validation and persisted session state.

use thiserror::Error;

/// Main error type for Commander Pro operations.
#[derive(Error, Debug)]
pub enum CommanderError {
    /// Device not found during enumeration.
    #[error("No supported Corsair device found. Check USB connection and permissions.")]
    DeviceNotFound,

    /// HID communication error.
    #[error("HID communication error: {0}")]
    HidError(#[from] hidapi::HidError),

    /// Timeout waiting for device response.
    #[error("Timeout waiting for device response")]
    Timeout,

    /// Invalid or malformed response from device.
    #[error("Invalid response from device: {message}")]
    InvalidResponse { message: String },

    /// The feature does not exist on this device variant.
    #[error("Operation not supported by {device}")]
    UnsupportedOperation { device: &'static str },

    /// Channel name that does not resolve on this device.
    #[error("unknown channel, should be one of: {choices}")]
    UnknownChannel { choices: String },

    /// LED mode name that is not known.
    #[error("mode \"{0}\" is not valid")]
    InvalidMode(String),

    /// LED direction name that is not known.
    #[error("invalid direction: '{0}'")]
    InvalidDirection(String),

    /// Normalized fan profile is longer than the device accepts.
    #[error("too many points in profile (remove {excess})")]
    TooManyPoints { excess: usize },

    /// Temperature sensor index outside the probes of this device.
    #[error("sensor {index} invalid, must be between 0 and {max}")]
    InvalidSensor { index: usize, max: usize },

    /// Fan index outside the fan channels of this device.
    #[error("fan {index} invalid, must be between 0 and {max}")]
    InvalidFan { index: usize, max: usize },

    /// The selected temperature sensor is not connected.
    #[error("the specified temperature sensor ({0}) is not connected")]
    SensorNotConnected(u8),

    /// Staging this effect would exceed the device limit.
    #[error("too many lighting effects ({count} > {max}), use the 'clear' mode to reset them")]
    StagingOverflow { count: usize, max: usize },

    /// Session storage could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Error categories independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Feature absent on this device variant.
    UnsupportedOperation,
    /// Out-of-range index, unknown channel, invalid mode or profile.
    InvalidArgument,
    /// Request conflicts with cached device state.
    DeviceStateConflict,
    /// Too many lighting effects staged.
    StagingOverflow,
    /// Device discovery or HID I/O failure.
    Transport,
    /// Persistent session store failure.
    Storage,
}

impl CommanderError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommanderError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            CommanderError::UnknownChannel { .. }
            | CommanderError::InvalidMode(_)
            | CommanderError::InvalidDirection(_)
            | CommanderError::TooManyPoints { .. }
            | CommanderError::InvalidSensor { .. }
            | CommanderError::InvalidFan { .. }
            | CommanderError::InvalidInput(_) => ErrorKind::InvalidArgument,
            CommanderError::SensorNotConnected(_) => ErrorKind::DeviceStateConflict,
            CommanderError::StagingOverflow { .. } => ErrorKind::StagingOverflow,
            CommanderError::DeviceNotFound
            | CommanderError::HidError(_)
            | CommanderError::Timeout
            | CommanderError::InvalidResponse { .. } => ErrorKind::Transport,
            CommanderError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type alias for Commander operations.
pub type Result<T> = std::result::Result<T, CommanderError>;
