//! Request/response HID transport.
//!
//! The driver only needs three blocking primitives from the HID layer, so
//! they are expressed as a trait. `hidapi::HidDevice` implements it for real
//! hardware; tests substitute a recording mock.

use hidapi::HidDevice;

use crate::error::{CommanderError, Result};
use crate::protocol::HID_REPORT_LENGTH;

/// HID read timeout in milliseconds.
const READ_TIMEOUT_MS: i32 = 2000;

/// Blocking HID transport used by the driver.
pub trait HidTransport {
    /// Write one output report. `buf[0]` is the report id.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Read one input report of `length` bytes.
    fn read(&mut self, length: usize) -> Result<Vec<u8>>;

    /// Discard reports the device queued but nobody read.
    fn clear_pending_reads(&mut self) -> Result<()>;
}

impl HidTransport for HidDevice {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        HidDevice::write(self, buf).map_err(CommanderError::HidError)
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        let read = self
            .read_timeout(&mut buf, READ_TIMEOUT_MS)
            .map_err(CommanderError::HidError)?;

        if read == 0 {
            return Err(CommanderError::Timeout);
        }

        buf.truncate(read);
        Ok(buf)
    }

    fn clear_pending_reads(&mut self) -> Result<()> {
        let mut buf = [0u8; HID_REPORT_LENGTH];
        loop {
            match self.read_timeout(&mut buf, 1) {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        Ok(())
    }
}
