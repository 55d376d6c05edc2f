//! PMBus numeric encodings and SMBus packet error checking.
//!
//! Implements the LINEAR11 and ULINEAR16 fixed-point formats used by
//! power-monitoring devices, and the CRC-8 Packet Error Code (PEC) appended
//! to SMBus transactions.
//!
//! References:
//! - Power Systems Management Protocol Specification, Part II, Rev 1.2.
//! - System Management Bus (SMBus) Specification, Version 3.1.

use std::sync::OnceLock;

// =============================================================================
// Command Codes
// =============================================================================

/// Read/write bit appended to the SMBus address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WriteBit {
    Write = 0x00,
    Read = 0x01,
}

/// PMBus command codes (incomplete, only those used by supported devices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandCode {
    Page = 0x00,
    ClearFaults = 0x03,
    PagePlusWrite = 0x05,
    PagePlusRead = 0x06,
    VoutMode = 0x20,
    FanConfig12 = 0x3a,
    FanCommand1 = 0x3b,
    FanCommand2 = 0x3c,
    FanConfig34 = 0x3d,
    FanCommand3 = 0x3e,
    FanCommand4 = 0x3f,
    ReadEin = 0x86,
    ReadEout = 0x87,
    ReadVin = 0x88,
    ReadIin = 0x89,
    ReadVcap = 0x8a,
    ReadVout = 0x8b,
    ReadIout = 0x8c,
    ReadTemperature1 = 0x8d,
    ReadTemperature2 = 0x8e,
    ReadTemperature3 = 0x8f,
    ReadFanSpeed1 = 0x90,
    ReadFanSpeed2 = 0x91,
    ReadFanSpeed3 = 0x92,
    ReadFanSpeed4 = 0x93,
    ReadDutyCycle = 0x94,
    ReadFrequency = 0x95,
    ReadPout = 0x96,
    ReadPin = 0x97,
    ReadPmbusRevision = 0x98,
    MfrId = 0x99,
    MfrModel = 0x9a,
    MfrRevision = 0x9b,
    MfrLocation = 0x9c,
    MfrDate = 0x9d,
    MfrSerial = 0x9e,
    MfrSpecificD1 = 0xd1,
    MfrSpecificD2 = 0xd2,
    MfrSpecificD8 = 0xd8,
    MfrSpecificDc = 0xdc,
    MfrSpecificEe = 0xee,
    MfrSpecificF0 = 0xf0,
    MfrSpecificFc = 0xfc,
}

impl CommandCode {
    /// Raw command byte.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// LINEAR11 / ULINEAR16
// =============================================================================

/// Largest LINEAR11 mantissa magnitude.
const LINEAR11_MAX_MANTISSA: f64 = 1023.0;

/// Sign-extend the low `bits` bits of `value`.
const fn sign_extend(value: i32, bits: u32) -> i32 {
    let shift = 32 - bits;
    (value << shift) >> shift
}

/// Decode a PMBus LINEAR11 or ULINEAR16 value.
///
/// Without `vout_exponent` the two bytes are a little-endian LINEAR11 word:
/// 11-bit two's-complement mantissa in bits 0-10 and 5-bit two's-complement
/// exponent in bits 11-15.
///
/// With `vout_exponent` (the VOUT_MODE byte) the value is ULINEAR16: the
/// exponent is the low 5 bits of `vout_exponent` and the full word is an
/// unsigned mantissa.
///
/// # Example
/// ```
/// use commander_rust_devices::protocol::pmbus::decode_linear;
///
/// assert_eq!(decode_linear([0x67, 0xe3], None), 54.4375);
/// assert_eq!(decode_linear([0x67, 0x03], Some(0x1c)), 54.4375);
/// ```
pub fn decode_linear(bytes: [u8; 2], vout_exponent: Option<u8>) -> f64 {
    let word = u16::from_le_bytes(bytes);

    let (mantissa, exponent) = match vout_exponent {
        None => (
            sign_extend((word & 0x07ff) as i32, 11),
            sign_extend((word >> 11) as i32, 5),
        ),
        Some(mode) => (word as i32, sign_extend((mode & 0x1f) as i32, 5)),
    };

    mantissa as f64 * 2f64.powi(exponent)
}

/// Encode a value in PMBus LINEAR11 format.
///
/// Picks the smallest exponent that keeps the mantissa within 11 bits, so
/// values that are not a multiple of the chosen step are rounded.
///
/// # Example
/// ```
/// use commander_rust_devices::protocol::pmbus::{decode_linear, encode_linear11};
///
/// assert_eq!(encode_linear11(3.3), [0x4d, 0xc3]);
/// assert_eq!(encode_linear11(0.0), [0x00, 0x00]);
/// assert_eq!(decode_linear(encode_linear11(-2812.0), None), -2812.0);
/// ```
pub fn encode_linear11(value: f64) -> [u8; 2] {
    if value == 0.0 {
        return [0x00, 0x00];
    }

    let exponent = (value.abs() / LINEAR11_MAX_MANTISSA).log2().ceil() as i32;
    let mantissa = (value * 2f64.powi(-exponent)).round_ties_even() as i32;

    let word = (((exponent & 0x1f) as u16) << 11) | ((mantissa & 0x07ff) as u16);
    word.to_le_bytes()
}

// =============================================================================
// Packet Error Code (CRC-8)
// =============================================================================

/// CRC-8 polynomial x^8 + x^2 + x^1 + x^0 (the x^8 term is implicit).
const PEC_POLY: u8 = 0x07;

/// Most significant bit of the CRC register.
const PEC_MSB_MASK: u8 = 0x80;

static PEC_TABLE: OnceLock<[u8; 256]> = OnceLock::new();

fn pec_table() -> &'static [u8; 256] {
    PEC_TABLE.get_or_init(|| {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut reg = i as u8;
            for _ in 0..8 {
                reg = if reg & PEC_MSB_MASK != 0 {
                    (reg << 1) ^ PEC_POLY
                } else {
                    reg << 1
                };
            }
            *entry = reg;
        }
        table
    })
}

/// Compute the 8-bit SMBus Packet Error Code of `bytes`.
///
/// Appending the returned byte to `bytes` yields a message whose PEC is 0.
///
/// # Example
/// ```
/// use commander_rust_devices::protocol::pmbus::compute_pec;
///
/// assert_eq!(compute_pec(b"123456789"), 0xf4);
/// assert_eq!(compute_pec(&[0x5c, 0x93]), 0x00);
/// ```
pub fn compute_pec(bytes: &[u8]) -> u8 {
    let table = pec_table();
    bytes
        .iter()
        .fold(0u8, |reg, &octet| table[(reg ^ octet) as usize])
}
