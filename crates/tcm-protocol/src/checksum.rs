//! CRC-16 used to protect every frame.
//!
//! Generator polynomial X^16 + X^12 + X^5 + 1 (0x1021), initial value 0,
//! no input or output reflection, no final xor. This is the parameter set
//! catalogued as CRC-16/XMODEM.

use crc::{Crc, CRC_16_XMODEM};

/// Frame checksum algorithm.
pub const TCM_CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the frame checksum over `data`.
pub fn checksum(data: &[u8]) -> u16 {
    TCM_CRC16.checksum(data)
}
