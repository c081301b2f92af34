use crate::regs::calib_mem;

/// Factory-fused calibration coefficients read from the sensor.
/// These are unique to every individual chip and required for compensation formulas.
///
/// Signed fields are already sign-corrected; nothing downstream reinterprets them.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    /// 12-bit signed.
    pub dig_h4: i16,
    /// 12-bit signed.
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Interprets the low `bits` bits of `value` as a two's-complement number.
///
/// With the sign bit set the result is `-(value ^ mask) - 1`, `mask` having all `bits` bits set.
/// Only called with the NVM field widths (8, 12 and 16).
pub(crate) fn sign_extend(value: u16, bits: u32) -> i16 {
    debug_assert!((1..=16).contains(&bits));
    let mask = ((1u32 << bits) - 1) as u16;
    let value = value & mask;
    if value & (1 << (bits - 1)) != 0 {
        -((value ^ mask) as i16) - 1
    } else {
        value as i16
    }
}

impl CalibData {
    /// Builds coefficients from already-signed values, grouped like the datasheet's
    /// `dig_T1..3`, `dig_P1` + `dig_P2..9` and `dig_H1..6`.
    ///
    /// `dig_H4` and `dig_H5` are 12-bit on the chip (-2048..=2047).
    pub fn new(
        dig_t: (u16, i16, i16),
        dig_p: (u16, [i16; 8]),
        dig_h: (u8, i16, u8, i16, i16, i8),
    ) -> Self {
        let (dig_t1, dig_t2, dig_t3) = dig_t;
        let (dig_p1, [dig_p2, dig_p3, dig_p4, dig_p5, dig_p6, dig_p7, dig_p8, dig_p9]) = dig_p;
        let (dig_h1, dig_h2, dig_h3, dig_h4, dig_h5, dig_h6) = dig_h;

        CalibData {
            dig_t1,
            dig_t2,
            dig_t3,
            dig_p1,
            dig_p2,
            dig_p3,
            dig_p4,
            dig_p5,
            dig_p6,
            dig_p7,
            dig_p8,
            dig_p9,
            dig_h1,
            dig_h2,
            dig_h3,
            dig_h4,
            dig_h5,
            dig_h6,
        }
    }

    /// Parses the NVM bytes gathered from 0x88..=0x9F, 0xA1 and 0xE1..=0xE7, in that order.
    pub fn from_nvm(buffer: &[u8; calib_mem::TOTAL_SIZE]) -> Self {
        let word = |i: usize| (buffer[i] as u16) | ((buffer[i + 1] as u16) << 8);
        let signed = |i: usize| sign_extend(word(i), 16);

        // 0xE4/0xE5/0xE6 pack dig_H4 and dig_H5 as 12-bit values sharing the 0xE5 byte.
        let h4 = ((buffer[28] as u16) << 4) | (buffer[29] as u16 & 0x0F);
        let h5 = ((buffer[30] as u16) << 4) | ((buffer[29] as u16 >> 4) & 0x0F);

        CalibData {
            dig_t1: word(0),
            dig_t2: signed(2),
            dig_t3: signed(4),
            dig_p1: word(6),
            dig_p2: signed(8),
            dig_p3: signed(10),
            dig_p4: signed(12),
            dig_p5: signed(14),
            dig_p6: signed(16),
            dig_p7: signed(18),
            dig_p8: signed(20),
            dig_p9: signed(22),
            dig_h1: buffer[24],
            dig_h2: signed(25),
            dig_h3: buffer[27],
            dig_h4: sign_extend(h4, 12),
            dig_h5: sign_extend(h5, 12),
            dig_h6: sign_extend(buffer[31] as u16, 8) as i8,
        }
    }
}
