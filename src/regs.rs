//! Register map and bit packing of the three control registers.

use crate::settings::Config;

pub const ADDR_CHIP_ID: u8 = 0xD0;
pub const ADDR_RESET: u8 = 0xE0;
pub const ADDR_CTRL_HUM: u8 = 0xF2;
pub const ADDR_STATUS: u8 = 0xF3;
pub const ADDR_CTRL_MEAS: u8 = 0xF4;
pub const ADDR_CONFIG: u8 = 0xF5;

/// Writing this to `ADDR_RESET` triggers a power-on-reset sequence.
pub const RESET_COMMAND: u8 = 0xB6;

/// Memory addresses and sizes for the calibration NVM blocks, in read order.
pub mod calib_mem {
    pub const ADDR: [u8; 3] = [0x88, 0xA1, 0xE1];
    pub const SIZES: [usize; 3] = [24, 1, 7];
    pub const TOTAL_SIZE: usize = 24 + 1 + 7;
}

/// Memory address and size for the measurement data registers.
pub mod raw_data_mem {
    pub const ADDR: u8 = 0xF7;
    pub const SIZE: usize = 8;
}

const STATUS_MEASURING: u8 = 1 << 3;
const STATUS_IM_UPDATE: u8 = 1 << 0;

/// `ctrl_hum`: humidity oversampling in bits 2..0.
pub fn ctrl_hum(config: &Config) -> u8 {
    (config.hum_osrs as u8) & 0x07
}

/// `ctrl_meas`: temperature oversampling in bits 7..5, pressure in 4..2, mode in 1..0.
pub fn ctrl_meas(config: &Config) -> u8 {
    (((config.temp_osrs as u8) & 0x07) << 5)
        | (((config.pres_osrs as u8) & 0x07) << 2)
        | ((config.mode as u8) & 0x03)
}

/// `config`: standby time in bits 7..5, filter in 4..2. `spi3w_en` (bit 0) stays off.
pub fn config(config: &Config) -> u8 {
    (((config.standby as u8) & 0x07) << 5) | (((config.filter as u8) & 0x07) << 2)
}

/// Decoded `status` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    pub fn from_reg(value: u8) -> Self {
        Status(value)
    }

    /// A conversion is running. Drops back to `false` once results are in the data registers.
    pub fn is_measuring(&self) -> bool {
        self.0 & STATUS_MEASURING != 0
    }

    /// NVM data is being copied to the image registers (at power-on and after reset).
    pub fn is_updating(&self) -> bool {
        self.0 & STATUS_IM_UPDATE != 0
    }
}
