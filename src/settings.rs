use crate::error::InvalidConfigValue;

/// Oversampling settings for temperature, pressure and humidity.
///
/// Higher oversampling rates reduce noise by averaging inside the chip,
/// but lengthen every conversion and raise the current drawn per cycle.
/// The discriminant is the 3-bit register code, not the multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// No measurement. The channel reads back its reset value.
    Skipped = 0,
    /// 1x oversampling (default).
    #[default]
    X1 = 1,
    /// 2x oversampling.
    X2 = 2,
    /// 4x oversampling.
    X4 = 3,
    /// 8x oversampling.
    X8 = 4,
    /// 16x oversampling. Highest precision, longest conversion.
    X16 = 5,
}

impl TryFrom<u8> for Oversampling {
    type Error = InvalidConfigValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Oversampling::Skipped),
            1 => Ok(Oversampling::X1),
            2 => Ok(Oversampling::X2),
            3 => Ok(Oversampling::X4),
            4 => Ok(Oversampling::X8),
            5 => Ok(Oversampling::X16),
            _ => Err(InvalidConfigValue(value)),
        }
    }
}

/// Power mode of the sensor, bits 1..0 of `ctrl_meas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// No conversions. All registers stay accessible.
    #[default]
    Sleep = 0,
    /// A single conversion, after which the chip drops back to sleep.
    Forced = 1,
    /// Continuous conversions separated by the standby time.
    Normal = 3,
}

impl TryFrom<u8> for Mode {
    type Error = InvalidConfigValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Sleep),
            // Both 01 and 10 select forced mode on the chip.
            1 | 2 => Ok(Mode::Forced),
            3 => Ok(Mode::Normal),
            _ => Err(InvalidConfigValue(value)),
        }
    }
}

/// Inactive duration between two conversions in normal mode.
///
/// The encoding is not monotonic: the 10 ms and 20 ms settings sit after
/// 1000 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Standby {
    Ms0_5 = 0,
    Ms62_5 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    #[default]
    Ms1000 = 5,
    Ms10 = 6,
    Ms20 = 7,
}

impl Standby {
    /// Standby duration in microseconds.
    pub fn as_micros(self) -> u32 {
        match self {
            Standby::Ms0_5 => 500,
            Standby::Ms62_5 => 62_500,
            Standby::Ms125 => 125_000,
            Standby::Ms250 => 250_000,
            Standby::Ms500 => 500_000,
            Standby::Ms1000 => 1_000_000,
            Standby::Ms10 => 10_000,
            Standby::Ms20 => 20_000,
        }
    }
}

impl TryFrom<u8> for Standby {
    type Error = InvalidConfigValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Standby::Ms0_5),
            1 => Ok(Standby::Ms62_5),
            2 => Ok(Standby::Ms125),
            3 => Ok(Standby::Ms250),
            4 => Ok(Standby::Ms500),
            5 => Ok(Standby::Ms1000),
            6 => Ok(Standby::Ms10),
            7 => Ok(Standby::Ms20),
            _ => Err(InvalidConfigValue(value)),
        }
    }
}

/// Coefficient of the IIR (infinite impulse response) filter.
///
/// The filter smooths short-term disturbances in pressure and temperature
/// (slammed doors, wind across the port). Humidity is not filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Filter {
    /// Filter disabled.
    #[default]
    Off = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
}

impl TryFrom<u8> for Filter {
    type Error = InvalidConfigValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Filter::Off),
            1 => Ok(Filter::X2),
            2 => Ok(Filter::X4),
            3 => Ok(Filter::X8),
            4 => Ok(Filter::X16),
            _ => Err(InvalidConfigValue(value)),
        }
    }
}

/// In-memory mirror of the three control registers.
///
/// The driver keeps this equal to what was last written to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Humidity oversampling (`ctrl_hum`).
    pub hum_osrs: Oversampling,
    /// Temperature oversampling (`ctrl_meas`).
    pub temp_osrs: Oversampling,
    /// Pressure oversampling (`ctrl_meas`).
    pub pres_osrs: Oversampling,
    /// Power mode (`ctrl_meas`).
    pub mode: Mode,
    /// Standby time in normal mode (`config`).
    pub standby: Standby,
    /// IIR filter coefficient (`config`).
    pub filter: Filter,
}

impl Config {
    /// Worst case duration of one conversion in milliseconds.
    ///
    /// Uses the oversampling register codes (0..=5), as the datasheet formula does.
    pub fn max_measurement_time_ms(&self) -> f64 {
        let t = self.temp_osrs as u8 as f64;
        let p = self.pres_osrs as u8 as f64;
        let h = self.hum_osrs as u8 as f64;
        1.25 + 2.3 * t + (2.3 * p + 0.575) + (2.3 * h + 0.575)
    }

    /// Same as [`Config::max_measurement_time_ms`], in whole microseconds.
    pub fn max_measurement_time_us(&self) -> u32 {
        let t = self.temp_osrs as u32;
        let p = self.pres_osrs as u32;
        let h = self.hum_osrs as u32;
        1250 + 2300 * t + (2300 * p + 575) + (2300 * h + 575)
    }
}

/// Builder for a starting [`Config`] passed to `init_with_config`.
#[derive(Default)]
pub struct Bme280Builder {
    config: Config,
}

impl Bme280Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temperature oversampling.
    pub fn temp_oversampling(mut self, os: Oversampling) -> Self {
        self.config.temp_osrs = os;
        self
    }

    /// Sets the humidity oversampling.
    pub fn hum_oversampling(mut self, os: Oversampling) -> Self {
        self.config.hum_osrs = os;
        self
    }

    /// Sets the pressure oversampling.
    pub fn pres_oversampling(mut self, os: Oversampling) -> Self {
        self.config.pres_osrs = os;
        self
    }

    /// Sets the power mode the chip enters right after initialisation.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn standby(mut self, standby: Standby) -> Self {
        self.config.standby = standby;
        self
    }

    /// Sets the IIR filter coefficient.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
