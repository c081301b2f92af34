#![no_std]

//! # BME280 Environmental Sensor Driver
//!
//! A type-safe, `no_std` driver for the Bosch BME280 humidity, pressure and
//! temperature sensor, built on the `embedded-hal` 1.0 I2C and delay traits.
//! The driver uses the typestate pattern so that measurements can only be
//! taken once the factory calibration has been loaded.
//!
//! ## Features
//! - **Write-Through Configuration**: Every setter writes its register(s)
//!   immediately; the in-memory configuration always equals the chip's.
//! - **Floating-Point Compensation**: The datasheet's double precision formulas.
//! - **Typestate Pattern**: Prevents measuring before initialization.
//! - **`defmt` feature**: Optional logging and `defmt::Format` on all public types.
//!
//! ## Units
//! - **Temperature**: °C
//! - **Humidity**: %RH, clamped to 0..=100
//! - **Pressure**: Pascal (Pa) -> 101325.0 = 1013.25 hPa
//!
//! ## Example
//! ```ignore
//! let bme280 = Bme280::new(i2c, DEFAULT_ADDRESS);
//! let mut bme280 = bme280.init()?;
//!
//! bme280.set_mode(Mode::Forced)?;
//! let data = bme280.read_data(&mut delay)?;
//! // The chip went back to sleep after the one-shot conversion.
//! assert_eq!(bme280.mode(), Mode::Sleep);
//! ```

mod calc;
mod calib;
pub mod regs;
mod settings;

pub use calib::CalibData;
pub use regs::Status;
pub use settings::{Bme280Builder, Config, Filter, Mode, Oversampling, Standby};

use core::marker::PhantomData;
use embedded_hal::{delay::DelayNs, i2c};

use regs::{calib_mem, raw_data_mem};

/// I2C address with the SDO pin tied to GND.
pub const DEFAULT_ADDRESS: u8 = 0x76;
/// I2C address with the SDO pin tied to VDDIO.
pub const ALTERNATE_ADDRESS: u8 = 0x77;
/// Value of the `id` register on a BME280.
pub const CHIP_ID: u8 = 0x60;

// --- Typestates ---

/// Sensor has been created but not yet initialized with calibration data.
#[derive(Debug)]
pub struct Uninitialized;
/// Sensor is initialized, configured, and ready for measurements.
#[derive(Debug)]
pub struct Ready;

/// Error types for the BME280 driver.
pub mod error {
    /// A configuration code outside its enumeration. Carries the rejected code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct InvalidConfigValue(pub u8);

    /// Errors that can occur during communication or configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum Bme280Error<E> {
        /// I2C bus error, passed through unchanged.
        I2CError(E),
        /// Oversampling, mode, standby or filter code outside its enumeration.
        InvalidConfigValue(u8),
    }

    impl<E> From<InvalidConfigValue> for Bme280Error<E> {
        fn from(value: InvalidConfigValue) -> Self {
            Bme280Error::InvalidConfigValue(value.0)
        }
    }

    /// Result type alias for BME280 operations.
    pub type Result<T, E> = core::result::Result<T, Bme280Error<E>>;
}

/// Raw ADC words read from the data registers (0xF7..=0xFE).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawData {
    /// 20-bit pressure reading.
    pub press_adc: u32,
    /// 20-bit temperature reading.
    pub temp_adc: u32,
    /// 16-bit humidity reading.
    pub hum_adc: u16,
}

impl RawData {
    /// Reconstructs the ADC words from the MSB-first data block.
    pub fn from_block(buffer: &[u8; raw_data_mem::SIZE]) -> Self {
        let press_adc =
            ((buffer[0] as u32) << 12) | ((buffer[1] as u32) << 4) | ((buffer[2] as u32) >> 4);
        let temp_adc =
            ((buffer[3] as u32) << 12) | ((buffer[4] as u32) << 4) | ((buffer[5] as u32) >> 4);
        let hum_adc = ((buffer[6] as u16) << 8) | (buffer[7] as u16);

        RawData {
            press_adc,
            temp_adc,
            hum_adc,
        }
    }
}

/// Temperature in degrees Celsius.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature(pub f64);

/// Relative humidity in percent.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Humidity(pub f64);

/// Atmospheric pressure in Pascal (Pa).
///
/// # Example
/// ```rust
/// use bme280_driver::Pressure;
/// let press = Pressure(101325.0);
/// assert_eq!(press.as_hpa(), 1013.25);
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pressure(pub f64);

impl Pressure {
    /// Converts to hectopascal (1 hPa = 100 Pa).
    pub fn as_hpa(&self) -> f64 {
        self.0 / 100.0
    }
}

/// Compensated measurement result in physical units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub humidity: Humidity,
}

/// The main BME280 driver structure.
///
/// Use `Bme280::new(...)` to start. The `STATE` generic uses the Typestate pattern
/// to track initialization status at compile time. A driver owns its bus handle
/// and its configuration mirror; one instance per physical device.
#[derive(Debug)]
pub struct Bme280<I2C, STATE> {
    i2c: I2C,
    address: u8,
    calib_data: CalibData,
    config: Config,
    _state: PhantomData<STATE>,
}

impl<I2C, E> Bme280<I2C, Uninitialized>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Creates a new driver instance in the `Uninitialized` state.
    ///
    /// This does not communicate with the sensor yet.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus object.
    /// * `address` - The I2C address of the sensor ([`DEFAULT_ADDRESS`] or [`ALTERNATE_ADDRESS`]).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Bme280 {
            i2c,
            address,
            calib_data: CalibData::default(),
            config: Config::default(),
            _state: PhantomData,
        }
    }

    /// Loads the factory calibration and writes the default configuration.
    ///
    /// See [`Bme280::init_with_config`].
    pub fn init(self) -> error::Result<Bme280<I2C, Ready>, E> {
        self.init_with_config(Config::default())
    }

    /// Loads the factory calibration, then writes `ctrl_hum`, `ctrl_meas` and
    /// `config` from `config`, in that order.
    ///
    /// This transitions the driver state from `Uninitialized` to `Ready`.
    ///
    /// # Errors
    /// Returns an error if the I2C communication fails. The driver is consumed, so
    /// no instance with missing calibration data can be used afterwards.
    pub fn init_with_config(mut self, config: Config) -> error::Result<Bme280<I2C, Ready>, E> {
        let calib_data = self.get_calib_data()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("bme280 {=u8:#x}: calibration loaded {}", self.address, calib_data);

        let mut bme280 = Bme280 {
            i2c: self.i2c,
            address: self.address,
            calib_data,
            config,
            _state: PhantomData,
        };
        bme280.write_all_regs(&config)?;

        Ok(bme280)
    }

    /// Reads factory-fused calibration coefficients from the sensor's NVM.
    ///
    /// The BME280 stores calibration data in three non-contiguous memory blocks.
    fn get_calib_data(&mut self) -> error::Result<CalibData, E> {
        let mut buffer = [0u8; calib_mem::TOTAL_SIZE];

        let mut offset = 0;
        for (addr, size) in calib_mem::ADDR.iter().zip(calib_mem::SIZES) {
            self.read_into(*addr, &mut buffer[offset..offset + size])?;
            offset += size;
        }

        Ok(CalibData::from_nvm(&buffer))
    }
}

impl<I2C, STATE, E> Bme280<I2C, STATE>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Reads data from a starting register address into a provided buffer.
    ///
    /// The chip auto-increments the register address during the read.
    fn read_into(&mut self, reg_address: u8, buffer: &mut [u8]) -> error::Result<(), E> {
        self.i2c
            .write_read(self.address, &[reg_address], buffer)
            .map_err(error::Bme280Error::I2CError)
    }

    /// Reads a single byte from a specific register address.
    fn read_reg_byte(&mut self, reg_address: u8) -> error::Result<u8, E> {
        let mut buffer = [0];
        self.read_into(reg_address, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Writes one value to one register.
    fn write_reg(&mut self, reg_address: u8, value: u8) -> error::Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::trace!("bme280 write {=u8:#x} <- {=u8:#b}", reg_address, value);

        self.i2c
            .write(self.address, &[reg_address, value])
            .map_err(error::Bme280Error::I2CError)
    }

    /// Gives back the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Bme280<I2C, Ready>
where
    I2C: i2c::I2c<Error = E>,
{
    /// Reads the Chip ID from the sensor (expected value: [`CHIP_ID`]).
    pub fn read_chip_id(&mut self) -> error::Result<u8, E> {
        self.read_reg_byte(regs::ADDR_CHIP_ID)
    }

    /// Performs a soft-reset of the sensor.
    ///
    /// The chip reverts to its power-on register values (sleep mode) and needs 2ms
    /// to reload its NVM, after which the driver's oversampling, standby and filter
    /// settings are written back. The mode is written back as [`Mode::Sleep`], so a
    /// reset never starts a forced conversion.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> error::Result<(), E> {
        self.write_reg(regs::ADDR_RESET, regs::RESET_COMMAND)?;
        self.config.mode = Mode::Sleep;
        delay.delay_ms(2);

        let config = self.config;
        self.write_all_regs(&config)
    }

    /// Reads the `status` register.
    pub fn read_status(&mut self) -> error::Result<Status, E> {
        Ok(Status::from_reg(self.read_reg_byte(regs::ADDR_STATUS)?))
    }

    /// `true` while a conversion is running.
    pub fn is_measuring(&mut self) -> error::Result<bool, E> {
        Ok(self.read_status()?.is_measuring())
    }

    /// `true` while NVM data is being copied to the image registers.
    pub fn is_updating(&mut self) -> error::Result<bool, E> {
        Ok(self.read_status()?.is_updating())
    }

    /// Current configuration mirror.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Calibration coefficients loaded during initialization.
    pub fn calib_data(&self) -> &CalibData {
        &self.calib_data
    }

    pub fn humidity_oversampling(&self) -> Oversampling {
        self.config.hum_osrs
    }

    pub fn temperature_oversampling(&self) -> Oversampling {
        self.config.temp_osrs
    }

    pub fn pressure_oversampling(&self) -> Oversampling {
        self.config.pres_osrs
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn standby(&self) -> Standby {
        self.config.standby
    }

    pub fn filter(&self) -> Filter {
        self.config.filter
    }

    /// Sets the humidity oversampling.
    ///
    /// Writes `ctrl_hum`, then rewrites `ctrl_meas`: the chip only applies a
    /// `ctrl_hum` change after the next `ctrl_meas` write.
    ///
    /// The new value is recorded as soon as `ctrl_hum` is written. If the
    /// `ctrl_meas` write then fails, the chip still holds the new code and will
    /// apply it on the next `ctrl_meas` write from any setter.
    pub fn set_humidity_oversampling(&mut self, os: Oversampling) -> error::Result<(), E> {
        let config = Config {
            hum_osrs: os,
            ..self.config
        };
        self.write_reg(regs::ADDR_CTRL_HUM, regs::ctrl_hum(&config))?;
        self.config = config;
        self.write_reg(regs::ADDR_CTRL_MEAS, regs::ctrl_meas(&config))
    }

    /// Sets the temperature oversampling (`ctrl_meas`).
    pub fn set_temperature_oversampling(&mut self, os: Oversampling) -> error::Result<(), E> {
        let config = Config {
            temp_osrs: os,
            ..self.config
        };
        self.commit_ctrl_meas(config)
    }

    /// Sets the pressure oversampling (`ctrl_meas`).
    pub fn set_pressure_oversampling(&mut self, os: Oversampling) -> error::Result<(), E> {
        let config = Config {
            pres_osrs: os,
            ..self.config
        };
        self.commit_ctrl_meas(config)
    }

    /// Switches the power mode (`ctrl_meas`).
    ///
    /// Selecting [`Mode::Forced`] starts a single conversion; collect it with
    /// [`Bme280::read_data`].
    pub fn set_mode(&mut self, mode: Mode) -> error::Result<(), E> {
        #[cfg(feature = "defmt")]
        defmt::debug!("bme280 mode {} -> {}", self.config.mode, mode);

        let config = Config {
            mode,
            ..self.config
        };
        self.commit_ctrl_meas(config)
    }

    /// Sets the standby time between conversions in normal mode (`config`).
    pub fn set_standby(&mut self, standby: Standby) -> error::Result<(), E> {
        let config = Config {
            standby,
            ..self.config
        };
        self.commit_config(config)
    }

    /// Sets the IIR filter coefficient (`config`).
    pub fn set_filter(&mut self, filter: Filter) -> error::Result<(), E> {
        let config = Config {
            filter,
            ..self.config
        };
        self.commit_config(config)
    }

    /// Reads one sample and compensates it.
    ///
    /// In forced mode this first waits for the worst case conversion time, and
    /// afterwards records that the chip is back in sleep mode. No register write
    /// is issued for that: the chip returns to sleep on its own.
    pub fn read_data(&mut self, delay: &mut impl DelayNs) -> error::Result<Measurement, E> {
        let raw_data = self.read_raw_data(delay)?;
        Ok(self.calib_data.compensate(&raw_data))
    }

    /// Same timing and mode handling as [`Bme280::read_data`], without compensation.
    pub fn read_raw_data(&mut self, delay: &mut impl DelayNs) -> error::Result<RawData, E> {
        let forced = self.config.mode == Mode::Forced;

        if forced {
            let wait_us = self.config.max_measurement_time_us();

            #[cfg(feature = "defmt")]
            defmt::trace!("bme280 forced conversion, waiting {=u32} us", wait_us);

            delay.delay_us(wait_us);
        }

        let mut buffer = [0u8; raw_data_mem::SIZE];
        self.read_into(raw_data_mem::ADDR, &mut buffer)?;

        if forced {
            self.config.mode = Mode::Sleep;
        }

        Ok(RawData::from_block(&buffer))
    }

    fn commit_ctrl_meas(&mut self, config: Config) -> error::Result<(), E> {
        self.write_reg(regs::ADDR_CTRL_MEAS, regs::ctrl_meas(&config))?;
        self.config = config;
        Ok(())
    }

    fn commit_config(&mut self, config: Config) -> error::Result<(), E> {
        self.write_reg(regs::ADDR_CONFIG, regs::config(&config))?;
        self.config = config;
        Ok(())
    }

    /// Writes all three control registers. `ctrl_hum` must precede `ctrl_meas`.
    fn write_all_regs(&mut self, config: &Config) -> error::Result<(), E> {
        self.write_reg(regs::ADDR_CTRL_HUM, regs::ctrl_hum(config))?;
        self.write_reg(regs::ADDR_CTRL_MEAS, regs::ctrl_meas(config))?;
        self.write_reg(regs::ADDR_CONFIG, regs::config(config))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use crate::calib::tests::{pack_nvm, reference_calib};
    use crate::error::Bme280Error;

    use alloc::vec;
    use alloc::vec::Vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction},
    };

    const ADDR: u8 = DEFAULT_ADDRESS;

    /// Sums every requested delay.
    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn calibration_reads(address: u8) -> Vec<Transaction> {
        let nvm = pack_nvm(&reference_calib());
        vec![
            Transaction::write_read(address, vec![0x88], nvm[..24].to_vec()),
            Transaction::write_read(address, vec![0xA1], nvm[24..25].to_vec()),
            Transaction::write_read(address, vec![0xE1], nvm[25..].to_vec()),
        ]
    }

    fn init_sequence(address: u8) -> Vec<Transaction> {
        let mut transactions = calibration_reads(address);
        transactions.extend([
            Transaction::write(address, vec![0xF2, 0b001]),
            Transaction::write(address, vec![0xF4, 0b001_001_00]),
            Transaction::write(address, vec![0xF5, 0b101_000_00]),
        ]);
        transactions
    }

    /// Data block encoding pressure 415148, temperature 519888, humidity 23344.
    fn reference_block() -> Vec<u8> {
        vec![0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x5B, 0x30]
    }

    fn ready_driver(mut rest: Vec<Transaction>) -> (Bme280<I2cMock, Ready>, I2cMock) {
        let mut expectations = init_sequence(ADDR);
        expectations.append(&mut rest);
        let i2c = I2cMock::new(&expectations);
        let bme280 = Bme280::new(i2c.clone(), ADDR).init().unwrap();
        (bme280, i2c)
    }

    #[test]
    fn init_reads_calibration_then_writes_control_registers() {
        let (bme280, mut i2c) = ready_driver(vec![]);
        assert_eq!(*bme280.calib_data(), reference_calib());
        assert_eq!(*bme280.config(), Config::default());
        i2c.done();
    }

    #[test]
    fn address_is_not_hardcoded() {
        let mut i2c = I2cMock::new(&init_sequence(ALTERNATE_ADDRESS));
        let bme280 = Bme280::new(i2c.clone(), ALTERNATE_ADDRESS).init().unwrap();
        drop(bme280.release());
        i2c.done();
    }

    #[test]
    fn init_with_config_writes_supplied_configuration() {
        let mut expectations = calibration_reads(ADDR);
        expectations.extend([
            Transaction::write(ADDR, vec![0xF2, 0b101]),
            Transaction::write(ADDR, vec![0xF4, 0b011_010_11]),
            Transaction::write(ADDR, vec![0xF5, 0b000_001_00]),
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let config = Bme280Builder::new()
            .hum_oversampling(Oversampling::X16)
            .temp_oversampling(Oversampling::X4)
            .pres_oversampling(Oversampling::X2)
            .mode(Mode::Normal)
            .standby(Standby::Ms0_5)
            .filter(Filter::X2)
            .build();
        let bme280 = Bme280::new(i2c.clone(), ADDR)
            .init_with_config(config)
            .unwrap();
        assert_eq!(*bme280.config(), config);
        i2c.done();
    }

    #[test]
    fn failed_calibration_read_aborts_init() {
        let nvm = pack_nvm(&reference_calib());
        let expectations = [
            Transaction::write_read(ADDR, vec![0x88], nvm[..24].to_vec()),
            Transaction::write_read(ADDR, vec![0xA1], vec![0]).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let err = Bme280::new(i2c.clone(), ADDR).init().err();
        assert_eq!(err, Some(Bme280Error::I2CError(ErrorKind::Other)));
        i2c.done();
    }

    #[test]
    fn humidity_oversampling_rewrites_ctrl_hum_and_ctrl_meas() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF2, 0b101]),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_00]),
        ]);
        bme280.set_humidity_oversampling(Oversampling::X16).unwrap();
        assert_eq!(bme280.humidity_oversampling(), Oversampling::X16);
        i2c.done();
    }

    #[test]
    fn single_register_setters() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF4, 0b101_001_00]),
            Transaction::write(ADDR, vec![0xF4, 0b101_101_00]),
            Transaction::write(ADDR, vec![0xF5, 0b111_000_00]),
            Transaction::write(ADDR, vec![0xF5, 0b111_100_00]),
            Transaction::write(ADDR, vec![0xF4, 0b101_101_11]),
        ]);
        bme280.set_temperature_oversampling(Oversampling::X16).unwrap();
        bme280.set_pressure_oversampling(Oversampling::X16).unwrap();
        bme280.set_standby(Standby::Ms20).unwrap();
        bme280.set_filter(Filter::X16).unwrap();
        bme280.set_mode(Mode::Normal).unwrap();

        assert_eq!(bme280.temperature_oversampling(), Oversampling::X16);
        assert_eq!(bme280.pressure_oversampling(), Oversampling::X16);
        assert_eq!(bme280.standby(), Standby::Ms20);
        assert_eq!(bme280.filter(), Filter::X16);
        assert_eq!(bme280.mode(), Mode::Normal);
        i2c.done();
    }

    #[test]
    fn failed_write_keeps_previous_configuration() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF5, 0b101_100_00]).with_error(ErrorKind::Other),
            Transaction::write(ADDR, vec![0xF2, 0b011]),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_00]).with_error(ErrorKind::Other),
        ]);
        let err = bme280.set_filter(Filter::X16).unwrap_err();
        assert_eq!(err, Bme280Error::I2CError(ErrorKind::Other));
        assert_eq!(bme280.filter(), Filter::Off);

        let err = bme280.set_humidity_oversampling(Oversampling::X4).unwrap_err();
        assert_eq!(err, Bme280Error::I2CError(ErrorKind::Other));
        // ctrl_hum already holds the new code.
        assert_eq!(bme280.humidity_oversampling(), Oversampling::X4);
        i2c.done();
    }

    #[test]
    fn failed_ctrl_hum_write_keeps_previous_humidity_oversampling() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF2, 0b011]).with_error(ErrorKind::Other),
        ]);
        let err = bme280.set_humidity_oversampling(Oversampling::X4).unwrap_err();
        assert_eq!(err, Bme280Error::I2CError(ErrorKind::Other));
        assert_eq!(bme280.humidity_oversampling(), Oversampling::X1);
        i2c.done();
    }

    /// A humidity change whose `ctrl_meas` commit failed takes effect on the next
    /// `ctrl_meas` write, so the forced wait must already account for it.
    #[test]
    fn pending_humidity_change_is_used_for_forced_wait() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF2, 0b011]),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_00]).with_error(ErrorKind::Other),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_01]),
            Transaction::write_read(ADDR, vec![0xF7], reference_block()),
        ]);
        assert!(bme280.set_humidity_oversampling(Oversampling::X4).is_err());
        bme280.set_mode(Mode::Forced).unwrap();

        let mut delay = RecordingDelay::default();
        bme280.read_raw_data(&mut delay).unwrap();

        assert_eq!(bme280.humidity_oversampling(), Oversampling::X4);
        // 1.25 + 2.3 + 2.875 + (2.3 * 3 + 0.575) ms
        assert_eq!(delay.total_ns, 13_900_000);
        i2c.done();
    }

    #[test]
    fn invalid_code_is_rejected_before_any_write() {
        let (mut bme280, mut i2c) = ready_driver(vec![]);

        let mut set_raw = |code: u8| -> error::Result<(), ErrorKind> {
            let os = Oversampling::try_from(code)?;
            bme280.set_pressure_oversampling(os)
        };
        assert_eq!(set_raw(6), Err(Bme280Error::InvalidConfigValue(6)));
        assert_eq!(bme280.pressure_oversampling(), Oversampling::X1);
        i2c.done();
    }

    /// The chip drops back to sleep by itself after a forced conversion; the driver
    /// mirrors that without reading the status register or writing `ctrl_meas`.
    #[test]
    fn forced_read_waits_then_reverts_to_sleep_without_bus_write() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF4, 0b001_001_01]),
            Transaction::write_read(ADDR, vec![0xF7], reference_block()),
        ]);
        bme280.set_mode(Mode::Forced).unwrap();
        assert_eq!(bme280.mode(), Mode::Forced);

        let mut delay = RecordingDelay::default();
        let data = bme280.read_data(&mut delay).unwrap();

        assert_eq!(delay.total_ns, 9_300_000);
        assert_eq!(bme280.mode(), Mode::Sleep);
        assert!((data.temperature.0 - 25.08).abs() < 0.01);
        assert!((data.pressure.0 - 100653.3).abs() < 1.0);
        assert!((data.humidity.0 - 0.3434).abs() < 1e-4);
        i2c.done();
    }

    #[test]
    fn normal_mode_read_has_no_delay_and_keeps_mode() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF4, 0b001_001_11]),
            Transaction::write_read(ADDR, vec![0xF7], reference_block()),
            Transaction::write_read(ADDR, vec![0xF7], reference_block()),
        ]);
        bme280.set_mode(Mode::Normal).unwrap();

        let mut delay = RecordingDelay::default();
        let first = bme280.read_data(&mut delay).unwrap();
        let second = bme280.read_data(&mut delay).unwrap();

        assert_eq!(delay.total_ns, 0);
        assert_eq!(bme280.mode(), Mode::Normal);
        assert_eq!(first, second);
        i2c.done();
    }

    #[test]
    fn raw_data_decodes_msb_first_block() {
        let (mut bme280, mut i2c) =
            ready_driver(vec![Transaction::write_read(ADDR, vec![0xF7], reference_block())]);
        let raw = bme280.read_raw_data(&mut NoopDelay::new()).unwrap();
        assert_eq!(
            raw,
            RawData {
                press_adc: 415148,
                temp_adc: 519888,
                hum_adc: 23344,
            }
        );
        i2c.done();
    }

    #[test]
    fn status_flags_read_register_f3() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write_read(ADDR, vec![0xF3], vec![0x08]),
            Transaction::write_read(ADDR, vec![0xF3], vec![0x00]),
            Transaction::write_read(ADDR, vec![0xF3], vec![0x01]),
            Transaction::write_read(ADDR, vec![0xF3], vec![0x00]),
        ]);
        assert!(bme280.is_measuring().unwrap());
        assert!(!bme280.is_measuring().unwrap());
        assert!(bme280.is_updating().unwrap());
        assert!(!bme280.is_updating().unwrap());
        i2c.done();
    }

    #[test]
    fn chip_id() {
        let (mut bme280, mut i2c) =
            ready_driver(vec![Transaction::write_read(ADDR, vec![0xD0], vec![CHIP_ID])]);
        assert_eq!(bme280.read_chip_id().unwrap(), CHIP_ID);
        i2c.done();
    }

    #[test]
    fn reset_restores_configuration() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF5, 0b101_011_00]),
            Transaction::write(ADDR, vec![0xE0, 0xB6]),
            Transaction::write(ADDR, vec![0xF2, 0b001]),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_00]),
            Transaction::write(ADDR, vec![0xF5, 0b101_011_00]),
        ]);
        bme280.set_filter(Filter::X8).unwrap();

        let mut delay = RecordingDelay::default();
        bme280.reset(&mut delay).unwrap();

        assert_eq!(delay.total_ns, 2_000_000);
        assert_eq!(bme280.filter(), Filter::X8);
        i2c.done();
    }

    #[test]
    fn reset_in_forced_mode_writes_back_sleep() {
        let (mut bme280, mut i2c) = ready_driver(vec![
            Transaction::write(ADDR, vec![0xF4, 0b001_001_01]),
            Transaction::write(ADDR, vec![0xE0, 0xB6]),
            Transaction::write(ADDR, vec![0xF2, 0b001]),
            Transaction::write(ADDR, vec![0xF4, 0b001_001_00]),
            Transaction::write(ADDR, vec![0xF5, 0b101_000_00]),
        ]);
        bme280.set_mode(Mode::Forced).unwrap();
        bme280.reset(&mut NoopDelay::new()).unwrap();

        assert_eq!(bme280.mode(), Mode::Sleep);
        i2c.done();
    }
}
