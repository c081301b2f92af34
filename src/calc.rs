use crate::{CalibData, Humidity, Measurement, Pressure, RawData, Temperature};

/// Floating-point compensation formulas from the Bosch BME280 datasheet (section 4.2.3).
///
/// The operations and their order follow the reference code exactly so results stay
/// bit-identical to it.
impl CalibData {
    /// Computes `t_fine`, the fine temperature shared by all three formulas.
    pub fn t_fine(&self, adc_t: u32) -> f64 {
        let adc_t = adc_t as f64;
        let t1 = self.dig_t1 as f64;
        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * self.dig_t2 as f64;
        let var2 = (adc_t / 131072.0 - t1 / 8192.0)
            * (adc_t / 131072.0 - t1 / 8192.0)
            * self.dig_t3 as f64;
        var1 + var2
    }

    /// Temperature in °C.
    pub fn temperature(t_fine: f64) -> f64 {
        t_fine / 5120.0
    }

    /// Pressure in Pa.
    ///
    /// Returns `0.0` when `dig_p1` scaling drives the divisor to zero.
    pub fn pressure(&self, t_fine: f64, adc_p: u32) -> f64 {
        let mut var1 = (t_fine / 2.0) - 64000.0;
        let mut var2 = var1 * var1 * self.dig_p6 as f64 / 32768.0;
        var2 += var1 * self.dig_p5 as f64 * 2.0;
        var2 = (var2 / 4.0) + (self.dig_p4 as f64 * 65536.0);
        var1 = (self.dig_p3 as f64 * var1 * var1 / 524288.0 + self.dig_p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.dig_p1 as f64;

        if var1 == 0.0 {
            return 0.0;
        }

        let mut p = 1048576.0 - adc_p as f64;
        p = (p - (var2 / 4096.0)) * 6250.0 / var1;
        let var1 = self.dig_p9 as f64 * p * p / 2147483648.0;
        let var2 = p * self.dig_p8 as f64 / 32768.0;
        p + (var1 + var2 + self.dig_p7 as f64) / 16.0
    }

    /// Relative humidity in %, clamped to `0.0..=100.0`.
    pub fn humidity(&self, t_fine: f64, adc_h: u16) -> f64 {
        let mut var_h = t_fine - 76800.0;
        var_h = (adc_h as f64 - (self.dig_h4 as f64 * 64.0 + self.dig_h5 as f64 / 16384.0 * var_h))
            * (self.dig_h2 as f64 / 65536.0
                * (1.0
                    + self.dig_h6 as f64 / 67108864.0
                        * var_h
                        * (1.0 + self.dig_h3 as f64 / 67108864.0 * var_h)));
        var_h *= 1.0 - self.dig_h1 as f64 * var_h / 524288.0;

        if var_h > 100.0 {
            100.0
        } else if var_h < 0.0 {
            0.0
        } else {
            var_h
        }
    }

    /// Runs all three formulas over one raw sample.
    pub fn compensate(&self, raw: &RawData) -> Measurement {
        let t_fine = self.t_fine(raw.temp_adc);

        Measurement {
            temperature: Temperature(Self::temperature(t_fine)),
            pressure: Pressure(self.pressure(t_fine, raw.press_adc)),
            humidity: Humidity(self.humidity(t_fine, raw.hum_adc)),
        }
    }
}
