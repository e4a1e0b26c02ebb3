//! INA219 power sensor access.
//!
//! The bus driver sits behind the [`SensorDriver`] trait so the collector
//! loop and its tests run without hardware. The real register-level driver
//! is feature-gated on `hardware`, the same way GPIO access is gated in
//! other Pi tooling, and a stub that reports the sensor as unavailable is
//! compiled in otherwise.

use thiserror::Error;
use tracing::debug;

use crate::sampling::data::Sample;
use crate::sampling::host::HostProbe;

/// Shunt resistor value in ohms, fixed by the measurement circuit.
pub const SHUNT_OHMS: f64 = 0.1;

/// I2C address of the INA219.
pub const INA219_ADDRESS: u16 = 0x40;

/// I2C bus the sensor is attached to.
pub const I2C_BUS: u8 = 1;

/// Raw electrical quantities read from the power sensor in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricalReading {
    /// Bus voltage in volts
    pub voltage: f64,
    /// Shunt voltage in millivolts
    pub shunt_voltage: f64,
    /// Bus current in milliamps
    pub current: f64,
    /// Power in milliwatts
    pub power: f64,
}

/// Errors produced while acquiring a sample from the power sensor.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The bus device could not be opened or configured.
    #[error("sensor configuration failed: {0}")]
    Config(String),

    /// Measured current or voltage exceeded the configured range. Expected
    /// under heavy load; the cycle is skipped, not aborted.
    #[error("current/voltage out of device range for the configured gain")]
    RangeExceeded,
}

impl AcquisitionError {
    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Bus-level driver for the power sensor.
pub trait SensorDriver {
    /// Open the bus and configure the device: 16 V range, +/-40 mV gain.
    ///
    /// Called once per acquisition cycle so a transient bus fault never
    /// requires a process restart to clear a stale handle.
    fn configure(&mut self) -> std::result::Result<(), AcquisitionError>;

    /// Read all electrical quantities.
    fn read(&mut self) -> std::result::Result<ElectricalReading, AcquisitionError>;
}

/// Acquires complete samples: electrical quantities from the sensor driver
/// plus best-effort host telemetry from the probe.
pub struct SensorReader<D, P> {
    driver: D,
    probe: P,
}

impl<D: SensorDriver, P: HostProbe> SensorReader<D, P> {
    pub fn new(driver: D, probe: P) -> Self {
        Self { driver, probe }
    }

    /// Configure the device and acquire one sample.
    ///
    /// Host-telemetry failures substitute sentinel values and never fail the
    /// acquisition; the extrema tracker is the caller's responsibility.
    pub fn acquire(&mut self) -> std::result::Result<Sample, AcquisitionError> {
        self.driver.configure()?;
        let reading = self.driver.read()?;

        let temperature = self.probe.read_temperature();
        let signal_strength = self.probe.read_signal_strength();
        debug!(
            "acquired {:.3} V, {:.3} mV shunt, {:.3} mA, {:.3} mW, {:.1} C, {} dBm",
            reading.voltage,
            reading.shunt_voltage,
            reading.current,
            reading.power,
            temperature,
            signal_strength
        );

        Ok(Sample {
            voltage: reading.voltage,
            shunt_voltage: reading.shunt_voltage,
            current: reading.current,
            power: reading.power,
            temperature,
            signal_strength,
        })
    }
}

#[cfg(feature = "hardware")]
mod ina219 {
    use super::*;
    use rppal::i2c::I2c;

    // INA219 register map
    const REG_CONFIG: u8 = 0x00;
    const REG_SHUNT_VOLTAGE: u8 = 0x01;
    const REG_BUS_VOLTAGE: u8 = 0x02;
    const REG_POWER: u8 = 0x03;
    const REG_CURRENT: u8 = 0x04;
    const REG_CALIBRATION: u8 = 0x05;

    /// 16 V bus range, +/-40 mV PGA gain, 12-bit conversions, continuous
    /// shunt-and-bus mode.
    const CONFIG_16V_40MV: u16 = 0x019F;

    /// Math-overflow flag in the bus voltage register.
    const OVERFLOW_FLAG: u16 = 0x0001;

    /// Largest current the +/-40 mV gain can represent across the shunt.
    const MAX_EXPECTED_AMPS: f64 = 0.04 / SHUNT_OHMS;

    /// Amps per current-register bit.
    const CURRENT_LSB: f64 = MAX_EXPECTED_AMPS / 32770.0;

    /// Bus voltage register LSB is 4 mV, after the 3-bit status shift.
    const BUS_VOLTAGE_LSB: f64 = 0.004;

    /// Shunt voltage register LSB is 10 uV.
    const SHUNT_VOLTAGE_LSB_MV: f64 = 0.01;

    /// Register-level INA219 driver over the Pi's I2C bus.
    ///
    /// The bus handle is opened fresh on every [`SensorDriver::configure`]
    /// call rather than held for the process lifetime.
    pub struct Ina219Driver {
        i2c: Option<I2c>,
    }

    impl Ina219Driver {
        pub fn new() -> Self {
            Self { i2c: None }
        }

        fn write_register(
            i2c: &mut I2c,
            register: u8,
            value: u16,
        ) -> std::result::Result<(), AcquisitionError> {
            let [hi, lo] = value.to_be_bytes();
            i2c.write(&[register, hi, lo])
                .map(|_| ())
                .map_err(|e| AcquisitionError::config_error(format!("register write: {}", e)))
        }

        fn read_register(&mut self, register: u8) -> std::result::Result<u16, AcquisitionError> {
            let i2c = self
                .i2c
                .as_mut()
                .ok_or_else(|| AcquisitionError::config_error("sensor not configured"))?;
            let mut buffer = [0u8; 2];
            i2c.write_read(&[register], &mut buffer)
                .map_err(|e| AcquisitionError::config_error(format!("register read: {}", e)))?;
            Ok(u16::from_be_bytes(buffer))
        }
    }

    impl Default for Ina219Driver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SensorDriver for Ina219Driver {
        fn configure(&mut self) -> std::result::Result<(), AcquisitionError> {
            let mut i2c = I2c::with_bus(I2C_BUS)
                .map_err(|e| AcquisitionError::config_error(format!("open I2C bus: {}", e)))?;
            i2c.set_slave_address(INA219_ADDRESS)
                .map_err(|e| AcquisitionError::config_error(format!("set address: {}", e)))?;

            Self::write_register(&mut i2c, REG_CONFIG, CONFIG_16V_40MV)?;
            let calibration = (0.04096 / (CURRENT_LSB * SHUNT_OHMS)) as u16;
            Self::write_register(&mut i2c, REG_CALIBRATION, calibration)?;

            self.i2c = Some(i2c);
            Ok(())
        }

        fn read(&mut self) -> std::result::Result<ElectricalReading, AcquisitionError> {
            let bus_raw = self.read_register(REG_BUS_VOLTAGE)?;
            if bus_raw & OVERFLOW_FLAG != 0 {
                return Err(AcquisitionError::RangeExceeded);
            }
            let voltage = f64::from(bus_raw >> 3) * BUS_VOLTAGE_LSB;

            let shunt_raw = self.read_register(REG_SHUNT_VOLTAGE)? as i16;
            let shunt_voltage = f64::from(shunt_raw) * SHUNT_VOLTAGE_LSB_MV;

            let current_raw = self.read_register(REG_CURRENT)? as i16;
            let current = f64::from(current_raw) * CURRENT_LSB * 1000.0;

            let power_raw = self.read_register(REG_POWER)?;
            let power = f64::from(power_raw) * CURRENT_LSB * 20.0 * 1000.0;

            Ok(ElectricalReading {
                voltage,
                shunt_voltage,
                current,
                power,
            })
        }
    }
}

#[cfg(not(feature = "hardware"))]
mod unavailable {
    use super::*;

    /// Stand-in driver for builds without I2C support.
    pub struct UnavailableSensor;

    impl UnavailableSensor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for UnavailableSensor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SensorDriver for UnavailableSensor {
        fn configure(&mut self) -> std::result::Result<(), AcquisitionError> {
            Err(AcquisitionError::config_error(
                "power sensor support not compiled in (enable the `hardware` feature)",
            ))
        }

        fn read(&mut self) -> std::result::Result<ElectricalReading, AcquisitionError> {
            Err(AcquisitionError::config_error(
                "power sensor support not compiled in (enable the `hardware` feature)",
            ))
        }
    }
}

// Re-export the appropriate sensor driver
#[cfg(feature = "hardware")]
pub use ina219::Ina219Driver as DefaultSensorDriver;

#[cfg(not(feature = "hardware"))]
pub use unavailable::UnavailableSensor as DefaultSensorDriver;
