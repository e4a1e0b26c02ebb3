//! Optional local character display.
//!
//! A 16x2 I2C LCD lets a field unit show its latest sample without a
//! laptop. The device sits behind [`TelemetryDisplay`] so the collector
//! loop and its tests run without hardware; the real driver is feature-gated
//! on `hardware` alongside the power sensor.

use crate::error::Result;
use crate::sampling::data::Sample;

/// Two-line character display for the latest sample.
pub trait TelemetryDisplay {
    /// Render the sample. Failures are contained to the current cycle.
    fn render(&mut self, sample: &Sample) -> Result<()>;

    /// Blank the display, used on shutdown.
    fn clear(&mut self) -> Result<()>;
}

/// Format the two display lines for a sample.
///
/// Line one carries the electrical reading, line two the host telemetry.
pub fn format_lines(sample: &Sample) -> (String, String) {
    (
        format!("{:.3} V {:.3} mW", sample.voltage, sample.power),
        format!(
            "{:.1} C   {:>2} dBm",
            sample.temperature, sample.signal_strength
        ),
    )
}

#[cfg(feature = "hardware")]
mod lcd {
    use super::*;
    use crate::error::CollectorError;
    use rppal::i2c::I2c;
    use std::thread;
    use std::time::Duration;

    /// I2C address of the PCF8574 backpack on the LCD.
    const LCD_ADDRESS: u16 = 0x3F;

    /// I2C bus the display is attached to.
    const I2C_BUS: u8 = 1;

    // HD44780 protocol, 4-bit mode through the PCF8574 expander
    const CMD_CLEAR: u8 = 0x01;
    const LINE_1: u8 = 0x80;
    const LINE_2: u8 = 0xC0;
    const ENABLE: u8 = 0b0000_0100;
    const REGISTER_SELECT: u8 = 0b0000_0001;

    /// Backlight bit stays unset; the panel shares the battery pack with
    /// the Pi and the backlight is the biggest draw on it.
    const BACKLIGHT: u8 = 0x00;

    const COLUMNS: usize = 16;

    /// HD44780 16x2 LCD behind a PCF8574 I2C backpack.
    pub struct I2cLcd {
        i2c: I2c,
    }

    impl I2cLcd {
        pub fn new() -> Result<Self> {
            let mut i2c = I2c::with_bus(I2C_BUS)
                .map_err(|e| CollectorError::display_error(format!("open I2C bus: {}", e)))?;
            i2c.set_slave_address(LCD_ADDRESS)
                .map_err(|e| CollectorError::display_error(format!("set address: {}", e)))?;

            let mut display = Self { i2c };
            display.init()?;
            Ok(display)
        }

        /// Standard 4-bit initialization sequence.
        fn init(&mut self) -> Result<()> {
            for command in [0x33, 0x32, 0x28, 0x0C, 0x06, CMD_CLEAR] {
                self.command(command)?;
            }
            thread::sleep(Duration::from_millis(5));
            Ok(())
        }

        fn command(&mut self, byte: u8) -> Result<()> {
            self.write_byte(byte, 0)
        }

        fn write_char(&mut self, byte: u8) -> Result<()> {
            self.write_byte(byte, REGISTER_SELECT)
        }

        fn write_byte(&mut self, byte: u8, mode: u8) -> Result<()> {
            self.write_nibble(mode | (byte & 0xF0))?;
            self.write_nibble(mode | ((byte << 4) & 0xF0))
        }

        /// Latch four data bits by strobing the enable line.
        fn write_nibble(&mut self, data: u8) -> Result<()> {
            let data = data | BACKLIGHT;
            self.raw_write(data)?;
            self.raw_write(data | ENABLE)?;
            thread::sleep(Duration::from_micros(500));
            self.raw_write(data & !ENABLE)?;
            thread::sleep(Duration::from_micros(100));
            Ok(())
        }

        fn raw_write(&mut self, data: u8) -> Result<()> {
            self.i2c
                .write(&[data])
                .map(|_| ())
                .map_err(|e| CollectorError::display_error(format!("I2C write: {}", e)))
        }

        fn write_line(&mut self, text: &str, line: u8) -> Result<()> {
            self.command(line)?;
            for byte in text.bytes().take(COLUMNS) {
                self.write_char(byte)?;
            }
            Ok(())
        }
    }

    impl TelemetryDisplay for I2cLcd {
        fn render(&mut self, sample: &Sample) -> Result<()> {
            let (top, bottom) = format_lines(sample);
            self.command(CMD_CLEAR)?;
            thread::sleep(Duration::from_millis(2));
            self.write_line(&top, LINE_1)?;
            self.write_line(&bottom, LINE_2)
        }

        fn clear(&mut self) -> Result<()> {
            self.command(CMD_CLEAR)?;
            thread::sleep(Duration::from_millis(2));
            Ok(())
        }
    }
}

#[cfg(feature = "hardware")]
pub use lcd::I2cLcd;
