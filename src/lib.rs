//! Driver for TDK InvenSense ICP-10111 barometric pressure sensor

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

use core::fmt;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Read, Write};

/// Address of the ICP-10111, which has no address select pin.
pub const DEFAULT_ADDRESS: u8 = 0x63;

pub struct ICP10111<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D, E> ICP10111<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E>,
    D: DelayMs<u8>,
{
    /// Creates a new driver
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Creates a new driver talking to a peripheral at `address`
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        ICP10111 { i2c, delay, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Send an I2C command
    fn command(&mut self, command: Command) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &command.value())
            .map_err(Error::Command)
    }

    /// Issue `command`, wait for the conversion, then fill `buf`
    fn convert(&mut self, command: Command, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.command(command)?;
        self.delay.delay_ms(command.conversion_time_ms());
        self.i2c.read(self.address, buf).map_err(Error::Read)
    }

    /// Take a pressure measurement in hPa
    pub fn measure_pressure(&mut self) -> Result<f32, Error<E>> {
        let raw = self.measure_pressure_raw()?;
        Ok(decode_pressure(raw))
    }

    /// Take a pressure measurement, returning the three significant bytes
    pub fn measure_pressure_raw(&mut self) -> Result<[u8; 3], Error<E>> {
        let mut buf = [0; 9];
        self.convert(Command::MeasurePressure, &mut buf)?;
        debug!("pressure raw: {:02x?}", buf);
        Ok([buf[0], buf[1], buf[2]])
    }

    /// Take a temperature measurement in °C
    pub fn measure_temperature(&mut self) -> Result<f32, Error<E>> {
        let raw = self.measure_temperature_raw()?;
        Ok(decode_temperature(raw))
    }

    /// Take a temperature measurement, returning the two significant bytes
    pub fn measure_temperature_raw(&mut self) -> Result<[u8; 2], Error<E>> {
        let mut buf = [0; 6];
        self.convert(Command::MeasureTemperature, &mut buf)?;
        debug!("temperature raw: {:02x?}", buf);
        Ok([buf[0], buf[1]])
    }

    /// Take a pressure and temperature measurement
    pub fn measure(&mut self) -> Result<Measurement, Error<E>> {
        let pressure = self.measure_pressure()?;
        let temperature = self.measure_temperature()?;
        Ok(Measurement {
            pressure,
            temperature,
        })
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D, E> ICP10111<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E>,
    D: DelayMs<u8>,
    E: fmt::Debug,
{
    /// Take one polling sample, keeping whichever readings succeeded.
    ///
    /// Temperature is only measured once pressure has been read. Failures
    /// are logged and reported as `None`, so a caller can keep polling.
    pub fn sample(&mut self) -> (Option<f32>, Option<f32>) {
        let pressure = match self.measure_pressure() {
            Ok(p) => p,
            Err(e) => {
                warn!("pressure: {}", e);
                return (None, None);
            }
        };
        match self.measure_temperature() {
            Ok(t) => (Some(pressure), Some(t)),
            Err(e) => {
                warn!("temperature: {}", e);
                (Some(pressure), None)
            }
        }
    }
}

/// Convert a raw pressure sample to hPa
pub fn decode_pressure(raw: [u8; 3]) -> f32 {
    BigEndian::read_u24(&raw) as f32 / 100.0
}

/// Convert a raw temperature sample to °C
pub fn decode_temperature(raw: [u8; 2]) -> f32 {
    BigEndian::read_u16(&raw) as f32 / 100.0 - 40.0
}

/// Errors
#[derive(Debug)]
pub enum Error<E> {
    /// Writing the measurement command failed
    Command(E),
    /// Reading the measurement result failed
    Read(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Command(e) => write!(f, "sending measurement command: {:?}", e),
            Error::Read(e) => write!(f, "reading measurement data: {:?}", e),
        }
    }
}

#[derive(Copy, Clone)]
enum Command {
    MeasurePressure,
    MeasureTemperature,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// hPa
    pub pressure: f32,
    /// °C
    pub temperature: f32,
}

impl Command {
    fn value(&self) -> [u8; 3] {
        match *self {
            Command::MeasurePressure => [0x48, 0xA3, 0x00],
            Command::MeasureTemperature => [0x60, 0x9C, 0x00],
        }
    }

    fn conversion_time_ms(&self) -> u8 {
        match *self {
            Command::MeasurePressure => 100,
            Command::MeasureTemperature => 50,
        }
    }
}
