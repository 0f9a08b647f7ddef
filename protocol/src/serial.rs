//! Native asynchronous serial port support for [`HeatPump`](crate::HeatPump).
//!
//! Uses the [`serial2-tokio`](https://crates.io/crates/serial2-tokio) crate.

extern crate std;

use crate::{Connection, Error};
use alloc::{boxed::Box, string::String};
use core::time::Duration;
use embedded_io_adapters::tokio_1::FromTokio;
use embedded_io_async::{ErrorType, Read, Write};
use log::{debug, info};
use serial2_tokio::{CharSize, FlowControl, Parity, SerialPort, Settings, StopBits};
use std::io;

/// Default baud rate of the heat pump's serial interface.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between closing and reopening the port on reconnect.
const REOPEN_DELAY: Duration = Duration::from_millis(100);

/// Port-specific error type to be used as `E` for the generic [`Error<E>`] type.
pub type PortError = io::Error;

/// Configuration of a serial port.
///
/// Defaults to 115200 baud, 8 data bits, no parity, one stop bit
/// and software flow control.
#[derive(Clone, Debug)]
pub struct PortConfig {
    /// Path of the serial device, e.g. `/dev/ttyUSB0`.
    pub path: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Parity.
    pub parity: Parity,
    /// Flow control.
    pub flow_control: FlowControl,
    /// Timeout for reading a chunk of data.
    pub timeout: Duration,
}

impl PortConfig {
    /// Constructs the default configuration for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            flow_control: FlowControl::XonXoff,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Serial port implementing [`Read`], [`Write`] and [`Connection`].
///
/// Reads that don't complete within the configured timeout return no data,
/// which surfaces as [`Error::StreamBroken`].
pub struct Port {
    port: Option<FromTokio<SerialPort>>,
    config: PortConfig,
}

impl Port {
    /// Returns the configuration of the port.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    fn inner(&mut self) -> Result<&mut FromTokio<SerialPort>, io::Error> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))
    }
}

/// Opens a native serial port at the given path using the default configuration.
///
/// Returns a [`Port`] that can be passed to [`HeatPump::new`](crate::HeatPump::new).
pub fn open(path: &str) -> Result<Port, Error<PortError>> {
    open_with(PortConfig::new(path))
}

/// Opens a native serial port using the given configuration.
pub fn open_with(config: PortConfig) -> Result<Port, Error<PortError>> {
    let port = open_port(&config).map_err(Error::Io)?;

    debug!("Opened serial port {:?}", config.path);

    Ok(Port {
        port: Some(port),
        config,
    })
}

fn open_port(config: &PortConfig) -> io::Result<FromTokio<SerialPort>> {
    let port = SerialPort::open(&config.path, |mut settings: Settings| {
        settings.set_raw();
        settings.set_baud_rate(config.baud_rate)?;
        settings.set_char_size(CharSize::Bits8);
        settings.set_stop_bits(StopBits::One);
        settings.set_parity(config.parity);
        settings.set_flow_control(config.flow_control);

        Ok(settings)
    })?;

    port.discard_buffers()?;

    Ok(FromTokio::new(port))
}

impl ErrorType for Port {
    type Error = PortError;
}

impl Read for Port {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let timeout = self.config.timeout;

        match tokio::time::timeout(timeout, self.inner()?.read(buf)).await {
            Ok(res) => res,
            Err(_) => {
                debug!("Read timed out after {timeout:?}");

                Ok(0)
            }
        }
    }
}

impl Write for Port {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.inner()?.write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner()?.flush().await
    }
}

#[async_trait::async_trait(?Send)]
impl Connection for Port {
    async fn reconnect(&mut self) -> Result<(), Self::Error> {
        if let Some(port) = self.port.take() {
            // Drop stale data before closing
            port.into_inner().discard_buffers()?;
        }

        tokio::time::sleep(REOPEN_DELAY).await;

        self.port = Some(open_port(&self.config)?);
        info!("Reconnected serial port {:?}", self.config.path);

        Ok(())
    }
}
