//! Communicate with Heliotherm heat pumps via their serial RS-232 interface.
//!
//! # Overview
//!
//! The `htheatpump` crate implements the proprietary protocol spoken by the
//! controller of Heliotherm heat pumps. It offers an asynchronous,
//! platform-agnostic API for reading and writing device parameters,
//! querying the fault list and editing the weekly time programs.
//!
//! Depending on your needs, you can:
//!
//! - Use the high-level [`HeatPump`] client to access named parameters.
//! - Inspect or extend the parameter catalog using [`params::Registry`].
//! - Work directly with the wire format using the [`frame`] module.
//!
//! # Getting started
//!
//! The controller exposes an RS-232 port (or a USB-RS-232 adapter on newer
//! models) that has to be configured as follows:
//!
//! - **Baud rate:** 115200 (older models use 19200)
//! - **Parity:** None
//! - **Data bits:** 8
//! - **Stop bits:** 1
//! - **Flow control:** XON/XOFF
//!
//! If you enable the `native-serial` feature, you can obtain a compatible
//! serial port instance using `serial::open`.
//!
//! # Examples
//!
//! Every operation requires a successful login first:
//!
//! ```no_run
//! use htheatpump::{Connection, HeatPump, embedded_io_async::{Read, Write}};
//!
//! async fn example<P: Read + Write + Connection>(port: P) -> htheatpump::Result<(), P::Error> {
//!     let mut hp = HeatPump::new(port);
//!
//!     hp.login(htheatpump::DEFAULT_LOGIN_RETRIES).await?;
//!
//!     println!("Serial number: {}", hp.get_serial_number().await?);
//!     println!("Outdoor temperature: {}", hp.get_param("Temp. Aussen").await?);
//!
//!     hp.logout().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! Measured values can be read in bulk with a single request:
//!
//! ```no_run
//! use htheatpump::{HeatPump, embedded_io_async::{Read, Write}};
//!
//! async fn example<P: Read + Write>(hp: &mut HeatPump<P>) -> htheatpump::Result<(), P::Error> {
//!     let values = hp.fast_query(&["Temp. Vorlauf", "Temp. Ruecklauf"]).await?;
//!
//!     for (name, val) in values {
//!         println!("{name}: {val}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Protocol details
//!
//! Requests and responses are ASCII commands wrapped into a binary frame
//! consisting of a 6-byte header, a length byte and a trailing checksum
//! (see [`frame`]). The controller is not consistent in how it computes
//! length and checksum of its responses, so the response header selects
//! the rules used to validate a frame.
//!
//! The controller answers every request with exactly one response,
//! except for bulk requests, which produce one response per requested item.
//! Only one exchange may be in flight at any time, which is enforced by
//! requiring `&mut self` for all client operations.

#![no_std]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod datetime;
pub mod frame;
mod heatpump;
pub mod params;
pub mod timeprog;

mod catalog;
mod response;

#[cfg(test)]
mod mock;

#[cfg(feature = "native-serial")]
#[cfg_attr(docsrs, doc(cfg(feature = "native-serial")))]
pub mod serial;

pub use embedded_io_async;
pub use heatpump::{DEFAULT_LOGIN_RETRIES, FaultEntry, HeatPump, VerifyAction};

use crate::params::Value;
use alloc::{boxed::Box, string::String};
use core::fmt::{Display, Formatter};
use embedded_io_async::{ErrorType, ReadExactError};

/// A specialized [`Result`] type for [`HeatPump`] operations.
///
/// Uses [`Error<E>`] as the error variant, which can include port-specific errors.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error type for [`HeatPump`] operations.
///
/// The generic parameter `E` allows the error type to carry a port-specific error.
///
/// This enum is marked `#[non_exhaustive]` to allow for future variants.
#[non_exhaustive]
#[derive(PartialEq, Debug)]
pub enum Error<E> {
    /// A request or frame has an invalid length.
    InvalidLength(frame::LengthError),
    /// The port returned fewer bytes than expected, e.g. due to a timeout.
    StreamBroken,
    /// The device responded with an unknown frame header.
    UnknownHeader([u8; frame::RESPONSE_HEADER_LEN]),
    /// A response frame has an incorrect checksum.
    IncorrectChecksum {
        /// Checksum computed from the received frame.
        expected: u8,
        /// Checksum contained in the received frame.
        actual: u8,
    },
    /// The payload of a response frame is malformed.
    InvalidPayload,
    /// The device returned a response that doesn't match the request.
    InvalidResponse(String),
    /// The device returned a data point that wasn't requested.
    UnexpectedDataPoint(u16),
    /// The device returned a fault list entry with an unexpected index.
    UnexpectedIndex {
        /// Requested index.
        expected: u32,
        /// Index returned by the device.
        actual: u32,
    },
    /// All login attempts failed.
    LoginFailed(usize),
    /// The parameter is not part of the registry.
    UnknownParameter(String),
    /// The parameter has the wrong data point type for the requested operation.
    InvalidParameterType(String),
    /// The value lies outside of the parameter's limits.
    OutOfRange {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: Value,
    },
    /// A value couldn't be converted.
    InvalidValue(params::ValueError),
    /// A time program operation failed.
    TimeProgram(timeprog::Error),
    /// The device response failed verification against the registry.
    Verification(String),
    /// A port-specific input/output error.
    Io(E),
}

impl<E: core::error::Error> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidLength(err) => write!(f, "{err}"),
            Self::StreamBroken => write!(f, "data stream broken"),
            Self::UnknownHeader(header) => write!(f, "unknown response header: {header:02x?}"),
            Self::IncorrectChecksum { expected, actual } => write!(
                f,
                "incorrect checksum: {actual:#04x} (expected {expected:#04x})"
            ),
            Self::InvalidPayload => write!(f, "invalid payload"),
            Self::InvalidResponse(resp) => write!(f, "invalid response: {resp:?}"),
            Self::UnexpectedDataPoint(nr) => write!(f, "unexpected data point: {nr}"),
            Self::UnexpectedIndex { expected, actual } => {
                write!(f, "unexpected index: {actual} (expected {expected})")
            }
            Self::LoginFailed(tries) => write!(f, "login failed after {tries} tries"),
            Self::UnknownParameter(name) => write!(f, "unknown parameter: {name:?}"),
            Self::InvalidParameterType(name) => {
                write!(f, "invalid parameter type: {name:?}")
            }
            Self::OutOfRange { name, value } => {
                write!(f, "value {value} of parameter {name:?} out of range")
            }
            Self::InvalidValue(err) => write!(f, "invalid value: {err}"),
            Self::TimeProgram(err) => write!(f, "time program error: {err}"),
            Self::Verification(msg) => write!(f, "verification failed: {msg}"),
            Self::Io(err) => write!(f, "input/output error: {err}"),
        }
    }
}

impl<E: core::error::Error> core::error::Error for Error<E> {}

impl<E> From<ReadExactError<E>> for Error<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => Self::StreamBroken,
            ReadExactError::Other(err) => Self::Io(err),
        }
    }
}

impl<E> From<frame::LengthError> for Error<E> {
    fn from(err: frame::LengthError) -> Self {
        Self::InvalidLength(err)
    }
}

impl<E> From<params::ValueError> for Error<E> {
    fn from(err: params::ValueError) -> Self {
        Self::InvalidValue(err)
    }
}

impl<E> From<timeprog::Error> for Error<E> {
    fn from(err: timeprog::Error) -> Self {
        Self::TimeProgram(err)
    }
}

/// A port that is able to re-establish its connection.
///
/// Used by [`HeatPump::login`] to recover from a confused device
/// before retrying.
#[async_trait::async_trait(?Send)]
pub trait Connection: ErrorType {
    /// Discards pending data, closes the connection and opens it again.
    async fn reconnect(&mut self) -> core::result::Result<(), Self::Error>;
}

#[async_trait::async_trait(?Send)]
impl<T: Connection + ?Sized> Connection for &mut T {
    async fn reconnect(&mut self) -> core::result::Result<(), Self::Error> {
        (**self).reconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use core::convert::Infallible;
    use log::LevelFilter;

    pub fn init_logger() {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::max())
            .is_test(true)
            .try_init();
    }

    #[test]
    fn error_display() {
        let err: Error<Infallible> = Error::IncorrectChecksum {
            expected: 0x91,
            actual: 0x00,
        };

        assert_eq!(
            err.to_string(),
            "incorrect checksum: 0x00 (expected 0x91)",
            "message should contain both checksums"
        );
        assert_eq!(
            Error::<Infallible>::LoginFailed(3).to_string(),
            "login failed after 3 tries"
        );
    }

    #[test]
    fn error_conversion() {
        let err: Error<Infallible> = ReadExactError::UnexpectedEof.into();

        assert_eq!(err, Error::StreamBroken, "eof should be a broken stream");

        let err: Error<Infallible> = frame::LengthError { len: 0, limit: 1 }.into();

        assert!(
            matches!(err, Error::InvalidLength(_)),
            "length error should be converted"
        );
    }
}
