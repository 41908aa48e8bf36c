use core::fmt;
use embedded_time::{clock, ConversionError};
use std::{io, net::SocketAddr};

/// An error that stops the controller from starting.
#[derive(Debug)]
pub enum Error {
    /// The command socket could not be bound.
    Bind { addr: SocketAddr, source: io::Error },
    /// The command socket could not be configured.
    Socket(io::Error),
    Clock(clock::Error),
    Time(ConversionError),
    InvalidConfig(&'static str),
    /// A builder was missing a required part.
    Incomplete(&'static str),
}

impl From<clock::Error> for Error {
    fn from(clock_error: clock::Error) -> Self {
        Error::Clock(clock_error)
    }
}

impl From<ConversionError> for Error {
    fn from(time_error: ConversionError) -> Self {
        Error::Time(time_error)
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Self {
        Error::Socket(io_error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bind { addr, source } => {
                write!(f, "failed to bind command socket to {addr}: {source}")
            }
            Error::Socket(source) => write!(f, "command socket error: {source}"),
            Error::Clock(err) => write!(f, "clock error: {err:?}"),
            Error::Time(err) => write!(f, "time conversion error: {err:?}"),
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
            Error::Incomplete(part) => write!(f, "copter is missing its {part}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bind { source, .. } | Error::Socket(source) => Some(source),
            _ => None,
        }
    }
}
