//! Error taxonomy and process exit codes.
//!
//! Setup failures each map to their own stable exit code; all runtime I/O
//! failures share one. "No event ready" is not an error anywhere in the
//! crate, and device-gone / interrupted-wait are clean terminations, so
//! neither appears here.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read tuning profile: {0}")]
    ProfileRead(#[source] io::Error),

    #[error("invalid tuning profile: {0}")]
    ProfileParse(#[from] toml::de::Error),

    #[error("unable to create or connect report socket: {0}")]
    Connect(#[source] io::Error),

    #[error("no Wii Remote found")]
    DeviceNotFound,

    #[error("unable to open device: {0}")]
    DeviceOpen(#[source] io::Error),

    #[error("unable to open device interfaces: {0}")]
    InterfaceOpen(#[source] io::Error),

    #[error("error waiting for device events: {0}")]
    Wait(#[source] io::Error),

    #[error("error reading device events: {0}")]
    Dispatch(#[source] io::Error),

    #[error("unable to send report: {0}")]
    Send(#[source] io::Error),
}

impl Error {
    /// Stable process exit code for this failure class (documented in the
    /// README).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ProfileRead(_) | Error::ProfileParse(_) => 0x01,
            Error::Connect(_) => 0x10,
            Error::DeviceNotFound | Error::DeviceOpen(_) => 0x21,
            Error::InterfaceOpen(_) => 0x25,
            Error::Wait(_) | Error::Dispatch(_) | Error::Send(_) => 0x80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_stable() {
        let io = || io::Error::new(io::ErrorKind::Other, "x");
        assert_eq!(Error::ProfileRead(io()).exit_code(), 0x01);
        assert_eq!(Error::Connect(io()).exit_code(), 0x10);
        assert_eq!(Error::DeviceNotFound.exit_code(), 0x21);
        assert_eq!(Error::DeviceOpen(io()).exit_code(), 0x21);
        assert_eq!(Error::InterfaceOpen(io()).exit_code(), 0x25);
        assert_eq!(Error::Wait(io()).exit_code(), 0x80);
        assert_eq!(Error::Dispatch(io()).exit_code(), 0x80);
        assert_eq!(Error::Send(io()).exit_code(), 0x80);
    }
}
