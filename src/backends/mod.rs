//! Device session backends.
//!
//! Implementations of [`DeviceSession`](crate::session::DeviceSession) for
//! concrete device stacks. Only the Linux evdev backend is wired up; the
//! scheduler never depends on anything in here directly.

pub mod evdev;

pub use self::evdev::WiimoteSession;
