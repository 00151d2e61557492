//! The device-session seam.
//!
//! A [`DeviceSession`] owns one opened input device and turns its native
//! event stream into [`DeviceEvent`]s. The scheduler only ever talks to this
//! trait, so one loop iteration can be exercised with a scripted session in
//! tests.

use std::time::Duration;

use crate::error::Error;
use crate::event::{Capabilities, DeviceEvent};

/// Outcome of a bounded wait for device readability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// At least one underlying handle is readable.
    Readable,
    /// The timeout elapsed with nothing ready. Not an error.
    TimedOut,
    /// The wait was interrupted by a signal; the caller should shut down
    /// cleanly.
    Interrupted,
}

/// A session over one opened input device.
///
/// Implementations own the underlying handles; dropping the session releases
/// them on every exit path.
pub trait DeviceSession {
    /// Interfaces the device currently advertises.
    fn available(&self) -> Capabilities;

    /// (Re)open the requested interfaces, returning the set actually opened.
    /// Also the hotplug response: a session rescans and picks up extensions
    /// that appeared since the last call.
    fn open_capabilities(&mut self, requested: Capabilities) -> Result<Capabilities, Error>;

    /// Block until an event may be ready or the timeout elapses.
    fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness, Error>;

    /// Fetch the next queued event without blocking. `Ok(None)` means nothing
    /// is ready, which is a normal condition.
    fn next_event(&mut self) -> Result<Option<DeviceEvent>, Error>;
}
