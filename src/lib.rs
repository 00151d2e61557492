//! wiimouse — bridges a Wii Remote to a pointer consumer.
//!
//! Translates discrete input events (keys, Classic Controller sticks, the
//! Nunchuk stick) into fixed-rate, fixed-layout 5-byte mouse reports and
//! delivers them over a connected Unix datagram socket.

pub mod backends;
pub mod config;
pub mod error;
pub mod event;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod transport;

pub use config::Tuning;
pub use error::Error;
pub use event::{Capabilities, DeviceEvent, Key, KeyState, StickPos};
pub use report::MouseReport;
pub use scheduler::Scheduler;
pub use session::{DeviceSession, Readiness};
pub use transport::{ReportLink, ReportSink};
