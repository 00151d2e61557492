//! The report scheduler: wait, dispatch, integrate, emit.
//!
//! One loop iteration is one [`Scheduler::step`]: a bounded wait on the
//! session, at most one event dispatched into [`RemoteState`], time
//! bookkeeping, motion integration into [`PointerState`], and possibly one
//! report.
//!
//! ## The two timers
//! `prev_frame` advances every iteration and drives integration, so sampling
//! cadence never distorts velocity. `last_report` advances only when a report
//! is actually sent and drives emission alone: if it ages past the configured
//! interval, a heartbeat report goes out even with no input activity, so a
//! held button keeps being re-asserted and accumulated motion never stalls
//! silently.

use std::time::Instant;

use log::{info, trace, warn};

use crate::config::Tuning;
use crate::error::Error;
use crate::event::{Capabilities, DeviceEvent, KeyState};
use crate::report::MouseReport;
use crate::session::{DeviceSession, Readiness};
use crate::state::{apply_deadzone, integrate, map_buttons, PointerState, RemoteState};
use crate::transport::ReportSink;

/// Interfaces the bridge asks a session to keep open.
pub const REQUESTED_CAPABILITIES: Capabilities = Capabilities::CORE
    .union(Capabilities::NUNCHUK)
    .union(Capabilities::CLASSIC);

/// Time source, a seam so one iteration is testable with scripted timestamps.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// Monotonic clock used in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Whether the loop keeps running after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Control {
    Continue,
    Shutdown,
}

/// The event-to-report pipeline state machine.
pub struct Scheduler<S, C = SystemClock> {
    session: S,
    clock: C,
    tuning: Tuning,
    remote: RemoteState,
    pointer: PointerState,
    last_report: Instant,
    prev_frame: Instant,
}

impl<S: DeviceSession> Scheduler<S, SystemClock> {
    pub fn new(session: S, tuning: Tuning) -> Self {
        Self::with_clock(session, tuning, SystemClock)
    }
}

impl<S: DeviceSession, C: Clock> Scheduler<S, C> {
    pub fn with_clock(session: S, tuning: Tuning, mut clock: C) -> Self {
        let now = clock.now();
        Self {
            session,
            clock,
            tuning,
            remote: RemoteState::default(),
            pointer: PointerState::default(),
            last_report: now,
            prev_frame: now,
        }
    }

    /// Run until the device goes away, the wait is interrupted, or a fatal
    /// I/O error occurs. Device-gone and interruption are clean shutdowns.
    pub fn run(&mut self, sink: &mut dyn ReportSink) -> Result<(), Error> {
        loop {
            if self.step(sink)? == Control::Shutdown {
                return Ok(());
            }
        }
    }

    /// One iteration of the pipeline.
    fn step(&mut self, sink: &mut dyn ReportSink) -> Result<Control, Error> {
        match self.session.wait_readable(self.tuning.interval())? {
            Readiness::Interrupted => {
                info!("wait interrupted, shutting down");
                return Ok(Control::Shutdown);
            }
            Readiness::Readable | Readiness::TimedOut => {}
        }

        let mut should_report = false;

        // Dispatch at most one event; None just falls through to bookkeeping.
        match self.session.next_event()? {
            Some(DeviceEvent::Gone) => {
                info!("device gone, shutting down");
                return Ok(Control::Shutdown);
            }
            Some(DeviceEvent::Hotplug) => {
                match self.session.open_capabilities(REQUESTED_CAPABILITIES) {
                    Ok(opened) => trace!("interfaces reopened: {:#010x}", opened.bits()),
                    Err(err) => warn!("reopening interfaces failed: {err}"),
                }
            }
            Some(DeviceEvent::Key { key, state }) => {
                self.remote.set_key(key, state.is_pressed());
                // Repeats refresh held state but must not trigger a send.
                if state != KeyState::Autorepeat {
                    should_report = true;
                }
            }
            Some(DeviceEvent::ClassicMove { left, right }) => {
                let dz = self.tuning.deadzone;
                self.remote.axes = [
                    apply_deadzone(left.x, dz),
                    apply_deadzone(left.y, dz),
                    apply_deadzone(right.x, dz),
                    apply_deadzone(right.y, dz),
                ];
            }
            Some(DeviceEvent::NunchukMove { stick }) => {
                // Lower-precision source: scaled, and it never drives the
                // right-stick slots.
                let dz = self.tuning.deadzone;
                let scale = self.tuning.nunchuk_scale;
                self.remote.axes[0] = (apply_deadzone(stick.x, dz) as f64 * scale) as i32;
                self.remote.axes[1] = (apply_deadzone(stick.y, dz) as f64 * scale) as i32;
            }
            None => {}
        }

        let now = self.clock.now();

        // Heartbeat: bound the silence to one interval.
        if now.duration_since(self.last_report) > self.tuning.interval() {
            should_report = true;
        }

        let elapsed = now.duration_since(self.prev_frame);
        let (dx, dy) = integrate(
            &self.remote.axes,
            self.tuning.right_stick_weight,
            elapsed.as_micros() as u64,
        );
        self.pointer.accumulate(dx, dy);
        self.pointer.buttons = map_buttons(&self.remote.keys);
        self.prev_frame = now;

        if !should_report {
            return Ok(Control::Continue);
        }

        let report = MouseReport::from_pointer(
            &self.pointer.motion,
            self.pointer.buttons,
            self.tuning.sensitivity,
        );
        trace!("sending report {report:?}");
        sink.send(&report).map_err(Error::Send)?;

        self.pointer.reset_motion();
        self.last_report = now;
        Ok(Control::Continue)
    }
}
