//! Wii Remote session over the Linux evdev nodes exposed by `hid-wiimote`.
//!
//! The kernel driver splits one remote into several input nodes, one per
//! interface ("Nintendo Wii Remote", "… Nunchuk", "… Classic Controller").
//! This backend is intentionally "dumb": it owns the open nodes plus an
//! inotify watch on `/dev/input`, and translates raw `EV_KEY`/`EV_ABS`
//! streams into typed [`DeviceEvent`]s. All policy (deadzones, scaling,
//! scheduling) stays with the caller.
//!
//! ## Conventions
//! - `EV_KEY` values 0/1/2 map to `Up`/`Down`/`Autorepeat`.
//! - `EV_ABS` values are cached per interface and flushed as one move event
//!   on `SYN_REPORT`, so a consumer always sees whole stick pairs.
//! - An `ENODEV` read on the core node becomes `Gone`; on an extension node
//!   it drops that interface and becomes `Hotplug`. Node creation or removal
//!   under `/dev/input` also becomes `Hotplug`.

use std::collections::VecDeque;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::path::PathBuf;
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device, InputEventKind, Key as EvdevKey, Synchronization};
use log::{debug, info};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify};

use crate::error::Error;
use crate::event::{Capabilities, DeviceEvent, Key, KeyState, StickPos};
use crate::session::{DeviceSession, Readiness};

const INPUT_DIR: &str = "/dev/input";

const CORE_NAME: &str = "Nintendo Wii Remote";
const NUNCHUK_NAME: &str = "Nintendo Wii Remote Nunchuk";
const CLASSIC_NAME: &str = "Nintendo Wii Remote Classic Controller";

/// One open interface node.
struct Interface {
    capability: Capabilities,
    path: PathBuf,
    device: Device,
    /// Last-seen raw ABS values, flushed on SYN_REPORT.
    sticks: [StickPos; 2],
    /// An ABS value changed since the last flush.
    moved: bool,
}

/// Session over the evdev nodes of one Wii Remote.
pub struct WiimoteSession {
    interfaces: Vec<Interface>,
    available: Capabilities,
    watch: Inotify,
    queue: VecDeque<DeviceEvent>,
}

impl WiimoteSession {
    /// Discover a Wii Remote. Fails with [`Error::DeviceNotFound`] when no
    /// core node is present; interfaces are opened separately via
    /// [`DeviceSession::open_capabilities`].
    pub fn open() -> Result<Self, Error> {
        let watch = Inotify::init(InitFlags::IN_NONBLOCK | InitFlags::IN_CLOEXEC)
            .map_err(|err| Error::DeviceOpen(err.into()))?;
        watch
            .add_watch(INPUT_DIR, AddWatchFlags::IN_CREATE | AddWatchFlags::IN_DELETE)
            .map_err(|err| Error::DeviceOpen(err.into()))?;

        let found = scan();
        let core = found
            .iter()
            .find(|(cap, _)| *cap == Capabilities::CORE)
            .ok_or(Error::DeviceNotFound)?;
        info!("opening Wii Remote at {}", core.1.display());

        let available = found
            .iter()
            .fold(Capabilities::NONE, |acc, (cap, _)| acc | *cap);

        Ok(Self {
            interfaces: Vec::new(),
            available,
            watch,
            queue: VecDeque::new(),
        })
    }

    /// Queue `Hotplug` if the inotify watch saw input nodes come or go.
    fn drain_watch(&mut self) -> Result<(), Error> {
        let mut changed = false;
        loop {
            match self.watch.read_events() {
                Ok(events) => {
                    for event in events {
                        if let Some(name) = &event.name {
                            if name.to_string_lossy().starts_with("event") {
                                changed = true;
                            }
                        }
                    }
                }
                Err(Errno::EAGAIN) => break,
                Err(err) => return Err(Error::Dispatch(err.into())),
            }
        }
        if changed {
            debug!("input topology changed");
            self.queue.push_back(DeviceEvent::Hotplug);
        }
        Ok(())
    }

    /// Read whatever the open interfaces have buffered into the event queue.
    fn drain_interfaces(&mut self) -> Result<(), Error> {
        let mut gone = false;
        let mut lost = Vec::new();

        for (idx, iface) in self.interfaces.iter_mut().enumerate() {
            if !readable_now(iface.device.as_raw_fd()).map_err(Error::Dispatch)? {
                continue;
            }
            // Collected so the device borrow ends before translation touches
            // the interface's stick cache.
            let fetched: io::Result<Vec<evdev::InputEvent>> =
                iface.device.fetch_events().map(|events| events.collect());
            match fetched {
                Ok(events) => {
                    for event in events {
                        translate(iface, event, &mut self.queue);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) if err.raw_os_error() == Some(Errno::ENODEV as i32) => {
                    if iface.capability == Capabilities::CORE {
                        gone = true;
                    } else {
                        lost.push(idx);
                    }
                }
                Err(err) => return Err(Error::Dispatch(err)),
            }
        }

        for idx in lost.into_iter().rev() {
            let iface = self.interfaces.remove(idx);
            info!("interface detached: {}", iface.path.display());
            self.queue.push_back(DeviceEvent::Hotplug);
        }
        if gone {
            self.queue.clear();
            self.queue.push_back(DeviceEvent::Gone);
        }
        Ok(())
    }
}

impl DeviceSession for WiimoteSession {
    fn available(&self) -> Capabilities {
        self.available
    }

    fn open_capabilities(&mut self, requested: Capabilities) -> Result<Capabilities, Error> {
        let found = scan();
        self.available = found
            .iter()
            .fold(Capabilities::NONE, |acc, (cap, _)| acc | *cap);

        self.interfaces.clear();
        let mut opened = Capabilities::NONE;
        for (capability, path) in found {
            if !requested.contains(capability) {
                continue;
            }
            let device = Device::open(&path).map_err(Error::InterfaceOpen)?;
            debug!("opened interface at {}", path.display());
            self.interfaces.push(Interface {
                capability,
                path,
                device,
                sticks: [StickPos::default(); 2],
                moved: false,
            });
            opened |= capability;
        }
        Ok(opened)
    }

    fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness, Error> {
        if !self.queue.is_empty() {
            return Ok(Readiness::Readable);
        }

        let mut fds = Vec::with_capacity(self.interfaces.len() + 1);
        for iface in &self.interfaces {
            // SAFETY: the fd is owned by `self.interfaces`, which outlives
            // the poll call.
            let fd = unsafe { BorrowedFd::borrow_raw(iface.device.as_raw_fd()) };
            fds.push(PollFd::new(fd, PollFlags::POLLIN));
        }
        fds.push(PollFd::new(self.watch.as_fd(), PollFlags::POLLIN));

        let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let timeout = PollTimeout::try_from(millis).unwrap_or(PollTimeout::MAX);
        match poll(&mut fds, timeout) {
            Ok(0) => Ok(Readiness::TimedOut),
            Ok(_) => Ok(Readiness::Readable),
            Err(Errno::EINTR) => Ok(Readiness::Interrupted),
            Err(err) => Err(Error::Wait(err.into())),
        }
    }

    fn next_event(&mut self) -> Result<Option<DeviceEvent>, Error> {
        if let Some(event) = self.queue.pop_front() {
            return Ok(Some(event));
        }
        self.drain_watch()?;
        self.drain_interfaces()?;
        Ok(self.queue.pop_front())
    }
}

/// Enumerate `/dev/input` and classify Wii Remote nodes by kernel device
/// name. Unopenable or unrelated nodes are skipped.
fn scan() -> Vec<(Capabilities, PathBuf)> {
    let mut found = Vec::new();
    for (path, device) in evdev::enumerate() {
        let capability = match device.name() {
            Some(CORE_NAME) => Capabilities::CORE,
            Some(NUNCHUK_NAME) => Capabilities::NUNCHUK,
            Some(CLASSIC_NAME) => Capabilities::CLASSIC,
            _ => continue,
        };
        found.push((capability, path));
    }
    found
}

/// Zero-timeout poll on one fd, so blocking-mode reads are only issued when
/// data is already buffered.
fn readable_now(fd: i32) -> io::Result<bool> {
    // SAFETY: the fd belongs to a live `Device` held by the caller.
    let fd = unsafe { BorrowedFd::borrow_raw(fd) };
    let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::ZERO) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(Errno::EINTR) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Translate one raw input event, queueing any completed typed events.
fn translate(iface: &mut Interface, event: evdev::InputEvent, queue: &mut VecDeque<DeviceEvent>) {
    match event.kind() {
        InputEventKind::Key(code) => {
            if let Some(key) = map_key(code) {
                let state = match event.value() {
                    0 => KeyState::Up,
                    2 => KeyState::Autorepeat,
                    _ => KeyState::Down,
                };
                queue.push_back(DeviceEvent::Key { key, state });
            }
        }
        InputEventKind::AbsAxis(axis) => update_stick(iface, axis, event.value()),
        InputEventKind::Synchronization(Synchronization::SYN_REPORT) => {
            if iface.moved {
                iface.moved = false;
                queue.push_back(match iface.capability {
                    Capabilities::NUNCHUK => DeviceEvent::NunchukMove {
                        stick: iface.sticks[0],
                    },
                    _ => DeviceEvent::ClassicMove {
                        left: iface.sticks[0],
                        right: iface.sticks[1],
                    },
                });
            }
        }
        _ => {}
    }
}

/// Cache one ABS axis value. The Nunchuk stick arrives on `ABS_RX`/`ABS_RY`,
/// the Classic Controller sticks on the HAT1/HAT2 pairs; the axis sets never
/// overlap on one node.
fn update_stick(iface: &mut Interface, axis: AbsoluteAxisType, value: i32) {
    let slot = match axis {
        AbsoluteAxisType::ABS_HAT1X => &mut iface.sticks[0].x,
        AbsoluteAxisType::ABS_HAT1Y => &mut iface.sticks[0].y,
        AbsoluteAxisType::ABS_HAT2X => &mut iface.sticks[1].x,
        AbsoluteAxisType::ABS_HAT2Y => &mut iface.sticks[1].y,
        AbsoluteAxisType::ABS_RX => &mut iface.sticks[0].x,
        AbsoluteAxisType::ABS_RY => &mut iface.sticks[0].y,
        _ => return,
    };
    *slot = value;
    iface.moved = true;
}

/// Map kernel key codes into the fixed capability-model set. The kernel puts
/// A/B/X/Y on the gamepad cluster (`BTN_SOUTH`..`BTN_WEST`) and Plus/Minus on
/// `KEY_NEXT`/`KEY_PREVIOUS`; anything unknown is dropped.
fn map_key(code: EvdevKey) -> Option<Key> {
    Some(match code {
        EvdevKey::KEY_LEFT => Key::Left,
        EvdevKey::KEY_RIGHT => Key::Right,
        EvdevKey::KEY_UP => Key::Up,
        EvdevKey::KEY_DOWN => Key::Down,
        EvdevKey::BTN_SOUTH => Key::A,
        EvdevKey::BTN_EAST => Key::B,
        EvdevKey::KEY_NEXT => Key::Plus,
        EvdevKey::KEY_PREVIOUS => Key::Minus,
        EvdevKey::BTN_MODE => Key::Home,
        EvdevKey::BTN_1 => Key::One,
        EvdevKey::BTN_2 => Key::Two,
        EvdevKey::BTN_NORTH => Key::X,
        EvdevKey::BTN_WEST => Key::Y,
        EvdevKey::BTN_TL => Key::Tl,
        EvdevKey::BTN_TR => Key::Tr,
        EvdevKey::BTN_TL2 => Key::Zl,
        EvdevKey::BTN_TR2 => Key::Zr,
        EvdevKey::BTN_THUMBL => Key::ThumbL,
        EvdevKey::BTN_THUMBR => Key::ThumbR,
        EvdevKey::BTN_C => Key::C,
        EvdevKey::BTN_Z => Key::Z,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map_covers_the_pointer_buttons() {
        assert_eq!(map_key(EvdevKey::BTN_SOUTH), Some(Key::A));
        assert_eq!(map_key(EvdevKey::BTN_EAST), Some(Key::B));
        assert_eq!(map_key(EvdevKey::BTN_TR), Some(Key::Tr));
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        assert_eq!(map_key(EvdevKey::KEY_SPACE), None);
        assert_eq!(map_key(EvdevKey::BTN_LEFT), None);
    }
}
