//! Device events and the capability model.
//!
//! A session represents input changes as small, typed events ([`DeviceEvent`])
//! carrying exactly the payload each kind needs.
//!
//! ## Value conventions
//! - **Keys:** transition edges ([`KeyState`]); `Autorepeat` is the driver
//!   re-asserting a held key, not a new press.
//! - **Sticks:** raw driver units, signed, zero-centered. Deadzone correction
//!   and scaling are the consumer's job, not the session's.
//! - **Topology:** `Hotplug` means the extension set changed and interfaces
//!   should be re-opened; `Gone` means the remote itself disappeared.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Keys known to the capability model (core remote, Nunchuk, Classic
/// Controller). The set is fixed; sessions translate their native codes into
/// it and drop anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    B,
    Plus,
    Minus,
    Home,
    One,
    Two,
    X,
    Y,
    Tl,
    Tr,
    Zl,
    Zr,
    ThumbL,
    ThumbR,
    C,
    Z,
}

impl Key {
    /// Number of known key identifiers, for state-array sizing.
    pub const COUNT: usize = 21;

    /// Stable index of this key into a `[_; Key::COUNT]` state array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Transition carried by a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    /// Released.
    Up,
    /// Pressed.
    Down,
    /// Driver-generated repeat of a key that is still held.
    Autorepeat,
}

impl KeyState {
    /// Whether the key is held after this transition (repeats count as held).
    #[inline]
    pub fn is_pressed(self) -> bool {
        !matches!(self, KeyState::Up)
    }
}

/// One analog stick position in raw driver units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StickPos {
    pub x: i32,
    pub y: i32,
}

/// Typed event produced by a device session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The remote disappeared; the consumer should shut down cleanly.
    Gone,
    /// The extension topology changed; the consumer should re-open
    /// capabilities. Never a report trigger by itself.
    Hotplug,
    /// Core or Classic Controller key transition.
    Key { key: Key, state: KeyState },
    /// Classic Controller movement, both sticks aggregated into one event.
    ClassicMove { left: StickPos, right: StickPos },
    /// Nunchuk stick movement (single, lower-precision pair).
    NunchukMove { stick: StickPos },
}

/// Bitmask of device interfaces a session can open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    /// The remote itself: keys and the hotplug/gone lifecycle.
    pub const CORE: Capabilities = Capabilities(1 << 0);
    /// Nunchuk extension (stick + C/Z).
    pub const NUNCHUK: Capabilities = Capabilities(1 << 1);
    /// Classic Controller extension (two sticks + full key set).
    pub const CLASSIC: Capabilities = Capabilities(1 << 2);

    /// Raw bits, for logging alongside the kernel's own bitmask output.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when every bit of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    /// Const form of `|`, usable in constant expressions.
    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Capabilities) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Capabilities {
    type Output = Capabilities;

    fn bitand(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 & rhs.0)
    }
}

impl fmt::LowerHex for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_indices_are_distinct() {
        let keys = [
            Key::Left,
            Key::Right,
            Key::Up,
            Key::Down,
            Key::A,
            Key::B,
            Key::Plus,
            Key::Minus,
            Key::Home,
            Key::One,
            Key::Two,
            Key::X,
            Key::Y,
            Key::Tl,
            Key::Tr,
            Key::Zl,
            Key::Zr,
            Key::ThumbL,
            Key::ThumbR,
            Key::C,
            Key::Z,
        ];
        assert_eq!(keys.len(), Key::COUNT);

        let mut seen = [false; Key::COUNT];
        for key in keys {
            assert!(!seen[key.index()]);
            seen[key.index()] = true;
        }
    }

    #[test]
    fn test_autorepeat_counts_as_held() {
        assert!(KeyState::Down.is_pressed());
        assert!(KeyState::Autorepeat.is_pressed());
        assert!(!KeyState::Up.is_pressed());
    }

    #[test]
    fn test_capability_bit_operations() {
        let requested = Capabilities::CORE | Capabilities::NUNCHUK;
        assert!(requested.contains(Capabilities::CORE));
        assert!(requested.contains(Capabilities::NUNCHUK));
        assert!(!requested.contains(Capabilities::CLASSIC));
        assert!((requested & Capabilities::CLASSIC).is_empty());
        assert_eq!(requested.bits(), 0b011);
    }
}
