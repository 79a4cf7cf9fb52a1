// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared types: exit signals, observable flags, and lifecycle phases.

/// Which heuristic decided the user is leaving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExitSignal {
    /// Pointer moved fast and mostly perpendicular toward a viewport edge.
    EdgeVelocity,
    /// Pointer left the document near an edge and did not come back within the
    /// confirmation window.
    LeaveConfirmed,
    /// Document became hidden (tab switch, minimize).
    Hidden,
    /// Fast touch scroll gesture.
    TouchVelocity,
    /// Scroll position crossed the configured percentage of the page.
    ScrollDepth,
    /// Configured delay elapsed.
    Delay,
    /// Configured to fire as soon as the engine arms.
    PageLoad,
}

/// Externally observable boolean.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    /// `isShowing`: the presentation layer should show its content.
    Showing,
    /// `isAllowedToGetTriggered`: detection listeners are armed.
    AllowedToGetTriggered,
    /// `isUnsubscribed`: the user opted out permanently.
    Unsubscribed,
}

/// A single flag transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlagChange {
    /// The flag that changed.
    pub flag: Flag,
    /// Its new value.
    pub value: bool,
}

/// Snapshot of all observable flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// See [`Flag::Showing`].
    pub is_showing: bool,
    /// See [`Flag::AllowedToGetTriggered`].
    pub is_allowed_to_get_triggered: bool,
    /// See [`Flag::Unsubscribed`].
    pub is_unsubscribed: bool,
}

impl Flags {
    /// Value of a single flag.
    #[must_use]
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Showing => self.is_showing,
            Flag::AllowedToGetTriggered => self.is_allowed_to_get_triggered,
            Flag::Unsubscribed => self.is_unsubscribed,
        }
    }

    /// Sets a flag, returning `true` if its value changed.
    pub fn set(&mut self, flag: Flag, value: bool) -> bool {
        let slot = match flag {
            Flag::Showing => &mut self.is_showing,
            Flag::AllowedToGetTriggered => &mut self.is_allowed_to_get_triggered,
            Flag::Unsubscribed => &mut self.is_unsubscribed,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}

/// Lifecycle phase of the engine.
///
/// ```text
///  Unarmed ──setup──► Armed ──signal──► Fired
///                       ▲                 │
///                       └───reset_state───┘
///
///  (any) ──unsubscribe──► Unsubscribed ──reset_state──► Armed
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not armed and never fired in this session.
    Unarmed,
    /// Listeners are live.
    Armed,
    /// A signal fired; listeners are torn down until an explicit reset.
    Fired,
    /// The user opted out. Terminal until `reset_state`.
    Unsubscribed,
}

impl Phase {
    /// Derives the phase from the flags and whether anything fired this session.
    #[must_use]
    pub fn from_flags(flags: &Flags, fired: bool) -> Self {
        if flags.is_unsubscribed {
            Self::Unsubscribed
        } else if flags.is_allowed_to_get_triggered {
            Self::Armed
        } else if fired {
            Self::Fired
        } else {
            Self::Unarmed
        }
    }
}
