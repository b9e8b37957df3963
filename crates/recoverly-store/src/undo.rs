//! Undo affordance for eager mutations.
//!
//! A mutation is applied immediately and an [`UndoWindow`] is armed with the
//! snapshot taken before it. The window counts down in [`UNDO_TICK`] steps;
//! while it is active, [`UndoWindow::undo`] hands the snapshot back.

use std::time::Duration;

use tracing::debug;

use crate::set::CaseSet;

pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(30);
pub const UNDO_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    Active { remaining: Duration },
    /// Countdown ran out; the mutation stands.
    Expired,
    Undone,
    /// Closed by the user without reverting.
    Dismissed,
}

impl UndoState {
    pub fn is_active(self) -> bool {
        matches!(self, UndoState::Active { .. })
    }
}

#[derive(Debug, Clone)]
pub struct UndoWindow {
    message: String,
    snapshot: CaseSet,
    duration: Duration,
    state: UndoState,
}

impl UndoWindow {
    pub fn new(message: impl Into<String>, snapshot: CaseSet, duration: Duration) -> Self {
        let state = if duration.is_zero() {
            UndoState::Expired
        } else {
            UndoState::Active {
                remaining: duration,
            }
        };
        Self {
            message: message.into(),
            snapshot,
            duration,
            state,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn state(&self) -> UndoState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        match self.state {
            UndoState::Active { remaining } => remaining,
            _ => Duration::ZERO,
        }
    }

    /// Whole seconds left, rounded up.
    pub fn seconds_left(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    /// Fraction of the window still left, from 1.0 down to 0.0.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        self.remaining().as_secs_f64() / self.duration.as_secs_f64()
    }

    /// Advance the countdown by one tick.
    pub fn tick(&mut self) -> UndoState {
        if let UndoState::Active { remaining } = self.state {
            self.state = if remaining <= UNDO_TICK {
                UndoState::Expired
            } else {
                UndoState::Active {
                    remaining: remaining - UNDO_TICK,
                }
            };
        }
        self.state
    }

    /// Revert: returns the pre-mutation snapshot if the window is still active.
    pub fn undo(&mut self) -> Option<CaseSet> {
        if !self.state.is_active() {
            return None;
        }
        self.state = UndoState::Undone;
        Some(self.snapshot.clone())
    }

    pub fn dismiss(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = UndoState::Dismissed;
        true
    }
}

/// Holds at most one live [`UndoWindow`].
#[derive(Debug, Clone, Default)]
pub struct UndoSlot {
    current: Option<UndoWindow>,
    last_closed: Option<UndoState>,
}

impl UndoSlot {
    /// Install `window`, replacing whatever was pending.
    ///
    /// The displaced window is returned as-is. Its mutation stays applied and
    /// can no longer be undone.
    pub fn arm(&mut self, window: UndoWindow) -> Option<UndoWindow> {
        let displaced = self.current.take();
        if let Some(old) = &displaced {
            debug!(
                displaced = old.message(),
                replacement = window.message(),
                "undo window replaced before closing"
            );
        }
        if window.state().is_active() {
            self.current = Some(window);
        } else {
            self.last_closed = Some(window.state());
        }
        displaced
    }

    /// Tick the pending window. Returns its new state, or `None` when the slot
    /// is empty. A window that leaves `Active` is removed from the slot.
    pub fn tick(&mut self) -> Option<UndoState> {
        let window = self.current.as_mut()?;
        let state = window.tick();
        if !state.is_active() {
            self.close(state);
        }
        Some(state)
    }

    pub fn undo(&mut self) -> Option<CaseSet> {
        let snapshot = self.current.as_mut()?.undo()?;
        self.close(UndoState::Undone);
        Some(snapshot)
    }

    pub fn dismiss(&mut self) -> bool {
        let dismissed = self.current.as_mut().is_some_and(UndoWindow::dismiss);
        if dismissed {
            self.close(UndoState::Dismissed);
        }
        dismissed
    }

    pub fn current(&self) -> Option<&UndoWindow> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Final state of the most recently closed window.
    pub fn last_closed(&self) -> Option<UndoState> {
        self.last_closed
    }

    fn close(&mut self, state: UndoState) {
        self.current = None;
        self.last_closed = Some(state);
    }
}
