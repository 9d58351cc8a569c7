//! Timing of the fullscreen toggle.
//!
//! The plot is hidden while the host re-lays it out, resized and redrawn
//! once the layout has settled, then faded back in.

use std::time::{Duration, Instant};

use tracing::debug;

/// Time from the toggle until the layout is applied.
pub const LAYOUT_SETTLE: Duration = Duration::from_millis(200);
/// Time from the toggle until the plot is fully visible again.
pub const FADE_DURATION: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenPhase {
    /// Hidden while the layout changes.
    Settling,
    FadingIn,
    Complete,
}

/// Result of polling a transition at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionStep {
    pub phase: FullscreenPhase,
    pub opacity: f32,
    /// Set on the single poll where the layout settle period ended.
    pub settled_now: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FullscreenTransition {
    /// Time of the first poll; the transition starts on the next frame
    /// after the toggle.
    started: Option<Instant>,
    settled: bool,
}

impl FullscreenTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, now: Instant) -> TransitionStep {
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        if elapsed < LAYOUT_SETTLE {
            return TransitionStep {
                phase: FullscreenPhase::Settling,
                opacity: 0.0,
                settled_now: false,
            };
        }

        let settled_now = !self.settled;
        if settled_now {
            debug!(?elapsed, "fullscreen layout settled");
            self.settled = true;
        }

        if elapsed >= FADE_DURATION {
            TransitionStep {
                phase: FullscreenPhase::Complete,
                opacity: 1.0,
                settled_now,
            }
        } else {
            TransitionStep {
                phase: FullscreenPhase::FadingIn,
                opacity: (elapsed - LAYOUT_SETTLE).as_secs_f32()
                    / (FADE_DURATION - LAYOUT_SETTLE).as_secs_f32(),
                settled_now,
            }
        }
    }
}
