//! Confirmation tray state machine.
//!
//! The tray is modeled as a pure finite-state machine: [`TrayState::transition`]
//! maps an event to the next state plus the effects the caller must carry out
//! (animations, haptics, timers, counter updates). Animation is an effect of a
//! transition, never the source of truth. At most one timer is pending; a new
//! `StartTimer` replaces the old one.
//!
//! ```text
//! Hidden        --Show-->    SlidingIn                  (slide in, haptic)
//! SlidingIn     --Timer-->   VisiblePendingConfirmation
//! visible       --Hide-->    SlidingOut{false} --Timer--> Hidden
//! visible       --Confirm--> Confirmed                  (increment, haptic)
//! Confirmed     --Timer-->   SlidingOut{true}  --Timer--> Hidden (reset flow)
//! ```
//!
//! `ForceHide` takes every state straight to `Hidden`.

use ecoroute_core::config::TrayConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TrayState {
    #[default]
    Hidden,
    SlidingIn,
    VisiblePendingConfirmation,
    Confirmed,
    SlidingOut {
        /// Leaving after a confirmed pickup (ends with a flow reset)
        after_confirm: bool,
    },
}

impl TrayState {
    /// On screen and still awaiting a decision
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::SlidingIn | Self::VisiblePendingConfirmation)
    }

    /// Compute the transition for `event`, or `None` when the event does not
    /// apply in this state.
    pub fn transition(self, event: TrayEvent, timings: &TrayTimings) -> Option<Transition> {
        use TrayEffect::*;

        let (next, effects) = match (self, event) {
            (_, TrayEvent::ForceHide) => (
                Self::Hidden,
                vec![
                    CancelTimer,
                    Animate {
                        motion: Motion::SlideOut,
                        duration: Duration::ZERO,
                        easing: Easing::Linear,
                    },
                ],
            ),

            (Self::Hidden, TrayEvent::Show) => (
                Self::SlidingIn,
                vec![
                    Animate {
                        motion: Motion::SlideIn,
                        duration: timings.slide_in,
                        easing: Easing::EaseOut,
                    },
                    Haptic,
                    StartTimer(timings.slide_in),
                ],
            ),
            (Self::SlidingIn, TrayEvent::TimerElapsed) => (Self::VisiblePendingConfirmation, vec![]),

            (Self::SlidingIn | Self::VisiblePendingConfirmation, TrayEvent::Hide) => (
                Self::SlidingOut {
                    after_confirm: false,
                },
                vec![
                    Animate {
                        motion: Motion::SlideOut,
                        duration: timings.slide_out,
                        easing: Easing::EaseInOut,
                    },
                    StartTimer(timings.slide_out),
                ],
            ),
            (
                Self::SlidingOut {
                    after_confirm: false,
                },
                TrayEvent::TimerElapsed,
            ) => (Self::Hidden, vec![ClearProximity]),

            (Self::SlidingIn | Self::VisiblePendingConfirmation, TrayEvent::Confirm) => (
                Self::Confirmed,
                vec![IncrementPickups, Haptic, StartTimer(timings.confirm_display)],
            ),
            (Self::Confirmed, TrayEvent::TimerElapsed) => (
                Self::SlidingOut {
                    after_confirm: true,
                },
                vec![
                    Animate {
                        motion: Motion::SlideOut,
                        duration: timings.confirm_slide_out,
                        easing: Easing::EaseIn,
                    },
                    StartTimer(timings.confirm_slide_out),
                ],
            ),
            (
                Self::SlidingOut {
                    after_confirm: true,
                },
                TrayEvent::TimerElapsed,
            ) => (Self::Hidden, vec![ResetFlow]),

            _ => return None,
        };

        Some(Transition { next, effects })
    }
}

impl fmt::Display for TrayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "hidden",
            Self::SlidingIn => "sliding-in",
            Self::VisiblePendingConfirmation => "visible-pending-confirmation",
            Self::Confirmed => "confirmed",
            Self::SlidingOut { .. } => "sliding-out",
        };
        f.write_str(name)
    }
}

/// Inputs to the tray state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrayEvent {
    Show,
    Hide,
    Confirm,
    TimerElapsed,
    /// A new anchor invalidates everything on screen
    ForceHide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    SlideIn,
    SlideOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEffect {
    Animate {
        motion: Motion,
        duration: Duration,
        easing: Easing,
    },
    Haptic,
    IncrementPickups,
    /// Replace the pending timer
    StartTimer(Duration),
    CancelTimer,
    /// Stop tracking, clear confirmation and proximity
    ResetFlow,
    ClearProximity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: TrayState,
    pub effects: Vec<TrayEffect>,
}

/// Animation and display timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayTimings {
    pub slide_in: Duration,
    pub slide_out: Duration,
    pub confirm_display: Duration,
    pub confirm_slide_out: Duration,
}

impl Default for TrayTimings {
    fn default() -> Self {
        Self::from(&TrayConfig::default())
    }
}

impl From<&TrayConfig> for TrayTimings {
    fn from(config: &TrayConfig) -> Self {
        Self {
            slide_in: Duration::from_millis(config.slide_in_ms),
            slide_out: Duration::from_millis(config.slide_out_ms),
            confirm_display: Duration::from_millis(config.confirm_display_ms),
            confirm_slide_out: Duration::from_millis(config.confirm_slide_out_ms),
        }
    }
}
