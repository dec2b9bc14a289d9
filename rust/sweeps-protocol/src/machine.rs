//! The loader lifecycle, expressed as a pure state machine.
//!
//! The browser glue in `sweeps-widget` owns the iframe element, the
//! listeners and the retry timer; everything it is allowed to do is an
//! explicit [`LoaderAction`] returned from [`LoaderMachine::handle`]. That
//! split keeps the lifecycle natively testable and leaves no decision
//! buried inside a DOM callback.
//!
//! ```text
//! Uninitialized ──FrameCreated──▸ Loading ──FrameLoaded──▸ AwaitingReady
//!       ▲                           ▲                           │
//!       │                           │ RetryElapsed /            │ Ready
//!    Cleanup                        │ FrameCreated              ▼
//!  (any state)                      └───── backoff ◂──Error── Ready
//!                                              │
//!                                              │ attempts exhausted
//!                                              ▼
//!                                           Failed (terminal)
//! ```

use crate::{WidgetError, WidgetMessage};

/// Error budget before the loader gives up on a widget instance.
pub const MAX_RETRIES: u32 = 3;

/// Fixed backoff between tearing a failed iframe down and recreating it.
pub const RETRY_DELAY_MS: u32 = 1000;

/// Lifecycle phase of one widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    /// No iframe exists; nothing is in flight.
    Uninitialized,
    /// An iframe exists (or is about to be recreated) and has not finished
    /// loading its document.
    Loading,
    /// The iframe document loaded and `INITIALIZE_WIDGET` was posted; the
    /// embed side has not confirmed its first render yet.
    AwaitingReady,
    /// The embed side rendered successfully.
    Ready,
    /// The retry budget is exhausted. Terminal: the loader takes no further
    /// action for this instance.
    Failed,
}

/// Severity of a diagnostic forwarded from the embed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// `WIDGET_WARNING` traffic.
    Warning,
    /// `WIDGET_INFO` traffic.
    Info,
}

/// An input to the loader state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// The caller created (or recreated) the iframe element.
    FrameCreated,
    /// The iframe's `load` event fired.
    FrameLoaded,
    /// A decoded protocol message arrived from the embed document.
    Message(WidgetMessage),
    /// The window-level error handler captured an uncaught exception in the
    /// host frame, outside the iframe's own boundary.
    HostError(WidgetError),
    /// The retry backoff timer elapsed.
    RetryElapsed,
    /// The caller is tearing this instance down.
    Cleanup,
}

/// An effect the caller must perform in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderAction {
    /// Post `INITIALIZE_WIDGET` into the iframe.
    PostInitialize {
        /// Campaign id to initialize with.
        sweepstakes_id: String,
    },
    /// Set the iframe element's inline height, in CSS pixels.
    ApplyHeight {
        /// Requested height.
        height: f64,
    },
    /// Start the backoff timer and feed [`LoaderEvent::RetryElapsed`] back
    /// in when it fires.
    ScheduleRetry {
        /// Backoff duration.
        delay_ms: u32,
    },
    /// Tear down the current iframe and create a fresh one, then feed
    /// [`LoaderEvent::FrameCreated`] back in.
    RecreateFrame,
    /// Remove the iframe element and drop the reference to it.
    RemoveFrame,
    /// Forward a non-fatal diagnostic from the embed document to the log.
    Diagnostic {
        /// Severity of the diagnostic.
        level: DiagnosticLevel,
        /// Diagnostic text.
        message: String,
    },
    /// The retry budget is exhausted; log the final error and stop. The
    /// host page is never thrown an exception.
    Abandon {
        /// The error that exhausted the budget.
        error: WidgetError,
    },
}

/// Per-instance loader state.
///
/// One machine exists per mounted widget; it is mutated only by its owner's
/// event handlers, which a single frame's event loop serializes, so there is
/// no concurrent mutation to guard against.
#[derive(Debug, Clone)]
pub struct LoaderMachine {
    sweepstakes_id: String,
    phase: LoaderPhase,
    retry_attempts: u32,
    max_retries: u32,
    retry_pending: bool,
}

impl LoaderMachine {
    /// A fresh machine in [`LoaderPhase::Uninitialized`].
    pub fn new(sweepstakes_id: impl Into<String>) -> Self {
        Self::with_max_retries(sweepstakes_id, MAX_RETRIES)
    }

    /// A fresh machine with a custom retry budget.
    pub fn with_max_retries(sweepstakes_id: impl Into<String>, max_retries: u32) -> Self {
        Self {
            sweepstakes_id: sweepstakes_id.into(),
            phase: LoaderPhase::Uninitialized,
            retry_attempts: 0,
            max_retries,
            retry_pending: false,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LoaderPhase {
        self.phase
    }

    /// How many recreations have been spent. Never exceeds the budget.
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// Whether the loader is loading or waiting on the embed handshake.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, LoaderPhase::Loading | LoaderPhase::AwaitingReady)
    }

    /// Feed one event in and get the effects to perform.
    pub fn handle(&mut self, event: LoaderEvent) -> Vec<LoaderAction> {
        match event {
            LoaderEvent::FrameCreated => {
                if self.phase == LoaderPhase::Failed {
                    return Vec::new();
                }
                self.phase = LoaderPhase::Loading;
                Vec::new()
            }

            LoaderEvent::FrameLoaded => {
                // A `load` from a frame that was already cleaned up or
                // abandoned carries no live iframe to talk to.
                if self.phase != LoaderPhase::Loading {
                    return Vec::new();
                }
                self.phase = LoaderPhase::AwaitingReady;
                vec![LoaderAction::PostInitialize {
                    sweepstakes_id: self.sweepstakes_id.clone(),
                }]
            }

            LoaderEvent::Message(message) => self.handle_message(message),

            LoaderEvent::HostError(error) => self.handle_error(error),

            LoaderEvent::RetryElapsed => {
                if !self.retry_pending || self.phase == LoaderPhase::Failed {
                    return Vec::new();
                }
                self.retry_pending = false;
                vec![LoaderAction::RecreateFrame]
            }

            LoaderEvent::Cleanup => {
                self.phase = LoaderPhase::Uninitialized;
                self.retry_attempts = 0;
                self.retry_pending = false;
                vec![LoaderAction::RemoveFrame]
            }
        }
    }

    fn handle_message(&mut self, message: WidgetMessage) -> Vec<LoaderAction> {
        match message {
            WidgetMessage::Ready {} => {
                if !self.is_loading() {
                    return Vec::new();
                }
                self.phase = LoaderPhase::Ready;
                self.retry_attempts = 0;
                self.retry_pending = false;
                Vec::new()
            }

            WidgetMessage::Error { error } => self.handle_error(error),

            // Height application is idempotent and lifecycle-neutral: it
            // applies in every phase and the last value wins.
            WidgetMessage::SetHeight { height } => {
                vec![LoaderAction::ApplyHeight { height }]
            }

            WidgetMessage::Warning { message } => vec![LoaderAction::Diagnostic {
                level: DiagnosticLevel::Warning,
                message,
            }],

            WidgetMessage::Info { message } => vec![LoaderAction::Diagnostic {
                level: DiagnosticLevel::Info,
                message,
            }],

            // The parent never initializes itself.
            WidgetMessage::Initialize { .. } => Vec::new(),
        }
    }

    fn handle_error(&mut self, error: WidgetError) -> Vec<LoaderAction> {
        // Errors only matter while an iframe lifecycle is in flight. A
        // terminal instance stays terminal, and an error during the backoff
        // window describes a frame that is already condemned.
        let retryable = matches!(
            self.phase,
            LoaderPhase::Loading | LoaderPhase::AwaitingReady | LoaderPhase::Ready
        );
        if !retryable || self.retry_pending {
            return Vec::new();
        }

        if self.retry_attempts < self.max_retries {
            self.retry_attempts += 1;
            self.retry_pending = true;
            self.phase = LoaderPhase::Loading;
            vec![LoaderAction::ScheduleRetry {
                delay_ms: RETRY_DELAY_MS,
            }]
        } else {
            self.phase = LoaderPhase::Failed;
            vec![LoaderAction::RemoveFrame, LoaderAction::Abandon { error }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    fn error() -> WidgetError {
        WidgetError::new(codes::RENDER_ERROR, "boom")
    }

    /// Drive a machine through create → load → ready.
    fn ready_machine() -> LoaderMachine {
        let mut machine = LoaderMachine::new("abc-123");
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);
        machine.handle(LoaderEvent::Message(WidgetMessage::Ready {}));
        machine
    }

    #[test]
    fn load_triggers_initialize_with_the_campaign_id() {
        let mut machine = LoaderMachine::new("abc-123");
        assert!(machine.handle(LoaderEvent::FrameCreated).is_empty());
        assert_eq!(machine.phase(), LoaderPhase::Loading);

        let actions = machine.handle(LoaderEvent::FrameLoaded);
        assert_eq!(
            actions,
            vec![LoaderAction::PostInitialize {
                sweepstakes_id: "abc-123".into()
            }]
        );
        assert_eq!(machine.phase(), LoaderPhase::AwaitingReady);
    }

    #[test]
    fn ready_resets_the_retry_counter() {
        let mut machine = LoaderMachine::new("abc-123");
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);
        machine.handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }));
        machine.handle(LoaderEvent::RetryElapsed);
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);
        assert_eq!(machine.retry_attempts(), 1);

        machine.handle(LoaderEvent::Message(WidgetMessage::Ready {}));
        assert_eq!(machine.phase(), LoaderPhase::Ready);
        assert_eq!(machine.retry_attempts(), 0);
    }

    #[test]
    fn each_error_schedules_exactly_one_recreation() {
        let mut machine = LoaderMachine::new("abc-123");
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);

        for attempt in 1..=MAX_RETRIES {
            let actions =
                machine.handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }));
            assert_eq!(
                actions,
                vec![LoaderAction::ScheduleRetry {
                    delay_ms: RETRY_DELAY_MS
                }]
            );
            assert_eq!(machine.retry_attempts(), attempt);

            assert_eq!(
                machine.handle(LoaderEvent::RetryElapsed),
                vec![LoaderAction::RecreateFrame]
            );
            machine.handle(LoaderEvent::FrameCreated);
            machine.handle(LoaderEvent::FrameLoaded);
        }

        // Budget spent: the next error is terminal and recreates nothing.
        let actions = machine.handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }));
        assert_eq!(
            actions,
            vec![
                LoaderAction::RemoveFrame,
                LoaderAction::Abandon { error: error() }
            ]
        );
        assert_eq!(machine.phase(), LoaderPhase::Failed);
        assert_eq!(machine.retry_attempts(), MAX_RETRIES);

        // Terminal means terminal.
        assert!(machine
            .handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }))
            .is_empty());
        assert!(machine.handle(LoaderEvent::RetryElapsed).is_empty());
    }

    #[test]
    fn errors_during_backoff_do_not_double_schedule() {
        let mut machine = LoaderMachine::new("abc-123");
        machine.handle(LoaderEvent::FrameCreated);
        machine.handle(LoaderEvent::FrameLoaded);

        machine.handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }));
        let during_backoff =
            machine.handle(LoaderEvent::Message(WidgetMessage::Error { error: error() }));
        assert!(during_backoff.is_empty());
        assert_eq!(machine.retry_attempts(), 1);
    }

    #[test]
    fn height_applies_in_every_phase() {
        let mut machine = LoaderMachine::new("abc-123");
        for advance in [
            LoaderEvent::FrameCreated,
            LoaderEvent::FrameLoaded,
            LoaderEvent::Message(WidgetMessage::Ready {}),
        ] {
            let phase = machine.phase();
            let actions = machine.handle(LoaderEvent::Message(WidgetMessage::SetHeight {
                height: 712.0,
            }));
            assert_eq!(actions, vec![LoaderAction::ApplyHeight { height: 712.0 }]);
            assert_eq!(machine.phase(), phase, "height must not change lifecycle");
            machine.handle(advance);
        }
    }

    #[test]
    fn host_errors_share_the_retry_path() {
        let mut machine = LoaderMachine::new("abc-123");
        machine.handle(LoaderEvent::FrameCreated);
        let actions = machine.handle(LoaderEvent::HostError(WidgetError::new(
            codes::GLOBAL_ERROR,
            "script error",
        )));
        assert_eq!(
            actions,
            vec![LoaderAction::ScheduleRetry {
                delay_ms: RETRY_DELAY_MS
            }]
        );
        assert_eq!(machine.retry_attempts(), 1);
    }

    #[test]
    fn cleanup_resets_everything() {
        let mut machine = ready_machine();
        let actions = machine.handle(LoaderEvent::Cleanup);
        assert_eq!(actions, vec![LoaderAction::RemoveFrame]);
        assert_eq!(machine.phase(), LoaderPhase::Uninitialized);
        assert_eq!(machine.retry_attempts(), 0);

        // A fresh create after cleanup starts a normal cycle.
        machine.handle(LoaderEvent::FrameCreated);
        assert_eq!(machine.phase(), LoaderPhase::Loading);
    }

    #[test]
    fn diagnostics_are_forwarded_without_state_change() {
        let mut machine = ready_machine();
        let actions = machine.handle(LoaderEvent::Message(WidgetMessage::Warning {
            message: "slow asset".into(),
        }));
        assert_eq!(
            actions,
            vec![LoaderAction::Diagnostic {
                level: DiagnosticLevel::Warning,
                message: "slow asset".into()
            }]
        );
        assert_eq!(machine.phase(), LoaderPhase::Ready);
    }

    #[test]
    fn stray_events_are_ignored() {
        let mut machine = LoaderMachine::new("abc-123");
        // Load event with no frame in flight.
        assert!(machine.handle(LoaderEvent::FrameLoaded).is_empty());
        // An echoed initialize.
        assert!(machine
            .handle(LoaderEvent::Message(WidgetMessage::Initialize {
                sweepstakes_id: "abc-123".into()
            }))
            .is_empty());
        // Errors while nothing is mounted.
        assert!(machine.handle(LoaderEvent::HostError(error())).is_empty());
        assert_eq!(machine.phase(), LoaderPhase::Uninitialized);
        assert_eq!(machine.retry_attempts(), 0);
    }
}
