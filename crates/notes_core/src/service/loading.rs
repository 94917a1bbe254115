//! Loading/error state tracking keyed by operation kind.
//!
//! # Responsibility
//! - Record whether each kind of repository operation is idle, running,
//!   succeeded or failed, so callers can disable input while work is pending.
//! - Expire settled states after a fixed delay.
//!
//! # Invariants
//! - Unknown operations read as `LoadingState::Idle`.
//! - Only states settled through `finish`/`handle_error` expire; states set
//!   directly with `set_state` stay until cleared.

use log::warn;
use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

/// States settled through `finish` are cleared after this delay.
pub const SUCCESS_CLEAR_DELAY: Duration = Duration::from_millis(1500);
/// Failures recorded through `handle_error` are cleared after this delay.
pub const FAILURE_CLEAR_DELAY: Duration = Duration::from_secs(3);

const UNKNOWN_FAILURE: &str = "unknown error";

/// Kind of repository operation a caller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Fetch,
    Create,
    Update,
    Delete,
    Search,
    DeleteAll,
}

impl OperationKind {
    pub const ALL: [Self; 6] = [
        Self::Fetch,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Search,
        Self::DeleteAll,
    ];

    /// Stable key used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::DeleteAll => "deleteAll",
        }
    }
}

/// Progress of one operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Success,
    Failure(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    state: LoadingState,
    expires_at: Option<Instant>,
}

/// Per-operation loading state registry.
#[derive(Debug, Clone, Default)]
pub struct LoadingTracker {
    entries: HashMap<OperationKind, Entry>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, operation: OperationKind, state: LoadingState) {
        self.entries.insert(
            operation,
            Entry {
                state,
                expires_at: None,
            },
        );
    }

    pub fn state(&self, operation: OperationKind) -> LoadingState {
        self.entries
            .get(&operation)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, operation: OperationKind) -> bool {
        self.entries
            .get(&operation)
            .is_some_and(|entry| entry.state.is_loading())
    }

    /// Whether any operation is running; callers disable mutations while true.
    pub fn is_any_loading(&self) -> bool {
        self.entries.values().any(|entry| entry.state.is_loading())
    }

    pub fn clear(&mut self, operation: OperationKind) {
        self.set_state(operation, LoadingState::Idle);
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn start(&mut self, operation: OperationKind) {
        self.set_state(operation, LoadingState::Loading);
    }

    /// Settles `operation` as success or failure (with message). Either
    /// outcome clears after `SUCCESS_CLEAR_DELAY`.
    pub fn finish(&mut self, operation: OperationKind, outcome: Result<(), String>) {
        let state = match outcome {
            Ok(()) => LoadingState::Success,
            Err(message) => failure(message),
        };
        self.settle(operation, state, SUCCESS_CLEAR_DELAY);
    }

    /// Records `error` as the failure of `operation` and logs it. The failure
    /// stays visible for `FAILURE_CLEAR_DELAY`.
    pub fn handle_error(&mut self, operation: OperationKind, error: &dyn Display) {
        warn!(
            "event=operation_failed module=service status=error operation={} error={}",
            operation.as_str(),
            error
        );
        self.settle(operation, failure(error.to_string()), FAILURE_CLEAR_DELAY);
    }

    fn settle(&mut self, operation: OperationKind, state: LoadingState, delay: Duration) {
        self.entries.insert(
            operation,
            Entry {
                state,
                expires_at: Some(Instant::now() + delay),
            },
        );
    }

    /// Resets every settled state whose delay has elapsed at `now`.
    pub fn clear_expired(&mut self, now: Instant) {
        for entry in self.entries.values_mut() {
            if entry.expires_at.is_some_and(|expires_at| expires_at <= now) {
                entry.state = LoadingState::Idle;
                entry.expires_at = None;
            }
        }
    }

    /// Runs `task` with `operation` marked as loading.
    ///
    /// Returns `None` on failure; the error is logged and kept as the
    /// operation's failure state.
    pub fn perform<T, E: Display>(
        &mut self,
        operation: OperationKind,
        task: impl FnOnce() -> Result<T, E>,
    ) -> Option<T> {
        self.start(operation);
        match task() {
            Ok(value) => {
                self.finish(operation, Ok(()));
                Some(value)
            }
            Err(err) => {
                self.handle_error(operation, &err);
                None
            }
        }
    }
}

fn failure(message: String) -> LoadingState {
    if message.trim().is_empty() {
        LoadingState::Failure(UNKNOWN_FAILURE.to_string())
    } else {
        LoadingState::Failure(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        LoadingState, LoadingTracker, OperationKind, FAILURE_CLEAR_DELAY, SUCCESS_CLEAR_DELAY,
    };
    use std::time::{Duration, Instant};

    #[test]
    fn unknown_operations_are_idle() {
        let tracker = LoadingTracker::new();
        for operation in OperationKind::ALL {
            assert_eq!(tracker.state(operation), LoadingState::Idle);
        }
        assert!(!tracker.is_any_loading());
    }

    #[test]
    fn perform_marks_success_and_returns_value() {
        let mut tracker = LoadingTracker::new();
        let value = tracker.perform(OperationKind::Create, || Ok::<_, String>(7));
        assert_eq!(value, Some(7));
        assert!(tracker.state(OperationKind::Create).is_success());
        assert!(!tracker.is_any_loading());
    }

    #[test]
    fn perform_records_failure_message() {
        let mut tracker = LoadingTracker::new();
        let value: Option<()> =
            tracker.perform(OperationKind::Delete, || Err("delete failed: locked"));
        assert_eq!(value, None);
        assert_eq!(
            tracker.state(OperationKind::Delete).error_message(),
            Some("delete failed: locked")
        );
    }

    #[test]
    fn start_marks_only_that_operation_loading() {
        let mut tracker = LoadingTracker::new();
        tracker.start(OperationKind::Fetch);
        assert!(tracker.is_loading(OperationKind::Fetch));
        assert!(tracker.is_any_loading());
        assert!(!tracker.is_loading(OperationKind::Search));
    }

    #[test]
    fn blank_failure_message_falls_back_to_unknown() {
        let mut tracker = LoadingTracker::new();
        tracker.finish(OperationKind::Update, Err("  ".to_string()));
        assert_eq!(
            tracker.state(OperationKind::Update),
            LoadingState::Failure("unknown error".to_string())
        );
    }

    #[test]
    fn finished_states_expire_after_the_short_delay() {
        let mut tracker = LoadingTracker::new();
        tracker.finish(OperationKind::Create, Ok(()));
        tracker.finish(OperationKind::Delete, Err("boom".to_string()));
        let settled_at = Instant::now();

        tracker.clear_expired(settled_at + SUCCESS_CLEAR_DELAY - Duration::from_millis(500));
        assert!(tracker.state(OperationKind::Create).is_success());
        assert!(tracker.state(OperationKind::Delete).is_failure());

        tracker.clear_expired(settled_at + SUCCESS_CLEAR_DELAY + Duration::from_millis(10));
        assert_eq!(tracker.state(OperationKind::Create), LoadingState::Idle);
        assert_eq!(tracker.state(OperationKind::Delete), LoadingState::Idle);
    }

    #[test]
    fn handled_errors_stay_visible_longer() {
        let mut tracker = LoadingTracker::new();
        tracker.handle_error(OperationKind::Search, &"index busy");
        let settled_at = Instant::now();

        tracker.clear_expired(settled_at + SUCCESS_CLEAR_DELAY + Duration::from_millis(10));
        assert_eq!(
            tracker.state(OperationKind::Search).error_message(),
            Some("index busy")
        );

        tracker.clear_expired(settled_at + FAILURE_CLEAR_DELAY + Duration::from_millis(10));
        assert_eq!(tracker.state(OperationKind::Search), LoadingState::Idle);
    }

    #[test]
    fn manually_set_states_do_not_expire() {
        let mut tracker = LoadingTracker::new();
        tracker.set_state(OperationKind::Fetch, LoadingState::Loading);
        tracker.clear_expired(Instant::now() + Duration::from_secs(60));
        assert!(tracker.is_loading(OperationKind::Fetch));

        tracker.clear_all();
        assert!(!tracker.is_any_loading());
    }

    #[test]
    fn operation_keys_are_stable() {
        let keys: Vec<&str> = OperationKind::ALL.iter().map(|op| op.as_str()).collect();
        assert_eq!(
            keys,
            vec!["fetch", "create", "update", "delete", "search", "deleteAll"]
        );
    }
}
