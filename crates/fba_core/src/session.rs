//! The session gate.
//!
//! Edit-mode entry is conditional on an authenticated session, and loss of
//! the session - however it happens, including passive expiry observed
//! asynchronously - forces edit mode back off. The gate is an explicit state
//! container notifying through the shared event registry, not a bare global.

use std::sync::Arc;

use crate::error::{FbaError, Result};
use crate::event::AdminEvent;
use crate::gateway::Session;
use crate::notify::CallbackRegistry;

/// Authentication state of the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No authenticated session exists.
    LoggedOut,
    /// An authenticated session exists.
    LoggedIn,
}

/// Gatekeeper for edit mode.
#[derive(Debug)]
pub struct SessionGate {
    session: Option<Session>,
    edit_mode: bool,
    events: Arc<CallbackRegistry<AdminEvent>>,
}

impl SessionGate {
    /// Create a gate in the logged-out, edit-mode-off state.
    pub fn new(events: Arc<CallbackRegistry<AdminEvent>>) -> Self {
        Self {
            session: None,
            edit_mode: false,
            events,
        }
    }

    /// Current authentication state.
    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Whether an authenticated session exists.
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether edit mode is active.
    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Record a session transition observed from the gateway.
    ///
    /// Passing `None` models logout or expiry; if edit mode is on it is
    /// forced off as a side effect, regardless of what caused the loss.
    pub fn set_session(&mut self, session: Option<Session>) {
        let was_logged_in = self.is_logged_in();
        self.session = session;
        let logged_in = self.is_logged_in();

        if was_logged_in != logged_in {
            self.events.emit(&AdminEvent::session_changed(logged_in));
        }

        if !logged_in && self.edit_mode {
            self.edit_mode = false;
            self.events.emit(&AdminEvent::edit_mode_changed(false));
        }
    }

    /// Switch edit mode on or off.
    ///
    /// Turning edit mode on requires a session and fails with
    /// [`FbaError::NotAuthenticated`] without one; turning it off is always
    /// allowed. Returns whether the flag actually changed.
    pub fn set_edit_mode(&mut self, on: bool) -> Result<bool> {
        if on && !self.is_logged_in() {
            return Err(FbaError::NotAuthenticated);
        }
        if self.edit_mode == on {
            return Ok(false);
        }
        self.edit_mode = on;
        self.events.emit(&AdminEvent::edit_mode_changed(on));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn session() -> Session {
        Session {
            access_token: "token".to_string(),
            user_id: "user-1".to_string(),
            email: None,
            expires_at: None,
        }
    }

    fn gate_with_log() -> (SessionGate, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(CallbackRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        events.subscribe(Arc::new(move |event: &AdminEvent| {
            log_clone.lock().unwrap().push(event.event_type().to_string());
        }));
        (SessionGate::new(events), log)
    }

    #[test]
    fn test_entry_requires_session() {
        let (mut gate, _log) = gate_with_log();

        assert!(matches!(
            gate.set_edit_mode(true),
            Err(FbaError::NotAuthenticated)
        ));
        assert!(!gate.is_edit_mode());

        gate.set_session(Some(session()));
        assert!(gate.set_edit_mode(true).unwrap());
        assert!(gate.is_edit_mode());
    }

    #[test]
    fn test_turning_off_always_allowed() {
        let (mut gate, _log) = gate_with_log();
        assert!(!gate.set_edit_mode(false).unwrap());
    }

    // Session loss - simulated expiry included - flips edit mode off
    // without any explicit setter call.
    #[test]
    fn test_session_loss_forces_exit() {
        let (mut gate, log) = gate_with_log();

        gate.set_session(Some(session()));
        gate.set_edit_mode(true).unwrap();
        assert!(gate.is_edit_mode());

        gate.set_session(None);
        assert!(!gate.is_edit_mode());
        assert_eq!(gate.state(), SessionState::LoggedOut);

        let entries = log.lock().unwrap();
        assert_eq!(
            entries.as_slice(),
            [
                "SessionChanged",
                "EditModeChanged",
                "SessionChanged",
                "EditModeChanged"
            ]
        );
    }

    #[test]
    fn test_no_duplicate_notifications() {
        let (mut gate, log) = gate_with_log();

        gate.set_session(Some(session()));
        gate.set_session(Some(session()));
        gate.set_edit_mode(true).unwrap();
        assert!(!gate.set_edit_mode(true).unwrap());

        let entries = log.lock().unwrap();
        assert_eq!(entries.as_slice(), ["SessionChanged", "EditModeChanged"]);
    }
}
