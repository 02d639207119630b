//! The session gate.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::session::credentials::CredentialVerifier;
use crate::session::error::SessionError;
use crate::session::User;
use crate::store::{Collections, Store};

/// Observer notified after the session marker changes.
///
/// Listeners should re-read whatever they need; the only guarantee is that
/// the signal arrives after the write that changed the session.
pub trait SessionListener: Send + Sync {
    /// Called with the new session, or `None` after sign-out.
    fn on_session_change(&self, session: Option<&User>);
}

impl<F> SessionListener for F
where
    F: Fn(Option<&User>) + Send + Sync,
{
    fn on_session_change(&self, session: Option<&User>) {
        self(session);
    }
}

/// Validates credentials and records the current-user marker.
pub struct SessionGate<S, V> {
    store: S,
    verifier: V,
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,
}

impl<S: Store, V: CredentialVerifier> SessionGate<S, V> {
    /// Creates a gate over `store` that accepts what `verifier` accepts.
    pub fn new(store: S, verifier: V) -> Self {
        Self {
            store,
            verifier,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Registers a listener for session changes.
    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.write().push(listener);
    }

    /// Checks the pair and, on success, records and returns the session.
    ///
    /// A rejected pair returns `AuthFailure` and leaves any existing
    /// session untouched.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let Some(role) = self.verifier.verify(username, password)? else {
            warn!(username, "Login rejected");
            return Err(SessionError::AuthFailure);
        };

        let user = User {
            username: username.to_string(),
            role,
        };
        Collections::new(&self.store).save_current_user(&user)?;
        info!(username, role = %role, "Signed in");

        self.notify(Some(&user));
        Ok(user)
    }

    /// Returns the recorded session, if any.
    pub fn current_session(&self) -> Result<Option<User>, SessionError> {
        Ok(Collections::new(&self.store).current_user()?)
    }

    /// Returns the recorded session or `NotSignedIn`.
    pub fn require_session(&self) -> Result<User, SessionError> {
        self.current_session()?.ok_or(SessionError::NotSignedIn)
    }

    /// Clears the session marker and notifies listeners.
    pub fn end_session(&self) -> Result<(), SessionError> {
        Collections::new(&self.store).clear_current_user()?;
        info!("Signed out");

        self.notify(None);
        Ok(())
    }

    fn notify(&self, session: Option<&User>) {
        // Snapshot so a listener may subscribe others without deadlocking.
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_session_change(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{StaticCredentials, UserRole};
    use crate::store::{CollectionKey, MemoryStore};
    use parking_lot::Mutex;

    fn gate() -> SessionGate<MemoryStore, StaticCredentials> {
        SessionGate::new(MemoryStore::new(), StaticCredentials::default())
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Option<String>>>,
    }

    impl SessionListener for Recorder {
        fn on_session_change(&self, session: Option<&User>) {
            self.seen.lock().push(session.map(|u| u.username.clone()));
        }
    }

    #[test]
    fn test_authenticate_admin_creates_session() {
        let gate = gate();
        let user = gate.authenticate("admin", "admin123").unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(gate.current_session().unwrap(), Some(user));
    }

    #[test]
    fn test_wrong_pair_fails_without_session() {
        let gate = gate();
        let err = gate.authenticate("admin", "wrong").unwrap_err();
        assert!(matches!(err, SessionError::AuthFailure));
        assert!(gate.current_session().unwrap().is_none());
        assert!(gate.store.get(CollectionKey::User).unwrap().is_none());
    }

    #[test]
    fn test_failed_login_keeps_existing_session() {
        let gate = gate();
        let user = gate.authenticate("admin", "admin123").unwrap();
        assert!(gate.authenticate("mallory", "admin123").is_err());
        assert_eq!(gate.current_session().unwrap(), Some(user));
    }

    #[test]
    fn test_end_session_clears_marker() {
        let gate = gate();
        gate.authenticate("admin", "admin123").unwrap();
        gate.end_session().unwrap();
        assert!(gate.current_session().unwrap().is_none());
        assert!(matches!(
            gate.require_session(),
            Err(SessionError::NotSignedIn)
        ));
    }

    #[test]
    fn test_listeners_signaled_after_changes_only() {
        let gate = gate();
        let recorder = Arc::new(Recorder::default());
        gate.subscribe(recorder.clone());

        gate.authenticate("admin", "admin123").unwrap();
        let _ = gate.authenticate("admin", "nope");
        gate.end_session().unwrap();

        assert_eq!(
            *recorder.seen.lock(),
            vec![Some("admin".to_string()), None]
        );
    }

    #[test]
    fn test_listener_sees_written_state() {
        let store = Arc::new(MemoryStore::new());
        let gate = SessionGate::new(Arc::clone(&store), StaticCredentials::default());
        let observed = Arc::new(Mutex::new(None));

        let probe_store = Arc::clone(&store);
        let probe = Arc::clone(&observed);
        gate.subscribe(Arc::new(move |_: Option<&User>| {
            let marker = Collections::new(&*probe_store).current_user().unwrap();
            *probe.lock() = marker.map(|u| u.username);
        }));

        gate.authenticate("admin", "admin123").unwrap();
        assert_eq!(observed.lock().as_deref(), Some("admin"));
    }
}
