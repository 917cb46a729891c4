//! Authentication gate.
//!
//! The chat core only needs to know whether somebody is signed in and with
//! which role. The gate is injected at startup from configuration; the mock
//! variant accepts a single demo credential.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::{AuthConfig, AuthMode};
use crate::error::{Result, SahayakError};
use crate::types::{Identity, UserProfile, DEFAULT_ROLE};

pub const DEMO_EMAIL: &str = "teacher@demo.com";
pub const DEMO_PASSWORD: &str = "demo123";

/// Current sign-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(Identity),
    Anonymous,
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            AuthState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Source of the current identity.
pub trait AuthGate: Send + Sync {
    /// Snapshot of the current state.
    fn current(&self) -> AuthState;

    /// Push-style stream of state changes. The receiver starts at the current state.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    fn sign_out(&self);

    /// Stored profile of the signed-in teacher, if any.
    fn profile(&self) -> Option<UserProfile>;
}

/// Build the gate selected by `config.mode`.
pub fn build_auth_gate(config: &AuthConfig) -> Result<Arc<dyn AuthGate>> {
    match config.mode {
        AuthMode::Mock => {
            let gate = MockAuthGate::new().with_profile(config.demo_profile.clone());
            if config.auto_sign_in {
                gate.sign_in(DEMO_EMAIL, DEMO_PASSWORD)?;
            }
            Ok(Arc::new(gate))
        }
        AuthMode::Disabled => Ok(Arc::new(DisabledAuthGate::new())),
    }
}

// =============================================================================
// MockAuthGate
// =============================================================================

/// Gate that signs in only the demo account.
#[derive(Debug)]
pub struct MockAuthGate {
    state: watch::Sender<AuthState>,
    profile: UserProfile,
}

impl Default for MockAuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        Self {
            state,
            profile: UserProfile::default(),
        }
    }

    /// Profile returned while the demo account is signed in.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    fn demo_identity() -> Identity {
        Identity {
            uid: "demo-teacher".to_string(),
            email: DEMO_EMAIL.to_string(),
            display_name: Some("Demo Teacher".to_string()),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

impl AuthGate for MockAuthGate {
    fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        if !email.trim().eq_ignore_ascii_case(DEMO_EMAIL) || password != DEMO_PASSWORD {
            tracing::warn!(email = %email.trim(), "Mock sign-in rejected");
            return Err(SahayakError::Auth("invalid email or password".to_string()));
        }
        let identity = Self::demo_identity();
        self.state
            .send_replace(AuthState::Authenticated(identity.clone()));
        tracing::info!(uid = %identity.uid, "Signed in with demo account");
        Ok(identity)
    }

    fn sign_out(&self) {
        let previous = self.state.send_replace(AuthState::Anonymous);
        if previous.is_authenticated() {
            tracing::info!("Signed out");
        }
    }

    fn profile(&self) -> Option<UserProfile> {
        if !self.state.borrow().is_authenticated() {
            return None;
        }
        let mut profile = self.profile.clone();
        profile.email.get_or_insert_with(|| DEMO_EMAIL.to_string());
        Some(profile)
    }
}

// =============================================================================
// DisabledAuthGate
// =============================================================================

/// Gate with no accounts. Always anonymous.
#[derive(Debug)]
pub struct DisabledAuthGate {
    state: watch::Sender<AuthState>,
}

impl Default for DisabledAuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl DisabledAuthGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        Self { state }
    }
}

impl AuthGate for DisabledAuthGate {
    fn current(&self) -> AuthState {
        AuthState::Anonymous
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity> {
        Err(SahayakError::Auth("authentication is disabled".to_string()))
    }

    fn sign_out(&self) {}

    fn profile(&self) -> Option<UserProfile> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_starts_anonymous() {
        let gate = MockAuthGate::new();
        assert_eq!(gate.current(), AuthState::Anonymous);
        assert!(gate.current().identity().is_none());
    }

    #[test]
    fn test_mock_accepts_demo_credential() {
        let gate = MockAuthGate::new();
        let identity = gate.sign_in("teacher@demo.com", "demo123").unwrap();
        assert_eq!(identity.email, DEMO_EMAIL);
        assert_eq!(identity.role, "teacher");
        assert!(gate.current().is_authenticated());
    }

    #[test]
    fn test_mock_email_is_case_and_space_insensitive() {
        let gate = MockAuthGate::new();
        assert!(gate.sign_in("  Teacher@Demo.com ", "demo123").is_ok());
    }

    #[test]
    fn test_mock_rejects_wrong_password() {
        let gate = MockAuthGate::new();
        let err = gate.sign_in(DEMO_EMAIL, "wrong").unwrap_err();
        assert!(matches!(err, SahayakError::Auth(_)));
        assert_eq!(gate.current(), AuthState::Anonymous);
    }

    #[test]
    fn test_mock_rejects_other_account() {
        let gate = MockAuthGate::new();
        assert!(gate.sign_in("someone@school.in", DEMO_PASSWORD).is_err());
    }

    #[tokio::test]
    async fn test_mock_pushes_state_changes() {
        let gate = MockAuthGate::new();
        let mut rx = gate.subscribe();
        assert_eq!(*rx.borrow(), AuthState::Anonymous);

        gate.sign_in(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        gate.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthState::Anonymous);
    }

    #[test]
    fn test_disabled_gate_never_authenticates() {
        let gate = DisabledAuthGate::new();
        assert!(gate.sign_in(DEMO_EMAIL, DEMO_PASSWORD).is_err());
        assert_eq!(gate.current(), AuthState::Anonymous);
        gate.sign_out();
        assert_eq!(*gate.subscribe().borrow(), AuthState::Anonymous);
    }

    #[test]
    fn test_build_from_config() {
        let gate = build_auth_gate(&AuthConfig::default()).unwrap();
        assert!(!gate.current().is_authenticated());

        let gate = build_auth_gate(&AuthConfig {
            mode: AuthMode::Mock,
            auto_sign_in: true,
            ..AuthConfig::default()
        })
        .unwrap();
        assert!(gate.current().is_authenticated());

        let gate = build_auth_gate(&AuthConfig {
            mode: AuthMode::Disabled,
            auto_sign_in: true,
            ..AuthConfig::default()
        })
        .unwrap();
        assert!(!gate.current().is_authenticated());
        assert!(gate.profile().is_none());
    }

    #[test]
    fn test_mock_profile_only_while_signed_in() {
        let gate = build_auth_gate(&AuthConfig {
            demo_profile: UserProfile {
                language: Some("kn".to_string()),
                ..UserProfile::default()
            },
            ..AuthConfig::default()
        })
        .unwrap();
        assert!(gate.profile().is_none());

        gate.sign_in(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        let profile = gate.profile().unwrap();
        assert_eq!(profile.language(), "kn");
        assert_eq!(profile.email.as_deref(), Some(DEMO_EMAIL));

        gate.sign_out();
        assert!(gate.profile().is_none());
    }
}
