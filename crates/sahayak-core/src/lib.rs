pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod types;

pub use auth::{build_auth_gate, AuthGate, AuthState, MockAuthGate};
pub use config::SahayakConfig;
pub use error::{Result, SahayakError};
pub use features::{Feature, Route};
pub use types::*;
