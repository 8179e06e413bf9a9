//! Application Layer
//!
//! Use cases and application services.

pub mod authenticator;
pub mod config;
pub mod credential_store;
pub mod csrf_guard;
pub mod session_binder;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use authenticator::Authenticator;
pub use config::AuthConfig;
pub use credential_store::CredentialStore;
pub use session_binder::{ExpirySweeper, LoadedSession, SessionBinder};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
