//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the backend crates:
//! - Cryptographic utilities (random tokens, Base64, constant-time comparison)
//! - Password hashing (Argon2id with fixed cost parameters)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
