//! Database entity models for the self-hosted backend.
//!
//! These Sea-ORM entities define the tables behind
//! [`SeaOrmClient`](crate::SeaOrmClient): the identities managed by the auth
//! side, the application profiles carrying roles, and the country reference
//! list shown to administrators.

/// Registered identities with password hashes and confirmation state.
pub mod identity;

/// One profile per identity, carrying the role.
pub mod user_profile;

/// Read-only country reference data.
pub mod country;
