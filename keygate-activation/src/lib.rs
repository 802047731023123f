//! Key activation and binding for Keygate.
//!
//! This crate handles:
//! - Durable key → identifier bindings in a single JSON file
//! - Authority lists deciding which keys may be activated
//! - First-write-wins activation with idempotent re-verification
//! - Administrative listing and revocation of bindings
//!
//! # Binding Lifecycle
//!
//! A key is **unbound** until its first successful activation, after which it
//! is **bound** to exactly one identifier. Only an explicit
//! [`ActivationService::remove_binding`] returns it to unbound, at which point
//! any identifier may claim it again.
//!
//! # Store Format
//!
//! The store file is a flat JSON object: `{"KEY": "identifier", ...}`.

mod authority;
mod error;
mod service;
mod store;

pub use authority::{
    parse_authority_list, AuthorityList, AuthoritySource, OpenAuthority, StaticAuthority,
};
pub use error::{ActivationError, ActivationResult};
pub use service::{ActivationOutcome, ActivationService};
pub use store::{BindingStore, Bindings};

#[cfg(feature = "online")]
pub use authority::{HttpAuthority, DEFAULT_AUTHORITY_TIMEOUT};
