//! Secure sharing: capability-token links for anonymous property viewing.
//!
//! The issuer mints grants for staff; the resolver serves anonymous visitors.
//! Between them sits the grant's state machine (`Valid`, `Expired`,
//! `Exhausted`) evaluated in [`propmedia_core::models::ShareGrant::status_at`].

pub mod issuer;
pub mod redaction;
pub mod resolver;
