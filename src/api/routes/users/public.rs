//! Public types for the users API

/// Profile of a known identity.
pub use crate::identity::Traits as User;
