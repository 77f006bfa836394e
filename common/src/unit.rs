//! Marker types tagging [`DateTimeOf`] values.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Moment an entity was created.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Moment an entity was soft-deleted.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Moment an entity was last modified.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Moment a session expires.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
