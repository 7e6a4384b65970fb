//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity modification.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an entity being added to a collection.
#[derive(Clone, Copy, Debug)]
pub struct Addition;

/// Marker type describing an entity being viewed.
#[derive(Clone, Copy, Debug)]
pub struct View;
