//! Stored entity types.
//!
//! Every entity shares the same tracked-item shape: an optional integer
//! identity (absent until first persisted), an ownership link to its parent,
//! a dense zero-based `ord` within the parent's collection, entity-specific
//! fields, and an optional [`image::ImageRef`].

pub mod form;
pub mod image;
pub mod testing;
