//! canvass-store: SQLite persistence and filesystem image storage.
//!
//! [`SqliteStore`] implements every seam trait the engine consumes: the
//! per-entity repositories of `canvass_core::store` and the image store.
//! One value serves both roles, so a reconciliation call is wired as
//! `Reconciler::new(&store, &store, &mut channel)`.

pub mod db;
pub mod images;
pub mod repos;
pub mod schema;

pub use repos::SqliteStore;
