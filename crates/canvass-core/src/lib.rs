//! canvass-core: domain model and reconciliation engine for survey and test
//! configuration.
//!
//! Nested configuration trees (forms → questions → options / slider labels;
//! test groups → protocols → phases → questions → options) are edited by
//! submitting partial update batches. The [`reconcile`] module merges one
//! batch against stored state, deciding per item whether to create, update,
//! leave untouched, or delete, while an [`reconcile::channel::ImageChannel`]
//! carries optional binary attachments positionally alongside the batch.
//!
//! Persistence and image storage are consumed through the seam traits in
//! [`store`]; the `canvass-store` crate provides the SQLite + filesystem
//! implementation.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at orchestration seams, `thiserror` enums
//!   for typed leaf conditions. "Not found" and "no changes" are outcomes,
//!   never errors.
//! - **Logging**: `tracing` macros (`debug!`, `info!`, `warn!`).

pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod sampler;
pub mod store;
pub mod update;
