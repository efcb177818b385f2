//! Positional image channel.
//!
//! A single-pass cursor over a flat sequence of optional binary blobs,
//! advanced exactly once per update record visited, in the same pre-order as
//! the reconciliation recursion (parent before children, siblings in
//! submission order). Callers size the channel to the total record count of
//! the submitted tree, rejected records included; advancing past the end is
//! an error, never silent realignment.

use thiserror::Error;

/// Three-way classification of one channel slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSlot {
    /// Absent blob: leave the item's image as it is.
    Keep,
    /// Present but empty blob: clear the item's image.
    Clear,
    /// Present non-empty blob: create or replace the item's image.
    Replace(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("image channel exhausted: slot {requested} requested, {provided} provided")]
    Exhausted { requested: usize, provided: usize },
}

/// Read-once cursor over the submitted blobs.
#[derive(Debug, Default)]
pub struct ImageChannel {
    blobs: Vec<Option<Vec<u8>>>,
    cursor: usize,
}

impl ImageChannel {
    #[must_use]
    pub fn new(blobs: Vec<Option<Vec<u8>>>) -> Self {
        Self { blobs, cursor: 0 }
    }

    /// An empty channel, for batches carrying no image slots.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pull and classify the next slot.
    ///
    /// The blob is moved out of the channel; a slot can never be read twice.
    ///
    /// # Errors
    ///
    /// [`ChannelError::Exhausted`] when the caller advances past the end,
    /// which means the channel was sized smaller than the record count of
    /// the submitted tree.
    pub fn next(&mut self) -> Result<ImageSlot, ChannelError> {
        let Some(entry) = self.blobs.get_mut(self.cursor) else {
            return Err(ChannelError::Exhausted {
                requested: self.cursor,
                provided: self.blobs.len(),
            });
        };
        let blob = entry.take();
        self.cursor += 1;
        Ok(match blob {
            None => ImageSlot::Keep,
            Some(bytes) if bytes.is_empty() => ImageSlot::Clear,
            Some(bytes) => ImageSlot::Replace(bytes),
        })
    }

    /// Number of slots consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }

    /// Number of slots not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.blobs.len() - self.cursor
    }
}
