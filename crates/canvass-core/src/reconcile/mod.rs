//! Batch reconciliation engine.
//!
//! One pass merges a submitted update batch against a stored collection,
//! deciding per item whether to create, update, leave untouched, or delete,
//! reassigning dense `0..n-1` orders in submission sequence, and
//! synchronizing optional images through the positional [`channel`].
//!
//! The pass is generic over the [`Tracked`] entity adapter; the per-entity
//! wiring (which child collections to recurse into, and with which slice of
//! the update record) lives in [`forms`] and [`testing`].
//!
//! Alignment contract: exactly one channel slot is consumed per update
//! record at the point the record is visited, before recursing into its
//! children — including records rejected as not found. A rejected record
//! therefore still burns its order index and its image slot, so subsequent
//! records land where the client intended.

pub mod channel;
pub mod forms;
pub mod outcome;
pub mod testing;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ValidationError;
use crate::model::image::ImageRef;
use crate::store::{HasRepo, ImageStore};
use channel::{ImageChannel, ImageSlot};
use outcome::{ItemOutcome, Outcomes};

/// Adapter between one entity type and the generic reconciliation pass.
///
/// Implementations hold no state; `differs_from` is the pure field-level
/// change detector, comparing every persisted scalar field against the
/// corresponding update field by value.
pub trait Tracked: Clone {
    type Update;

    /// Result-key scope, e.g. `question`.
    const SCOPE: &'static str;
    /// Human-facing entity name used in "not found" outcomes.
    const ENTITY: &'static str;
    /// Image storage category. Unique per entity type: scopes may repeat
    /// across the form and test trees (`question`, `option`), but storage
    /// keys must not, or one tree's image overwrites the other's.
    const IMAGE_CATEGORY: &'static str;

    fn update_id(update: &Self::Update) -> Option<i64>;
    fn image_alt(update: &Self::Update) -> Option<&str>;

    /// Domain constraints checked before any persistence in the item's
    /// subtree.
    fn validate(update: &Self::Update) -> Result<(), ValidationError>;

    /// A fresh unpersisted item from a create record.
    fn build(parent: Option<i64>, update: &Self::Update, ord: u32) -> Self;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
    fn parent_id(&self) -> Option<i64>;
    fn ord(&self) -> u32;
    fn set_ord(&mut self, ord: u32);
    fn image(&self) -> Option<&ImageRef>;
    fn set_image(&mut self, image: Option<ImageRef>);

    /// Whether any persisted field differs from the update record.
    fn differs_from(&self, update: &Self::Update) -> bool;

    /// Copy the update record's field values onto the item.
    fn apply(&mut self, update: &Self::Update);
}

/// Reconciles submitted batches against a backing store.
///
/// One `Reconciler` serves one logical unit of work: the channel is shared
/// across every entry-point call made for the same enclosing request, so
/// slots line up with the full submitted tree.
pub struct Reconciler<'a, S> {
    store: &'a S,
    images: &'a dyn ImageStore,
    channel: &'a mut ImageChannel,
}

impl<'a, S> Reconciler<'a, S> {
    pub fn new(store: &'a S, images: &'a dyn ImageStore, channel: &'a mut ImageChannel) -> Self {
        Self {
            store,
            images,
            channel,
        }
    }

    /// Channel slots consumed so far by this unit of work.
    #[must_use]
    pub const fn slots_consumed(&self) -> usize {
        self.channel.consumed()
    }

    /// Reconcile one collection under `parent`.
    ///
    /// `updates = None` is the delete-everything sentinel: no records are
    /// visited and every stored item is swept.
    ///
    /// `recurse` is invoked for each created or matched record (after its
    /// channel slot, so children consume later slots); `sweep_children` for
    /// each swept item, before its own row is deleted.
    ///
    /// # Errors
    ///
    /// Storage and image I/O failures, channel exhaustion, and validation
    /// failures abort the batch. "Not found" and "no changes" never do;
    /// they are recorded in `outcomes`.
    pub fn reconcile_collection<T, FChild, FSweep>(
        &mut self,
        parent: Option<i64>,
        prefix: &str,
        updates: Option<&[T::Update]>,
        outcomes: &mut Outcomes,
        mut recurse: FChild,
        mut sweep_children: FSweep,
    ) -> Result<()>
    where
        T: Tracked,
        S: HasRepo<T>,
        FChild: FnMut(&mut Self, &T, &T::Update, &str, &mut Outcomes) -> Result<()>,
        FSweep: FnMut(&mut Self, &T, &str, &mut Outcomes) -> Result<()>,
    {
        let store: &'a S = self.store;
        let repo = store.repo();

        let existing = repo
            .find_all(parent)
            .with_context(|| format!("load {} collection", T::SCOPE))?;
        let mut stored: BTreeMap<i64, T> = existing
            .into_iter()
            .filter_map(|item| item.id().map(|id| (id, item)))
            .collect();
        let mut processed: BTreeMap<i64, bool> =
            stored.keys().map(|id| (*id, false)).collect();

        for (index, record) in updates.unwrap_or_default().iter().enumerate() {
            // One slot per record, before anything else can reject it.
            let slot = self
                .channel
                .next()
                .with_context(|| format!("image slot for {} record {index}", T::SCOPE))?;
            let ord = u32::try_from(index).context("order index overflow")?;

            match T::update_id(record) {
                None => {
                    T::validate(record)?;
                    let mut item = T::build(parent, record, ord);
                    let id = repo
                        .save(&mut item)
                        .with_context(|| format!("insert {}", T::SCOPE))?;
                    if let ImageSlot::Replace(bytes) = &slot {
                        let alt = T::image_alt(record).unwrap_or_default();
                        let image = self
                            .images
                            .create_and_save(
                                bytes,
                                T::IMAGE_CATEGORY,
                                &format!("{}_{id}", T::IMAGE_CATEGORY),
                                alt,
                            )
                            .with_context(|| format!("store image for {} {id}", T::SCOPE))?;
                        item.set_image(Some(image));
                        repo.save(&mut item)
                            .with_context(|| format!("attach image to {} {id}", T::SCOPE))?;
                    }
                    debug!(scope = T::SCOPE, id, ord, "created");
                    let key = format!("{prefix}{}_new_{index}", T::SCOPE);
                    let child_prefix = format!("{key}_");
                    outcomes.insert(key, ItemOutcome::Created { id });
                    recurse(self, &item, record, &child_prefix, outcomes)?;
                }
                Some(id) => {
                    let key = format!("{prefix}{}_{id}", T::SCOPE);
                    let Some(item) = stored.get_mut(&id) else {
                        debug!(scope = T::SCOPE, id, "record references unknown id");
                        outcomes.insert(key, ItemOutcome::NotFound { entity: T::ENTITY });
                        continue;
                    };
                    T::validate(record)?;

                    let fields_changed = item.differs_from(record);
                    let ord_changed = item.ord() != ord;
                    let image_changed = !matches!(slot, ImageSlot::Keep);

                    if fields_changed || ord_changed || image_changed {
                        item.apply(record);
                        item.set_ord(ord);
                        match slot {
                            ImageSlot::Clear => {
                                let detached = item.image().cloned();
                                item.set_image(None);
                                repo.save(item)
                                    .with_context(|| format!("update {} {id}", T::SCOPE))?;
                                if let Some(old) = detached {
                                    self.images.delete_if_unused(&old).with_context(|| {
                                        format!("drop image of {} {id}", T::SCOPE)
                                    })?;
                                }
                            }
                            ImageSlot::Replace(bytes) => {
                                let alt = T::image_alt(record)
                                    .map(str::to_owned)
                                    .or_else(|| item.image().map(|img| img.alt.clone()))
                                    .unwrap_or_default();
                                let image = match item.image() {
                                    Some(current) => {
                                        // Same owner: replace content in place.
                                        self.images.save(&bytes, &current.path).with_context(
                                            || format!("replace image of {} {id}", T::SCOPE),
                                        )?;
                                        ImageRef::new(current.path.clone(), alt)
                                    }
                                    None => self
                                        .images
                                        .create_and_save(
                                            &bytes,
                                            T::IMAGE_CATEGORY,
                                            &format!("{}_{id}", T::IMAGE_CATEGORY),
                                            &alt,
                                        )
                                        .with_context(|| {
                                            format!("store image for {} {id}", T::SCOPE)
                                        })?,
                                };
                                item.set_image(Some(image));
                                repo.save(item)
                                    .with_context(|| format!("update {} {id}", T::SCOPE))?;
                            }
                            ImageSlot::Keep => {
                                repo.save(item)
                                    .with_context(|| format!("update {} {id}", T::SCOPE))?;
                            }
                        }
                        debug!(scope = T::SCOPE, id, ord, "updated");
                        outcomes.insert(key.clone(), ItemOutcome::Updated);
                    } else {
                        outcomes.insert(key.clone(), ItemOutcome::Unchanged);
                    }
                    processed.insert(id, true);

                    // Children reconcile even when the item itself was
                    // untouched: a question's text can stay while its
                    // options change.
                    let snapshot = item.clone();
                    recurse(self, &snapshot, record, &format!("{key}_"), outcomes)?;
                }
            }
        }

        // Sweep: every stored item the batch did not reference goes away,
        // children first, image last (the count query must not see the row).
        for (id, item) in &stored {
            if processed.get(id).copied().unwrap_or(false) {
                continue;
            }
            let key = format!("{prefix}{}_{id}", T::SCOPE);
            sweep_children(self, item, &format!("{key}_"), outcomes)?;
            repo.delete(*id)
                .with_context(|| format!("delete {} {id}", T::SCOPE))?;
            if let Some(image) = item.image() {
                self.images
                    .delete_if_unused(image)
                    .with_context(|| format!("drop image of {} {id}", T::SCOPE))?;
            }
            debug!(scope = T::SCOPE, id, "swept");
            outcomes.insert(key, ItemOutcome::Deleted);
        }

        Ok(())
    }
}
