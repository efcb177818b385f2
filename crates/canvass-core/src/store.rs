//! Persistence and image-store seams.
//!
//! The engine is written against these traits only; `canvass-store` provides
//! the SQLite + filesystem implementation, and tests substitute in-memory
//! fakes. All methods are blocking and run inside whatever transaction
//! boundary the caller establishes.

use anyhow::Result;

use crate::model::form::{Faq, FormOption, FormQuestion, InfoCard, SliderLabel};
use crate::model::image::ImageRef;
use crate::model::testing::{Phase, Protocol, TestGroup, TestOption, TestQuestion};

/// CRUD over one entity's collection.
pub trait Repo<T> {
    /// All items under `parent`, ordered by `ord`. Global collections
    /// (FAQs, info cards, test groups) ignore `parent`.
    fn find_all(&self, parent: Option<i64>) -> Result<Vec<T>>;

    fn find_by_id(&self, id: i64) -> Result<Option<T>>;

    /// Insert when the item has no id (assigning one), update otherwise.
    /// Returns the item's id; on insert the item is mutated to carry it.
    fn save(&self, item: &mut T) -> Result<i64>;

    fn delete(&self, id: i64) -> Result<()>;
}

/// Access to the repository for one entity type.
pub trait HasRepo<T> {
    fn repo(&self) -> &dyn Repo<T>;
}

/// Everything the reconciliation engine needs from a backing store.
pub trait SurveyStore:
    HasRepo<Faq>
    + HasRepo<InfoCard>
    + HasRepo<FormQuestion>
    + HasRepo<FormOption>
    + HasRepo<SliderLabel>
    + HasRepo<TestGroup>
    + HasRepo<Protocol>
    + HasRepo<Phase>
    + HasRepo<TestQuestion>
    + HasRepo<TestOption>
{
}

impl<S> SurveyStore for S where
    S: HasRepo<Faq>
        + HasRepo<InfoCard>
        + HasRepo<FormQuestion>
        + HasRepo<FormOption>
        + HasRepo<SliderLabel>
        + HasRepo<TestGroup>
        + HasRepo<Protocol>
        + HasRepo<Phase>
        + HasRepo<TestQuestion>
        + HasRepo<TestOption>
{
}

/// Binary image storage.
///
/// I/O errors here are fatal for the whole batch. Note that physical writes
/// and deletes are not transactional with the persistence layer: a later
/// failure in the same batch leaves files and rows desynchronized (the
/// caller's rollback covers rows only).
pub trait ImageStore {
    /// Overwrite the content at an existing storage key.
    fn save(&self, bytes: &[u8], path: &str) -> Result<()>;

    /// Store a new image under `<category>/<filename>` and return its
    /// reference.
    fn create_and_save(
        &self,
        bytes: &[u8],
        category: &str,
        filename: &str,
        alt: &str,
    ) -> Result<ImageRef>;

    /// Remove the content at a storage key.
    fn delete(&self, path: &str) -> Result<()>;

    /// Remove the content if no stored item references `image.path` any
    /// more. Returns whether a deletion happened.
    fn delete_if_unused(&self, image: &ImageRef) -> Result<bool>;

    /// Duplicate the content under a fresh storage key.
    fn clone_image(&self, image: &ImageRef) -> Result<ImageRef>;
}
