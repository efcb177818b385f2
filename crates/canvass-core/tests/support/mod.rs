//! In-memory store fake shared by the engine integration tests.
//!
//! Mirrors the seam traits of `canvass_core::store` with `RefCell`-backed
//! maps so scenarios run without SQLite or a filesystem.

#![allow(dead_code)]

use anyhow::Result;
use canvass_core::model::form::{Faq, FormOption, FormQuestion, InfoCard, SliderLabel};
use canvass_core::model::image::ImageRef;
use canvass_core::model::testing::{Phase, Protocol, TestGroup, TestOption, TestQuestion};
use canvass_core::reconcile::Tracked;
use canvass_core::store::{HasRepo, ImageStore, Repo};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub struct MemRepo<T> {
    items: RefCell<BTreeMap<i64, T>>,
    next_id: Cell<i64>,
}

impl<T: Tracked> MemRepo<T> {
    fn new() -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Seed a stored item directly, assigning an id when absent.
    pub fn seed(&self, mut item: T) -> i64 {
        let id = item.id().unwrap_or_else(|| {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        });
        item.set_id(id);
        self.next_id.set(self.next_id.get().max(id + 1));
        self.items.borrow_mut().insert(id, item);
        id
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.items.borrow().get(&id).cloned()
    }

    pub fn all(&self) -> Vec<T> {
        let mut items: Vec<T> = self.items.borrow().values().cloned().collect();
        items.sort_by_key(Tracked::ord);
        items
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

impl<T: Tracked> Repo<T> for MemRepo<T> {
    fn find_all(&self, parent: Option<i64>) -> Result<Vec<T>> {
        let mut items: Vec<T> = self
            .items
            .borrow()
            .values()
            .filter(|item| parent.is_none() || item.parent_id() == parent)
            .cloned()
            .collect();
        items.sort_by_key(Tracked::ord);
        Ok(items)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<T>> {
        Ok(self.items.borrow().get(&id).cloned())
    }

    fn save(&self, item: &mut T) -> Result<i64> {
        let id = match item.id() {
            Some(id) => id,
            None => {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                item.set_id(id);
                id
            }
        };
        self.items.borrow_mut().insert(id, item.clone());
        Ok(id)
    }

    fn delete(&self, id: i64) -> Result<()> {
        self.items.borrow_mut().remove(&id);
        Ok(())
    }
}

pub struct MemoryStore {
    pub faqs: MemRepo<Faq>,
    pub info_cards: MemRepo<InfoCard>,
    pub questions: MemRepo<FormQuestion>,
    pub options: MemRepo<FormOption>,
    pub slider_labels: MemRepo<SliderLabel>,
    pub groups: MemRepo<TestGroup>,
    pub protocols: MemRepo<Protocol>,
    pub phases: MemRepo<Phase>,
    pub test_questions: MemRepo<TestQuestion>,
    pub test_options: MemRepo<TestOption>,
    pub images: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            faqs: MemRepo::new(),
            info_cards: MemRepo::new(),
            questions: MemRepo::new(),
            options: MemRepo::new(),
            slider_labels: MemRepo::new(),
            groups: MemRepo::new(),
            protocols: MemRepo::new(),
            phases: MemRepo::new(),
            test_questions: MemRepo::new(),
            test_options: MemRepo::new(),
            images: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn has_image(&self, path: &str) -> bool {
        self.images.borrow().contains_key(path)
    }

    pub fn image_count(&self) -> usize {
        self.images.borrow().len()
    }

    fn image_used(&self, path: &str) -> bool {
        fn used<T: Tracked>(repo: &MemRepo<T>, path: &str) -> bool {
            repo.items
                .borrow()
                .values()
                .any(|item| item.image().is_some_and(|image| image.path == path))
        }
        used(&self.faqs, path)
            || used(&self.info_cards, path)
            || used(&self.questions, path)
            || used(&self.options, path)
            || used(&self.slider_labels, path)
            || used(&self.groups, path)
            || used(&self.protocols, path)
            || used(&self.phases, path)
            || used(&self.test_questions, path)
            || used(&self.test_options, path)
    }
}

impl HasRepo<Faq> for MemoryStore {
    fn repo(&self) -> &dyn Repo<Faq> {
        &self.faqs
    }
}

impl HasRepo<InfoCard> for MemoryStore {
    fn repo(&self) -> &dyn Repo<InfoCard> {
        &self.info_cards
    }
}

impl HasRepo<FormQuestion> for MemoryStore {
    fn repo(&self) -> &dyn Repo<FormQuestion> {
        &self.questions
    }
}

impl HasRepo<FormOption> for MemoryStore {
    fn repo(&self) -> &dyn Repo<FormOption> {
        &self.options
    }
}

impl HasRepo<SliderLabel> for MemoryStore {
    fn repo(&self) -> &dyn Repo<SliderLabel> {
        &self.slider_labels
    }
}

impl HasRepo<TestGroup> for MemoryStore {
    fn repo(&self) -> &dyn Repo<TestGroup> {
        &self.groups
    }
}

impl HasRepo<Protocol> for MemoryStore {
    fn repo(&self) -> &dyn Repo<Protocol> {
        &self.protocols
    }
}

impl HasRepo<Phase> for MemoryStore {
    fn repo(&self) -> &dyn Repo<Phase> {
        &self.phases
    }
}

impl HasRepo<TestQuestion> for MemoryStore {
    fn repo(&self) -> &dyn Repo<TestQuestion> {
        &self.test_questions
    }
}

impl HasRepo<TestOption> for MemoryStore {
    fn repo(&self) -> &dyn Repo<TestOption> {
        &self.test_options
    }
}

impl ImageStore for MemoryStore {
    fn save(&self, bytes: &[u8], path: &str) -> Result<()> {
        self.images
            .borrow_mut()
            .insert(path.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn create_and_save(
        &self,
        bytes: &[u8],
        category: &str,
        filename: &str,
        alt: &str,
    ) -> Result<ImageRef> {
        let path = format!("{category}/{filename}");
        self.images
            .borrow_mut()
            .insert(path.clone(), bytes.to_vec());
        Ok(ImageRef::new(path, alt))
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.images.borrow_mut().remove(path);
        Ok(())
    }

    fn delete_if_unused(&self, image: &ImageRef) -> Result<bool> {
        if self.image_used(&image.path) {
            return Ok(false);
        }
        Ok(self.images.borrow_mut().remove(&image.path).is_some())
    }

    fn clone_image(&self, image: &ImageRef) -> Result<ImageRef> {
        let bytes = self
            .images
            .borrow()
            .get(&image.path)
            .cloned()
            .unwrap_or_default();
        let path = format!("{}_copy", image.path);
        self.images.borrow_mut().insert(path.clone(), bytes);
        Ok(ImageRef::new(path, image.alt.clone()))
    }
}
