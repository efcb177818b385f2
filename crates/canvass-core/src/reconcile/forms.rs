//! Adapters and entry points for the form side: FAQs, info cards, and form
//! questions with their options and slider labels.

use anyhow::Result;

use crate::error::ValidationError;
use crate::model::form::{Faq, FormOption, FormQuestion, InfoCard, SliderLabel};
use crate::model::image::ImageRef;
use crate::store::SurveyStore;
use crate::update::{
    FaqUpdate, FormOptionUpdate, FormQuestionUpdate, InfoCardUpdate, SliderLabelUpdate,
};

use super::outcome::Outcomes;
use super::{Reconciler, Tracked};

const MAX_COLOR: u32 = 0xFF_FFFF;

fn require_text(
    value: &str,
    entity: &'static str,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyText { entity, field });
    }
    Ok(())
}

impl Tracked for Faq {
    type Update = FaqUpdate;
    const SCOPE: &'static str = "faq";
    const ENTITY: &'static str = "Faq";
    const IMAGE_CATEGORY: &'static str = "faq";

    fn update_id(update: &FaqUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &FaqUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &FaqUpdate) -> Result<(), ValidationError> {
        require_text(&update.question, Self::ENTITY, "question")?;
        require_text(&update.answer, Self::ENTITY, "answer")
    }

    fn build(_parent: Option<i64>, update: &FaqUpdate, ord: u32) -> Self {
        Self {
            id: None,
            ord,
            question: update.question.clone(),
            answer: update.answer.clone(),
            image: None,
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<i64> {
        None
    }

    fn ord(&self) -> u32 {
        self.ord
    }

    fn set_ord(&mut self, ord: u32) {
        self.ord = ord;
    }

    fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<ImageRef>) {
        self.image = image;
    }

    fn differs_from(&self, update: &FaqUpdate) -> bool {
        self.question != update.question || self.answer != update.answer
    }

    fn apply(&mut self, update: &FaqUpdate) {
        self.question.clone_from(&update.question);
        self.answer.clone_from(&update.answer);
    }
}

impl Tracked for InfoCard {
    type Update = InfoCardUpdate;
    const SCOPE: &'static str = "info_card";
    const ENTITY: &'static str = "Info card";
    const IMAGE_CATEGORY: &'static str = "info_card";

    fn update_id(update: &InfoCardUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &InfoCardUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &InfoCardUpdate) -> Result<(), ValidationError> {
        require_text(&update.title, Self::ENTITY, "title")?;
        if update.color > MAX_COLOR {
            return Err(ValidationError::ColorOutOfRange(update.color));
        }
        Ok(())
    }

    fn build(_parent: Option<i64>, update: &InfoCardUpdate, ord: u32) -> Self {
        Self {
            id: None,
            ord,
            title: update.title.clone(),
            body: update.body.clone(),
            color: update.color,
            image: None,
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<i64> {
        None
    }

    fn ord(&self) -> u32 {
        self.ord
    }

    fn set_ord(&mut self, ord: u32) {
        self.ord = ord;
    }

    fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<ImageRef>) {
        self.image = image;
    }

    fn differs_from(&self, update: &InfoCardUpdate) -> bool {
        self.title != update.title || self.body != update.body || self.color != update.color
    }

    fn apply(&mut self, update: &InfoCardUpdate) {
        self.title.clone_from(&update.title);
        self.body.clone_from(&update.body);
        self.color = update.color;
    }
}

impl Tracked for FormQuestion {
    type Update = FormQuestionUpdate;
    const SCOPE: &'static str = "question";
    const ENTITY: &'static str = "Question";
    const IMAGE_CATEGORY: &'static str = "form_question";

    fn update_id(update: &FormQuestionUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &FormQuestionUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &FormQuestionUpdate) -> Result<(), ValidationError> {
        require_text(&update.text, Self::ENTITY, "text")?;
        if let Some((min, max)) = update.payload.slider_bounds()
            && min >= max
        {
            return Err(ValidationError::SliderBounds { min, max });
        }
        Ok(())
    }

    fn build(parent: Option<i64>, update: &FormQuestionUpdate, ord: u32) -> Self {
        let (slider_min, slider_max) = match update.payload.slider_bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        Self {
            id: None,
            // The engine always supplies the parent for owned collections.
            form_id: parent.unwrap_or_default(),
            ord,
            text: update.text.clone(),
            required: update.required,
            kind: update.payload.kind(),
            slider_min,
            slider_max,
            image: None,
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<i64> {
        Some(self.form_id)
    }

    fn ord(&self) -> u32 {
        self.ord
    }

    fn set_ord(&mut self, ord: u32) {
        self.ord = ord;
    }

    fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<ImageRef>) {
        self.image = image;
    }

    fn differs_from(&self, update: &FormQuestionUpdate) -> bool {
        let (slider_min, slider_max) = match update.payload.slider_bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        self.text != update.text
            || self.required != update.required
            || self.kind != update.payload.kind()
            || self.slider_min != slider_min
            || self.slider_max != slider_max
    }

    fn apply(&mut self, update: &FormQuestionUpdate) {
        self.text.clone_from(&update.text);
        self.required = update.required;
        self.kind = update.payload.kind();
        (self.slider_min, self.slider_max) = match update.payload.slider_bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
    }
}

impl Tracked for FormOption {
    type Update = FormOptionUpdate;
    const SCOPE: &'static str = "option";
    const ENTITY: &'static str = "Option";
    const IMAGE_CATEGORY: &'static str = "form_option";

    fn update_id(update: &FormOptionUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &FormOptionUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &FormOptionUpdate) -> Result<(), ValidationError> {
        require_text(&update.text, Self::ENTITY, "text")
    }

    fn build(parent: Option<i64>, update: &FormOptionUpdate, ord: u32) -> Self {
        Self {
            id: None,
            question_id: parent.unwrap_or_default(),
            ord,
            text: update.text.clone(),
            image: None,
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<i64> {
        Some(self.question_id)
    }

    fn ord(&self) -> u32 {
        self.ord
    }

    fn set_ord(&mut self, ord: u32) {
        self.ord = ord;
    }

    fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<ImageRef>) {
        self.image = image;
    }

    fn differs_from(&self, update: &FormOptionUpdate) -> bool {
        self.text != update.text
    }

    fn apply(&mut self, update: &FormOptionUpdate) {
        self.text.clone_from(&update.text);
    }
}

impl Tracked for SliderLabel {
    type Update = SliderLabelUpdate;
    const SCOPE: &'static str = "slider_label";
    const ENTITY: &'static str = "Slider label";
    const IMAGE_CATEGORY: &'static str = "slider_label";

    fn update_id(update: &SliderLabelUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &SliderLabelUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &SliderLabelUpdate) -> Result<(), ValidationError> {
        require_text(&update.text, Self::ENTITY, "text")
    }

    fn build(parent: Option<i64>, update: &SliderLabelUpdate, ord: u32) -> Self {
        Self {
            id: None,
            question_id: parent.unwrap_or_default(),
            ord,
            text: update.text.clone(),
            image: None,
        }
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn parent_id(&self) -> Option<i64> {
        Some(self.question_id)
    }

    fn ord(&self) -> u32 {
        self.ord
    }

    fn set_ord(&mut self, ord: u32) {
        self.ord = ord;
    }

    fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: Option<ImageRef>) {
        self.image = image;
    }

    fn differs_from(&self, update: &SliderLabelUpdate) -> bool {
        self.text != update.text
    }

    fn apply(&mut self, update: &SliderLabelUpdate) {
        self.text.clone_from(&update.text);
    }
}

impl<S: SurveyStore> Reconciler<'_, S> {
    /// Reconcile the global FAQ collection.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile_collection`].
    pub fn reconcile_faqs(&mut self, updates: Option<&[FaqUpdate]>) -> Result<Outcomes> {
        let mut outcomes = Outcomes::new();
        self.reconcile_collection::<Faq, _, _>(
            None,
            "",
            updates,
            &mut outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )?;
        Ok(outcomes)
    }

    /// Reconcile the global info-card collection.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile_collection`].
    pub fn reconcile_info_cards(&mut self, updates: Option<&[InfoCardUpdate]>) -> Result<Outcomes> {
        let mut outcomes = Outcomes::new();
        self.reconcile_collection::<InfoCard, _, _>(
            None,
            "",
            updates,
            &mut outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )?;
        Ok(outcomes)
    }

    /// Reconcile one form's questions together with their options and
    /// slider labels.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile_collection`].
    pub fn reconcile_form(
        &mut self,
        form_id: i64,
        updates: Option<&[FormQuestionUpdate]>,
    ) -> Result<Outcomes> {
        let mut outcomes = Outcomes::new();
        self.reconcile_collection::<FormQuestion, _, _>(
            Some(form_id),
            "",
            updates,
            &mut outcomes,
            |rec, question, update, prefix, out| {
                rec.reconcile_question_children(question, update, prefix, out)
            },
            |rec, question, prefix, out| rec.sweep_question_children(question, prefix, out),
        )?;
        Ok(outcomes)
    }

    fn reconcile_question_children(
        &mut self,
        question: &FormQuestion,
        update: &FormQuestionUpdate,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        // Variants that carry no child list sweep the collection: switching
        // a select question to text deletes its options.
        self.reconcile_collection::<FormOption, _, _>(
            question.id,
            prefix,
            update.payload.options(),
            outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )?;
        self.reconcile_collection::<SliderLabel, _, _>(
            question.id,
            prefix,
            update.payload.labels(),
            outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )
    }

    fn sweep_question_children(
        &mut self,
        question: &FormQuestion,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<FormOption, _, _>(
            question.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )?;
        self.reconcile_collection::<SliderLabel, _, _>(
            question.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )
    }
}
