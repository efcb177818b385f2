//! Adapters and entry points for the test side:
//! test groups → protocols → phases → questions → options.

use anyhow::Result;

use crate::error::ValidationError;
use crate::model::image::ImageRef;
use crate::model::testing::{Phase, Protocol, TestGroup, TestOption, TestQuestion};
use crate::store::SurveyStore;
use crate::update::{
    PhaseUpdate, ProtocolUpdate, TestGroupUpdate, TestOptionUpdate, TestQuestionUpdate,
};

use super::outcome::Outcomes;
use super::{Reconciler, Tracked};

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

impl Tracked for TestGroup {
    type Update = TestGroupUpdate;
    const SCOPE: &'static str = "group";
    const ENTITY: &'static str = "Group";
    const IMAGE_CATEGORY: &'static str = "group";

    fn update_id(update: &TestGroupUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &TestGroupUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &TestGroupUpdate) -> Result<(), ValidationError> {
        require_text(&update.label, Self::ENTITY, "label")?;
        if update.probability > 100 {
            return Err(ValidationError::ProbabilityOutOfRange(update.probability));
        }
        Ok(())
    }

    fn build(_parent: Option<i64>, update: &TestGroupUpdate, ord: u32) -> Self {
        Self {
            id: None,
            ord,
            label: update.label.clone(),
            probability: update.probability,
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

    fn differs_from(&self, update: &TestGroupUpdate) -> bool {
        self.label != update.label || self.probability != update.probability
    }

    fn apply(&mut self, update: &TestGroupUpdate) {
        self.label.clone_from(&update.label);
        self.probability = update.probability;
    }
}

impl Tracked for Protocol {
    type Update = ProtocolUpdate;
    const SCOPE: &'static str = "protocol";
    const ENTITY: &'static str = "Protocol";
    const IMAGE_CATEGORY: &'static str = "protocol";

    fn update_id(update: &ProtocolUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &ProtocolUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &ProtocolUpdate) -> Result<(), ValidationError> {
        require_text(&update.name, Self::ENTITY, "name")
    }

    fn build(parent: Option<i64>, update: &ProtocolUpdate, ord: u32) -> Self {
        Self {
            id: None,
            group_id: parent.unwrap_or_default(),
            ord,
            name: update.name.clone(),
            summary: update.summary.clone(),
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
        Some(self.group_id)
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

    fn differs_from(&self, update: &ProtocolUpdate) -> bool {
        self.name != update.name || self.summary != update.summary
    }

    fn apply(&mut self, update: &ProtocolUpdate) {
        self.name.clone_from(&update.name);
        self.summary.clone_from(&update.summary);
    }
}

impl Tracked for Phase {
    type Update = PhaseUpdate;
    const SCOPE: &'static str = "phase";
    const ENTITY: &'static str = "Phase";
    const IMAGE_CATEGORY: &'static str = "phase";

    fn update_id(update: &PhaseUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &PhaseUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &PhaseUpdate) -> Result<(), ValidationError> {
        require_text(&update.title, Self::ENTITY, "title")
    }

    fn build(parent: Option<i64>, update: &PhaseUpdate, ord: u32) -> Self {
        Self {
            id: None,
            protocol_id: parent.unwrap_or_default(),
            ord,
            title: update.title.clone(),
            duration_days: update.duration_days,
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
        Some(self.protocol_id)
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

    fn differs_from(&self, update: &PhaseUpdate) -> bool {
        self.title != update.title || self.duration_days != update.duration_days
    }

    fn apply(&mut self, update: &PhaseUpdate) {
        self.title.clone_from(&update.title);
        self.duration_days = update.duration_days;
    }
}

impl Tracked for TestQuestion {
    type Update = TestQuestionUpdate;
    const SCOPE: &'static str = "question";
    const ENTITY: &'static str = "Question";
    const IMAGE_CATEGORY: &'static str = "test_question";

    fn update_id(update: &TestQuestionUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &TestQuestionUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &TestQuestionUpdate) -> Result<(), ValidationError> {
        require_text(&update.text, Self::ENTITY, "text")
    }

    fn build(parent: Option<i64>, update: &TestQuestionUpdate, ord: u32) -> Self {
        Self {
            id: None,
            phase_id: parent.unwrap_or_default(),
            ord,
            text: update.text.clone(),
            required: update.required,
            kind: update.payload.kind(),
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
        Some(self.phase_id)
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

    fn differs_from(&self, update: &TestQuestionUpdate) -> bool {
        self.text != update.text
            || self.required != update.required
            || self.kind != update.payload.kind()
    }

    fn apply(&mut self, update: &TestQuestionUpdate) {
        self.text.clone_from(&update.text);
        self.required = update.required;
        self.kind = update.payload.kind();
    }
}

impl Tracked for TestOption {
    type Update = TestOptionUpdate;
    const SCOPE: &'static str = "option";
    const ENTITY: &'static str = "Option";
    const IMAGE_CATEGORY: &'static str = "test_option";

    fn update_id(update: &TestOptionUpdate) -> Option<i64> {
        update.id
    }

    fn image_alt(update: &TestOptionUpdate) -> Option<&str> {
        update.image_alt.as_deref()
    }

    fn validate(update: &TestOptionUpdate) -> Result<(), ValidationError> {
        require_text(&update.text, Self::ENTITY, "text")
    }

    fn build(parent: Option<i64>, update: &TestOptionUpdate, ord: u32) -> Self {
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

    fn differs_from(&self, update: &TestOptionUpdate) -> bool {
        self.text != update.text
    }

    fn apply(&mut self, update: &TestOptionUpdate) {
        self.text.clone_from(&update.text);
    }
}

impl<S: SurveyStore> Reconciler<'_, S> {
    /// Reconcile the test-group tree: groups, their protocols, phases,
    /// questions, and options, in one pre-order pass over the channel.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile_collection`].
    pub fn reconcile_test_groups(
        &mut self,
        updates: Option<&[TestGroupUpdate]>,
    ) -> Result<Outcomes> {
        let mut outcomes = Outcomes::new();
        self.reconcile_collection::<TestGroup, _, _>(
            None,
            "",
            updates,
            &mut outcomes,
            |rec, group, update, prefix, out| {
                rec.reconcile_group_children(group, update, prefix, out)
            },
            |rec, group, prefix, out| rec.sweep_group_children(group, prefix, out),
        )?;
        Ok(outcomes)
    }

    fn reconcile_group_children(
        &mut self,
        group: &TestGroup,
        update: &TestGroupUpdate,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<Protocol, _, _>(
            group.id,
            prefix,
            update.protocols.as_deref(),
            outcomes,
            |rec, protocol, upd, pfx, out| rec.reconcile_protocol_children(protocol, upd, pfx, out),
            |rec, protocol, pfx, out| rec.sweep_protocol_children(protocol, pfx, out),
        )
    }

    fn sweep_group_children(
        &mut self,
        group: &TestGroup,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<Protocol, _, _>(
            group.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |rec, protocol, pfx, out| rec.sweep_protocol_children(protocol, pfx, out),
        )
    }

    fn reconcile_protocol_children(
        &mut self,
        protocol: &Protocol,
        update: &ProtocolUpdate,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<Phase, _, _>(
            protocol.id,
            prefix,
            update.phases.as_deref(),
            outcomes,
            |rec, phase, upd, pfx, out| rec.reconcile_phase_children(phase, upd, pfx, out),
            |rec, phase, pfx, out| rec.sweep_phase_children(phase, pfx, out),
        )
    }

    fn sweep_protocol_children(
        &mut self,
        protocol: &Protocol,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<Phase, _, _>(
            protocol.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |rec, phase, pfx, out| rec.sweep_phase_children(phase, pfx, out),
        )
    }

    fn reconcile_phase_children(
        &mut self,
        phase: &Phase,
        update: &PhaseUpdate,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<TestQuestion, _, _>(
            phase.id,
            prefix,
            update.questions.as_deref(),
            outcomes,
            |rec, question, upd, pfx, out| {
                rec.reconcile_collection::<TestOption, _, _>(
                    question.id,
                    pfx,
                    upd.payload.options(),
                    out,
                    |_, _, _, _, _| Ok(()),
                    |_, _, _, _| Ok(()),
                )
            },
            |rec, question, pfx, out| rec.sweep_test_question_children(question, pfx, out),
        )
    }

    fn sweep_phase_children(
        &mut self,
        phase: &Phase,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<TestQuestion, _, _>(
            phase.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |rec, question, pfx, out| rec.sweep_test_question_children(question, pfx, out),
        )
    }

    fn sweep_test_question_children(
        &mut self,
        question: &TestQuestion,
        prefix: &str,
        outcomes: &mut Outcomes,
    ) -> Result<()> {
        self.reconcile_collection::<TestOption, _, _>(
            question.id,
            prefix,
            None,
            outcomes,
            |_, _, _, _, _| Ok(()),
            |_, _, _, _| Ok(()),
        )
    }
}
