//! End-to-end reconciliation against a real SQLite database and a tempdir
//! image root, covering what the in-memory fakes of `canvass-core` cannot:
//! SQL round-trips, physical image files, and foreign-key wiring.

use canvass_core::model::form::{Faq, FormOption, FormQuestion, QuestionKind};
use canvass_core::model::testing::{Phase, Protocol, TestGroup, TestOption, TestQuestion};
use canvass_core::reconcile::Reconciler;
use canvass_core::reconcile::channel::ImageChannel;
use canvass_core::reconcile::outcome::ItemOutcome;
use canvass_core::store::Repo;
use canvass_core::update::{
    FaqUpdate, FormOptionUpdate, FormQuestionUpdate, PhaseUpdate, ProtocolUpdate, QuestionPayload,
    TestGroupUpdate, TestQuestionPayload, TestQuestionUpdate,
};
use canvass_store::SqliteStore;

fn store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open_in_memory(dir.path().join("images")).expect("open store");
    (dir, store)
}

fn option_update(id: Option<i64>, text: &str) -> FormOptionUpdate {
    FormOptionUpdate {
        id,
        text: text.into(),
        image_alt: None,
    }
}

#[test]
fn form_batch_persists_rows_and_image_files() {
    let (_dir, store) = store();

    let updates = [FormQuestionUpdate {
        id: None,
        text: "Preferred contact?".into(),
        required: true,
        image_alt: Some("contact icons".into()),
        payload: QuestionPayload::SelectOne {
            options: Some(vec![option_update(None, "Email"), option_update(None, "Phone")]),
        },
    }];
    // Question gets an image, options keep none.
    let mut channel = ImageChannel::new(vec![Some(b"question png".to_vec()), None, None]);
    let mut reconciler = Reconciler::new(&store, &store, &mut channel);

    let outcomes = reconciler
        .reconcile_form(1, Some(&updates))
        .expect("reconcile");

    let questions: Vec<FormQuestion> =
        Repo::<FormQuestion>::find_all(&store, Some(1)).expect("questions");
    assert_eq!(questions.len(), 1);
    let question = &questions[0];
    assert_eq!(question.kind, QuestionKind::SelectOne);
    assert_eq!(question.ord, 0);
    let question_id = question.id.expect("id");

    assert_eq!(
        outcomes.get("question_new_0"),
        Some(&ItemOutcome::Created { id: question_id })
    );

    let image = question.image.as_ref().expect("image attached");
    assert_eq!(image.path, format!("form_question/form_question_{question_id}"));
    assert_eq!(image.alt, "contact icons");
    let file = store.image_root().join(&image.path);
    assert_eq!(std::fs::read(&file).expect("image file"), b"question png");

    let options: Vec<FormOption> =
        Repo::<FormOption>::find_all(&store, Some(question_id)).expect("options");
    let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, ["Email", "Phone"]);
}

#[test]
fn resubmitting_the_stored_form_changes_nothing() {
    let (_dir, store) = store();

    let created = [FormQuestionUpdate {
        id: None,
        text: "Any comments?".into(),
        required: false,
        image_alt: None,
        payload: QuestionPayload::TextLong,
    }];
    let mut channel = ImageChannel::new(vec![None]);
    Reconciler::new(&store, &store, &mut channel)
        .reconcile_form(1, Some(&created))
        .expect("first pass");

    let stored: Vec<FormQuestion> =
        Repo::<FormQuestion>::find_all(&store, Some(1)).expect("questions");
    let question_id = stored[0].id.expect("id");

    let resubmitted = [FormQuestionUpdate {
        id: Some(question_id),
        text: "Any comments?".into(),
        required: false,
        image_alt: None,
        payload: QuestionPayload::TextLong,
    }];
    let mut channel = ImageChannel::new(vec![None]);
    let outcomes = Reconciler::new(&store, &store, &mut channel)
        .reconcile_form(1, Some(&resubmitted))
        .expect("second pass");

    assert_eq!(
        outcomes.get(&format!("question_{question_id}")),
        Some(&ItemOutcome::Unchanged)
    );
    let after: Vec<FormQuestion> =
        Repo::<FormQuestion>::find_all(&store, Some(1)).expect("questions");
    assert_eq!(after, stored);
}

#[test]
fn sweeping_a_question_removes_rows_and_image_files() {
    let (_dir, store) = store();

    let created = [FormQuestionUpdate {
        id: None,
        text: "Pick one".into(),
        required: true,
        image_alt: Some("chart".into()),
        payload: QuestionPayload::SelectOne {
            options: Some(vec![option_update(None, "A")]),
        },
    }];
    let mut channel = ImageChannel::new(vec![
        Some(b"question".to_vec()),
        Some(b"option".to_vec()),
    ]);
    Reconciler::new(&store, &store, &mut channel)
        .reconcile_form(1, Some(&created))
        .expect("create");

    let question_id = Repo::<FormQuestion>::find_all(&store, Some(1)).expect("questions")[0]
        .id
        .expect("id");
    let option_id = Repo::<FormOption>::find_all(&store, Some(question_id)).expect("options")[0]
        .id
        .expect("id");
    let question_file = store
        .image_root()
        .join(format!("form_question/form_question_{question_id}"));
    let option_file = store
        .image_root()
        .join(format!("form_option/form_option_{option_id}"));
    assert!(question_file.exists());
    assert!(option_file.exists());

    let mut channel = ImageChannel::empty();
    let outcomes = Reconciler::new(&store, &store, &mut channel)
        .reconcile_form(1, Some(&[]))
        .expect("sweep");

    assert_eq!(
        outcomes.get(&format!("question_{question_id}")),
        Some(&ItemOutcome::Deleted)
    );
    assert_eq!(
        outcomes.get(&format!("question_{question_id}_option_{option_id}")),
        Some(&ItemOutcome::Deleted)
    );
    assert!(Repo::<FormQuestion>::find_all(&store, Some(1))
        .expect("questions")
        .is_empty());
    assert!(Repo::<FormOption>::find_all(&store, Some(question_id))
        .expect("options")
        .is_empty());
    assert!(!question_file.exists());
    assert!(!option_file.exists());
}

#[test]
fn faq_image_clear_drops_the_file() {
    let (_dir, store) = store();

    let created = [FaqUpdate {
        id: None,
        question: "Is it safe?".into(),
        answer: "Yes.".into(),
        image_alt: Some("seal".into()),
    }];
    let mut channel = ImageChannel::new(vec![Some(b"seal png".to_vec())]);
    Reconciler::new(&store, &store, &mut channel)
        .reconcile_faqs(Some(&created))
        .expect("create");

    let faq = &Repo::<Faq>::find_all(&store, None).expect("faqs")[0];
    let faq_id = faq.id.expect("id");
    let file = store
        .image_root()
        .join(&faq.image.as_ref().expect("image").path);
    assert!(file.exists());

    let cleared = [FaqUpdate {
        id: Some(faq_id),
        question: "Is it safe?".into(),
        answer: "Yes.".into(),
        image_alt: None,
    }];
    // Present-but-empty slot clears the image.
    let mut channel = ImageChannel::new(vec![Some(Vec::new())]);
    let outcomes = Reconciler::new(&store, &store, &mut channel)
        .reconcile_faqs(Some(&cleared))
        .expect("clear");

    assert_eq!(
        outcomes.get(&format!("faq_{faq_id}")),
        Some(&ItemOutcome::Updated)
    );
    let faq = &Repo::<Faq>::find_all(&store, None).expect("faqs")[0];
    assert!(faq.image.is_none());
    assert!(!file.exists());
}

#[test]
fn question_images_stay_distinct_across_the_two_trees() {
    let (_dir, store) = store();

    let form_updates = [FormQuestionUpdate {
        id: None,
        text: "Preferred color?".into(),
        required: false,
        image_alt: Some("palette".into()),
        payload: QuestionPayload::TextShort,
    }];
    let mut channel = ImageChannel::new(vec![Some(b"form bytes".to_vec())]);
    Reconciler::new(&store, &store, &mut channel)
        .reconcile_form(1, Some(&form_updates))
        .expect("form pass");

    let test_updates = [TestGroupUpdate {
        id: None,
        label: "Variant".into(),
        probability: 50,
        image_alt: None,
        protocols: Some(vec![ProtocolUpdate {
            id: None,
            name: "Daily".into(),
            summary: "".into(),
            image_alt: None,
            phases: Some(vec![PhaseUpdate {
                id: None,
                title: "Ramp-up".into(),
                duration_days: None,
                image_alt: None,
                questions: Some(vec![TestQuestionUpdate {
                    id: None,
                    text: "Energy level?".into(),
                    required: false,
                    image_alt: Some("battery".into()),
                    payload: TestQuestionPayload::TextShort,
                }]),
            }]),
        }]),
    }];
    let mut channel = ImageChannel::new(vec![None, None, None, Some(b"test bytes".to_vec())]);
    Reconciler::new(&store, &store, &mut channel)
        .reconcile_test_groups(Some(&test_updates))
        .expect("test pass");

    // Both tables hand out row id 1 independently; the storage keys must
    // still not collide.
    let form_question: FormQuestion = Repo::<FormQuestion>::find_by_id(&store, 1)
        .expect("query")
        .expect("row");
    let test_question: TestQuestion = Repo::<TestQuestion>::find_by_id(&store, 1)
        .expect("query")
        .expect("row");
    assert_eq!(form_question.id, test_question.id);

    let form_image = form_question.image.expect("form image");
    let test_image = test_question.image.expect("test image");
    assert_ne!(form_image.path, test_image.path);
    assert_eq!(
        std::fs::read(store.image_root().join(&form_image.path)).expect("form file"),
        b"form bytes"
    );
    assert_eq!(
        std::fs::read(store.image_root().join(&test_image.path)).expect("test file"),
        b"test bytes"
    );
}

#[test]
fn test_group_tree_round_trips_through_sqlite() {
    let (_dir, store) = store();

    let updates = [TestGroupUpdate {
        id: None,
        label: "Control".into(),
        probability: 40,
        image_alt: None,
        protocols: Some(vec![ProtocolUpdate {
            id: None,
            name: "Baseline".into(),
            summary: "No intervention".into(),
            image_alt: None,
            phases: Some(vec![PhaseUpdate {
                id: None,
                title: "Week one".into(),
                duration_days: Some(7),
                image_alt: None,
                questions: Some(vec![TestQuestionUpdate {
                    id: None,
                    text: "Sleep quality?".into(),
                    required: true,
                    image_alt: None,
                    payload: TestQuestionPayload::TextShort,
                }]),
            }]),
        }]),
    }];
    // One slot per record across the whole tree, pre-order.
    let mut channel = ImageChannel::new(vec![None; 4]);
    let mut reconciler = Reconciler::new(&store, &store, &mut channel);
    reconciler
        .reconcile_test_groups(Some(&updates))
        .expect("reconcile");
    assert_eq!(reconciler.slots_consumed(), 4);

    let groups: Vec<TestGroup> = Repo::<TestGroup>::find_all(&store, None).expect("groups");
    assert_eq!(groups.len(), 1);
    let group_id = groups[0].id.expect("id");
    assert_eq!(groups[0].probability, 40);

    let protocols: Vec<Protocol> =
        Repo::<Protocol>::find_all(&store, Some(group_id)).expect("protocols");
    assert_eq!(protocols.len(), 1);
    let phases: Vec<Phase> =
        Repo::<Phase>::find_all(&store, Some(protocols[0].id.expect("id"))).expect("phases");
    assert_eq!(phases[0].duration_days, Some(7));
    let questions: Vec<TestQuestion> =
        Repo::<TestQuestion>::find_all(&store, Some(phases[0].id.expect("id"))).expect("questions");
    assert_eq!(questions.len(), 1);
    let options: Vec<TestOption> =
        Repo::<TestOption>::find_all(&store, Some(questions[0].id.expect("id"))).expect("options");
    assert!(options.is_empty());
}
