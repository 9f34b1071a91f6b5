use std::collections::BTreeMap;

use proptest::prelude::*;

use super::*;
use crate::{
    error::{FormError, TransitionError},
    models::{CriterionRecord, Entity, ScopeKey},
    submit::{SubmitFailure, SubmitReport, SubmitTarget},
    validate::{CheckOutcome, DuplicateSource, FieldIssue, FieldKey},
};

fn deliverables() -> WizardSession {
    WizardSession::open(WizardKind::Deliverable, ScopeKey::Objective(3))
}

fn confirm_name(session: &mut WizardSession, name: &str) {
    let pending = session
        .set_name(name)
        .expect("session is open")
        .expect("name should need a remote check");
    assert!(session.apply_check(pending.ticket, CheckOutcome::Unique));
}

/// Fills a deliverable draft and leaves the session on the review step.
fn fill_to_review(session: &mut WizardSession, name: &str, criterion: &str) {
    confirm_name(session, name);
    assert_eq!(session.next().expect("details are valid"), 2);
    session.set_criterion(0, criterion).expect("criterion exists");
    assert_eq!(session.next().expect("criteria are valid"), 3);
}

fn entity(id: u64, name: &str) -> Entity {
    Entity {
        id,
        name: name.to_string(),
        description: None,
        criteria: vec![],
        scope_key: Some("objective:3".to_string()),
    }
}

#[test]
fn test_short_name_blocks_next_without_remote_check() {
    let mut session = deliverables();
    let pending = session.set_name("abc").expect("open");
    assert!(pending.is_none());
    assert_eq!(*session.name_check(), NameCheck::Unchecked);

    let err = session.next().expect_err("name is too short");
    match err {
        TransitionError::StepInvalid { step, errors } => {
            assert_eq!(step, 1);
            assert_eq!(
                errors,
                vec![FormError::LocalValidation {
                    field: FieldKey::Name,
                    issue: FieldIssue::TooShort { min: 5 },
                }]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.current_step(), Some(1));
}

#[test]
fn test_name_is_capped_at_raw_limit() {
    let mut session = deliverables();
    session.set_name(&"x".repeat(80)).expect("open");
    assert_eq!(session.draft().name.chars().count(), 60);
    assert!(!session.draft().name_result().is_valid());
}

#[test]
fn test_next_waits_for_name_check() {
    let mut session = deliverables();
    let pending = session.set_name("Reporte Semanal").expect("open");
    assert!(pending.is_some());
    assert_eq!(*session.name_check(), NameCheck::Pending);

    assert_eq!(session.next(), Err(TransitionError::NameUnverified));
    assert!(!session.can_submit());
}

#[test]
fn test_older_check_result_is_discarded() {
    let mut session = deliverables();
    let first = session.set_name("Reporte Semanal").expect("open").expect("check");
    let second = session.set_name("Reporte Mensual").expect("open").expect("check");

    assert!(session.apply_check(second.ticket, CheckOutcome::Unique));
    assert!(!session.apply_check(
        first.ticket,
        CheckOutcome::Duplicate(DuplicateSource::Remote)
    ));
    assert_eq!(*session.name_check(), NameCheck::Unique);

    // The first response arriving before the second changes nothing either.
    let third = session.set_name("Reporte Anual").expect("open").expect("check");
    assert!(!session.apply_check(second.ticket, CheckOutcome::Unique));
    assert_eq!(*session.name_check(), NameCheck::Pending);
    assert!(session.apply_check(third.ticket, CheckOutcome::Unique));
}

#[test]
fn test_remote_duplicate_blocks_next() {
    let mut session = deliverables();
    let pending = session.set_name("Reporte Semanal").expect("open").expect("check");
    session.apply_check(pending.ticket, CheckOutcome::Duplicate(DuplicateSource::Remote));

    let err = session.next().expect_err("duplicate name");
    assert_eq!(
        err.form_errors(),
        &[FormError::duplicate(FieldKey::Name, DuplicateSource::Remote)]
    );
    assert_eq!(
        session.field_messages()[&FieldKey::Name],
        vec!["already exists in this scope".to_string()]
    );
}

#[test]
fn test_failed_check_is_not_unique() {
    let mut session = deliverables();
    let pending = session.set_name("Reporte Semanal").expect("open").expect("check");
    session.apply_check(
        pending.ticket,
        CheckOutcome::Failed("Could not reach the server.".to_string()),
    );

    let err = session.next().expect_err("check failed");
    assert!(matches!(
        err.form_errors(),
        [FormError::Transport { .. }]
    ));

    let retry = session.request_name_check().expect("open").expect("check");
    assert!(session.apply_check(retry.ticket, CheckOutcome::Unique));
    assert_eq!(session.next(), Ok(2));
}

#[test]
fn test_back_preserves_criteria_by_default() {
    let mut session = deliverables();
    confirm_name(&mut session, "Reporte Semanal");
    session.next().expect("valid");
    session.set_criterion(0, "Debe cumplir el plazo").expect("exists");

    assert_eq!(session.back(), Ok(1));
    assert_eq!(session.draft().criteria, vec![Criterion::new("Debe cumplir el plazo")]);
    // Back on the first step is a no-op.
    assert_eq!(session.back(), Ok(1));
}

#[test]
fn test_back_resets_criteria_when_opted_in() {
    let options = WizardOptions {
        reset_criteria_on_back: true,
    };
    let mut session =
        WizardSession::open_with(WizardKind::Deliverable, ScopeKey::Objective(3), options);
    confirm_name(&mut session, "Reporte Semanal");
    session.next().expect("valid");
    session.set_criterion(0, "Debe cumplir el plazo").expect("exists");
    session.add_criterion().expect("open");

    assert_eq!(session.back(), Ok(1));
    assert_eq!(session.draft().criteria, vec![Criterion::default()]);
}

#[test]
fn test_back_to_rejects_forward_jumps() {
    let mut session = deliverables();
    assert_eq!(
        session.back_to(2),
        Err(TransitionError::InvalidStep { step: 2 })
    );
    assert_eq!(
        session.back_to(0),
        Err(TransitionError::InvalidStep { step: 0 })
    );
}

#[test]
fn test_next_on_last_step() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");
    assert_eq!(session.next(), Err(TransitionError::AtLastStep { step: 3 }));
}

#[test]
fn test_repeated_criteria_block_criteria_step() {
    let mut session = deliverables();
    confirm_name(&mut session, "Reporte Semanal");
    session.next().expect("valid");
    session.set_criterion(0, "Debe cumplir el plazo").expect("exists");
    let index = session.add_criterion().expect("open");
    session.set_criterion(index, "debe cumplir  el plazo").expect("exists");

    let err = session.next().expect_err("repeated criterion");
    assert_eq!(
        err.form_errors(),
        &[FormError::duplicate(FieldKey::Criterion(1), DuplicateSource::Sibling)]
    );

    session.remove_criterion(1).expect("exists");
    assert_eq!(session.next(), Ok(3));
}

#[test]
fn test_set_criterion_out_of_range() {
    let mut session = deliverables();
    assert_eq!(
        session.set_criterion(4, "Debe cumplir el plazo"),
        Err(TransitionError::NoSuchCriterion { index: 4 })
    );
}

#[test]
fn test_stage_current_starts_new_draft() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");

    assert_eq!(session.stage_current(), Ok(1));
    assert_eq!(session.current_step(), Some(1));
    assert_eq!(session.draft(), &Draft::new());
    assert_eq!(session.staged()[0].name, "Reporte Semanal");
    assert_eq!(*session.name_check(), NameCheck::Unchecked);
}

#[test]
fn test_staged_name_collides_without_remote_check() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");
    session.stage_current().expect("valid");

    let pending = session.set_name(" reporte  semanal").expect("open");
    assert!(pending.is_none());
    assert_eq!(
        *session.name_check(),
        NameCheck::Duplicate {
            origin: DuplicateSource::Staged,
            detail: None,
        }
    );

    session.remove_staged(0).expect("exists");
    assert_eq!(*session.name_check(), NameCheck::Unchecked);
    assert!(session.staged().is_empty());
}

#[test]
fn test_staging_only_from_review_of_deliverable_wizard() {
    let mut session = deliverables();
    assert_eq!(session.stage_current(), Err(TransitionError::NotOnReviewStep));

    let mut objective = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    assert_eq!(
        objective.stage_current(),
        Err(TransitionError::StagingUnsupported)
    );
}

#[test]
fn test_submit_only_from_last_step() {
    let mut session = deliverables();
    confirm_name(&mut session, "Reporte Semanal");
    assert_eq!(
        session.begin_submit().map(|_| ()),
        Err(TransitionError::NotLastStep { step: 1, last: 3 })
    );
}

#[test]
fn test_begin_submit_orders_staged_first_and_locks_edits() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");
    session.stage_current().expect("valid");
    fill_to_review(&mut session, "Informe de Avance", "Incluye los indicadores");
    assert!(session.can_submit());

    let pending = session.begin_submit().expect("valid");
    let names: Vec<_> = pending.payloads.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Reporte Semanal", "Informe de Avance"]);
    assert_eq!(pending.target, SubmitTarget::Create);
    assert_eq!(pending.payloads[0].scope_key, "objective:3");

    assert!(session.is_submitting());
    assert!(!session.can_submit());
    assert_eq!(
        session.set_name("Otro nombre"),
        Err(TransitionError::SubmitInFlight)
    );
    assert_eq!(
        session.begin_submit().map(|_| ()),
        Err(TransitionError::SubmitInFlight)
    );
}

#[test]
fn test_successful_submit_closes_session() {
    let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    confirm_name(&mut session, "Mejorar la cobertura");
    session.next().expect("valid");
    session.set_criterion(0, "Cobertura mayor al 80%").expect("exists");

    let pending = session.begin_submit().expect("valid");
    let report = SubmitReport {
        created: vec![entity(11, "Mejorar la cobertura")],
        failure: None,
        skipped: 0,
        interrupted: false,
    };
    let resolution = session.finish_submit(pending.ticket, report);

    assert_eq!(
        resolution,
        SubmitResolution::Completed(vec![entity(11, "Mejorar la cobertura")])
    );
    assert_eq!(session.state(), WizardState::Submitted);
    assert_eq!(session.committed().len(), 1);
    assert_eq!(
        session.set_name("Otro nombre"),
        Err(TransitionError::Closed { state: "submitted" })
    );
}

#[test]
fn test_failure_keeps_failing_draft_and_drops_committed_ones() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Entrega Uno", "Criterio de la uno");
    session.stage_current().expect("valid");
    fill_to_review(&mut session, "Entrega Dos", "Criterio de la dos");
    session.stage_current().expect("valid");
    fill_to_review(&mut session, "Entrega Tres", "Criterio de la tres");

    let pending = session.begin_submit().expect("valid");
    assert_eq!(pending.payloads.len(), 3);

    let error = FormError::BackendValidation {
        message: "nombre duplicado".to_string(),
        fields: BTreeMap::new(),
    };
    let report = SubmitReport {
        created: vec![entity(21, "Entrega Uno")],
        failure: Some(SubmitFailure {
            index: 1,
            error: error.clone(),
        }),
        skipped: 1,
        interrupted: false,
    };

    match session.finish_submit(pending.ticket, report) {
        SubmitResolution::Failed {
            committed,
            error: reported,
            step,
        } => {
            assert_eq!(committed, vec![entity(21, "Entrega Uno")]);
            assert_eq!(reported, error);
            assert_eq!(step, 3);
        }
        other => panic!("unexpected resolution: {other:?}"),
    }

    assert_eq!(session.draft().name, "Entrega Dos");
    let staged: Vec<_> = session.staged().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(staged, vec!["Entrega Tres"]);
    assert_eq!(session.banner(), Some("nombre duplicado"));
    assert_eq!(session.committed().len(), 1);
    assert!(!session.is_submitting());
    assert!(session.can_submit());
}

#[test]
fn test_conflict_rolls_back_to_name_step() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");
    let pending = session.begin_submit().expect("valid");

    let report = SubmitReport {
        created: vec![],
        failure: Some(SubmitFailure {
            index: 0,
            error: FormError::Duplicate {
                field: FieldKey::Name,
                origin: DuplicateSource::Remote,
                detail: Some("nombre duplicado".to_string()),
            },
        }),
        skipped: 0,
        interrupted: false,
    };
    let resolution = session.finish_submit(pending.ticket, report);

    assert!(matches!(resolution, SubmitResolution::Failed { step: 1, .. }));
    assert_eq!(session.current_step(), Some(1));
    assert_eq!(
        session.field_messages()[&FieldKey::Name],
        vec!["nombre duplicado".to_string()]
    );
    assert!(!session.can_submit());
}

#[test]
fn test_backend_field_messages_override_until_edited() {
    let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    confirm_name(&mut session, "Mejorar la cobertura");
    session.next().expect("valid");
    session.set_criterion(0, "Cobertura mayor al 80%").expect("exists");
    let pending = session.begin_submit().expect("valid");

    let error = FormError::BackendValidation {
        message: "Invalid objective".to_string(),
        fields: BTreeMap::from([("criteria.0".to_string(), vec!["too vague".to_string()])]),
    };
    let report = SubmitReport {
        created: vec![],
        failure: Some(SubmitFailure { index: 0, error }),
        skipped: 0,
        interrupted: false,
    };
    let resolution = session.finish_submit(pending.ticket, report);

    assert!(matches!(resolution, SubmitResolution::Failed { step: 2, .. }));
    assert_eq!(session.banner(), None);
    assert_eq!(
        session.field_messages()[&FieldKey::Criterion(0)],
        vec!["too vague".to_string()]
    );
    assert!(!session.can_submit());

    session.set_criterion(0, "Cobertura mayor al 85%").expect("exists");
    assert!(session.field_messages().is_empty());
    assert!(session.can_submit());
}

#[test]
fn test_message_for_missing_criterion_goes_to_banner() {
    let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    confirm_name(&mut session, "Mejorar la cobertura");
    session.next().expect("valid");
    session.set_criterion(0, "Cobertura mayor al 80%").expect("exists");
    let index = session.add_criterion().expect("open");
    session.set_criterion(index, "Sin defectos abiertos").expect("exists");
    let pending = session.begin_submit().expect("valid");

    let error = FormError::BackendValidation {
        message: "Invalid objective".to_string(),
        fields: BTreeMap::from([
            ("criteria.2".to_string(), vec!["too many criteria".to_string()]),
            ("name".to_string(), vec!["reserved word".to_string()]),
        ]),
    };
    let report = SubmitReport {
        created: vec![],
        failure: Some(SubmitFailure { index: 0, error }),
        skipped: 0,
        interrupted: false,
    };
    session.finish_submit(pending.ticket, report);

    assert_eq!(session.banner(), Some("too many criteria"));
    let messages = session.field_messages();
    assert!(!messages.contains_key(&FieldKey::Criterion(2)));
    assert_eq!(messages[&FieldKey::Name], vec!["reserved word".to_string()]);
    assert!(session.step_errors(2).is_empty());
}

#[test]
fn test_only_missing_criterion_messages_use_top_level_banner() {
    let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    confirm_name(&mut session, "Mejorar la cobertura");
    session.next().expect("valid");
    session.set_criterion(0, "Cobertura mayor al 80%").expect("exists");
    let pending = session.begin_submit().expect("valid");

    let error = FormError::BackendValidation {
        message: "Invalid objective".to_string(),
        fields: BTreeMap::from([("criteria.5".to_string(), vec!["unknown".to_string()])]),
    };
    let report = SubmitReport {
        created: vec![],
        failure: Some(SubmitFailure { index: 0, error }),
        skipped: 0,
        interrupted: false,
    };
    session.finish_submit(pending.ticket, report);

    assert_eq!(session.banner(), Some("Invalid objective"));
    assert!(session.field_messages().is_empty());
    assert!(session.can_submit());
}

#[test]
fn test_stale_submit_result_is_ignored() {
    let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    confirm_name(&mut session, "Mejorar la cobertura");
    session.next().expect("valid");
    session.set_criterion(0, "Cobertura mayor al 80%").expect("exists");
    let pending = session.begin_submit().expect("valid");

    let other = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
    let foreign = SubmitTicket {
        session: other.id(),
        seq: pending.ticket.seq,
    };
    assert_eq!(
        session.finish_submit(foreign, SubmitReport::default()),
        SubmitResolution::Stale { committed: vec![] }
    );
    assert!(session.is_submitting());
}

#[test]
fn test_cancel_during_submit_hands_back_saved_records() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Entrega Uno", "Criterio de la uno");
    session.stage_current().expect("valid");
    fill_to_review(&mut session, "Entrega Dos", "Criterio de la dos");
    let pending = session.begin_submit().expect("valid");

    assert!(session.cancel());
    let report = SubmitReport {
        created: vec![entity(31, "Entrega Uno")],
        failure: None,
        skipped: 1,
        interrupted: true,
    };

    assert_eq!(
        session.finish_submit(pending.ticket, report),
        SubmitResolution::Stale {
            committed: vec![entity(31, "Entrega Uno")]
        }
    );
    assert_eq!(session.state(), WizardState::Cancelled);
    assert_eq!(session.committed(), &[entity(31, "Entrega Uno")]);
}

#[test]
fn test_cancel_discards_everything() {
    let mut session = deliverables();
    fill_to_review(&mut session, "Reporte Semanal", "Debe cumplir el plazo");
    session.stage_current().expect("valid");
    let pending = session.set_name("Informe de Avance").expect("open").expect("check");

    assert!(session.cancel());
    assert!(!session.cancel());
    assert_eq!(session.state(), WizardState::Cancelled);
    assert!(session.staged().is_empty());
    assert_eq!(session.draft(), &Draft::new());
    assert!(!session.apply_check(pending.ticket, CheckOutcome::Unique));
    assert_eq!(
        session.next(),
        Err(TransitionError::Closed { state: "cancelled" })
    );
}

#[test]
fn test_edit_session_targets_existing_record() {
    let existing = Entity {
        id: 9,
        name: "Plan de pruebas".to_string(),
        description: Some("Cobertura mínima".to_string()),
        criteria: vec![CriterionRecord {
            id: 1,
            description: "Cubre los casos críticos".to_string(),
        }],
        scope_key: Some("objective:3".to_string()),
    };
    let mut session =
        WizardSession::edit(&existing, ScopeKey::Objective(3), WizardOptions::default());
    assert_eq!(session.kind(), WizardKind::EditDeliverable { id: 9 });
    assert_eq!(session.step_count(), 2);

    let check = session.request_name_check().expect("open").expect("check");
    assert_eq!(check.request.exclude_id, Some(9));
    session.apply_check(check.ticket, CheckOutcome::Unique);
    assert_eq!(session.next(), Ok(2));

    let pending = session.begin_submit().expect("valid");
    assert_eq!(pending.target, SubmitTarget::Update { id: 9 });
    assert_eq!(
        pending.payloads[0].description.as_deref(),
        Some("Cobertura mínima")
    );
}

#[test]
fn test_session_serializes() {
    let mut session = deliverables();
    session.set_name("abc").expect("open");
    let json = serde_json::to_value(&session).expect("serialize");
    assert_eq!(json["state"]["state"], "step");
    assert_eq!(json["name_check"]["status"], "unchecked");
}

#[derive(Debug, Clone)]
enum Edit {
    Name(String),
    Check { ticket: usize, outcome: u8 },
    Criterion { index: usize, text: String },
    AddCriterion,
    RemoveCriterion(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        prop_oneof![
            Just("Mejorar la cobertura".to_string()),
            Just("Corto".to_string()),
            "[A-Za-z ]{0,64}",
        ]
        .prop_map(Edit::Name),
        (0usize..8, 0u8..3).prop_map(|(ticket, outcome)| Edit::Check { ticket, outcome }),
        (0usize..4, "[A-Za-z ]{0,60}").prop_map(|(index, text)| Edit::Criterion { index, text }),
        Just(Edit::AddCriterion),
        (0usize..4).prop_map(Edit::RemoveCriterion),
    ]
}

fn outcome(code: u8) -> CheckOutcome {
    match code {
        0 => CheckOutcome::Unique,
        1 => CheckOutcome::Duplicate(DuplicateSource::Remote),
        _ => CheckOutcome::Failed("Could not reach the server.".to_string()),
    }
}

proptest! {
    #[test]
    fn prop_can_submit_follows_field_results(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let mut session = WizardSession::open(WizardKind::Objective, ScopeKey::Project(1));
        let mut tickets: Vec<CheckTicket> = Vec::new();

        for edit in edits {
            match edit {
                Edit::Name(raw) => {
                    if let Some(pending) = session.set_name(&raw).expect("open") {
                        tickets.push(pending.ticket);
                    }
                    prop_assert!(!session.name_check().is_unique());
                }
                Edit::Check { ticket, outcome: code } => {
                    if let Some(&ticket) = tickets.get(ticket % tickets.len().max(1)) {
                        session.apply_check(ticket, outcome(code));
                    }
                }
                Edit::Criterion { index, text } => {
                    let _ = session.set_criterion(index, &text);
                }
                Edit::AddCriterion => {
                    session.add_criterion().expect("open");
                }
                Edit::RemoveCriterion(index) => {
                    let _ = session.remove_criterion(index);
                }
            }

            let steps_clear = (1..=session.step_count()).all(|step| session.step_errors(step).is_empty());
            prop_assert_eq!(
                session.can_submit(),
                steps_clear && session.name_check().is_unique()
            );
            if session.can_submit() {
                prop_assert!(session.draft().local_errors().is_empty());
                prop_assert!(session.draft().name_result().is_valid());
            }
        }
    }
}
