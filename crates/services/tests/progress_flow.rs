use std::sync::Arc;

use gateway::{InMemoryStudentGateway, SessionScope, StudentGateway, StudentRecord};
use services::{Clock, ProgressController, WriteOutcome};
use training_core::model::{
    Requirement, RequirementCategory, RequirementId, RequirementSet, Role, StudentId,
    StudentProgress, TOTAL_FLIGHT_TIME,
};
use training_core::time::fixed_now;

fn seed_record(gateway: &InMemoryStudentGateway) -> StudentRecord {
    let total = Requirement {
        id: RequirementId::generate(),
        name: TOTAL_FLIGHT_TIME.to_owned(),
        total_hours: 40.0,
        completed_hours: 20.0,
        is_custom: false,
        category: Some(RequirementCategory::Key),
        order: 1,
    };
    let solo = Requirement {
        id: RequirementId::generate(),
        name: "Solo Flight".to_owned(),
        total_hours: 40.0,
        completed_hours: 20.0,
        is_custom: false,
        category: Some(RequirementCategory::Standard),
        order: 2,
    };

    let mut record = StudentRecord::bare(StudentId::generate());
    record.first_name = Some("Ada".into());
    record.progress = Some(StudentProgress {
        requirements: RequirementSet::from_items(vec![total, solo]),
        ..StudentProgress::default()
    });
    gateway.seed(record.clone());
    record
}

#[tokio::test]
async fn progress_flow_load_mutate_edit_and_recover() {
    let gateway = Arc::new(InMemoryStudentGateway::new());
    let record = seed_record(&gateway);
    let scope = SessionScope::new("token-abc", "school-1").expect("build scope");

    let mut controller = ProgressController::load(
        Clock::fixed(fixed_now()),
        Arc::clone(&gateway) as Arc<dyn StudentGateway>,
        scope,
        Role::SchoolAdmin,
        record.id,
    )
    .await
    .expect("load student");

    // Build out the student's plan.
    controller
        .add_milestone("First Solo", "First unsupervised flight")
        .await
        .expect("add milestone");
    controller
        .add_stage("Pre-Solo", "Basic handling")
        .await
        .expect("add stage");
    controller
        .add_requirement("Night Flight", 3.0)
        .await
        .expect("add requirement");

    let total = controller.progress().requirements.total().expect("total");
    assert_eq!(total.total_hours, 43.0);

    // Work toward it.
    let milestone_id = controller.progress().milestones.items()[0].id;
    controller
        .toggle_milestone(milestone_id)
        .await
        .expect("toggle milestone");
    assert!(controller.overview().next_milestone.is_none());

    // Batch hour edit survives a failed save and commits on retry.
    controller.begin_hours_edit().expect("begin edit");
    controller
        .set_draft_hours("Solo Flight", 32.0)
        .expect("draft hours");
    gateway.fail_next_write();
    controller
        .save_hours_edit()
        .await
        .expect_err("injected failure");
    assert!(controller.is_editing());

    let outcome = controller.save_hours_edit().await.expect("retry save");
    assert_eq!(outcome, WriteOutcome::Applied);
    assert!(!controller.is_editing());

    // The durable copy matches the rendered copy after every commit.
    let stored = gateway.stored(record.id).expect("stored record");
    assert_eq!(stored.progress.as_ref(), Some(controller.progress()));
    assert_eq!(
        controller
            .progress()
            .requirements
            .find_by_name("Solo Flight")
            .expect("solo")
            .completed_hours,
        32.0
    );
}
