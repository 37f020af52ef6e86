//! Task coordination flows against the audit sink.

use std::sync::Arc;

use crate::test_utils::fast_config;
use pelorus_coord::{
    AgentSpec, AssignOutcome, CoordinationEvent, Coordinator, TaskPriority, TaskSpec, TaskStatus,
};
use pelorus_core::audit::MemorySink;

fn survey_task() -> TaskSpec {
    TaskSpec::new(
        "Survey east channel",
        "Sweep the marked sector and report contacts",
        TaskPriority::High,
    )
}

#[tokio::test]
async fn full_task_lifecycle_reaches_the_sink() {
    let sink = Arc::new(MemorySink::new());
    let coord = Coordinator::with_sink(fast_config().coordination, sink.clone());

    coord.register_agent(AgentSpec::new("survey-1", "survey")).unwrap();
    let task = coord.add_task(survey_task());
    assert_eq!(task.status, TaskStatus::Assigned);

    coord.begin_task(&task.task_id).unwrap();
    let done = coord.complete_task(&task.task_id).unwrap();
    assert_eq!(done.status, TaskStatus::Completed);

    // Handoff + decision, both mirrored to the external sink
    let log = coord.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].event, CoordinationEvent::Handoff);
    assert_eq!(log[1].event, CoordinationEvent::Decision);
    assert_eq!(sink.len(), 2);

    let records = sink.records();
    assert!(records.iter().all(|(kind, _)| kind == "coordination_log"));
}

#[tokio::test]
async fn device_shaped_agents_queue_work_until_free() {
    let coord = Coordinator::new(fast_config().coordination);
    // Agents here mirror fleet devices 1:1; the coordinator does not care
    coord.register_agent(AgentSpec::new("uav-1", "aerial")).unwrap();

    let first = coord.add_task(survey_task().preferring("aerial"));
    assert_eq!(first.status, TaskStatus::Assigned);

    let second = coord.add_task(survey_task().preferring("aerial"));
    assert_eq!(second.status, TaskStatus::Pending);

    // Completing the first frees the agent for an explicit retry
    coord.begin_task(&first.task_id).unwrap();
    coord.complete_task(&first.task_id).unwrap();

    let outcome = coord.assign(&second.task_id).unwrap();
    assert_eq!(outcome, AssignOutcome::Assigned("uav-1".to_string()));
}

#[tokio::test]
async fn restart_window_defers_assignment_until_active() {
    let coord = Coordinator::new(fast_config().coordination);
    coord.register_agent(AgentSpec::new("survey-1", "survey")).unwrap();
    coord.restart_agent("survey-1").unwrap();

    let task = coord.add_task(survey_task());
    assert_eq!(task.status, TaskStatus::Pending);

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;

    let outcome = coord.assign(&task.task_id).unwrap();
    assert_eq!(outcome, AssignOutcome::Assigned("survey-1".to_string()));
}
