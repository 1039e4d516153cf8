//! Integration tests for planning against stored backlogs.

use std::sync::Arc;

use agenda_core::{
    AgendaDb, AgendaPlanner, Config, EnergyLevel, FixedClock, PlannerStrategy, PlanningRequest,
    Project,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn plan_and_confirm_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = AgendaDb::open_at(&dir.path().join("agenda.db")).unwrap();

    let report = Project::new("alice", "Report", "work", 4, 1.0, 5, now() + Duration::days(2)).unwrap();
    let garden = Project::new("alice", "Garden", "family", 2, 2.0, 2, now() + Duration::days(9)).unwrap();
    let other = Project::new("bob", "Bob's", "work", 5, 4.0, 5, now()).unwrap();
    for p in [&report, &garden, &other] {
        db.create_project(p).unwrap();
    }

    let planner = AgendaPlanner::from_config(&Config::default().planner, Arc::new(FixedClock(now())))
        .unwrap();
    let backlog = db.list_projects("alice").unwrap();
    let request = PlanningRequest::new("alice", backlog, 2.0, EnergyLevel::Medium);
    let result = planner.plan(&request).await.unwrap();

    assert_eq!(result.total_hours, 2.0);
    assert_eq!(result.blocks[0].project_id, report.id);
    assert_eq!(result.blocks[1].project_id, report.id);
    assert_eq!(result.blocks[2].project_id, garden.id);
    assert!(result.blocks.iter().all(|b| b.user_id == "alice"));

    let stored = db.replace_agenda("alice", &result.blocks).unwrap();
    assert_eq!(stored, result.blocks);

    // reopening the file sees the same agenda
    drop(db);
    let db = AgendaDb::open_at(&dir.path().join("agenda.db")).unwrap();
    assert_eq!(db.list_agenda("alice").unwrap(), result.blocks);
    assert!(db.list_agenda("bob").unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_external_planner_falls_back() {
    let mut config = Config::default();
    config.planner.strategy = PlannerStrategy::External;
    config.planner.external.endpoint = Some("http://127.0.0.1:9/plan".to_string());
    config.planner.external.timeout_secs = 2;

    let planner = AgendaPlanner::from_config(&config.planner, Arc::new(FixedClock(now()))).unwrap();
    let project = Project::new("alice", "Report", "work", 3, 1.0, 3, now()).unwrap();
    let request = PlanningRequest::new("alice", vec![project], 4.0, EnergyLevel::Medium);

    let result = planner.plan(&request).await.unwrap();
    assert_eq!(result.blocks.len(), 2);
    assert_eq!(result.blocks[0].start, now());
}
