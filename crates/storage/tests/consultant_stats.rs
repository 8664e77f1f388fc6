#![forbid(unsafe_code)]

use om_storage::{
    ConsultantFilter, ConsultantSort, ConsultantUpdate, NewConsultantProfile, NewProject, NewTask,
    NewUser, SqliteStore,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("om_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn consultant(first: &str, last: &str, tjm: f64, skills: &[&str]) -> (NewUser, NewConsultantProfile) {
    (
        NewUser {
            email: format!("{}.{}@om.cm", first.to_lowercase(), last.to_lowercase()),
            password_hash: "salt$digest".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: None,
            role: "CONSULTANT".to_string(),
        },
        NewConsultantProfile {
            tjm,
            specialization: "Développement logiciel".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years: 5,
            biography: None,
        },
    )
}

fn filter() -> ConsultantFilter {
    ConsultantFilter {
        search: None,
        skill: None,
        available: None,
        sort_by: ConsultantSort::Name,
        sort_desc: false,
        limit: 20,
        offset: 0,
    }
}

#[test]
fn directory_filters_narrow_the_listing() {
    let dir = temp_dir("directory_filters_narrow_the_listing");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let (user, profile) = consultant("Awa", "Mbarga", 60_000.0, &["Rust", "SQL"]);
    store.create_consultant(user, profile).expect("first");
    let (user, profile) = consultant("Paul", "Essomba", 90_000.0, &["NoSQL", "Python"]);
    let (_, paul) = store.create_consultant(user, profile).expect("second");
    let (user, profile) = consultant("Nadège", "Fouda", 45_000.0, &["Python"]);
    store.create_consultant(user, profile).expect("third");

    let (all, total) = store.list_consultants(&filter()).expect("list");
    assert_eq!(total, 3);
    let names: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(names, ["CON-001", "CON-003", "CON-002"], "first name order");

    let (found, total) = store
        .list_consultants(&ConsultantFilter {
            search: Some("essomba".to_string()),
            ..filter()
        })
        .expect("search");
    assert_eq!(total, 1);
    assert_eq!(found[0].id, paul.id);

    // Skill matching is exact, "SQL" must not surface "NoSQL".
    let (found, total) = store
        .list_consultants(&ConsultantFilter {
            skill: Some("SQL".to_string()),
            ..filter()
        })
        .expect("skill");
    assert_eq!(total, 1);
    assert_eq!(found[0].id, "CON-001");

    store
        .update_consultant(
            &paul.id,
            ConsultantUpdate {
                is_available: Some(false),
                ..ConsultantUpdate::default()
            },
        )
        .expect("bench paul");
    let (found, total) = store
        .list_consultants(&ConsultantFilter {
            available: Some(true),
            ..filter()
        })
        .expect("available");
    assert_eq!(total, 2);
    assert!(found.iter().all(|c| c.id != paul.id));

    let (by_rate, _) = store
        .list_consultants(&ConsultantFilter {
            sort_by: ConsultantSort::Tjm,
            sort_desc: true,
            ..filter()
        })
        .expect("by rate");
    let rates: Vec<f64> = by_rate.iter().map(|c| c.tjm).collect();
    assert_eq!(rates, [90_000.0, 60_000.0, 45_000.0]);
}

#[test]
fn profile_updates_merge_and_reach_the_account() {
    let dir = temp_dir("profile_updates_merge_and_reach_the_account");
    let mut store = SqliteStore::open(&dir).expect("open store");
    let (user, profile) = consultant("Awa", "Mbarga", 60_000.0, &["Rust"]);
    let (account, created) = store.create_consultant(user, profile).expect("create");

    let updated = store
        .update_consultant(
            &created.id,
            ConsultantUpdate {
                tjm: Some(75_000.0),
                phone: Some("+237 699 11 22 33".to_string()),
                ..ConsultantUpdate::default()
            },
        )
        .expect("update");
    assert_eq!(updated.tjm, 75_000.0);
    assert_eq!(updated.specialization, "Développement logiciel", "untouched fields stay");
    assert_eq!(updated.skills, ["Rust"]);

    let reloaded_account = store
        .user_by_id(&account.id)
        .expect("query")
        .expect("present");
    assert_eq!(reloaded_account.phone.as_deref(), Some("+237 699 11 22 33"));
}

struct ActivityFixture {
    store: SqliteStore,
    consultant: om_storage::ConsultantRow,
}

/// Three tasks on one project: an 8h estimate closed in 24h, an 8h
/// estimate closed on time and one still open.
fn activity_fixture(test_name: &str) -> ActivityFixture {
    let dir = temp_dir(test_name);
    let mut store = SqliteStore::open(&dir).expect("open store");
    let creator = store
        .create_user(NewUser {
            email: "dir@om.cm".to_string(),
            password_hash: "salt$digest".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Kamga".to_string(),
            phone: None,
            role: "DIRECTEUR".to_string(),
        })
        .expect("director")
        .id;
    let (user, profile) = consultant("Awa", "Mbarga", 40_000.0, &["Rust"]);
    let (account, row) = store.create_consultant(user, profile).expect("consultant");
    let project = store
        .create_project(NewProject {
            title: "Refonte du portail".to_string(),
            description: "Cadrage et réalisation".to_string(),
            budget: 2_000_000.0,
            estimated_hours: 160.0,
            priority: "HAUTE".to_string(),
            start_ms: None,
            end_ms: None,
            deadline_ms: None,
            client_name: None,
            client_email: None,
            client_phone: None,
            creator_id: creator,
            manager_id: None,
        })
        .expect("project");

    for (estimated, actual) in [(8.0, Some(24.0)), (8.0, Some(8.0)), (8.0, None)] {
        let task = store
            .create_task(NewTask {
                project_id: project.id.clone(),
                title: "Analyse des besoins".to_string(),
                description: "Ateliers de cadrage".to_string(),
                budget: 0.0,
                estimated_hours: estimated,
                priority: "MOYENNE".to_string(),
                deadline_ms: None,
                assigned_user_id: Some(account.id.clone()),
                parent_task_id: None,
            })
            .expect("task");
        if let Some(actual) = actual {
            store
                .set_task_status(&task.id, "TERMINE", Some(actual))
                .expect("finish");
        }
    }

    ActivityFixture {
        store,
        consultant: row,
    }
}

#[test]
fn snapshot_summarizes_the_profile() {
    let fx = activity_fixture("snapshot_summarizes_the_profile");
    let snapshot = fx
        .store
        .consultant_snapshot(&fx.consultant)
        .expect("snapshot");

    assert_eq!(snapshot.total_tasks, 3);
    assert_eq!(snapshot.completed_tasks, 2);
    assert_eq!(snapshot.completion_rate, 67, "2 of 3, rounded");
    // (24/8 and 8/8 as percentages) averaged: (300 + 100) / 2.
    assert_eq!(snapshot.reliability, 200);
    // Both closings booked a salary: 24/8*40000 + 8/8*40000.
    assert_eq!(snapshot.total_earnings, 160_000.0);
}

#[test]
fn activity_caps_ratios_but_keeps_the_raw_average() {
    let fx = activity_fixture("activity_caps_ratios_but_keeps_the_raw_average");
    let activity = fx
        .store
        .consultant_activity(&fx.consultant)
        .expect("activity");

    assert_eq!(activity.total_tasks, 3);
    assert_eq!(activity.completed_tasks, 2);
    assert_eq!(activity.in_progress_tasks, 0);
    assert_eq!(activity.pending_tasks, 1);
    assert_eq!(activity.unique_projects, 1);
    assert_eq!(activity.total_hours_worked, 32.0);
    // Ratios 3.0 and 1.0: the capped view clamps the overrun to 2.0.
    assert_eq!(activity.avg_ratio_capped, 1.5);
    assert_eq!(activity.avg_ratio_raw, 2.0);
    assert_eq!(activity.timed_tasks, 2);
    assert_eq!(activity.timed_hours, 32.0);
    assert_eq!(activity.total_earnings, 160_000.0);
    assert_eq!(activity.paid_earnings, 0.0);
    assert_eq!(activity.salary_transactions, 2);
    assert_eq!(activity.avg_task_duration_days, 0, "closed within the test run");
    assert_eq!(activity.recent_project_titles, ["Refonte du portail"]);
}

#[test]
fn timeline_puts_fresh_work_in_the_current_month() {
    let fx = activity_fixture("timeline_puts_fresh_work_in_the_current_month");

    let current: String = rusqlite::Connection::open_in_memory()
        .expect("scratch connection")
        .query_row("SELECT strftime('%Y-%m', 'now')", [], |row| row.get(0))
        .expect("current month");
    let months = vec!["2000-01".to_string(), current.clone()];

    let timeline = fx
        .store
        .consultant_timeline(&fx.consultant, &months)
        .expect("timeline");
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].month, "2000-01");
    assert_eq!(timeline[0].tasks_completed, 0);
    assert_eq!(timeline[0].earnings, 0.0);
    assert_eq!(timeline[1].month, current);
    assert_eq!(timeline[1].tasks_completed, 2);
    assert_eq!(timeline[1].hours_worked, 32.0);
    assert_eq!(timeline[1].earnings, 160_000.0);
}
