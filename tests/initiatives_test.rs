//! Kanban board and Gantt timeline over initiatives

use serde_json::{Value, json};
use verdant::testing::{self, TestApp, fake};

#[tokio::test]
async fn test_board_partitions_initiatives_by_status() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    let mut ids = Vec::new();
    for status in ["planned", "in_progress", "planned", "completed", "on_hold"] {
        ids.push(app.create(&admin, "/api/initiatives", fake::initiative(status)).await);
    }

    let board: Value = testing::get(app.router(), "/api/initiatives/board")
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    let columns = board["columns"].as_array().unwrap();
    let statuses: Vec<&str> = columns.iter().map(|c| c["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, ["planned", "in_progress", "on_hold", "completed"]);

    let counts: Vec<u64> = columns.iter().map(|c| c["count"].as_u64().unwrap()).collect();
    assert_eq!(counts, [2, 1, 1, 1]);
    assert_eq!(board["total"], 5);

    let mut seen: Vec<&str> = columns
        .iter()
        .flat_map(|c| c["items"].as_array().unwrap())
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    seen.sort();
    let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    expected.sort();
    assert_eq!(seen, expected);

    for column in columns {
        for item in column["items"].as_array().unwrap() {
            assert_eq!(item["status"], column["status"]);
        }
    }
}

#[tokio::test]
async fn test_moving_a_card_changes_only_status() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let id = app
        .create(
            &admin,
            "/api/initiatives",
            json!({"title": "Glass collection", "status": "in_progress", "progress": 60}),
        )
        .await;

    let moved: Value = testing::patch(app.router(), &format!("/api/initiatives/{id}/status"))
        .bearer_token(&admin.token)
        .json_body(&json!({"status": "completed"}))
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(moved["status"], "completed");
    assert_eq!(moved["progress"], 60);
    assert_eq!(moved["title"], "Glass collection");

    let board: Value = testing::get(app.router(), "/api/initiatives/board")
        .bearer_token(&admin.token)
        .execute()
        .await
        .json()
        .await;
    assert_eq!(board["columns"][1]["count"], 0);
    assert_eq!(board["columns"][3]["items"][0]["id"], id.as_str());

    testing::patch(app.router(), &format!("/api/initiatives/{id}/status"))
        .bearer_token(&admin.token)
        .json_body(&json!({"status": "archived"}))
        .execute()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_timeline_skips_unscheduled_and_sorts_by_start() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    app.create(
        &admin,
        "/api/initiatives",
        json!({"title": "Later", "status": "planned", "start_date": "2026-06-01", "end_date": "2026-07-15"}),
    )
    .await;
    app.create(
        &admin,
        "/api/initiatives",
        json!({"title": "Sooner", "status": "in_progress", "start_date": "2026-02-01"}),
    )
    .await;
    app.create(&admin, "/api/initiatives", json!({"title": "Someday"}))
        .await;

    let events: Vec<Value> = testing::get(app.router(), "/api/initiatives/timeline")
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Sooner");
    assert_eq!(events[0]["start"], "2026-02-01");
    assert_eq!(events[0]["end"], "2026-02-01");
    assert_eq!(events[0]["color"], "#3b82f6");
    assert_eq!(events[0]["all_day"], true);
    assert_eq!(events[1]["end"], "2026-07-15");
}

#[tokio::test]
async fn test_initiative_dates_and_progress_are_validated() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::post(app.router(), "/api/initiatives")
        .bearer_token(&admin.token)
        .json_body(&json!({"title": "Backwards", "start_date": "2026-05-10", "end_date": "2026-05-01"}))
        .execute()
        .await
        .assert_bad_request();

    testing::post(app.router(), "/api/initiatives")
        .bearer_token(&admin.token)
        .json_body(&json!({"title": "Overachiever", "progress": 120}))
        .execute()
        .await
        .assert_bad_request();

    let id = app
        .create(
            &admin,
            "/api/initiatives",
            json!({"title": "Scheduled", "start_date": "2026-05-10"}),
        )
        .await;

    // An end date before the stored start is rejected on update too
    testing::patch(app.router(), &format!("/api/initiatives/{id}"))
        .bearer_token(&admin.token)
        .json_body(&json!({"end_date": "2026-05-01"}))
        .execute()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_deleting_initiative_detaches_goals() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let initiative = app
        .create(&admin, "/api/initiatives", fake::initiative("planned"))
        .await;
    let goal = app
        .create(
            &admin,
            "/api/goals",
            json!({
                "initiative_id": initiative,
                "name": "Reduce film",
                "metric": "film_kg",
                "target_value": 50.0,
                "unit": "kg",
            }),
        )
        .await;

    testing::delete(app.router(), &format!("/api/initiatives/{initiative}"))
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_no_content();

    let goal: Value = testing::get(app.router(), &format!("/api/goals/{goal}"))
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_ok()
        .json()
        .await;
    assert!(goal["initiative_id"].is_null());
}

#[tokio::test]
async fn test_deleting_user_unassigns_their_initiatives() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let member = app.add_member(&admin).await;

    let id = app
        .create(
            &admin,
            "/api/initiatives",
            json!({"title": "Owned", "owner_id": member.user_id}),
        )
        .await;

    testing::delete(app.router(), &format!("/api/users/{}", member.user_id))
        .bearer_token(&admin.token)
        .execute()
        .await
        .assert_no_content();

    let initiative: Value = testing::get(app.router(), &format!("/api/initiatives/{id}"))
        .bearer_token(&admin.token)
        .execute()
        .await
        .json()
        .await;
    assert!(initiative["owner_id"].is_null());
}

#[tokio::test]
async fn test_clearing_start_date_unschedules_initiative() {
    let app = TestApp::new().await;
    let admin = app.register().await;
    let member = app.add_member(&admin).await;
    let id = app
        .create(
            &admin,
            "/api/initiatives",
            json!({
                "title": "Battery drop-off",
                "start_date": "2026-01-01",
                "owner_id": member.user_id,
            }),
        )
        .await;

    let updated: Value = testing::patch(app.router(), &format!("/api/initiatives/{id}"))
        .bearer_token(&admin.token)
        .json_body(&json!({"start_date": null, "owner_id": null}))
        .execute()
        .await
        .assert_ok()
        .json()
        .await;
    assert!(updated["start_date"].is_null());
    assert!(updated["owner_id"].is_null());
    assert_eq!(updated["title"], "Battery drop-off");

    let events: Vec<Value> = testing::get(app.router(), "/api/initiatives/timeline")
        .bearer_token(&admin.token)
        .execute()
        .await
        .json()
        .await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.register().await;

    testing::post(app.router(), "/api/initiatives")
        .bearer_token(&admin.token)
        .json_body(&json!({"title": "   "}))
        .execute()
        .await
        .assert_bad_request();

    let id = app.create(&admin, "/api/initiatives", fake::initiative("planned")).await;
    testing::patch(app.router(), &format!("/api/initiatives/{id}"))
        .bearer_token(&admin.token)
        .json_body(&json!({"title": ""}))
        .execute()
        .await
        .assert_bad_request();
}
