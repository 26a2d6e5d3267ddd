//! Integration tests for the Axum web server.
//!
//! These tests verify that routes are correctly wired to the core and that
//! core errors come back with the right status codes.

mod common;

use std::fs;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{ACTIVE_WORLD, TestApp};

#[tokio::test]
async fn worlds_list_is_sorted_with_count() {
    let app = TestApp::new();
    app.world("beta");
    app.world(ACTIVE_WORLD);
    fs::write(app.path("worlds/beta.wld.bak"), b"bak").unwrap();
    let token = app.login().await;

    let res = app.get("/api/worlds", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["worlds"][0]["name"], ACTIVE_WORLD);
    assert_eq!(body["worlds"][1]["name"], "beta");
    assert_eq!(body["worlds"][1]["has_backup"], true);
    assert_eq!(body["worlds"][0]["size"], "2.0KB");
}

#[tokio::test]
async fn world_detail_and_errors() {
    let app = TestApp::new();
    app.world(ACTIVE_WORLD);
    let token = app.login().await;

    let res = app.get("/api/worlds/Alpha", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["filename"], "Alpha.wld");
    assert_eq!(res.json()["has_backup"], false);

    let res = app.get("/api/worlds/Missing", &token).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["success"], false);

    let res = app.get("/api/worlds/%21%21%21", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn world_delete_requires_name_confirmation() {
    let app = TestApp::new();
    let world = app.world("Old");
    let token = app.login().await;

    let res = app.delete("/api/worlds/Old?confirm=true", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(world.exists());

    let res = app.delete("/api/worlds/Old?confirm=Old", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["success"], true);
    assert!(!world.exists());
}

#[tokio::test]
async fn world_copy_creates_destination() {
    let app = TestApp::new();
    app.world(ACTIVE_WORLD);
    let token = app.login().await;

    let res = app
        .post(
            "/api/worlds/Alpha/copy",
            &token,
            Some(json!({"destination": "Alpha Copy!"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["world"]["name"], "AlphaCopy");
    assert!(app.path("worlds/AlphaCopy.wld").is_file());

    let res = app
        .post(
            "/api/worlds/Alpha/copy",
            &token,
            Some(json!({"destination": "AlphaCopy"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app.post("/api/worlds/Alpha/copy", &token, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn world_create_conflict_and_validation() {
    let app = TestApp::new();
    app.world("Taken");
    let token = app.login().await;

    let res = app
        .post("/api/worlds", &token, Some(json!({"name": "Tak/en"})))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app.post("/api/worlds", &token, Some(json!({"size": 2}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "World name is required");
}

#[cfg(unix)]
#[tokio::test]
async fn world_create_runs_world_manager() {
    use std::os::unix::fs::PermissionsExt;

    let app = TestApp::new();
    let script = app.path("scripts/world-manager.sh");
    let worlds = app.path("worlds");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\nprintf 'generated' > \"{}/$WORLD_NAME.wld\"\necho \"size $AUTOCREATE\"\n",
            worlds.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let token = app.login().await;

    let res = app
        .post(
            "/api/worlds",
            &token,
            Some(json!({"name": "Fresh", "size": 9, "difficulty": 1})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text());
    let body = res.json();
    assert_eq!(body["world"]["name"], "Fresh");
    assert_eq!(body["world"]["size_code"], 2);
    assert_eq!(body["world"]["difficulty"], 1);
    assert!(app.path("worlds/Fresh.wld").is_file());
}

#[tokio::test]
async fn backups_list_applies_filter_and_limit() {
    let app = TestApp::new();
    app.backup("backup_Alpha_20240101_010101.tar.gz");
    app.backup("backup_Alpha_20240102_010101.tar.gz");
    app.backup("backup_Beta_20240103_010101.tar.gz");
    app.backup("notes.txt");
    let token = app.login().await;

    let res = app.get("/api/backups", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["count"], 3);
    assert_eq!(res.json()["retention"], 48);

    let res = app.get("/api/backups?world=Alpha&limit=1", &token).await;
    let body = res.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["total_size_bytes"], 14);
    assert_eq!(body["backups"][0]["world_name"], "Alpha");
}

#[tokio::test]
async fn backup_delete_checks_name_and_confirmation() {
    let app = TestApp::new();
    let backup = app.backup("backup_Alpha_20240101_010101.tar");
    let token = app.login().await;

    let res = app
        .delete("/api/backups/backup_..tar?confirm=true", &token)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Invalid backup filename");

    let res = app
        .delete("/api/backups/backup_Gone_20240101_010101.tar?confirm=true", &token)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .delete("/api/backups/backup_Alpha_20240101_010101.tar", &token)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(backup.exists());

    let res = app
        .delete(
            "/api/backups/backup_Alpha_20240101_010101.tar?confirm=true",
            &token,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!backup.exists());
}

#[tokio::test]
async fn backup_detail_omits_unreadable_contents() {
    let app = TestApp::new();
    app.backup("backup_Alpha_20240101_010101.tar.gz");
    let token = app.login().await;

    let res = app
        .get("/api/backups/backup_Alpha_20240101_010101.tar.gz", &token)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["world_name"], "Alpha");
    assert!(body.get("contents").is_none());
}

#[tokio::test]
async fn restore_failure_reports_missing_script() {
    let app = TestApp::new();
    app.backup("backup_Alpha_20240101_010101.tar");
    let token = app.login().await;

    let res = app
        .post(
            "/api/backups/backup_Alpha_20240101_010101.tar/restore?no_backup=true",
            &token,
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json();
    assert_eq!(body["success"], false);
    assert!(body["detail"].as_str().unwrap().contains("Script not found"));
}

#[tokio::test]
async fn stop_when_not_running_is_bad_request() {
    let app = TestApp::new();
    let token = app.login().await;

    let res = app.post("/api/server/stop", &token, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Server is not running");
}

#[tokio::test]
async fn server_status_and_health() {
    let app = TestApp::new();
    let token = app.login().await;

    let res = app.get("/api/server/status", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["running"], false);
    assert_eq!(body["supervisor"], false);
    assert_eq!(body["terraria"]["state"], "STOPPED");

    let res = app.get("/api/server/health", &token).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json();
    assert_eq!(body["healthy"], false);
    assert_eq!(body["checks"]["supervisor"]["status"], "error");
    assert_eq!(body["checks"]["backup_scheduler"]["message"], "Disabled");
}

#[tokio::test]
async fn log_tail_window() {
    let app = TestApp::new();
    app.log("terraria-stdout.log", 10);
    let token = app.login().await;

    let res = app.get("/api/logs/server?lines=5", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["exists"], true);
    assert_eq!(body["total_lines"], 10);
    assert_eq!(body["start_line"], 5);
    assert_eq!(body["lines_returned"], 5);
    assert_eq!(body["lines"][0], "line 6");
    assert!(body["content"].as_str().unwrap().ends_with("line 10"));

    let res = app.get("/api/logs/nonsense", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn log_search_and_listing() {
    let app = TestApp::new();
    app.log("backup.log", 3);
    fs::write(app.path("logs/custom.txt"), "x").unwrap();
    let token = app.login().await;

    let res = app.get("/api/logs/search?q=LINE%202", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["log"], "backup");
    assert_eq!(body["results"][0]["line_number"], 2);

    let res = app.get("/api/logs/search", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/logs", &token).await;
    assert_eq!(res.json()["count"], 2);
}

#[tokio::test]
async fn log_clear_needs_confirmation() {
    let app = TestApp::new();
    let log = app.log("crashes.log", 4);
    let token = app.login().await;

    let res = app.post("/api/logs/crash/clear", &token, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.post("/api/logs/server/clear?confirm=true", &token, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.post("/api/logs/crash/clear?confirm=true", &token, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Log 'crashes.log' cleared");
    assert_eq!(fs::read(&log).unwrap().len(), 0);
}

#[tokio::test]
async fn config_view_and_update() {
    let app = TestApp::new();
    let token = app.login().await;

    let res = app.get("/api/config", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["server"]["world_name"], ACTIVE_WORLD);
    assert_eq!(body["server"]["has_password"], false);
    assert!(body["server"].get("password").is_none());

    let res = app
        .send(
            Method::PUT,
            "/api/config",
            Some(&token),
            Some(json!({"max_players": 500, "backup_interval": 15, "bogus": 1})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    let updated = body["updated"].as_array().unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.contains(&json!("max_players")));
    assert!(updated.contains(&json!("backup_interval")));
    assert_eq!(body["restart_required"], true);
    assert!(body["message"].as_str().unwrap().starts_with("Updated: "));

    let res = app.get("/api/config", &token).await;
    assert_eq!(res.json()["server"]["max_players"], 255);

    let res = app
        .send(Method::PUT, "/api/config", Some(&token), Some(json!({"bogus": 1})))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn runtime_config_absent_then_present() {
    let app = TestApp::new();
    let token = app.login().await;

    let res = app.get("/api/config/runtime", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["exists"], false);
    assert_eq!(res.json()["message"], "Runtime config not yet generated");

    fs::write(app.path("config/serverconfig-runtime.txt"), "maxplayers=8\n").unwrap();
    let res = app.get("/api/config/runtime", &token).await;
    assert_eq!(res.json()["exists"], true);
    assert_eq!(res.json()["content"], "maxplayers=8\n");
}
