use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use quietroom::config::Config;
use quietroom::server::create_router;
use quietroom::types::RoomFinderState;

async fn mock_room(Path((building, room)): Path<(String, String)>) -> Response {
    if room == "N500" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if building != "OKT" || room != "N155" {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    Json(json!({
        "BuildingCode": "OKT",
        "RoomNumber": "N155",
        "Capacity": "40",
        "RoomType": "*Lab Computer",
        "Events": [
            {
                "Name": "CS 101",
                "DaysMet": ["M", "W"],
                "StartTime": "0900",
                "EndTime": "1000",
                "StartDate": "2000-01-01",
                "EndDate": "2999-12-31"
            },
            {
                "Name": "CS 099",
                "DaysMet": ["T"],
                "StartTime": "1300",
                "EndTime": "1400",
                "StartDate": "2000-01-01",
                "EndDate": "2000-05-01"
            }
        ]
    }))
    .into_response()
}

async fn mock_availability(Path(building): Path<String>) -> Response {
    match building.as_str() {
        "OKT" => Json(json!(["N160", "N155"])).into_response(),
        "SST" => Json(json!([])).into_response(),
        "SLOW" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!(["S100"])).into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

/// Starts a fake QuietRoom API and returns its base URL.
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/building/:building/room/:room", get(mock_room))
        .route("/availability/:building", get(mock_availability));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}")
}

async fn app() -> Router {
    app_with(&["OKT", "SST", "BAD"]).await
}

async fn app_with(buildings: &[&str]) -> Router {
    let config = Config {
        api_base_url: spawn_upstream().await,
        buildings: buildings.iter().map(|b| b.to_string()).collect(),
        ..Config::default()
    };
    create_router(Arc::new(RoomFinderState::new(config).unwrap()))
}

async fn get_json(app: &Router, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(session) = session {
        request = request.header("x-session-id", session);
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_and_buildings() {
    let app = app().await;

    let (status, body) = get_json(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(&app, "/buildings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["OKT", "SST", "BAD"]));
}

#[tokio::test]
async fn test_room_lookup() {
    let app = app().await;

    let (status, body) = get_json(&app, "/room/OKT/n155", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["card"]["state"], "loaded");
    assert_eq!(body["card"]["data"]["title"], "OKT N155");
    assert_eq!(body["card"]["data"]["capacity"], 40);
    assert_eq!(body["card"]["data"]["room_type"], "Lab - Computer");

    // Expired meeting is filtered out
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["Name"], "CS 101");
    assert_eq!(events[0]["DaysMet"], "M - W");

    let columns = body["schedule"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 5);
    assert_eq!(columns[0]["placements"].as_array().unwrap().len(), 1);
    assert_eq!(columns[1]["placements"].as_array().unwrap().len(), 0);
    assert_eq!(columns[2]["placements"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_room_not_found() {
    let app = app().await;

    let (status, body) = get_json(&app, "/room/OKT/N999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["card"]["state"], "not_found");
    assert_eq!(body["error"], "This room does not exist. Please try again!");
    assert_eq!(body["events"], json!([]));
}

#[tokio::test]
async fn test_room_blank_input() {
    let app = app().await;

    let (status, body) = get_json(&app, "/room?building=OKT&num=%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input. Please try again!");

    let (status, body) = get_json(&app, "/room?building=OKT&num=n155", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["data"]["title"], "OKT N155");
}

#[tokio::test]
async fn test_availability_rejects_bad_input() {
    let app = app().await;

    let (status, _) = get_json(&app, "/availability?day=X", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(
        &app,
        "/availability?day=M&start_time=14:00&end_time=13:00",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_merges_buildings() {
    let app = app().await;

    let (status, body) = get_json(&app, "/availability/latest", Some("tab-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["state"], "empty");

    let (status, body) = get_json(
        &app,
        "/availability?day=w&start_time=10:00&end_time=1130",
        Some("tab-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"]["day"], "W");
    assert_eq!(body["query"]["end_time"], "1130");
    assert_eq!(body["pending"], 0);
    assert_eq!(body["state"]["state"], "loaded");

    let rooms = body["state"]["data"].as_array().unwrap();
    let names: Vec<_> = rooms
        .iter()
        .map(|r| r["RoomNumber"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["N155", "N160"]);
    assert!(rooms.iter().all(|r| r["Building"] == "OKT"));

    let failures = body["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["building"], "BAD");

    // Same result is available without searching again
    let (_, latest) = get_json(&app, "/availability/latest", Some("tab-1")).await;
    assert_eq!(latest, body);

    // Other sessions don't see it
    let (_, other) = get_json(&app, "/availability/latest", Some("tab-2")).await;
    assert_eq!(other["state"]["state"], "empty");
}

#[tokio::test]
async fn test_room_upstream_failure() {
    let app = app().await;

    let (status, body) = get_json(&app, "/room/OKT/N500", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["card"]["state"], "error");
    assert!(body["error"].is_string());
    assert!(body["schedule"].is_null());
}

#[tokio::test]
async fn test_newer_search_supersedes_older() {
    let app = app_with(&["OKT", "SLOW"]).await;

    let first = get_json(
        &app,
        "/availability?day=M&start_time=0900&end_time=1000",
        Some("tab-1"),
    );
    let second = async {
        // Let the first search start before this one replaces it
        tokio::time::sleep(Duration::from_millis(50)).await;
        get_json(
            &app,
            "/availability?day=T&start_time=0900&end_time=1000",
            Some("tab-1"),
        )
        .await
    };
    let ((first_status, first_body), (second_status, second_body)) =
        tokio::join!(first, second);

    assert_eq!(first_status, StatusCode::CONFLICT);
    assert!(first_body["error"].is_string());
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body["query"]["day"], "T");

    let (_, latest) = get_json(&app, "/availability/latest", Some("tab-1")).await;
    assert_eq!(latest["query"]["day"], "T");
    assert_eq!(latest["state"]["state"], "loaded");
}

#[tokio::test]
async fn test_searches_without_session_are_independent() {
    let app = app_with(&["OKT", "SLOW"]).await;

    let first = get_json(&app, "/availability?day=M", None);
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        get_json(&app, "/availability?day=T", None).await
    };
    let ((first_status, first_body), (second_status, second_body)) =
        tokio::join!(first, second);

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(first_body["query"]["day"], "M");
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body["query"]["day"], "T");
    assert_eq!(first_body["state"]["data"].as_array().unwrap().len(), 3);

    // Nothing is kept for callers without a session
    let (_, latest) = get_json(&app, "/availability/latest", None).await;
    assert_eq!(latest["state"]["state"], "empty");
}
