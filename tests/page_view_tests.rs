// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page view tests: guards, redirects, and assembled view data.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Days, Utc};
use serde_json::json;
use tower::ServiceExt;

mod common;

async fn get_page(
    app: &axum::Router,
    uri: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_protected_page_redirects_to_login() {
    let (app, _, _) = common::create_test_app();

    let response = get_page(&app, "/dashboard", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_unknown_path_redirects_home() {
    let (app, _, _) = common::create_test_app();

    let response = get_page(&app, "/does-not-exist", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_landing_reports_authentication() {
    let (app, _, _) = common::create_test_app();

    let response = get_page(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    // Security headers ride on every response
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let body = common::body_json(response).await;
    assert_eq!(body["page"], "landing");
    assert_eq!(body["authenticated"], false);

    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;
    let response = get_page(&app, "/", Some(&cookie)).await;
    let body = common::body_json(response).await;
    assert_eq!(body["authenticated"], true);
}

#[tokio::test]
async fn test_login_page_redirects_when_authenticated() {
    let (app, _, _) = common::create_test_app();

    let response = get_page(&app, "/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["page"], "login");

    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;
    let response = get_page(&app, "/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let response = get_page(&app, "/signup", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn test_dashboard_view() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "City 10K",
            "date": "2026-03-01",
            "distance": 10.0,
            "raceType": "running",
            "terrainType": "road",
            "time": "00:50:00",
            "isCompleted": true,
        }),
    )
    .await;
    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "Forest 5K",
            "date": "2026-04-01",
            "distance": 5.0,
            "raceType": "running",
            "terrainType": "trail",
            "time": "00:20:00",
            "isCompleted": true,
        }),
    )
    .await;

    let next_race_day = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(10))
        .unwrap();
    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "Autumn Half",
            "date": next_race_day.to_string(),
            "distance": 21.1,
            "raceType": "running",
            "terrainType": "road",
            "isCompleted": false,
        }),
    )
    .await;

    let response = get_page(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["user"]["email"], "runner@example.com");

    let metrics = &body["metrics"];
    assert_eq!(metrics["totalRaces"], 3);
    assert_eq!(metrics["totalCompletedRaces"], 2);
    assert_eq!(metrics["totalUpcomingRaces"], 1);
    assert_eq!(metrics["totalDistance"], 15.0);
    assert_eq!(metrics["totalTime"], 4200);
    assert_eq!(metrics["terrainDistribution"]["road"], 1);
    assert_eq!(metrics["terrainDistribution"]["trail"], 1);
    // 4:00/km on the trail 5K beats 5:00/km on the road 10K
    assert_eq!(metrics["fastest"]["race"]["name"], "Forest 5K");
    assert_eq!(metrics["fastest"]["pace"], 4.0);

    // 15 km is about 143 soccer fields
    assert_eq!(body["funFacts"]["soccerFields"], 143);

    let countdown = &body["countdown"];
    assert_eq!(countdown["race"]["name"], "Autumn Half");
    let days = countdown["remaining"]["days"].as_i64().unwrap();
    assert!((9..=10).contains(&days), "expected ~10 days, got {days}");
}

#[tokio::test]
async fn test_dashboard_without_races_has_no_countdown() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    let response = get_page(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["metrics"]["totalRaces"], 0);
    assert!(body.get("countdown").is_none());
    assert!(body["metrics"].get("fastest").is_none());
}

#[tokio::test]
async fn test_race_list_filters() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "City 10K",
            "date": "2026-03-01",
            "distance": 10.0,
            "raceType": "running",
            "terrainType": "road",
            "time": "00:50:00",
            "isCompleted": true,
            "location": "Springfield",
        }),
    )
    .await;
    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "Forest 5K",
            "date": "2026-04-01",
            "distance": 5.0,
            "raceType": "running",
            "terrainType": "trail",
            "time": "00:20:00",
            "isCompleted": true,
        }),
    )
    .await;
    common::create_race(
        &app,
        &cookie,
        json!({
            "name": "Autumn Half",
            "date": "2027-10-03",
            "distance": 21.1,
            "raceType": "running",
            "terrainType": "road",
            "isCompleted": false,
        }),
    )
    .await;

    // Completed tab: both finished races, with display strings
    let response = get_page(&app, "/races", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let races = body["races"].as_array().unwrap();
    assert_eq!(races.len(), 2);
    assert_eq!(body["total"], 2);
    let city = races
        .iter()
        .find(|item| item["race"]["name"] == "City 10K")
        .unwrap();
    assert_eq!(city["timeDisplay"], "00:50:00");
    assert_eq!(city["paceDisplay"], "5:00");

    // Terrain filter narrows the list but not the total
    let response = get_page(&app, "/races?terrain=trail", Some(&cookie)).await;
    let body = common::body_json(response).await;
    assert_eq!(body["races"].as_array().unwrap().len(), 1);
    assert_eq!(body["races"][0]["race"]["name"], "Forest 5K");
    assert_eq!(body["total"], 2);

    // Search matches name or location, case-insensitively
    let response = get_page(&app, "/races?search=springfield", Some(&cookie)).await;
    let body = common::body_json(response).await;
    assert_eq!(body["races"].as_array().unwrap().len(), 1);
    assert_eq!(body["races"][0]["race"]["name"], "City 10K");

    // Upcoming tab: the planned race, no display strings
    let response = get_page(&app, "/races/upcoming", Some(&cookie)).await;
    let body = common::body_json(response).await;
    let races = body["races"].as_array().unwrap();
    assert_eq!(races.len(), 1);
    assert_eq!(races[0]["race"]["name"], "Autumn Half");
    assert!(races[0].get("timeDisplay").is_none());
}

#[tokio::test]
async fn test_edit_page_returns_race_or_redirects() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    let race = common::create_race(
        &app,
        &cookie,
        json!({
            "name": "City 10K",
            "date": "2026-03-01",
            "distance": 10.0,
            "raceType": "running",
            "terrainType": "road",
            "time": "00:50:00",
            "isCompleted": true,
        }),
    )
    .await;
    let id = race["id"].as_str().unwrap();

    let response = get_page(&app, &format!("/races/edit/{id}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["race"]["name"], "City 10K");

    // An unknown id quietly goes back to the list
    let response = get_page(
        &app,
        "/races/edit/00000000-0000-0000-0000-000000000000",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/races");
}
