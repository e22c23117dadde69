use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use waytohome::api::AppState;
use waytohome::config::Config;

/// Router plus the state behind it. The database directory is removed when
/// the app is dropped.
struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = tempfile::Builder::new()
        .prefix("waytohome-api-")
        .tempdir()
        .expect("Failed to create test directory");

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", dir.path().join("waytohome.db").display());

    let state = waytohome::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = waytohome::api::router(state.clone()).await;

    TestApp {
        router,
        state,
        _dir: dir,
    }
}

/// Creates an activated account and returns its API key.
async fn create_user(state: &AppState, email: &str) -> String {
    state
        .store()
        .create_active_user(email, "password1", None)
        .await
        .expect("Failed to hash password")
        .expect("Failed to create user")
        .api_key
}

async fn send(app: &Router, method: &str, uri: &str, key: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", key);

    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_place(app: &Router, key: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/place",
        key,
        Some(json!({
            "latitude": 49.8397,
            "longitude": 24.0297,
            "address": "Lviv",
            "name": name,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn create_way(app: &Router, key: &str, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/api/way", key, Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_requires_authentication() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "auth@gmail.com").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/place").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/place", "wrong-key", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/place")
                .header(header::AUTHORIZATION, format!("Bearer {key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_place_crud() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "place@gmail.com").await;

    let id = create_place(&app, &key, "Home").await;

    let (status, body) = send(&app, "GET", &format!("/api/place/{id}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Home");
    assert!(body["data"]["stop_id"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/place/{id}"),
        &key,
        Some(json!({ "name": "Work", "stop_id": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Work");
    assert_eq!(body["data"]["address"], "Lviv");
    assert_eq!(body["data"]["stop_id"], 42);

    let (status, body) = send(&app, "GET", "/api/place", &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/place/{id}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/api/place/{id}"), &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_place_validation() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "invalid@gmail.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/place",
        &key,
        Some(json!({ "latitude": 91.0, "longitude": 0.0, "address": "a", "name": "n" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/place",
        &key,
        Some(json!({ "latitude": "north", "longitude": 0.0, "address": "a", "name": "n" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/place", &key, Some(json!({ "name": "n" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_place(&app, &key, "Home").await;
    let (status, _) = send(&app, "PUT", &format!("/api/place/{id}"), &key, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/api/place", &key, Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/api/place", &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/place/9999", &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_entities_are_forbidden() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let owner = create_user(&state, "owner@gmail.com").await;
    let other = create_user(&state, "other@gmail.com").await;

    let place = create_place(&app, &owner, "Home").await;
    let way = create_way(&app, &owner, "Commute").await;

    let (status, _) = send(&app, "GET", &format!("/api/place/{place}"), &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &format!("/api/place/{place}"), &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/way/{way}"),
        &other,
        Some(json!({ "name": "Mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/way/{way}/notification"),
        &other,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", &format!("/api/way/{way}"), &owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Commute");
}

#[tokio::test]
async fn test_way_routes_are_ordered_by_position() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "routes@gmail.com").await;

    let home = create_place(&app, &key, "Home").await;
    let stop = create_place(&app, &key, "Stop").await;
    let work = create_place(&app, &key, "Work").await;
    let way = create_way(&app, &key, "Commute").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/way/{way}/route"),
        &key,
        Some(json!({
            "start_place": stop,
            "end_place": work,
            "time": "08:30:00",
            "position": 1,
            "transport_name": "tram",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let second_leg = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/way/{way}/route"),
        &key,
        Some(json!({
            "start_place": home,
            "end_place": stop,
            "time": "08:00:00",
            "position": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/api/way/{way}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);
    let routes = body["data"]["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["position"], 0);
    assert_eq!(routes[0]["start_place"], home);
    assert_eq!(routes[1]["position"], 1);
    assert_eq!(routes[1]["transport_name"], "tram");

    let (status, body) = send(&app, "GET", &format!("/api/way/{way}/route/1"), &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], second_leg);
    assert_eq!(body["data"]["time"], "08:30:00");

    let (status, _) = send(&app, "GET", &format!("/api/way/{way}/route/7"), &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/way", &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["routes"].as_array().unwrap().len(), 2);

    // Deleting a place removes the legs that use it.
    let (status, _) = send(&app, "DELETE", &format!("/api/place/{home}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/api/way/{way}"), &key, None).await;
    let routes = body["data"]["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["id"], second_leg);
}

#[tokio::test]
async fn test_route_validation() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "legs@gmail.com").await;
    let other = create_user(&state, "strange@gmail.com").await;

    let home = create_place(&app, &key, "Home").await;
    let foreign = create_place(&app, &other, "Elsewhere").await;
    let way = create_way(&app, &key, "Commute").await;

    let leg = |start: i64, end: i64, position: i32| {
        json!({ "start_place": start, "end_place": end, "time": "07:15:00", "position": position })
    };

    let uri = format!("/api/way/{way}/route");

    let (status, _) = send(&app, "POST", &uri, &key, Some(leg(home, home, 0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", &uri, &key, Some(leg(home, foreign, 0))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let work = create_place(&app, &key, "Work").await;
    let (status, _) = send(&app, "POST", &uri, &key, Some(leg(home, work, -1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", &uri, &key, Some(leg(home, work, 0))).await;
    assert_eq!(status, StatusCode::CREATED);
    let route = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, "GET", &format!("/api/route/{route}"), &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/route/{route}"),
        &key,
        Some(json!({ "position": 3, "transport_name": "bus" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["position"], 3);
    assert_eq!(body["data"]["transport_name"], "bus");

    let (status, _) = send(&app, "DELETE", &format!("/api/route/{route}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/route/{route}"), &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifications() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "notify@gmail.com").await;
    let way = create_way(&app, &key, "Commute").await;
    let mut events = state.shared.event_bus.subscribe();

    let uri = format!("/api/way/{way}/notification");

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        &key,
        Some(json!({
            "start_time": "2019-11-10",
            "end_time": "2019-11-01",
            "week_day": 1,
            "time": "08:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        &key,
        Some(json!({
            "start_time": "2019-11-01",
            "end_time": "2019-11-10",
            "week_day": 7,
            "time": "08:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        &key,
        Some(json!({
            "start_time": "2019-11-01",
            "end_time": "2019-11-10",
            "week_day": 1,
            "time": "08:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(matches!(
        events.try_recv(),
        Ok(waytohome::domain::TripEvent::NotificationScheduled(_))
    ));

    let (status, body) = send(&app, "GET", &uri, &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/notification/{id}"),
        &key,
        Some(json!({ "week_day": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["week_day"], 4);

    // Deleting the way cascades to its notifications.
    let (status, _) = send(&app, "DELETE", &format!("/api/way/{way}"), &key, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/notification/{id}"), &key, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_activation_and_login() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;

    let register = |body: Value| {
        Request::builder()
            .method("POST")
            .uri("/api/user/register")
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(register(json!({ "email": "new@gmail.com", "password": "password1" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(register(json!({ "email": "new@gmail.com", "password": "password1" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(register(json!({ "email": "not-an-email", "password": "password1" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let login = |email: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(
                json!({ "email": email, "password": "password1" }).to_string(),
            ))
            .unwrap()
    };

    // Not activated yet.
    let response = app.clone().oneshot(login("new@gmail.com")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let registration = state
        .auth_service()
        .register("second@gmail.com", "password1")
        .await
        .unwrap();

    let activate = |token: &str| {
        Request::builder()
            .uri(format!("/api/user/activate/{token}"))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(activate("bogus")).await.unwrap();
    assert_eq!(response.status().as_u16(), 498);

    let response = app
        .clone()
        .oneshot(activate(&registration.activation_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(activate(&registration.activation_token))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 498);

    let response = app.clone().oneshot(login("second@gmail.com")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("login sets a session cookie")
        .to_string();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["user"]["email"], "second@gmail.com");
    assert_eq!(body["data"]["api_key"].as_str().unwrap().len(), 64);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    create_user(&state, "wrong@gmail.com").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    json!({ "email": "wrong@gmail.com", "password": "password2" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_phone_and_profile() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "profile@gmail.com").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/user/phone",
        &key,
        Some(json!({ "phone_number": "0931234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/user/phone",
        &key,
        Some(json!({ "phone_number": "+380931234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["phone_number"], "+380931234567");

    let (status, body) = send(&app, "GET", "/api/user/profile", &key, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "");

    let (status, _) = send(&app, "PUT", "/api/user/profile", &key, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/user/profile",
        &key,
        Some(json!({ "first_name": "Taras", "telegram_id": 1234567 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["first_name"], "Taras");
    assert_eq!(body["data"]["telegram_id"], 1234567);
}

#[tokio::test]
async fn test_account_deletion_removes_everything() {
    let TestApp {
        router: app,
        state,
        _dir,
    } = spawn_app().await;
    let key = create_user(&state, "gone@gmail.com").await;

    let place = create_place(&app, &key, "Home").await;
    let way = create_way(&app, &key, "Commute").await;

    let (status, _) = send(&app, "DELETE", "/api/user", &key, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/user", &key, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let place = i32::try_from(place).unwrap();
    let way = i32::try_from(way).unwrap();
    assert!(state.store().get_place(place).await.unwrap().is_none());
    assert!(state.store().get_way(way).await.unwrap().is_none());
}
