mod common;

use std::env;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use records_backend::{
    app::build_router,
    config::Config,
    database::pool::{create_pool, run_migrations},
    utils::crypto::is_modern_hash,
    AppState,
};
use serde_json::json;
use uuid::Uuid;

use common::{empty_request, json_request, send_json};

/// `None` when no database is configured; the flows are skipped then.
async fn setup_app(uploads_dir: &std::path::Path) -> Option<(Router, sqlx::PgPool)> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database flow");
        return None;
    };
    let config = Config {
        database_url,
        uploads_dir: uploads_dir.display().to_string(),
        ..Config::default()
    };
    let pool = create_pool(&config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    let app = build_router(AppState::new(pool.clone(), &config), &config);
    Some((app, pool))
}

#[tokio::test]
async fn user_lifecycle_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let Some((app, pool)) = setup_app(tmp.path()).await else {
        return;
    };
    let email = format!("flow_{}@example.com", Uuid::new_v4());

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            "/api/users/register",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": "analytical",
                "role": "staff",
                "legal": {"nda": true},
                "balance": 0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["legal"], json!({"nda": true}));
    assert!(body["user"].get("passwordHash").is_none());
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        json_request(
            "POST",
            "/api/users/register",
            json!({"firstName": "A", "lastName": "B", "email": email, "password": "x", "role": "staff"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(
        &app,
        json_request("POST", "/api/users/login", json!({"email": email, "password": "analytical"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email.as_str());

    let (status, _) = send_json(
        &app,
        json_request("POST", "/api/users/login", json!({"email": email, "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Explicit false from the query string, first name from the body.
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/users/update/{}?suspended=true&isAvailable=false", id))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"firstName": "Augusta", "suspended": false}).to_string()))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["firstName"], "Augusta");

    let (status, body) = send_json(&app, empty_request("GET", &format!("/api/users/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["firstName"], "Augusta");
    assert_eq!(body["user"]["suspended"], false);
    assert_eq!(body["user"]["isAvailable"], false);
    assert_eq!(body["user"]["lastName"], "Lovelace");

    let (status, body) = send_json(
        &app,
        json_request("PUT", &format!("/api/users/update/{}", id), json!({"firstName": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");

    let (status, _) = send_json(&app, empty_request("DELETE", &format!("/api/users/delete/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, empty_request("DELETE", &format!("/api/users/delete/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    pool.close().await;
}

#[tokio::test]
async fn legacy_credential_is_upgraded_on_login() {
    let tmp = tempfile::tempdir().unwrap();
    let Some((app, pool)) = setup_app(tmp.path()).await else {
        return;
    };
    let email = format!("legacy_{}@example.com", Uuid::new_v4());

    sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name, role) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&email)
    .bind("plain-old")
    .bind("Old")
    .bind("Timer")
    .bind("staff")
    .execute(&pool)
    .await
    .expect("seed legacy user");

    for _ in 0..2 {
        let (status, _) = send_json(
            &app,
            json_request("POST", "/api/users/login", json!({"email": email, "password": "plain-old"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE email = $1")
                .bind(&email)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(is_modern_hash(stored.as_deref().unwrap()));
    }

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
}

#[tokio::test]
async fn customer_registration_rejects_known_contacts() {
    let tmp = tempfile::tempdir().unwrap();
    let Some((app, pool)) = setup_app(tmp.path()).await else {
        return;
    };
    let mobile = format!("07{}", &Uuid::new_v4().simple().to_string()[..8]);

    let (status, body) = send_json(
        &app,
        json_request(
            "POST",
            "/api/v1/register",
            json!({"firstName": "Cy", "mobile": mobile, "address": {"city": "Mombasa"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer"]["address"], json!({"city": "Mombasa"}));
    let id = body["customer"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app,
        json_request("POST", "/api/v1/register", json!({"firstName": "Other", "mobile": mobile})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(&app, empty_request("GET", "/api/v1/getcustomers")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["count"].as_u64().unwrap() >= 1);

    let (status, _) = send_json(&app, empty_request("DELETE", &format!("/api/v1/delete/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    pool.close().await;
}

fn multipart_update(uri: &str, email: &str) -> Request<Body> {
    let boundary = "FLOWBOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\n{email}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"profilePic\"; filename=\"me.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary,
        email = email
    );
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn rejected_update_leaves_no_upload_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let Some((app, pool)) = setup_app(tmp.path()).await else {
        return;
    };

    let mut ids = Vec::new();
    let mut emails = Vec::new();
    for name in ["first", "second"] {
        let email = format!("{}_{}@example.com", name, Uuid::new_v4());
        let (status, body) = send_json(
            &app,
            json_request(
                "POST",
                "/api/users/register",
                json!({"firstName": name, "lastName": "X", "email": email, "password": "pw", "role": "staff"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["user"]["id"].as_str().unwrap().to_string());
        emails.push(email);
    }

    let uri = format!("/api/users/update/{}", ids[0]);
    let (status, _) = send_json(&app, multipart_update(&uri, &emails[1])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let leftovers = std::fs::read_dir(tmp.path()).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);

    for id in &ids {
        let (status, _) = send_json(&app, empty_request("DELETE", &format!("/api/users/delete/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
    }
    pool.close().await;
}
