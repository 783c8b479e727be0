//! Unit tests for the resource services against a mocked database.
//!
//! Run with: cargo test --test services_unit_test

use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use weather_db::auth::{AuthMaterial, passwords, tokens};
use weather_db::common::AppState;
use weather_db::config::Config;
use weather_db::db::DbPool;
use weather_db::error::ApiError;
use weather_db::services::{sessions, stations, users, weather_data};
use weather_db::weather::Granularity;

fn test_config() -> Config {
    Config {
        db_host: "localhost".to_string(),
        db_port: "5432".to_string(),
        db_name: "weather".to_string(),
        db_user: "weather".to_string(),
        db_pass: "secret".to_string(),
        max_db_conn: 1,
        api_port: 8080,
        default_timezone: "Europe/Madrid".to_string(),
    }
}

fn state_with(conn: DatabaseConnection) -> AppState {
    AppState::new(DbPool::new(vec![conn]), test_config())
}

fn auth_with_token(token: Option<String>) -> AuthMaterial {
    AuthMaterial {
        session_token: token,
        api_key: None,
        peer_ip: "192.0.2.7".to_string(),
        user_agent: Some("tests/1.0".to_string()),
    }
}

fn row(entries: &[(&'static str, Value)]) -> BTreeMap<&'static str, Value> {
    entries.iter().cloned().collect()
}

#[tokio::test]
async fn users_list_requires_a_session_cookie() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(conn);

    let outcome = users::list(&state, Some("alice"), &auth_with_token(None)).await;
    assert!(matches!(outcome, Err(ApiError::Auth)));
}

#[tokio::test]
async fn users_list_rejects_tokens_without_an_active_session() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(Some(tokens::mint().plaintext));

    let outcome = users::list(&state, Some("alice"), &auth).await;
    assert!(matches!(outcome, Err(ApiError::Auth)));
}

#[tokio::test]
async fn users_list_maps_an_empty_result_to_not_found() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            // Session lookup succeeds...
            vec![row(&[("?column?", Value::Int(Some(1)))])],
            // ...but no visible user matches.
            vec![],
        ])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(Some(tokens::mint().plaintext));

    let outcome = users::list(&state, Some("ghost"), &auth).await;
    assert!(matches!(outcome, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn sessions_create_rejects_a_wrong_password() {
    let stored = passwords::hash("pw-abcdef".to_string()).await.unwrap();
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(&[("password", Value::from(stored))])]])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(None);

    let outcome = sessions::create(&state, "alice", Some("pw-wrong"), &auth, 3600).await;
    assert!(matches!(outcome, Err(ApiError::Auth)));
}

#[tokio::test]
async fn sessions_create_returns_the_row_and_the_plaintext_once() {
    let stored = passwords::hash("pw-abcdef".to_string()).await.unwrap();
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![row(&[("password", Value::from(stored))])],
            vec![row(&[
                ("uuid", Value::from("123e4567-e89b-12d3-a456-426614174000")),
                ("ip_address", Value::from("192.0.2.7")),
                ("user_agent", Value::from("tests/1.0")),
            ])],
        ])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(None);

    let created = sessions::create(&state, "alice", Some("pw-abcdef"), &auth, 3600)
        .await
        .unwrap();

    assert_eq!(created.token.len(), 43);
    assert!(created.session.is_object());
    assert_eq!(created.session["ip_address"], "192.0.2.7");
    // The plaintext never appears in the stored row.
    assert_ne!(created.session["uuid"], created.token);
}

#[tokio::test]
async fn stations_create_maps_a_quota_refusal_to_forbidden() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            // Token resolves to a user...
            vec![row(&[(
                "user_uuid",
                Value::from("123e4567-e89b-12d3-a456-426614174000"),
            )])],
            // ...but the gated insert touches no rows.
            vec![],
        ])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(Some(tokens::mint().plaintext));

    let outcome = stations::create(&state, Some("garden"), -3.7038, 40.4168, 657.0, &auth).await;
    assert!(matches!(outcome, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn users_patch_returns_the_row_and_revokes_sessions() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            // Caller may act on alice.
            vec![row(&[("?column?", Value::Int(Some(1)))])],
            // Not an admin: quota and admin flags are dropped.
            vec![],
            // RETURNING row of the update.
            vec![row(&[
                ("uuid", Value::from("123e4567-e89b-12d3-a456-426614174000")),
                ("username", Value::from("alice-renamed")),
                ("email", Value::from("alice@x.io")),
                ("max_stations", Value::Int(Some(1))),
                ("is_admin", Value::Bool(Some(false))),
                ("deleted_at", Value::String(None)),
            ])],
        ])
        // Session revocation after the update.
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();
    let state = state_with(conn);
    let auth = auth_with_token(Some(tokens::mint().plaintext));

    let patch = users::UserPatch {
        username: Some("alice-renamed".to_string()),
        ..Default::default()
    };
    let user = users::patch(&state, "alice", patch, &auth).await.unwrap();

    assert_eq!(user["username"], "alice-renamed");
    assert_eq!(user["is_admin"], false);
}

#[tokio::test]
async fn weather_data_list_resets_the_session_zone_and_queries() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            // quote_literal of the requested zone.
            vec![row(&[("quote_literal", Value::from("'Europe/Madrid'"))])],
            // Three raw readings in range.
            vec![
                row(&[("temperature", Value::Double(Some(21.5)))]),
                row(&[("temperature", Value::Double(Some(21.9)))]),
                row(&[("temperature", Value::Double(Some(22.4)))]),
            ],
        ])
        // SET TIME ZONE on the borrowed connection.
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let state = state_with(conn);

    let data = weather_data::list(
        &state,
        "garden",
        1, // temperature bit
        Granularity::Raw,
        "Europe/Madrid",
        "2024-06-01T00:00:00",
        "2024-06-01T00:10:00",
    )
    .await
    .unwrap();

    assert!(data.is_array());
    assert_eq!(data.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn weather_data_list_rejects_malformed_timestamps() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(conn);

    let outcome = weather_data::list(
        &state,
        "garden",
        1,
        Granularity::Raw,
        "Europe/Madrid",
        "2024-06-01 00:00:00",
        "2024-06-01T00:10:00",
    )
    .await;
    assert!(matches!(outcome, Err(ApiError::InvalidParams)));
}

#[tokio::test]
async fn weather_data_list_maps_an_empty_range_to_forbidden() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![row(&[("quote_literal", Value::from("'Europe/Madrid'"))])],
            vec![],
        ])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let state = state_with(conn);

    let outcome = weather_data::list(
        &state,
        "garden",
        0,
        Granularity::Hour,
        "Europe/Madrid",
        "2024-06-01T00:00:00",
        "2024-06-02T00:00:00",
    )
    .await;
    assert!(matches!(outcome, Err(ApiError::Forbidden)));
}
