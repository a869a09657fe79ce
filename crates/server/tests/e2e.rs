use std::net::SocketAddr;

use axum::Router;
use configs::{DatabaseBackend, DatabaseConfig};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    db: DatabaseConfig,
}

impl TestApp {
    async fn cleanup(&self) {
        if let Ok(db) = models::db::connect(&self.db).await {
            let _ = models::db::songs_collection(&db, &self.db.collection).drop().await;
        }
    }
}

/// `Ok(None)` when no database is configured; connection failures are errors.
async fn start_server() -> anyhow::Result<Option<TestApp>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(None); }
    let Ok(url) = std::env::var("MONGODB_URL") else {
        eprintln!("MONGODB_URL missing; skip e2e tests.");
        return Ok(None);
    };

    // isolated collection per test run
    let db = DatabaseConfig {
        backend: DatabaseBackend::Mongo,
        url,
        collection: format!("songs_e2e_{}", Uuid::new_v4().simple()),
        connect_timeout_secs: 3,
        server_selection_timeout_secs: 3,
        ..DatabaseConfig::default()
    };
    db.validate()?;

    let conn = models::db::connect(&db).await?;
    models::db::ping(&conn).await?;

    let state = server::startup::build_state(&db).await?;
    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(Some(TestApp { base_url, db }))
}

#[tokio::test]
async fn e2e_song_lifecycle() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/songs/", app.base_url))
        .form(&[("name", "Hallelujah"), ("lyrics", "I heard there was a secret chord"), ("last_performed_date", "15-03-2024")])
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created: Value = res.json().await?;
    let id = created["song_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(id.len(), 24);

    let res = client.get(format!("{}/songs/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let song: Value = res.json().await?;
    assert_eq!(song["_id"], json!(id));
    assert_eq!(song["name"], "Hallelujah");
    assert_eq!(song["last_performed_date"], "2024-03-15T00:00:00Z");
    assert_eq!(song["performances"], json!([]));

    let res = client
        .put(format!("{}/songs/{}", app.base_url, id))
        .json(&json!({"last_performed_date": "2024-06-01T20:30:00Z"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Song updated successfully");

    let song: Value = client.get(format!("{}/songs/{}", app.base_url, id)).send().await?.json().await?;
    assert_eq!(song["last_performed_date"], "2024-06-01T20:30:00Z");

    let list: Value = client.get(format!("{}/songs/", app.base_url)).send().await?.json().await?;
    let ids: Vec<&str> = list
        .as_array()
        .map(|a| a.iter().filter_map(|s| s["_id"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![id.as_str()]);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_and_malformed_ids() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/songs/000000000000000000000000", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Song not found");

    let res = client.get(format!("{}/songs/not-an-id", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/songs/000000000000000000000000?last_performed_date=2024-06-01T20:30:00Z", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    app.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn e2e_empty_collection_lists_nothing() -> anyhow::Result<()> {
    let Some(app) = start_server().await? else { return Ok(()) };
    let res = reqwest::get(format!("{}/songs/", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let list: Value = res.json().await?;
    assert_eq!(list, json!([]));
    Ok(())
}
