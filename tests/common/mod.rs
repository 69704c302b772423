//! In-process fake of the table API, for exercising `HttpStore` over real HTTP.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

type Params = HashMap<String, String>;

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    list_queries: Vec<(String, Params)>,
    bodies: Vec<(String, Value)>,
    next_id: usize,
}

#[derive(Clone, Default)]
pub struct FakeTables {
    inner: Arc<Mutex<Tables>>,
}

impl FakeTables {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.lock()
            .rows
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Every request to `table` answers 503 from now on.
    pub fn fail(&self, table: &str) {
        self.lock().failing.insert(table.to_string());
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    pub fn row(&self, table: &str, id: &str) -> Option<Value> {
        self.rows(table).into_iter().find(|r| r["id"] == id)
    }

    /// Query strings of list calls, in arrival order.
    pub fn list_queries(&self) -> Vec<(String, Params)> {
        self.lock().list_queries.clone()
    }

    /// Request bodies of writes, tagged with the HTTP method.
    pub fn bodies(&self) -> Vec<(String, Value)> {
        self.lock().bodies.clone()
    }

    fn check(&self, table: &str) -> Result<(), StatusCode> {
        if self.lock().failing.contains(table) {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(())
    }
}

pub struct FakeServer {
    /// e.g. `http://127.0.0.1:41234/tables`
    pub base_url: String,
    pub tables: FakeTables,
}

pub async fn spawn() -> FakeServer {
    let tables = FakeTables::default();
    let app = Router::new()
        .route("/tables/{table}", get(list).post(create))
        .route(
            "/tables/{table}/{id}",
            get(fetch).put(replace).patch(patch).delete(remove),
        )
        .with_state(tables.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        base_url: format!("http://{}/tables", addr),
        tables,
    }
}

/// A row as the table API stores it.
pub fn row(id: &str, name: &str, categories: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "url": format!("https://{}.example", name.to_lowercase()),
        "categories": categories,
        "description": "",
        "icon_url": "",
        "tags": [],
        "rating": 0,
        "is_favorite": false,
        "usage_count": 0,
        "last_used": null,
        "subscription_status": "free",
        "subscription_plan": null,
        "subscription_price": null,
        "billing_cycle": null,
        "subscription_start_date": null,
        "next_billing_date": null,
        "created_at": 1_717_200_000_000_i64,
        "updated_at": 1_717_200_000_000_i64
    })
}

async fn list(
    State(tables): State<FakeTables>,
    Path(table): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    tables
        .lock()
        .list_queries
        .push((table.clone(), params.clone()));
    tables.check(&table)?;

    let limit = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = tables.rows(&table).into_iter().take(limit).collect();
    let total = rows.len();
    Ok(Json(json!({ "data": rows, "total": total, "page": 1 })))
}

async fn create(
    State(tables): State<FakeTables>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    tables.check(&table)?;
    let mut guard = tables.lock();
    guard.bodies.push(("POST".to_string(), body.clone()));
    guard.next_id += 1;

    let mut row = body;
    row["id"] = json!(format!("row-{}", guard.next_id));
    row["created_at"] = json!(1_750_000_000_000_i64);
    row["updated_at"] = json!(1_750_000_000_000_i64);
    guard.rows.entry(table).or_default().push(row.clone());
    Ok((StatusCode::CREATED, Json(row)))
}

async fn fetch(
    State(tables): State<FakeTables>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    tables.check(&table)?;
    tables.row(&table, &id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace(
    State(tables): State<FakeTables>,
    Path((table, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    tables.check(&table)?;
    let mut guard = tables.lock();
    guard.bodies.push(("PUT".to_string(), body.clone()));
    let row = guard
        .rows
        .get_mut(&table)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;

    let created_at = row["created_at"].clone();
    *row = body;
    row["id"] = json!(id);
    row["created_at"] = created_at;
    Ok(Json(row.clone()))
}

async fn patch(
    State(tables): State<FakeTables>,
    Path((table, id)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, StatusCode> {
    tables.check(&table)?;
    let mut guard = tables.lock();
    guard
        .bodies
        .push(("PATCH".to_string(), Value::Object(body.clone())));
    let row = guard
        .rows
        .get_mut(&table)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;

    for (key, value) in body {
        row[key.as_str()] = value;
    }
    Ok(Json(row.clone()))
}

async fn remove(
    State(tables): State<FakeTables>,
    Path((table, id)): Path<(String, String)>,
) -> StatusCode {
    if tables.check(&table).is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    let mut guard = tables.lock();
    let Some(rows) = guard.rows.get_mut(&table) else {
        return StatusCode::NOT_FOUND;
    };
    let before = rows.len();
    rows.retain(|r| r["id"] != id.as_str());
    if rows.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}
