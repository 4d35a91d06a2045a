//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Extension, Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use rollcall_core::{
  cache::CachedStore, identity::Actor, store::AttendanceStore, subject::NewSubject,
};
use rollcall_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;

type Store = CachedStore<SqliteStore>;

async fn make_store() -> Arc<Store> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  Arc::new(CachedStore::new(store))
}

fn teacher() -> Actor {
  Actor { user_id: Uuid::new_v4(), username: "teacher".into() }
}

fn app(store: &Arc<Store>, actor: Option<Actor>) -> Router {
  let router = api_router(store.clone());
  match actor {
    Some(actor) => router.layer(Extension(actor)),
    None => router,
  }
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn student_json(roll: &str, name: &str) -> Value {
  json!({
    "roll_number": roll,
    "name":        name,
    "email":       format!("{roll}@school.edu"),
    "department":  "Physics",
    "year":        2,
  })
}

async fn register(store: &Arc<Store>, roll: &str, name: &str) -> Uuid {
  let resp = send(app(store, None), "POST", "/students", Some(student_json(roll, name))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body = json_body(resp).await;
  body["student_id"].as_str().unwrap().parse().unwrap()
}

async fn add_subject(store: &Arc<Store>, code: &str) -> Uuid {
  store
    .add_subject(NewSubject { name: format!("Subject {code}"), code: code.into() })
    .await
    .unwrap()
    .subject_id
}

// ── Students ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_list_by_name() {
  let store = make_store().await;
  register(&store, "002", "Alan Turing").await;
  register(&store, "001", "Barbara Liskov").await;

  let resp = send(app(&store, None), "GET", "/students?order=name", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let names: Vec<String> = json_body(resp)
    .await
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Alan Turing", "Barbara Liskov"]);
}

#[tokio::test]
async fn duplicate_roll_number_is_409() {
  let store = make_store().await;
  register(&store, "001", "Ada Lovelace").await;

  let mut dup = student_json("001", "Someone Else");
  dup["email"] = json!("other@school.edu");
  let resp = send(app(&store, None), "POST", "/students", Some(dup)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_phone_is_400_with_message() {
  let store = make_store().await;
  let mut body = student_json("001", "Ada Lovelace");
  body["phone"] = json!("call me");

  let resp = send(app(&store, None), "POST", "/students", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["error"], "Invalid phone number");
}

#[tokio::test]
async fn omitted_field_is_400_with_rule_message() {
  let store = make_store().await;
  let body = json!({ "name": "Ada Lovelace", "email": "ada@school.edu", "year": 1 });

  let resp = send(app(&store, None), "POST", "/students", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(resp).await["error"], "Roll number is required");
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
  let store = make_store().await;
  let mut body = student_json("001", "Ada Lovelace");
  body["year"] = json!("second");

  let resp = send(app(&store, None), "POST", "/students", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn unknown_student_is_404() {
  let store = make_store().await;
  let uri = format!("/students/{}", Uuid::new_v4());
  let resp = send(app(&store, None), "GET", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Attendance ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn marking_without_actor_is_401() {
  let store = make_store().await;
  let student = register(&store, "001", "Ada Lovelace").await;
  let subject = add_subject(&store, "CS101").await;

  let body = json!({
    "subject_id": subject,
    "date":       "2024-03-04",
    "entries":    { student.to_string(): "present" },
  });
  let resp = send(app(&store, None), "PUT", "/attendance", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let rows = send(app(&store, None), "GET", "/attendance", None).await;
  assert_eq!(json_body(rows).await, json!([]));
}

#[tokio::test]
async fn empty_marking_is_400() {
  let store = make_store().await;
  let subject = add_subject(&store, "CS101").await;

  let body = json!({ "subject_id": subject, "date": "2024-03-04", "entries": {} });
  let resp = send(app(&store, Some(teacher())), "PUT", "/attendance", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mark_then_read_sheet_and_history() {
  let store = make_store().await;
  let ada = register(&store, "001", "Ada Lovelace").await;
  let alan = register(&store, "002", "Alan Turing").await;
  let subject = add_subject(&store, "CS101").await;
  let who = teacher();

  let body = json!({
    "subject_id": subject,
    "date":       "2024-03-04",
    "entries":    { ada.to_string(): "present", alan.to_string(): "late" },
  });
  let resp = send(app(&store, Some(who.clone())), "PUT", "/attendance", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  // Re-marking replaces: Alan is no longer on record.
  let body = json!({
    "subject_id": subject,
    "date":       "2024-03-04",
    "entries":    { ada.to_string(): "absent" },
  });
  let resp = send(app(&store, Some(who.clone())), "PUT", "/attendance", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let uri = format!("/attendance/sheet?subject_id={subject}&date=2024-03-04");
  let sheet = json_body(send(app(&store, None), "GET", &uri, None).await).await;
  assert_eq!(sheet[0]["student"]["roll_number"], "001");
  assert_eq!(sheet[0]["status"], "absent");
  assert_eq!(sheet[1]["status"], Value::Null);

  let rows = json_body(send(app(&store, None), "GET", "/attendance", None).await).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["marked_by"], json!(who.user_id));
  assert_eq!(rows[0]["student"]["name"], "Ada Lovelace");
  assert_eq!(rows[0]["subject"]["code"], "CS101");

  let uri = format!("/students/{ada}/history");
  let history = json_body(send(app(&store, None), "GET", &uri, None).await).await;
  assert_eq!(history["stats"]["total"], 1);
  assert_eq!(history["stats"]["absent"], 1);
  assert_eq!(history["stats"]["percentage"], 0);
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analytics_for_a_month() {
  let store = make_store().await;
  let ada = register(&store, "001", "Ada Lovelace").await;
  let alan = register(&store, "002", "Alan Turing").await;
  let subject = add_subject(&store, "CS101").await;
  let who = teacher();

  for (date, ada_status, alan_status) in [
    ("2024-03-04", "present", "absent"),
    ("2024-03-05", "late", "absent"),
    ("2024-04-01", "absent", "present"),
  ] {
    let body = json!({
      "subject_id": subject,
      "date":       date,
      "entries":    { ada.to_string(): ada_status, alan.to_string(): alan_status },
    });
    let resp = send(app(&store, Some(who.clone())), "PUT", "/attendance", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  let resp = send(app(&store, None), "GET", "/analytics?month=2024-03", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let report = json_body(resp).await;

  assert_eq!(report["month"], "2024-03");
  assert_eq!(report["overall"]["total_classes"], 4);
  assert_eq!(report["overall"]["avg_rate"], 50);
  assert_eq!(report["daily_trends"].as_array().unwrap().len(), 2);
  assert_eq!(report["subject_breakdown"][0]["code"], "CS101");
  assert_eq!(report["subject_breakdown"][0]["rate"], 25);

  let low = report["low_attendance"].as_array().unwrap();
  assert_eq!(low.len(), 1);
  assert_eq!(low[0]["roll_number"], "002");
  assert_eq!(low[0]["rate"], 0);
}

#[tokio::test]
async fn malformed_month_is_rejected() {
  let store = make_store().await;
  let resp = send(app(&store, None), "GET", "/analytics?month=2024-13", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_counts_present_only() {
  let store = make_store().await;
  let ada = register(&store, "001", "Ada Lovelace").await;
  let alan = register(&store, "002", "Alan Turing").await;
  let subject = add_subject(&store, "CS101").await;
  add_subject(&store, "CS102").await;

  let body = json!({
    "subject_id": subject,
    "date":       "2024-03-04",
    "entries":    { ada.to_string(): "present", alan.to_string(): "late" },
  });
  send(app(&store, Some(teacher())), "PUT", "/attendance", Some(body)).await;

  let resp = send(app(&store, None), "GET", "/dashboard?date=2024-03-04", None).await;
  let summary = json_body(resp).await;
  assert_eq!(summary["total_students"], 2);
  assert_eq!(summary["total_subjects"], 2);
  assert_eq!(summary["present_today"], 1);
  assert_eq!(summary["attendance_rate"], 25.0);
}

#[tokio::test]
async fn dashboard_defaults_to_the_utc_day() {
  let store = make_store().await;
  let ada = register(&store, "001", "Ada Lovelace").await;
  let subject = add_subject(&store, "CS101").await;
  let today = chrono::Utc::now().date_naive();

  let body = json!({
    "subject_id": subject,
    "date":       today,
    "entries":    { ada.to_string(): "present" },
  });
  send(app(&store, Some(teacher())), "PUT", "/attendance", Some(body)).await;

  let summary = json_body(send(app(&store, None), "GET", "/dashboard", None).await).await;
  assert_eq!(summary["present_today"], 1);
  assert_eq!(summary["attendance_rate"], 100.0);
}
