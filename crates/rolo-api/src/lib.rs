//! JSON REST API for rolo.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rolo_core::store::ContactStore`] that also implements
//! [`rolo_core::slug::SlugIndex`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rolo_api::api_router(store.clone()))
//! ```

pub mod contacts;
pub mod data;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use rolo_core::{slug::SlugIndex, store::ContactStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactStore + SlugIndex + 'static,
{
  Router::new()
    .route(
      "/contacts",
      get(contacts::list::<S>).post(contacts::create::<S>),
    )
    .route("/contacts/data", patch(data::handler::<S>))
    .route("/contacts/by-slug/{slug}", get(contacts::get_by_slug::<S>))
    .route("/contacts/{contact_id}", get(contacts::get_one::<S>))
    .route("/contacts/{contact_id}/rename", post(contacts::rename::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rolo_core::{entity::LabeledKind, store::ContactStore as _};
  use rolo_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn send(
    store: Arc<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let req_body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(req_body).unwrap();

    let resp = api_router(store).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  async fn create_contact(
    store: Arc<SqliteStore>,
    first: &str,
    last: &str,
  ) -> Value {
    let (status, body) = send(
      store,
      "POST",
      "/contacts",
      Some(json!({ "FirstName": first, "LastName": last })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
  }

  // ── Create ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_contact_generates_slug() {
    let s = store().await;
    let body = create_contact(s, "John", "Doe").await;

    assert_eq!(body["slug"], "john-doe");
    assert_eq!(body["FirstName"], "John");
    assert_eq!(body["LastName"], "Doe");
    assert!(body["id"].is_i64());
  }

  #[tokio::test]
  async fn create_duplicate_name_numbers_the_slug() {
    let s = store().await;
    create_contact(s.clone(), "John", "Doe").await;
    let body = create_contact(s, "John", "Doe").await;
    assert_eq!(body["slug"], "john-doe-1");
  }

  // ── List ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_contacts_ordered_by_slug() {
    let s = store().await;
    create_contact(s.clone(), "Zoe", "Young").await;
    create_contact(s.clone(), "Alice", "Liddell").await;

    let (status, body) = send(s, "GET", "/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<_> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["slug"].as_str().unwrap())
      .collect();
    assert_eq!(slugs, ["alice-liddell", "zoe-young"]);
  }

  // ── Detail ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn detail_includes_every_child_collection_scoped_to_the_contact() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let bob = create_contact(s.clone(), "Bob", "Stone").await;
    let alice_id = alice["id"].as_i64().unwrap();
    let bob_id = bob["id"].as_i64().unwrap();

    s.add_labeled(
      alice_id,
      LabeledKind::EmailAddresses,
      "primary".into(),
      "alice@example.com".into(),
    )
    .await
    .unwrap();
    s.add_labeled(
      alice_id,
      LabeledKind::Notes,
      "note".into(),
      "alice note".into(),
    )
    .await
    .unwrap();
    s.add_labeled(bob_id, LabeledKind::Notes, "note".into(), "bob note".into())
      .await
      .unwrap();

    let (status, body) =
      send(s, "GET", &format!("/contacts/{alice_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "alice-liddell");

    for key in [
      "Names",
      "EmailAddresses",
      "PhoneNumbers",
      "Addresses",
      "Jobs",
      "GithubProfiles",
      "GameAccounts",
      "StravaAccounts",
      "NotesDetails",
    ] {
      assert!(body[key].is_array(), "missing key {key}: {body}");
    }

    let emails = body["EmailAddresses"].as_array().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["value"], "alice@example.com");
    assert_eq!(emails[0]["contactId"], alice_id);

    // Bob's note must not leak into Alice's detail.
    let notes = body["NotesDetails"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["value"], "alice note");
  }

  #[tokio::test]
  async fn detail_with_non_integer_id_returns_400() {
    let s = store().await;
    let (status, body) = send(s, "GET", "/contacts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("contact id"));
  }

  #[tokio::test]
  async fn detail_with_unknown_id_returns_404() {
    let s = store().await;
    let (status, _) = send(s, "GET", "/contacts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn detail_by_slug() {
    let s = store().await;
    create_contact(s.clone(), "Alice", "Liddell").await;

    let (status, body) =
      send(s.clone(), "GET", "/contacts/by-slug/alice-liddell", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["FirstName"], "Alice");

    let (status, _) =
      send(s, "GET", "/contacts/by-slug/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Patch ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_updates_child_field_and_echoes_the_request() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let alice_id = alice["id"].as_i64().unwrap();
    let entry = s
      .add_labeled(
        alice_id,
        LabeledKind::Names,
        "primary".into(),
        "Original Name Value".into(),
      )
      .await
      .unwrap();

    let (status, body) = send(
      s.clone(),
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": alice_id,
        "dataType": "Names",
        "dataId": entry.id,
        "field": "value",
        "newValue": "Updated Name Value",
      })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Update successful");
    assert_eq!(body["data"]["contactId"], alice_id);
    assert_eq!(body["data"]["dataType"], "Names");
    assert_eq!(body["data"]["newValue"], "Updated Name Value");

    let entries =
      s.labeled_entries(alice_id, LabeledKind::Names).await.unwrap();
    assert_eq!(entries[0].value, "Updated Name Value");
  }

  #[tokio::test]
  async fn patch_updates_contact_first_name() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let alice_id = alice["id"].as_i64().unwrap();

    let (status, _) = send(
      s.clone(),
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": alice_id,
        "dataType": "Contact",
        "field": "FirstName",
        "newValue": "Alicia",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fetched = s.get_contact(alice_id).await.unwrap().unwrap();
    assert_eq!(fetched.first_name, "Alicia");
  }

  #[tokio::test]
  async fn patch_with_foreign_contact_id_returns_404() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let bob = create_contact(s.clone(), "Bob", "Stone").await;
    let alice_id = alice["id"].as_i64().unwrap();
    let entry = s
      .add_labeled(
        alice_id,
        LabeledKind::Notes,
        "note".into(),
        "private".into(),
      )
      .await
      .unwrap();

    let (status, _) = send(
      s.clone(),
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": bob["id"],
        "dataType": "Notes",
        "dataId": entry.id,
        "field": "value",
        "newValue": "stolen",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let notes =
      s.labeled_entries(alice_id, LabeledKind::Notes).await.unwrap();
    assert_eq!(notes[0].value, "private");
  }

  #[tokio::test]
  async fn patch_without_data_id_returns_400() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;

    let (status, body) = send(
      s,
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": alice["id"],
        "dataType": "Names",
        "field": "value",
        "newValue": "x",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("dataId"));
  }

  #[tokio::test]
  async fn patch_with_unknown_data_type_returns_400() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;

    let (status, body) = send(
      s,
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": alice["id"],
        "dataType": "InvalidTable",
        "dataId": 1,
        "field": "value",
        "newValue": "x",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("dataType"));
  }

  #[tokio::test]
  async fn patch_with_missing_required_fields_returns_400() {
    let s = store().await;
    let (status, body) = send(
      s,
      "PATCH",
      "/contacts/data",
      Some(json!({ "contactId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mandatory"));
  }

  #[tokio::test]
  async fn patch_with_unlisted_field_returns_400() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let alice_id = alice["id"].as_i64().unwrap();
    let entry = s
      .add_labeled(alice_id, LabeledKind::Notes, "n".into(), "v".into())
      .await
      .unwrap();

    // Rewriting the foreign reference is exactly what the allow-list blocks.
    let (status, body) = send(
      s.clone(),
      "PATCH",
      "/contacts/data",
      Some(json!({
        "contactId": alice_id,
        "dataType": "Notes",
        "dataId": entry.id,
        "field": "contactId",
        "newValue": 999,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not updatable"));

    let notes =
      s.labeled_entries(alice_id, LabeledKind::Notes).await.unwrap();
    assert_eq!(notes[0].contact_id, alice_id);
  }

  #[tokio::test]
  async fn patch_with_wrong_content_type_returns_415() {
    let s = store().await;
    let req = Request::builder()
      .method("PATCH")
      .uri("/contacts/data")
      .header(header::CONTENT_TYPE, "text/plain")
      .body(Body::from("contactId=1"))
      .unwrap();

    let resp = api_router(s).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
  }

  // ── Rename ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rename_with_unchanged_name_keeps_the_slug() {
    let s = store().await;
    let alice = create_contact(s.clone(), "Alice", "Liddell").await;
    let alice_id = alice["id"].as_i64().unwrap();

    let (status, body) = send(
      s,
      "POST",
      &format!("/contacts/{alice_id}/rename"),
      Some(json!({ "FirstName": "Alice", "LastName": "Liddell" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "alice-liddell");
  }

  #[tokio::test]
  async fn rename_onto_another_contacts_name_numbers_the_slug() {
    let s = store().await;
    create_contact(s.clone(), "New", "Name Target").await; // new-name-target
    let other = create_contact(s.clone(), "Original", "Name").await;
    let other_id = other["id"].as_i64().unwrap();

    let (status, body) = send(
      s,
      "POST",
      &format!("/contacts/{other_id}/rename"),
      Some(json!({ "FirstName": "New", "LastName": "Name Target" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "new-name-target-1");
  }

  #[tokio::test]
  async fn rename_unknown_contact_returns_404() {
    let s = store().await;
    let (status, _) = send(
      s,
      "POST",
      "/contacts/999/rename",
      Some(json!({ "FirstName": "Ghost", "LastName": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
