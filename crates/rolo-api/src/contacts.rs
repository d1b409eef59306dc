//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts` | All contacts, ordered by slug |
//! | `POST` | `/contacts` | Body: `{"FirstName":"...","LastName":"..."}`; 201 + contact |
//! | `GET`  | `/contacts/:contact_id` | Detail view; 400 non-integer id, 404 unknown |
//! | `GET`  | `/contacts/by-slug/:slug` | Detail view routed by slug |
//! | `POST` | `/contacts/:contact_id/rename` | Regenerates the slug, excluding the contact's own row |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rolo_core::{
  contact::{Contact, ContactDetail, NewContact, display_name},
  slug::{SlugError, SlugIndex, generate_unique_slug},
  store::{ContactStore, Renamed, materialize_detail},
};
use serde::Deserialize;

use crate::error::ApiError;

/// Insert/rename attempts before giving up on the slug. Each retry
/// regenerates against the current store state, so only a sustained
/// concurrent writer can exhaust this.
const SLUG_CONFLICT_RETRIES: u32 = 3;

fn slug_error<E>(e: SlugError<E>) -> ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  match e {
    SlugError::Store(e) => ApiError::store(e),
    SlugError::Exhausted { base } => {
      ApiError::Conflict(format!("no free slug variant for {base:?}"))
    }
  }
}

/// The path parameter must be a plain integer id.
fn parse_contact_id(raw: &str) -> Result<i64, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid contact id: {raw:?}")))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore,
{
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /contacts` and `POST /contacts/:id/rename`.
#[derive(Debug, Deserialize)]
pub struct NameBody {
  #[serde(rename = "FirstName")]
  pub first_name: String,
  #[serde(rename = "LastName", default)]
  pub last_name:  String,
}

/// `POST /contacts` — generates a unique slug, then inserts. A slug
/// constraint hit means another request won the probe/insert race; the loop
/// regenerates and tries again.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore + SlugIndex,
{
  let display = display_name(&body.first_name, &body.last_name);

  for _ in 0..SLUG_CONFLICT_RETRIES {
    let slug = generate_unique_slug(&*store, &display, None)
      .await
      .map_err(slug_error)?;
    let new = NewContact {
      slug,
      first_name: body.first_name.clone(),
      last_name: body.last_name.clone(),
    };
    let inserted = store.add_contact(new).await.map_err(ApiError::store)?;
    if let Some(contact) = inserted {
      return Ok((StatusCode::CREATED, Json(contact)));
    }
  }

  Err(ApiError::Conflict(format!(
    "could not allocate a unique slug for {display:?}"
  )))
}

// ─── Detail reads ────────────────────────────────────────────────────────────

/// `GET /contacts/:contact_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(contact_id): Path<String>,
) -> Result<Json<ContactDetail>, ApiError>
where
  S: ContactStore,
{
  let id = parse_contact_id(&contact_id)?;
  let contact = store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;

  let detail = materialize_detail(&*store, contact)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(detail))
}

/// `GET /contacts/by-slug/:slug`
pub async fn get_by_slug<S>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
) -> Result<Json<ContactDetail>, ApiError>
where
  S: ContactStore,
{
  let contact = store
    .get_contact_by_slug(&slug)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {slug:?} not found")))?;

  let detail = materialize_detail(&*store, contact)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(detail))
}

// ─── Rename ──────────────────────────────────────────────────────────────────

/// `POST /contacts/:contact_id/rename` — regenerates the slug with the
/// contact's own row excluded, so an unchanged name keeps its slug while a
/// clash with any other contact still gets numbered.
pub async fn rename<S>(
  State(store): State<Arc<S>>,
  Path(contact_id): Path<String>,
  Json(body): Json<NameBody>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore + SlugIndex,
{
  let id = parse_contact_id(&contact_id)?;
  let display = display_name(&body.first_name, &body.last_name);

  for _ in 0..SLUG_CONFLICT_RETRIES {
    let slug = generate_unique_slug(&*store, &display, Some(id))
      .await
      .map_err(slug_error)?;
    let new = NewContact {
      slug,
      first_name: body.first_name.clone(),
      last_name: body.last_name.clone(),
    };
    match store.rename_contact(id, new).await.map_err(ApiError::store)? {
      Renamed::Done(contact) => return Ok(Json(contact)),
      Renamed::NotFound => {
        return Err(ApiError::NotFound(format!("contact {id} not found")));
      }
      Renamed::SlugTaken => continue,
    }
  }

  Err(ApiError::Conflict(format!(
    "could not allocate a unique slug for {display:?}"
  )))
}
