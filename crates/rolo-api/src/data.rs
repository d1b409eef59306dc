//! Handler for `PATCH /contacts/data` — the generic field patch behind
//! inline editing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PATCH` | `/contacts/data` | Body: `{contactId, dataType, dataId?, field, newValue}` |
//!
//! Validation happens in [`rolo_core::patch`] before any store access; once
//! the UPDATE is issued, its rows-affected count is the sole source of
//! truth. Zero rows yields 404 whether the row is missing or belongs to a
//! different contact — the two cases are deliberately indistinguishable.

use std::sync::Arc;

use axum::{Json, extract::State};
use rolo_core::{patch::PatchRequest, store::ContactStore};
use serde_json::{Value, json};

use crate::error::ApiError;

/// `PATCH /contacts/data`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError>
where
  S: ContactStore,
{
  // Decoded by hand so a malformed payload is a 400, not a 422. The Json
  // extractor has already rejected non-JSON content types with a 415.
  let request: PatchRequest = serde_json::from_value(body)
    .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

  let field = request.field.clone();
  let op = request.resolve()?;

  let affected = store.update_field(&op).await.map_err(ApiError::store)?;
  if affected == 0 {
    return Err(ApiError::NotFound(
      "record not found or no changes made".to_string(),
    ));
  }

  Ok(Json(json!({
    "message": "Update successful",
    "data": {
      "contactId": op.contact_id,
      "dataType": op.kind.api_name(),
      "dataId": op.data_id,
      "field": field,
      "newValue": op.new_value,
    },
  })))
}
