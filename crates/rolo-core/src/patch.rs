//! The generic field-patch protocol backing inline editing.
//!
//! A patch names a contact, an entity kind, optionally a child row, a field,
//! and a new value. Validation is fail-fast and happens entirely before any
//! store access; the store then applies exactly one ownership-scoped UPDATE.

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result, entity::EntityKind};

// ─── Request ─────────────────────────────────────────────────────────────────

/// The wire-level PATCH payload. The always-required fields are `Option` so
/// that a missing field surfaces as a malformed-payload error with a useful
/// message instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
  pub contact_id: Option<i64>,
  pub data_type:  Option<String>,
  pub data_id:    Option<i64>,
  pub field:      Option<String>,
  #[serde(default)]
  pub new_value:  Value,
}

// ─── Resolved operation ──────────────────────────────────────────────────────

/// A validated patch: a single column on a single row of a known kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOp {
  pub kind:       EntityKind,
  /// Column to rewrite; always taken from the kind's allow-list.
  pub column:     &'static str,
  pub new_value:  Value,
  pub contact_id: i64,
  /// Child row id; `None` exactly when `kind` is [`EntityKind::Contact`].
  pub data_id:    Option<i64>,
}

impl PatchRequest {
  /// Validate the payload and resolve it to a [`PatchOp`].
  ///
  /// Checks run in order and the first failure wins: required fields
  /// present, known `dataType`, `dataId` present for child kinds, `field`
  /// on the kind's allow-list.
  pub fn resolve(self) -> Result<PatchOp> {
    let (Some(contact_id), Some(data_type), Some(field)) =
      (self.contact_id, self.data_type.as_deref(), self.field.as_deref())
    else {
      return Err(Error::MissingRequiredFields);
    };

    let kind = EntityKind::from_name(data_type)
      .ok_or_else(|| Error::UnknownEntityKind(data_type.to_string()))?;

    // A child row cannot be targeted without its own id: `contactId` alone
    // is ambiguous when a contact has several rows of the same kind. The
    // root kind updates by `contactId` and ignores any supplied `dataId`.
    let data_id = match kind {
      EntityKind::Contact => None,
      _ => Some(self.data_id.ok_or(Error::MissingDataId(kind))?),
    };

    let column =
      kind.column_for(field).ok_or_else(|| Error::FieldNotPatchable {
        kind,
        field: field.to_string(),
      })?;

    Ok(PatchOp {
      kind,
      column,
      new_value: self.new_value,
      contact_id,
      data_id,
    })
  }
}
