//! Error types for `rolo-core`.

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("missing required fields: contactId, dataType and field are mandatory")]
  MissingRequiredFields,

  #[error("invalid dataType: {0:?}")]
  UnknownEntityKind(String),

  #[error("missing required field: dataId is mandatory for dataType {0}")]
  MissingDataId(EntityKind),

  #[error("field {field:?} is not updatable for dataType {kind}")]
  FieldNotPatchable { kind: EntityKind, field: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
