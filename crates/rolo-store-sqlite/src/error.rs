//! Error type for `rolo-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Reseeding inserted into a store that already held one of the demo
  /// slugs — the wipe step must have failed.
  #[error("reseed conflict on slug {0:?}")]
  SeedConflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
