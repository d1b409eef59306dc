//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Patch values arrive as
//! arbitrary JSON and are coerced to the closest SQLite type; structured
//! values (objects, arrays) are stored as their compact JSON text.

use chrono::{DateTime, Utc};
use rolo_core::contact::{
  Contact, GameAccount, GithubProfile, Job, LabeledEntry,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Patch values ────────────────────────────────────────────────────────────

/// Coerce a JSON `newValue` to a bindable SQLite value.
pub fn json_to_sql(value: &serde_json::Value) -> rusqlite::types::Value {
  use rusqlite::types::Value as Sql;

  match value {
    serde_json::Value::Null => Sql::Null,
    serde_json::Value::Bool(b) => Sql::Integer(*b as i64),
    serde_json::Value::Number(n) => match n.as_i64() {
      Some(i) => Sql::Integer(i),
      None => Sql::Real(n.as_f64().unwrap_or(0.0)),
    },
    serde_json::Value::String(s) => Sql::Text(s.clone()),
    other => Sql::Text(other.to_string()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub id:         i64,
  pub slug:       String,
  pub first_name: String,
  pub last_name:  String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      slug:       row.get(1)?,
      first_name: row.get(2)?,
      last_name:  row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:         self.id,
      slug:       self.slug,
      first_name: self.first_name,
      last_name:  self.last_name,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from one of the six `{name, value}` child tables.
pub struct RawLabeled {
  pub id:         i64,
  pub contact_id: i64,
  pub name:       String,
  pub value:      String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawLabeled {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      contact_id: row.get(1)?,
      name:       row.get(2)?,
      value:      row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<LabeledEntry> {
    Ok(LabeledEntry {
      id:         self.id,
      contact_id: self.contact_id,
      name:       self.name,
      value:      self.value,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `jobs` row.
pub struct RawJob {
  pub id:                 i64,
  pub contact_id:         i64,
  pub name:               String,
  pub company:            String,
  pub role:               Option<String>,
  pub linked_in_username: Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawJob {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      contact_id:         row.get(1)?,
      name:               row.get(2)?,
      company:            row.get(3)?,
      role:               row.get(4)?,
      linked_in_username: row.get(5)?,
      created_at:         row.get(6)?,
      updated_at:         row.get(7)?,
    })
  }

  pub fn into_job(self) -> Result<Job> {
    Ok(Job {
      id:                 self.id,
      contact_id:         self.contact_id,
      name:               self.name,
      company:            self.company,
      role:               self.role,
      linked_in_username: self.linked_in_username,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `github_profiles` row.
pub struct RawGithubProfile {
  pub id:         i64,
  pub contact_id: i64,
  pub name:       String,
  pub username:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawGithubProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      contact_id: row.get(1)?,
      name:       row.get(2)?,
      username:   row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<GithubProfile> {
    Ok(GithubProfile {
      id:         self.id,
      contact_id: self.contact_id,
      name:       self.name,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `game_accounts` row.
pub struct RawGameAccount {
  pub id:         i64,
  pub contact_id: i64,
  pub platform:   String,
  pub username:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawGameAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      contact_id: row.get(1)?,
      platform:   row.get(2)?,
      username:   row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_account(self) -> Result<GameAccount> {
    Ok(GameAccount {
      id:         self.id,
      contact_id: self.contact_id,
      platform:   self.platform,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
