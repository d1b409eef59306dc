//! Contact rows and the child-row shapes hanging off them.
//!
//! The contact row is a thin envelope (identity, slug, display names); the
//! interesting data lives in the per-kind child tables. Wire casing follows
//! the historical API payloads: rows are camelCase, while the contact's
//! `FirstName`/`LastName` keep their legacy spelling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Contact ─────────────────────────────────────────────────────────────────

/// The root entity. `slug` is globally unique and URL-safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:         i64,
  pub slug:       String,
  #[serde(rename = "FirstName")]
  pub first_name: String,
  #[serde(rename = "LastName")]
  pub last_name:  String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Contact {
  /// The free-text display name the slug is derived from.
  pub fn display_name(&self) -> String {
    display_name(&self.first_name, &self.last_name)
  }
}

/// Join first and last name into the display name slugs derive from.
/// Either side may be empty.
pub fn display_name(first: &str, last: &str) -> String {
  format!("{first} {last}").trim().to_string()
}

/// Input to [`crate::store::ContactStore::add_contact`] and
/// [`crate::store::ContactStore::rename_contact`]. The slug is generated by
/// the caller (see [`crate::slug::generate_unique_slug`]); the id and
/// timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub slug:       String,
  pub first_name: String,
  pub last_name:  String,
}

// ─── Child rows ──────────────────────────────────────────────────────────────

/// A row in one of the six `{name, value}` child tables (names, email
/// addresses, phone numbers, addresses, Strava accounts, notes). `name` is
/// the category label ("primary", "work", ...), `value` the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledEntry {
  pub id:         i64,
  pub contact_id: i64,
  pub name:       String,
  pub value:      String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A position the contact holds or held.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub id:                 i64,
  pub contact_id:         i64,
  pub name:               String,
  pub company:            String,
  pub role:               Option<String>,
  pub linked_in_username: Option<String>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

/// Input to [`crate::store::ContactStore::add_job`].
#[derive(Debug, Clone)]
pub struct NewJob {
  pub name:               String,
  pub company:            String,
  pub role:               Option<String>,
  pub linked_in_username: Option<String>,
}

/// A GitHub account attached to the contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubProfile {
  pub id:         i64,
  pub contact_id: i64,
  pub name:       String,
  pub username:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A gaming account (Steam, PSN, ...) attached to the contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAccount {
  pub id:         i64,
  pub contact_id: i64,
  pub platform:   String,
  pub username:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Detail view ─────────────────────────────────────────────────────────────

/// The contact row merged with every child collection — the read model
/// behind the detail view. Never stored, always re-queried.
///
/// Notes travel under the `NotesDetails` key so they cannot collide with a
/// free-text `Notes` field on the contact row itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetail {
  #[serde(flatten)]
  pub contact:         Contact,
  #[serde(rename = "Names")]
  pub names:           Vec<LabeledEntry>,
  #[serde(rename = "EmailAddresses")]
  pub email_addresses: Vec<LabeledEntry>,
  #[serde(rename = "PhoneNumbers")]
  pub phone_numbers:   Vec<LabeledEntry>,
  #[serde(rename = "Addresses")]
  pub addresses:       Vec<LabeledEntry>,
  #[serde(rename = "Jobs")]
  pub jobs:            Vec<Job>,
  #[serde(rename = "GithubProfiles")]
  pub github_profiles: Vec<GithubProfile>,
  #[serde(rename = "GameAccounts")]
  pub game_accounts:   Vec<GameAccount>,
  #[serde(rename = "StravaAccounts")]
  pub strava_accounts: Vec<LabeledEntry>,
  #[serde(rename = "NotesDetails")]
  pub notes:           Vec<LabeledEntry>,
}
