//! The closed set of patchable entity kinds.
//!
//! Dispatch over `dataType` is an exhaustive match, not an open lookup
//! table: each kind carries its table name and the allow-list of fields a
//! patch may touch. Identifiers, foreign references, the slug, and the
//! timestamp columns are on no list, so a patch can never overwrite them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── EntityKind ──────────────────────────────────────────────────────────────

/// One of the ten known entity kinds: the root contact or a child table.
/// Variant names match the wire-level `dataType` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
  Contact,
  Names,
  EmailAddresses,
  PhoneNumbers,
  Addresses,
  Jobs,
  GithubProfiles,
  GameAccounts,
  StravaAccounts,
  Notes,
}

impl EntityKind {
  /// Every kind, in the order the detail view lists the child collections.
  pub const ALL: [EntityKind; 10] = [
    Self::Contact,
    Self::Names,
    Self::EmailAddresses,
    Self::PhoneNumbers,
    Self::Addresses,
    Self::Jobs,
    Self::GithubProfiles,
    Self::GameAccounts,
    Self::StravaAccounts,
    Self::Notes,
  ];

  /// Resolve a wire-level `dataType` string. Returns `None` for anything
  /// outside the closed set.
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "Contact" => Some(Self::Contact),
      "Names" => Some(Self::Names),
      "EmailAddresses" => Some(Self::EmailAddresses),
      "PhoneNumbers" => Some(Self::PhoneNumbers),
      "Addresses" => Some(Self::Addresses),
      "Jobs" => Some(Self::Jobs),
      "GithubProfiles" => Some(Self::GithubProfiles),
      "GameAccounts" => Some(Self::GameAccounts),
      "StravaAccounts" => Some(Self::StravaAccounts),
      "Notes" => Some(Self::Notes),
      _ => None,
    }
  }

  /// The wire-level name, also used in error messages.
  pub fn api_name(self) -> &'static str {
    match self {
      Self::Contact => "Contact",
      Self::Names => "Names",
      Self::EmailAddresses => "EmailAddresses",
      Self::PhoneNumbers => "PhoneNumbers",
      Self::Addresses => "Addresses",
      Self::Jobs => "Jobs",
      Self::GithubProfiles => "GithubProfiles",
      Self::GameAccounts => "GameAccounts",
      Self::StravaAccounts => "StravaAccounts",
      Self::Notes => "Notes",
    }
  }

  /// The backing table.
  pub fn table(self) -> &'static str {
    match self {
      Self::Contact => "contacts",
      Self::Names => "names",
      Self::EmailAddresses => "email_addresses",
      Self::PhoneNumbers => "phone_numbers",
      Self::Addresses => "addresses",
      Self::Jobs => "jobs",
      Self::GithubProfiles => "github_profiles",
      Self::GameAccounts => "game_accounts",
      Self::StravaAccounts => "strava_accounts",
      Self::Notes => "notes",
    }
  }

  /// The `(wire field, column)` pairs a patch may touch on this kind.
  pub fn patchable_fields(self) -> &'static [(&'static str, &'static str)] {
    match self {
      Self::Contact => {
        &[("FirstName", "first_name"), ("LastName", "last_name")]
      }
      Self::Jobs => &[
        ("name", "name"),
        ("company", "company"),
        ("role", "role"),
        ("linkedInUsername", "linked_in_username"),
      ],
      Self::GithubProfiles => &[("name", "name"), ("username", "username")],
      Self::GameAccounts => {
        &[("platform", "platform"), ("username", "username")]
      }
      Self::Names
      | Self::EmailAddresses
      | Self::PhoneNumbers
      | Self::Addresses
      | Self::StravaAccounts
      | Self::Notes => &[("name", "name"), ("value", "value")],
    }
  }

  /// Look up the column behind a wire field name, if it is patchable.
  pub fn column_for(self, field: &str) -> Option<&'static str> {
    self
      .patchable_fields()
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, column)| *column)
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.api_name())
  }
}

// ─── LabeledKind ─────────────────────────────────────────────────────────────

/// The six child tables sharing the `{name, value}` row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabeledKind {
  Names,
  EmailAddresses,
  PhoneNumbers,
  Addresses,
  StravaAccounts,
  Notes,
}

impl LabeledKind {
  pub fn table(self) -> &'static str {
    EntityKind::from(self).table()
  }
}

impl From<LabeledKind> for EntityKind {
  fn from(kind: LabeledKind) -> Self {
    match kind {
      LabeledKind::Names => Self::Names,
      LabeledKind::EmailAddresses => Self::EmailAddresses,
      LabeledKind::PhoneNumbers => Self::PhoneNumbers,
      LabeledKind::Addresses => Self::Addresses,
      LabeledKind::StravaAccounts => Self::StravaAccounts,
      LabeledKind::Notes => Self::Notes,
    }
  }
}
