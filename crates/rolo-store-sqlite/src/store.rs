//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use rolo_core::{
  contact::{
    Contact, GameAccount, GithubProfile, Job, LabeledEntry, NewContact,
    NewJob,
  },
  entity::LabeledKind,
  patch::PatchOp,
  slug::SlugIndex,
  store::{ContactStore, Renamed},
};

use crate::{
  Error, Result,
  encode::{
    RawContact, RawGameAccount, RawGithubProfile, RawJob, RawLabeled,
    encode_dt, json_to_sql,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rolo contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Did the statement hit a UNIQUE/constraint rejection?
/// On `contacts` inserts and slug updates the only such constraint is the
/// slug's UNIQUE index.
fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(inner, _)
      if inner.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete every row, children before parents, so the foreign references
  /// are never dangling. Only administrative reseeding deletes rows.
  pub async fn wipe(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(
          "DELETE FROM names;
           DELETE FROM email_addresses;
           DELETE FROM phone_numbers;
           DELETE FROM addresses;
           DELETE FROM strava_accounts;
           DELETE FROM notes;
           DELETE FROM jobs;
           DELETE FROM github_profiles;
           DELETE FROM game_accounts;
           DELETE FROM contacts;",
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SlugIndex impl ──────────────────────────────────────────────────────────

impl SlugIndex for SqliteStore {
  type Error = Error;

  async fn slug_owner(
    &self,
    candidate: &str,
    exclude_id: Option<i64>,
  ) -> Result<Option<i64>> {
    let candidate = candidate.to_owned();

    let owner: Option<i64> = self
      .conn
      .call(move |conn| {
        let owner = match exclude_id {
          None => conn
            .query_row(
              "SELECT id FROM contacts WHERE slug = ?1",
              rusqlite::params![candidate],
              |row| row.get(0),
            )
            .optional()?,
          Some(exclude) => conn
            .query_row(
              "SELECT id FROM contacts WHERE slug = ?1 AND id != ?2",
              rusqlite::params![candidate, exclude],
              |row| row.get(0),
            )
            .optional()?,
        };
        Ok(owner)
      })
      .await?;

    Ok(owner)
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

/// Closure-side outcome of a rename; dates are decoded outside the
/// connection thread.
enum RawRenamed {
  Done(RawContact),
  NotFound,
  SlugTaken,
}

const CONTACT_COLUMNS: &str =
  "id, slug, first_name, last_name, created_at, updated_at";

impl ContactStore for SqliteStore {
  type Error = Error;

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn add_contact(&self, new: NewContact) -> Result<Option<Contact>> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let NewContact { slug, first_name, last_name } = new;

    let inserted = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO contacts (slug, first_name, last_name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![slug, first_name, last_name, at_str],
        );
        match result {
          Ok(_) => {
            Ok(Some((conn.last_insert_rowid(), slug, first_name, last_name)))
          }
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(inserted.map(|(id, slug, first_name, last_name)| Contact {
      id,
      slug,
      first_name,
      last_name,
      created_at,
      updated_at: created_at,
    }))
  }

  async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
              rusqlite::params![id],
              RawContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn get_contact_by_slug(&self, slug: &str) -> Result<Option<Contact>> {
    let slug = slug.to_owned();

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts WHERE slug = ?1"
              ),
              rusqlite::params![slug],
              RawContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY slug"
        ))?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn rename_contact(&self, id: i64, new: NewContact) -> Result<Renamed> {
    let at_str = encode_dt(Utc::now());
    let NewContact { slug, first_name, last_name } = new;

    let outcome = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "UPDATE contacts
           SET slug = ?1, first_name = ?2, last_name = ?3, updated_at = ?4
           WHERE id = ?5",
          rusqlite::params![slug, first_name, last_name, at_str, id],
        );
        match result {
          Ok(0) => Ok(RawRenamed::NotFound),
          Ok(_) => {
            let raw = conn.query_row(
              &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
              rusqlite::params![id],
              RawContact::from_row,
            )?;
            Ok(RawRenamed::Done(raw))
          }
          Err(e) if is_constraint_violation(&e) => Ok(RawRenamed::SlugTaken),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(match outcome {
      RawRenamed::Done(raw) => Renamed::Done(raw.into_contact()?),
      RawRenamed::NotFound => Renamed::NotFound,
      RawRenamed::SlugTaken => Renamed::SlugTaken,
    })
  }

  // ── Child rows ────────────────────────────────────────────────────────────

  async fn add_labeled(
    &self,
    contact_id: i64,
    kind: LabeledKind,
    name: String,
    value: String,
  ) -> Result<LabeledEntry> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let table = kind.table();

    let (id, name, value) = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {table} (contact_id, name, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)"
          ),
          rusqlite::params![contact_id, name, value, at_str],
        )?;
        Ok((conn.last_insert_rowid(), name, value))
      })
      .await?;

    Ok(LabeledEntry {
      id,
      contact_id,
      name,
      value,
      created_at,
      updated_at: created_at,
    })
  }

  async fn add_job(&self, contact_id: i64, job: NewJob) -> Result<Job> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let NewJob { name, company, role, linked_in_username } = job;

    let (id, name, company, role, linked_in_username) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO jobs
             (contact_id, name, company, role, linked_in_username, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            contact_id,
            name,
            company,
            role,
            linked_in_username,
            at_str
          ],
        )?;
        Ok((
          conn.last_insert_rowid(),
          name,
          company,
          role,
          linked_in_username,
        ))
      })
      .await?;

    Ok(Job {
      id,
      contact_id,
      name,
      company,
      role,
      linked_in_username,
      created_at,
      updated_at: created_at,
    })
  }

  async fn add_github_profile(
    &self,
    contact_id: i64,
    name: String,
    username: String,
  ) -> Result<GithubProfile> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);

    let (id, name, username) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO github_profiles
             (contact_id, name, username, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![contact_id, name, username, at_str],
        )?;
        Ok((conn.last_insert_rowid(), name, username))
      })
      .await?;

    Ok(GithubProfile {
      id,
      contact_id,
      name,
      username,
      created_at,
      updated_at: created_at,
    })
  }

  async fn add_game_account(
    &self,
    contact_id: i64,
    platform: String,
    username: String,
  ) -> Result<GameAccount> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);

    let (id, platform, username) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO game_accounts
             (contact_id, platform, username, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![contact_id, platform, username, at_str],
        )?;
        Ok((conn.last_insert_rowid(), platform, username))
      })
      .await?;

    Ok(GameAccount {
      id,
      contact_id,
      platform,
      username,
      created_at,
      updated_at: created_at,
    })
  }

  async fn labeled_entries(
    &self,
    contact_id: i64,
    kind: LabeledKind,
  ) -> Result<Vec<LabeledEntry>> {
    let table = kind.table();

    let raws: Vec<RawLabeled> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, contact_id, name, value, created_at, updated_at
           FROM {table} WHERE contact_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![contact_id], RawLabeled::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLabeled::into_entry).collect()
  }

  async fn jobs(&self, contact_id: i64) -> Result<Vec<Job>> {
    let raws: Vec<RawJob> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, contact_id, name, company, role, linked_in_username,
                  created_at, updated_at
           FROM jobs WHERE contact_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![contact_id], RawJob::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawJob::into_job).collect()
  }

  async fn github_profiles(
    &self,
    contact_id: i64,
  ) -> Result<Vec<GithubProfile>> {
    let raws: Vec<RawGithubProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, contact_id, name, username, created_at, updated_at
           FROM github_profiles WHERE contact_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![contact_id],
            RawGithubProfile::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGithubProfile::into_profile).collect()
  }

  async fn game_accounts(&self, contact_id: i64) -> Result<Vec<GameAccount>> {
    let raws: Vec<RawGameAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, contact_id, platform, username, created_at, updated_at
           FROM game_accounts WHERE contact_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![contact_id],
            RawGameAccount::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGameAccount::into_account).collect()
  }

  // ── Patch ─────────────────────────────────────────────────────────────────

  async fn update_field(&self, op: &PatchOp) -> Result<u64> {
    let at_str = encode_dt(Utc::now());
    // Table and column come from the closed EntityKind match, never from the
    // caller; the value is always bound.
    let table = op.kind.table();
    let column = op.column;
    let value = json_to_sql(&op.new_value);
    let contact_id = op.contact_id;
    let data_id = op.data_id;

    let affected = self
      .conn
      .call(move |conn| {
        let affected = match data_id {
          None => conn.execute(
            &format!(
              "UPDATE {table} SET {column} = ?1, updated_at = ?2 WHERE id = ?3"
            ),
            rusqlite::params![value, at_str, contact_id],
          )?,
          Some(data_id) => conn.execute(
            &format!(
              "UPDATE {table} SET {column} = ?1, updated_at = ?2
               WHERE id = ?3 AND contact_id = ?4"
            ),
            rusqlite::params![value, at_str, data_id, contact_id],
          )?,
        };
        Ok(affected as u64)
      })
      .await?;

    Ok(affected)
  }
}
