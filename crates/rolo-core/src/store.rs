//! The `ContactStore` trait and the detail-view aggregator.
//!
//! The trait is implemented by storage backends (e.g. `rolo-store-sqlite`).
//! Higher layers (`rolo-api`, `rolo-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  contact::{
    Contact, ContactDetail, GameAccount, GithubProfile, Job, LabeledEntry,
    NewContact, NewJob,
  },
  entity::LabeledKind,
  patch::PatchOp,
};

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// Outcome of a rename, which must respect both the contact's existence and
/// the slug uniqueness constraint.
#[derive(Debug, Clone)]
pub enum Renamed {
  Done(Contact),
  NotFound,
  /// The UNIQUE constraint rejected the new slug: another contact claimed it
  /// between the final probe and this write. Regenerate and retry.
  SlugTaken,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a rolo storage backend.
///
/// The store is the sole owner of persisted state; callers hold no
/// authoritative in-memory copy and re-query on every read. All methods
/// return `Send` futures so the trait can be used in multi-threaded async
/// runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Insert a new contact. Returns `Ok(None)` if the slug uniqueness
  /// constraint rejected the insert (the accepted probe/insert race); the
  /// caller regenerates the slug and retries.
  fn add_contact(
    &self,
    new: NewContact,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Retrieve a contact by slug — the detail page routes on slugs, not ids.
  fn get_contact_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// All contacts, ordered by slug.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Rewrite a contact's names and slug in one statement.
  fn rename_contact(
    &self,
    id: i64,
    new: NewContact,
  ) -> impl Future<Output = Result<Renamed, Self::Error>> + Send + '_;

  // ── Child rows ────────────────────────────────────────────────────────

  fn add_labeled(
    &self,
    contact_id: i64,
    kind: LabeledKind,
    name: String,
    value: String,
  ) -> impl Future<Output = Result<LabeledEntry, Self::Error>> + Send + '_;

  fn add_job(
    &self,
    contact_id: i64,
    job: NewJob,
  ) -> impl Future<Output = Result<Job, Self::Error>> + Send + '_;

  fn add_github_profile(
    &self,
    contact_id: i64,
    name: String,
    username: String,
  ) -> impl Future<Output = Result<GithubProfile, Self::Error>> + Send + '_;

  fn add_game_account(
    &self,
    contact_id: i64,
    platform: String,
    username: String,
  ) -> impl Future<Output = Result<GameAccount, Self::Error>> + Send + '_;

  /// All rows of one labeled kind for a contact, oldest first.
  fn labeled_entries(
    &self,
    contact_id: i64,
    kind: LabeledKind,
  ) -> impl Future<Output = Result<Vec<LabeledEntry>, Self::Error>> + Send + '_;

  fn jobs(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<Vec<Job>, Self::Error>> + Send + '_;

  fn github_profiles(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<Vec<GithubProfile>, Self::Error>> + Send + '_;

  fn game_accounts(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<Vec<GameAccount>, Self::Error>> + Send + '_;

  // ── Patch ─────────────────────────────────────────────────────────────

  /// Apply a resolved patch and return the number of rows affected.
  ///
  /// Child kinds update under the conjunctive `id = dataId AND contact_id =
  /// contactId` predicate; a row belonging to a different contact counts as
  /// zero rows, indistinguishable from a missing one.
  fn update_field<'a>(
    &'a self,
    op: &'a PatchOp,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}

// ─── Detail aggregation ──────────────────────────────────────────────────────

/// Materialise the detail read model for `contact`: the row plus all nine
/// child collections, each re-queried from the store.
pub async fn materialize_detail<S: ContactStore>(
  store: &S,
  contact: Contact,
) -> Result<ContactDetail, S::Error> {
  let id = contact.id;
  Ok(ContactDetail {
    contact,
    names: store.labeled_entries(id, LabeledKind::Names).await?,
    email_addresses: store
      .labeled_entries(id, LabeledKind::EmailAddresses)
      .await?,
    phone_numbers: store
      .labeled_entries(id, LabeledKind::PhoneNumbers)
      .await?,
    addresses: store.labeled_entries(id, LabeledKind::Addresses).await?,
    jobs: store.jobs(id).await?,
    github_profiles: store.github_profiles(id).await?,
    game_accounts: store.game_accounts(id).await?,
    strava_accounts: store
      .labeled_entries(id, LabeledKind::StravaAccounts)
      .await?,
    notes: store.labeled_entries(id, LabeledKind::Notes).await?,
  })
}
