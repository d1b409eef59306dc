//! Administrative reseed: wipe the store and repopulate the demo data set.
//!
//! This is the only path that deletes rows. The wipe removes children before
//! parents so the foreign references are never dangling.

use rolo_core::{
  contact::{NewContact, NewJob},
  entity::LabeledKind,
  slug::normalize,
  store::ContactStore as _,
};

use crate::{Error, Result, SqliteStore};

/// Wipe everything and insert the demo contacts.
pub async fn reseed(store: &SqliteStore) -> Result<()> {
  store.wipe().await?;

  let john = add_demo_contact(store, "John", "Doe").await?;
  store
    .add_labeled(
      john,
      LabeledKind::Names,
      "primary".into(),
      "John Doe".into(),
    )
    .await?;
  store
    .add_labeled(john, LabeledKind::Names, "givenName".into(), "John".into())
    .await?;
  store
    .add_labeled(john, LabeledKind::Names, "familyName".into(), "Doe".into())
    .await?;
  store
    .add_labeled(
      john,
      LabeledKind::EmailAddresses,
      "primary".into(),
      "john.doe@example.com".into(),
    )
    .await?;
  store
    .add_labeled(
      john,
      LabeledKind::PhoneNumbers,
      "primary".into(),
      "123-456-7890".into(),
    )
    .await?;
  store
    .add_labeled(
      john,
      LabeledKind::Addresses,
      "primary".into(),
      r#"{"street":"123 Mock St","city":"Testville","zip":"00000","country":"Mockland"}"#
        .into(),
    )
    .await?;
  store
    .add_job(
      john,
      NewJob {
        name:               "primary".into(),
        company:            "Meadow".into(),
        role:               Some("Frontend Lead".into()),
        linked_in_username: Some("johndoe".into()),
      },
    )
    .await?;
  store
    .add_github_profile(john, "primary".into(), "johndoe".into())
    .await?;
  store
    .add_game_account(john, "steam".into(), "pantherxiii".into())
    .await?;
  store
    .add_game_account(john, "psn".into(), "pantherxiii_psn".into())
    .await?;
  store
    .add_labeled(
      john,
      LabeledKind::StravaAccounts,
      "primary".into(),
      "johndoe".into(),
    )
    .await?;
  store
    .add_labeled(
      john,
      LabeledKind::Notes,
      "initial thoughts".into(),
      "This is a big ol note about the contact system.".into(),
    )
    .await?;

  let jane = add_demo_contact(store, "Jane", "Smith").await?;
  store
    .add_labeled(
      jane,
      LabeledKind::Names,
      "primary".into(),
      "Jane Smith".into(),
    )
    .await?;
  store
    .add_labeled(
      jane,
      LabeledKind::EmailAddresses,
      "primary".into(),
      "jane.smith@example.com".into(),
    )
    .await?;
  store
    .add_labeled(
      jane,
      LabeledKind::Notes,
      "Follow up".into(),
      "Remember to discuss project details.".into(),
    )
    .await?;

  Ok(())
}

/// Insert one demo contact; the store was just wiped, so a slug conflict
/// means the wipe failed.
async fn add_demo_contact(
  store: &SqliteStore,
  first: &str,
  last: &str,
) -> Result<i64> {
  let slug = normalize(&rolo_core::contact::display_name(first, last));
  let contact = store
    .add_contact(NewContact {
      slug:       slug.clone(),
      first_name: first.into(),
      last_name:  last.into(),
    })
    .await?
    .ok_or(Error::SeedConflict(slug))?;
  Ok(contact.id)
}
