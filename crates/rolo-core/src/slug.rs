//! Unique-slug generation.
//!
//! [`normalize`] is a pure transformation from a display name to a URL-safe
//! token. [`generate_unique_slug`] resolves collisions by probing the store
//! through the narrow [`SlugIndex`] trait; each candidate depends on the
//! previous probe's outcome, so probes are strictly sequential.

use std::future::Future;

use rand_core::{OsRng, RngCore};
use thiserror::Error;

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Numbered candidates (`base`, `base-1`, ...) probed before falling back to
/// random suffixes.
pub const MAX_NUMBERED_ATTEMPTS: u32 = 64;

/// Random-suffix candidates probed before giving up.
pub const MAX_RANDOM_ATTEMPTS: u32 = 4;

// ─── Probe trait ─────────────────────────────────────────────────────────────

/// The single point query the generator needs from a store: who, if anyone,
/// currently holds this slug?
pub trait SlugIndex {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the id of the contact holding `candidate`, ignoring the contact
  /// named by `exclude_id`. The exclusion lets a rename keep its own slug
  /// without reporting a self-conflict; conflicts against every other
  /// contact are still reported.
  fn slug_owner<'a>(
    &'a self,
    candidate: &'a str,
    exclude_id: Option<i64>,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SlugError<E> {
  #[error("slug probe failed")]
  Store(#[source] E),

  /// Every numbered and random candidate was taken.
  #[error("no free slug found for base {base:?}")]
  Exhausted { base: String },
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Turn a free-text display name into a URL-safe token: lowercase ASCII
/// letters, digits and single hyphens only, with no hyphen at either end.
///
/// Whitespace runs and existing hyphens become a single separator; common
/// Latin diacritics (and the classic `&`/`%`/`$` expansions) transliterate
/// to ASCII; every other character is dropped without leaving a separator,
/// so the words around it fuse. A fully-stripped input yields `""`.
pub fn normalize(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut pending_separator = false;

  for ch in name.chars() {
    let mut utf8 = [0u8; 4];
    let expanded = match transliterate(ch) {
      Some(ascii) => ascii,
      None => ch.encode_utf8(&mut utf8),
    };

    for c in expanded.chars() {
      if c.is_ascii_alphanumeric() {
        if pending_separator && !out.is_empty() {
          out.push('-');
        }
        pending_separator = false;
        out.push(c.to_ascii_lowercase());
      } else if c.is_whitespace() || c == '-' {
        pending_separator = true;
      }
    }
  }

  out
}

/// Closest-ASCII expansion for characters the accepted class cannot keep.
/// Returns `None` when the character maps to nothing and should pass through
/// the class filter unchanged.
fn transliterate(ch: char) -> Option<&'static str> {
  let mapped = match ch {
    'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä'
    | 'Å' => "a",
    'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
    'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
    'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö'
    | 'Ø' => "o",
    'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
    'ý' | 'ÿ' | 'Ý' => "y",
    'ç' | 'Ç' => "c",
    'ñ' | 'Ñ' => "n",
    'ß' => "ss",
    'æ' | 'Æ' => "ae",
    'œ' | 'Œ' => "oe",
    'ð' | 'Ð' => "d",
    'þ' | 'Þ' => "th",
    '&' => "and",
    '%' => "percent",
    '$' => "dollar",
    _ => return None,
  };
  Some(mapped)
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Find a slug no other contact holds.
///
/// Candidates are `base`, `base-1`, `base-2`, ... — one point query each, so
/// k existing conflicting variants cost at most k+1 round trips. A
/// pathologically long collision chain falls back to random hex suffixes so
/// the loop always terminates.
///
/// The gap between the final probe and the caller's insert is an accepted
/// race; the store's UNIQUE constraint is the backstop, and callers retry
/// generation when that constraint fires.
pub async fn generate_unique_slug<S: SlugIndex>(
  index: &S,
  name: &str,
  exclude_id: Option<i64>,
) -> Result<String, SlugError<S::Error>> {
  let base = normalize(name);

  let mut candidate = base.clone();
  for n in 1..=MAX_NUMBERED_ATTEMPTS {
    if is_free(index, &candidate, exclude_id).await? {
      return Ok(candidate);
    }
    candidate = format!("{base}-{n}");
  }

  for _ in 0..MAX_RANDOM_ATTEMPTS {
    let mut suffix = [0u8; 4];
    OsRng.fill_bytes(&mut suffix);
    let candidate = format!("{base}-{}", hex::encode(suffix));
    if is_free(index, &candidate, exclude_id).await? {
      return Ok(candidate);
    }
  }

  Err(SlugError::Exhausted { base })
}

async fn is_free<S: SlugIndex>(
  index: &S,
  candidate: &str,
  exclude_id: Option<i64>,
) -> Result<bool, SlugError<S::Error>> {
  let owner = index
    .slug_owner(candidate, exclude_id)
    .await
    .map_err(SlugError::Store)?;
  Ok(owner.is_none())
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  // ── normalize ───────────────────────────────────────────────────────────

  #[test]
  fn normalize_basic_names() {
    assert_eq!(normalize("Some String"), "some-string");
    assert_eq!(normalize("Another Test String!"), "another-test-string");
    assert_eq!(normalize("UPPERCASE"), "uppercase");
    assert_eq!(normalize("Already-Slugified"), "already-slugified");
    assert_eq!(normalize("New Contact"), "new-contact");
  }

  #[test]
  fn normalize_fuses_words_around_dropped_characters() {
    // Punctuation is stripped without leaving a separator.
    assert_eq!(
      normalize("  Leading/Trailing Spaces  "),
      "leadingtrailing-spaces"
    );
    assert_eq!(normalize("With_Underscores"), "withunderscores");
    assert_eq!(normalize("O'Brien"), "obrien");
  }

  #[test]
  fn normalize_transliterates_diacritics_and_symbols() {
    assert_eq!(normalize("Café São Paulo"), "cafe-sao-paulo");
    assert_eq!(normalize("Åse Strønen"), "ase-stronen");
    assert_eq!(normalize("Straße"), "strasse");
    assert_eq!(
      normalize("Special Chars *&^%$#@!"),
      "special-chars-andpercentdollar"
    );
  }

  #[test]
  fn normalize_collapses_separator_runs() {
    assert_eq!(normalize("a   b"), "a-b");
    assert_eq!(normalize("--a--b--"), "a-b");
    assert_eq!(normalize(" - a - b - "), "a-b");
  }

  #[test]
  fn normalize_fully_stripped_input_is_empty() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   "), "");
    assert_eq!(normalize("!!!"), "");
    assert_eq!(normalize("---"), "");
  }

  #[test]
  fn normalize_output_stays_in_accepted_class() {
    let inputs = [
      "Some String",
      "  Leading/Trailing Spaces  ",
      "Special Chars *&^%$#@!",
      "Café São Paulo",
      "--a--b--",
      "ünïcødé ÉVERYWHERE",
      "123 Numbers 456",
    ];
    for input in inputs {
      let slug = normalize(input);
      assert!(
        slug.chars().all(|c| c.is_ascii_lowercase()
          || c.is_ascii_digit()
          || c == '-'),
        "{input:?} -> {slug:?}"
      );
      assert!(!slug.starts_with('-'), "{input:?} -> {slug:?}");
      assert!(!slug.ends_with('-'), "{input:?} -> {slug:?}");
      assert!(!slug.contains("--"), "{input:?} -> {slug:?}");
    }
  }

  // ── generate_unique_slug ────────────────────────────────────────────────

  /// In-memory slug index over `(contact id, slug)` pairs, counting probes.
  struct FixedIndex {
    rows:   Vec<(i64, String)>,
    probes: AtomicUsize,
  }

  impl FixedIndex {
    fn new<const N: usize>(rows: [(i64, &str); N]) -> Self {
      Self {
        rows:   rows.iter().map(|(id, s)| (*id, s.to_string())).collect(),
        probes: AtomicUsize::new(0),
      }
    }

    fn probes(&self) -> usize {
      self.probes.load(Ordering::Relaxed)
    }
  }

  impl SlugIndex for FixedIndex {
    type Error = Infallible;

    fn slug_owner<'a>(
      &'a self,
      candidate: &'a str,
      exclude_id: Option<i64>,
    ) -> impl Future<Output = Result<Option<i64>, Infallible>> + Send + 'a
    {
      self.probes.fetch_add(1, Ordering::Relaxed);
      async move {
        Ok(
          self
            .rows
            .iter()
            .find(|(id, slug)| slug == candidate && Some(*id) != exclude_id)
            .map(|(id, _)| *id),
        )
      }
    }
  }

  /// A slug index where every candidate is taken.
  struct SaturatedIndex {
    probes: AtomicUsize,
  }

  impl SlugIndex for SaturatedIndex {
    type Error = Infallible;

    fn slug_owner<'a>(
      &'a self,
      _candidate: &'a str,
      _exclude_id: Option<i64>,
    ) -> impl Future<Output = Result<Option<i64>, Infallible>> + Send + 'a
    {
      self.probes.fetch_add(1, Ordering::Relaxed);
      async move { Ok(Some(1)) }
    }
  }

  #[tokio::test]
  async fn unique_name_returns_base_after_one_probe() {
    let index = FixedIndex::new([]);
    let slug = generate_unique_slug(&index, "New Contact", None).await.unwrap();
    assert_eq!(slug, "new-contact");
    assert_eq!(index.probes(), 1);
  }

  #[tokio::test]
  async fn single_conflict_appends_1() {
    let index = FixedIndex::new([(1, "existing-contact")]);
    let slug =
      generate_unique_slug(&index, "Existing Contact", None).await.unwrap();
    assert_eq!(slug, "existing-contact-1");
    assert_eq!(index.probes(), 2);
  }

  #[tokio::test]
  async fn conflict_chain_numbers_sequentially() {
    let index = FixedIndex::new([(1, "test"), (2, "test-1")]);
    let slug = generate_unique_slug(&index, "Test", None).await.unwrap();
    assert_eq!(slug, "test-2");
    assert_eq!(index.probes(), 3);
  }

  #[tokio::test]
  async fn rename_ignores_its_own_row() {
    let index = FixedIndex::new([(1, "my-contact")]);
    let slug =
      generate_unique_slug(&index, "My Contact", Some(1)).await.unwrap();
    assert_eq!(slug, "my-contact");
    assert_eq!(index.probes(), 1);
  }

  #[tokio::test]
  async fn rename_still_conflicts_with_other_contacts() {
    let index =
      FixedIndex::new([(1, "original-name"), (2, "new-name-target")]);
    let slug =
      generate_unique_slug(&index, "New Name Target", Some(1)).await.unwrap();
    assert_eq!(slug, "new-name-target-1");
    assert_eq!(index.probes(), 2);
  }

  #[tokio::test]
  async fn rename_walks_past_multiple_foreign_conflicts() {
    let index =
      FixedIndex::new([(2, "another-user"), (3, "another-user-1")]);
    let slug =
      generate_unique_slug(&index, "Another User", Some(1)).await.unwrap();
    assert_eq!(slug, "another-user-2");
    assert_eq!(index.probes(), 3);
  }

  #[tokio::test]
  async fn empty_name_numbers_from_the_empty_base() {
    let index = FixedIndex::new([]);
    let slug = generate_unique_slug(&index, "", None).await.unwrap();
    assert_eq!(slug, "");

    let index = FixedIndex::new([(1, "")]);
    let slug = generate_unique_slug(&index, "", None).await.unwrap();
    assert_eq!(slug, "-1");
  }

  #[tokio::test]
  async fn long_chain_falls_back_to_random_suffix() {
    let mut rows = vec![(0i64, "base".to_string())];
    for n in 1..MAX_NUMBERED_ATTEMPTS {
      rows.push((n as i64, format!("base-{n}")));
    }
    let index = FixedIndex { rows, probes: AtomicUsize::new(0) };

    let slug = generate_unique_slug(&index, "Base", None).await.unwrap();
    let suffix = slug.strip_prefix("base-").expect("random-suffix candidate");
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(index.probes(), MAX_NUMBERED_ATTEMPTS as usize + 1);
  }

  #[tokio::test]
  async fn saturated_index_errors_after_bounded_probes() {
    let index = SaturatedIndex { probes: AtomicUsize::new(0) };
    let err = generate_unique_slug(&index, "Test", None).await.unwrap_err();
    assert!(matches!(err, SlugError::Exhausted { ref base } if base == "test"));
    assert_eq!(
      index.probes.load(Ordering::Relaxed),
      (MAX_NUMBERED_ATTEMPTS + MAX_RANDOM_ATTEMPTS) as usize
    );
  }
}
