//! vCard (VCF) importer for orbit.
//!
//! Turns the text of an exported address book into
//! [`ImportCandidate`]s: a display name plus the preferred phone number and
//! email address. Everything else in the card is ignored. Pure synchronous;
//! no I/O.
//!
//! # Quick start
//!
//! ```no_run
//! let vcf = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:Alice Smith\r\nEND:VCARD\r\n";
//! let candidates = orbit_vcard::parse_candidates(vcf);
//! assert_eq!(candidates[0].name, "Alice Smith");
//! ```

pub mod error;
mod parse;

pub use error::{Error, Result};
use orbit_core::contact::ImportCandidate;

/// Parse a single vCard from `input`.
pub fn parse(input: &str) -> Result<ImportCandidate> { parse::parse_one(input) }

/// Parse zero or more vCards from `input`.
///
/// Each `BEGIN:VCARD … END:VCARD` block is parsed independently; a malformed
/// block yields `Err(…)` in the corresponding position without aborting the
/// rest.
pub fn parse_many(input: &str) -> Vec<Result<ImportCandidate>> {
  let lines = parse::unfold_lines(input);
  let mut results = Vec::new();
  let mut i = 0;

  while i < lines.len() {
    if lines[i].eq_ignore_ascii_case("BEGIN:VCARD") {
      let start = i;
      let rel_end = lines[start + 1..]
        .iter()
        .position(|l| l.eq_ignore_ascii_case("END:VCARD"));

      if let Some(offset) = rel_end {
        let end = start + 1 + offset;
        let card_str = lines[start..=end].join("\r\n") + "\r\n";
        results.push(parse::parse_one(&card_str));
        i = end + 1;
      } else {
        results.push(Err(Error::MissingEnvelope));
        break;
      }
    } else {
      i += 1;
    }
  }

  results
}

/// Parse every usable card in `input`, silently dropping cards that are
/// malformed or have no name.
pub fn parse_candidates(input: &str) -> Vec<ImportCandidate> {
  let results = parse_many(input);
  let total = results.len();
  let candidates: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
  if candidates.len() < total {
    tracing::debug!(
      dropped = total - candidates.len(),
      "skipped unusable vCards"
    );
  }
  candidates
}
