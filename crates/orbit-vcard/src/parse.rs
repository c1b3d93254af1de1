//! vCard 3.0 / 4.0 content-line parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_lines()          → Vec<String>
//!          └─ parse_content_line() → ContentLine
//!               └─ FN / N / TEL / EMAIL accumulators
//!                    └─ ImportCandidate

use orbit_core::contact::ImportCandidate;

use crate::error::{Error, Result};

// ─── Content-line representation ─────────────────────────────────────────────

struct ContentLine {
  name:   String,
  params: Vec<Param>,
  value:  String,
}

struct Param {
  name:  String,
  value: String,
}

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Join CRLF+SP (or LF+SP / LF+HT) continuation lines (RFC 6350 §3.2).
/// Tolerates bare LF line endings for real-world robustness.
///
/// A quoted-printable value ending in `=` is a soft line break (vCard 2.1):
/// the `=` is dropped and the next physical line is appended verbatim.
pub(crate) fn unfold_lines(s: &str) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  let mut soft_break = false;
  for raw in s.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if soft_break && let Some(last) = lines.last_mut() {
      last.pop();
      last.push_str(line);
    } else if let Some(rest) = line.strip_prefix([' ', '\t']) {
      // A continuation with no prior line is discarded.
      if let Some(last) = lines.last_mut() {
        last.push_str(rest);
      }
    } else {
      lines.push(line.to_string());
    }
    soft_break = lines
      .last()
      .is_some_and(|l| l.ends_with('=') && declares_quoted_printable(l));
  }
  lines.retain(|l| !l.is_empty());
  lines
}

/// Whether a raw content line carries `ENCODING=QUOTED-PRINTABLE` (or the
/// bare 2.1 `QUOTED-PRINTABLE` token) among its parameters.
fn declares_quoted_printable(line: &str) -> bool {
  let Some(colon) = find_unquoted_colon(line) else {
    return false;
  };
  line[..colon].split(';').skip(1).any(|param| {
    let value = param.rsplit('=').next().unwrap_or(param);
    value.trim().eq_ignore_ascii_case("QUOTED-PRINTABLE")
  })
}

/// Find the first `:` that is not inside a double-quoted string.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

/// Split on `;` while respecting double-quoted strings.
fn split_semicolons_respecting_quotes(s: &str) -> Vec<&str> {
  let mut result = Vec::new();
  let mut start = 0usize;
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ';' if !in_quotes => {
        result.push(&s[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  result.push(&s[start..]);
  result
}

/// Collect all TYPE= values, handling `TYPE=A,B` and multiple `TYPE=` params.
fn type_values(params: &[Param]) -> Vec<String> {
  params
    .iter()
    .filter(|p| p.name.eq_ignore_ascii_case("TYPE"))
    .flat_map(|p| p.value.split(','))
    .map(|t| t.trim().to_uppercase())
    .filter(|t| !t.is_empty())
    .collect()
}

/// Return a preference rank; lower is more preferred.
/// vCard 4.0: `PREF=N` param; vCard 3.0: `TYPE=PREF`.
fn pref_from_params(params: &[Param]) -> u8 {
  let explicit = params
    .iter()
    .filter(|p| p.name.eq_ignore_ascii_case("PREF"))
    .find_map(|p| p.value.parse::<u8>().ok());
  if let Some(n) = explicit {
    return n;
  }
  if type_values(params).iter().any(|t| t == "PREF") {
    return 1;
  }
  u8::MAX
}

/// Minimal quoted-printable decoder for vCard 3.0 `ENCODING=QUOTED-PRINTABLE`.
fn decode_quoted_printable(s: &str) -> String {
  let bytes = s.as_bytes();
  let mut result: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'=' && i + 2 < bytes.len() {
      let hi = (bytes[i + 1] as char).to_digit(16);
      let lo = (bytes[i + 2] as char).to_digit(16);
      if let (Some(hi), Some(lo)) = (hi, lo) {
        result.push(((hi << 4) | lo) as u8);
        i += 3;
        continue;
      }
    }
    result.push(bytes[i]);
    i += 1;
  }
  String::from_utf8_lossy(&result).into_owned()
}

fn unescape_value(s: &str) -> String {
  let mut result = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      result.push(c);
      continue;
    }
    match chars.next() {
      Some('n') | Some('N') => result.push('\n'),
      Some('\\') => result.push('\\'),
      Some(',') => result.push(','),
      Some(';') => result.push(';'),
      Some(other) => {
        result.push('\\');
        result.push(other);
      }
      None => result.push('\\'),
    }
  }
  result
}

/// Unescape and trim; `None` when nothing is left.
fn opt_value(s: &str) -> Option<String> {
  let s = unescape_value(s.trim());
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_string())
}

// ─── Content-line parser ─────────────────────────────────────────────────────

fn parse_content_line(line: &str) -> Result<ContentLine> {
  let colon_pos = find_unquoted_colon(line)
    .ok_or_else(|| Error::MalformedContentLine(line.to_string()))?;

  let name_part = &line[..colon_pos];
  let value = line[colon_pos + 1..].to_string();

  let tokens = split_semicolons_respecting_quotes(name_part);
  let name_raw = tokens[0].trim();
  if name_raw.is_empty() {
    return Err(Error::MalformedContentLine(line.to_string()));
  }

  // Strip group prefix (e.g. "item1.TEL" → "TEL")
  let name = match name_raw.rfind('.') {
    Some(dot_pos) => name_raw[dot_pos + 1..].to_uppercase(),
    None => name_raw.to_uppercase(),
  };

  let mut params = Vec::new();
  for token in &tokens[1..] {
    if let Some((param_name, param_val)) = token.split_once('=') {
      params.push(Param {
        name:  param_name.trim().to_uppercase(),
        value: param_val.trim().trim_matches('"').to_string(),
      });
    } else {
      // Bare token: treat as TYPE=value (vCard 2.1/3.0 compat)
      let t = token.trim();
      if !t.is_empty() {
        params.push(Param {
          name:  "TYPE".to_string(),
          value: t.to_uppercase(),
        });
      }
    }
  }

  Ok(ContentLine {
    name,
    params,
    value,
  })
}

// ─── Accumulators ────────────────────────────────────────────────────────────

#[derive(Default)]
struct NameAccum {
  full:       Option<String>,
  given:      Option<String>,
  family:     Option<String>,
  additional: Option<String>,
  prefix:     Option<String>,
  suffix:     Option<String>,
}

impl NameAccum {
  /// `FN` wins; otherwise compose from the structured `N` parts.
  fn into_display_name(self) -> Option<String> {
    if self.full.is_some() {
      return self.full;
    }
    let parts: Vec<String> =
      [self.prefix, self.given, self.additional, self.family, self.suffix]
        .into_iter()
        .flatten()
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
  }
}

/// Keeps the most preferred value seen so far; ties go to the first.
#[derive(Default)]
struct Preferred {
  best: Option<(u8, String)>,
}

impl Preferred {
  fn offer(&mut self, pref: u8, value: String) {
    let better = self
      .best
      .as_ref()
      .is_none_or(|(best_pref, _)| pref < *best_pref);
    if better {
      self.best = Some((pref, value));
    }
  }

  fn into_value(self) -> Option<String> { self.best.map(|(_, v)| v) }
}

// ─── Core parser ─────────────────────────────────────────────────────────────

/// Parse a single vCard from `input` into an import candidate.
pub fn parse_one(input: &str) -> Result<ImportCandidate> {
  let lines = unfold_lines(input);

  let start = lines
    .iter()
    .position(|l| l.eq_ignore_ascii_case("BEGIN:VCARD"))
    .ok_or(Error::MissingEnvelope)?;
  let end = lines
    .iter()
    .rposition(|l| l.eq_ignore_ascii_case("END:VCARD"))
    .ok_or(Error::MissingEnvelope)?;
  if end <= start {
    return Err(Error::MissingEnvelope);
  }

  let mut name = NameAccum::default();
  let mut phone = Preferred::default();
  let mut email = Preferred::default();

  for line in &lines[start + 1..end] {
    let Ok(cl) = parse_content_line(line) else {
      continue; // skip malformed lines
    };

    let is_qp = cl.params.iter().any(|p| {
      p.name.eq_ignore_ascii_case("ENCODING")
        && p.value.eq_ignore_ascii_case("QUOTED-PRINTABLE")
    });
    let value = if is_qp {
      decode_quoted_printable(&cl.value)
    } else {
      cl.value
    };

    match cl.name.as_str() {
      "FN" => {
        if let Some(v) = opt_value(&value) {
          name.full = Some(v);
        }
      }
      "N" => {
        // family;given;additional;prefix;suffix
        let parts: Vec<&str> = value.split(';').collect();
        let part = |i: usize| parts.get(i).and_then(|s| opt_value(s));
        name.family = part(0);
        name.given = part(1);
        name.additional = part(2);
        name.prefix = part(3);
        name.suffix = part(4);
      }
      "TEL" => {
        if let Some(number) = opt_value(&value) {
          // vCard 4.0 may carry a `tel:` URI.
          let has_scheme = number
            .get(..4)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("tel:"));
          let number = if has_scheme {
            number[4..].to_string()
          } else {
            number
          };
          phone.offer(pref_from_params(&cl.params), number);
        }
      }
      "EMAIL" => {
        if let Some(address) = opt_value(&value) {
          email.offer(pref_from_params(&cl.params), address);
        }
      }
      _ => {}
    }
  }

  let name = name.into_display_name().ok_or(Error::MissingName)?;
  Ok(ImportCandidate {
    name,
    phone_number: phone.into_value(),
    email: email.into_value(),
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
