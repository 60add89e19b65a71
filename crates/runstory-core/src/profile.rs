//! Helpers for the athlete profile page: building its URL, recognising a
//! missing profile, and pulling a display name out of its markdown.

/// Default profile URL; `{id}` is replaced by [`lookup_target`].
pub const DEFAULT_PROFILE_URL_TEMPLATE: &str =
  "https://www.parkrun.org.uk/parkrunner/{id}/all/";

/// Display name used when none can be extracted.
pub const DEFAULT_DISPLAY_NAME: &str = "parkrunner";

/// Phrases that mark an upstream page as "no such athlete". Matched
/// case-insensitively.
pub const NOT_FOUND_PHRASES: &[&str] = &[
  "no parkrunner",
  "parkrunner not found",
  "athlete not found",
  "page not found",
];

/// Strip the leading non-digit marker from an athlete identifier:
/// `"A12345"` → `"12345"`. Surrounding whitespace is ignored.
///
/// `None` unless what remains is a non-empty run of ASCII digits, so the
/// result is always safe to put in a URL path.
pub fn lookup_target(entity_id: &str) -> Option<&str> {
  let target = entity_id.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
  (!target.is_empty() && target.bytes().all(|b| b.is_ascii_digit())).then_some(target)
}

/// Interpolate `target` into `template` at every `{id}`.
pub fn profile_url(template: &str, target: &str) -> String {
  template.replace("{id}", target)
}

/// Whether `markdown` is the upstream's "profile does not exist" page.
pub fn indicates_missing_profile(markdown: &str) -> bool {
  let lower = markdown.to_lowercase();
  NOT_FOUND_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Best-effort short name for the athlete.
///
/// Takes the first non-empty markdown heading, drops emphasis markers, and
/// cuts it before a `" - "` summary or a parenthesised athlete number.
/// Falls back to [`DEFAULT_DISPLAY_NAME`]; never fails.
pub fn extract_display_name(markdown: &str) -> String {
  markdown
    .lines()
    .filter_map(heading_text)
    .map(clean_heading)
    .find(|name| !name.is_empty())
    .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned())
}

/// The text of an ATX heading (`# …` to `###### …`), if `line` is one.
fn heading_text(line: &str) -> Option<&str> {
  let line = line.trim_start();
  let level = line.bytes().take_while(|&b| b == b'#').count();
  if level == 0 || level > 6 {
    return None;
  }
  let rest = &line[level..];
  if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
    return None;
  }
  Some(rest.trim().trim_end_matches('#').trim_end())
}

fn clean_heading(text: &str) -> String {
  let mut name: String = text.chars().filter(|c| !matches!(c, '*' | '_' | '`')).collect();

  if let Some(idx) = name.find(" - ") {
    name.truncate(idx);
  }
  if let Some(idx) = name.rfind('(')
    && is_athlete_number(&name[idx + 1..])
  {
    name.truncate(idx);
  }

  name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `A12345)` or `12345)` at the start of `s`.
fn is_athlete_number(s: &str) -> bool {
  let s = s.strip_prefix(['A', 'a']).unwrap_or(s);
  let digits = s.bytes().take_while(u8::is_ascii_digit).count();
  digits > 0 && s[digits..].starts_with(')')
}
