//! Text shaping for the card body: excerpting and greedy word-wrap.

/// Characters of story text shown on a card.
pub const EXCERPT_CHARS: usize = 200;

/// Column budget per body line.
pub const WRAP_COLUMNS: usize = 40;

const ELLIPSIS: &str = "...";

/// The first [`EXCERPT_CHARS`] characters of `text` followed by an ellipsis.
pub fn excerpt(text: &str) -> String {
  let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
  out.push_str(ELLIPSIS);
  out
}

/// Greedy word-wrap to at most `width` characters per line.
///
/// Each line takes as many whitespace-separated words as fit, joined by one
/// space. A word longer than `width` is split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let width = width.max(1);
  let mut lines = Vec::new();
  let mut line = String::new();
  let mut line_len = 0;

  for word in text.split_whitespace() {
    let mut rest = word;
    loop {
      let rest_len = rest.chars().count();
      if line_len == 0 {
        if rest_len <= width {
          line.push_str(rest);
          line_len = rest_len;
          break;
        }
        let split = rest
          .char_indices()
          .nth(width)
          .map_or(rest.len(), |(i, _)| i);
        lines.push(rest[..split].to_owned());
        rest = &rest[split..];
      } else if line_len + 1 + rest_len <= width {
        line.push(' ');
        line.push_str(rest);
        line_len += 1 + rest_len;
        break;
      } else {
        lines.push(std::mem::take(&mut line));
        line_len = 0;
      }
    }
  }

  if !line.is_empty() {
    lines.push(line);
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn excerpt_truncates_by_characters() {
    let text = "é".repeat(250);
    let out = excerpt(&text);
    assert_eq!(out.chars().count(), EXCERPT_CHARS + 3);
    assert!(out.ends_with("..."));
  }

  #[test]
  fn excerpt_of_short_and_empty_text() {
    assert_eq!(excerpt("Quick run."), "Quick run....");
    assert_eq!(excerpt(""), "...");
  }

  #[test]
  fn wraps_at_last_fitting_space() {
    let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
    assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
    assert!(lines.iter().all(|l| l.chars().count() <= 10));
  }

  #[test]
  fn exact_fit_stays_on_one_line() {
    assert_eq!(wrap_text("abcde fghij", 11), vec!["abcde fghij"]);
    assert_eq!(wrap_text("abcde fghij", 10), vec!["abcde", "fghij"]);
  }

  #[test]
  fn long_words_are_split() {
    assert_eq!(wrap_text("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
  }

  #[test]
  fn whitespace_is_collapsed() {
    assert_eq!(wrap_text("  one\n\ntwo\tthree  ", 40), vec!["one two three"]);
    assert!(wrap_text("   ", 40).is_empty());
  }

  #[test]
  fn body_lines_fit_forty_columns() {
    let story = "Meet Jane, whose Saturday mornings have been measured in \
                 five-kilometre slices since 2015. From Bushy Park to \
                 Brighton & Hove, she has collected personal bests like \
                 other people collect fridge magnets.";
    let lines = wrap_text(&excerpt(story), WRAP_COLUMNS);
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.chars().count() <= WRAP_COLUMNS));
  }
}
