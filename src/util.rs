//! Small utility helpers used across modules.

/// Count words by trimming and splitting on runs of whitespace.
/// Empty and whitespace-only input counts as zero words.
pub fn word_count(s: &str) -> usize {
  s.split_whitespace().count()
}

/// Drop every dash from an identity field before pattern checks.
pub fn strip_dashes(s: &str) -> String {
  s.chars().filter(|c| *c != '-').collect()
}

/// Reduce a free-form id to something safe as a cache file stem.
pub fn safe_file_stem(s: &str) -> String {
  s.chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
    .collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let cut = (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn word_count_splits_on_whitespace_runs() {
    assert_eq!(word_count(""), 0);
    assert_eq!(word_count("   "), 0);
    assert_eq!(word_count(" one "), 1);
    assert_eq!(word_count("one\ttwo\n three"), 3);
  }

  #[test]
  fn safe_file_stem_keeps_only_portable_chars() {
    assert_eq!(safe_file_stem("proj-42_a"), "proj-42_a");
    assert_eq!(safe_file_stem("../etc/passwd"), "___etc_passwd");
  }
}
