//! # Distance Scoring
//! Weighted edit distance between a query and a candidate display string.
//!
//! - Both sides are split into tokens on menu separators (space, `.`, `-`, `>`).
//! - Each query token is scored against every haystack token with a penalty
//!   matrix; the cheapest haystack token wins ("best fit").
//! - The overall score is the arithmetic mean of the best fits, so queries
//!   with more words are not punished for being specific.
//! - Characters common as menu noise (space, `_`, `-`, `>`) are free to add,
//!   drop, or substitute.
//!
//! Pure functions, no I/O; all tunables come in through [`Settings`].

use crate::settings::Settings;
use tracing::warn;

/// Characters that split a query or display string into tokens.
const SEPARATORS: &[char] = &[' ', '.', '-', '>'];

/// Characters that are not considered mistakes: grammatical noise that
/// shows up in menus, such as accelerator underscores and breadcrumb arrows.
const IGNORED: &[char] = &[' ', '_', '-', '>'];

fn is_ignored(c: char) -> bool {
    IGNORED.contains(&c)
}

/// Cost of aligning one query character with one haystack character.
fn swap_cost(a: char, b: char, s: &Settings) -> u32 {
    if a == b {
        return 0;
    }
    if is_ignored(a) || is_ignored(b) {
        return 0;
    }
    if a.to_uppercase().eq(b.to_uppercase()) {
        // Some penalty, but close.
        return s.swap_penalty_case;
    }
    s.swap_penalty
}

/// Penalty matrix over `[-1, len_needle) x [-1, len_haystack)`, stored with
/// a one-cell border for the empty-prefix alignments.
struct PenaltyMatrix {
    cells: Vec<u32>,
    width: usize,
}

impl PenaltyMatrix {
    fn new(len_needle: usize, len_haystack: usize) -> Self {
        Self {
            cells: vec![0; (len_needle + 1) * (len_haystack + 1)],
            width: len_needle + 1,
        }
    }

    fn get(&self, needle_loc: isize, haystack_loc: isize) -> u32 {
        self.cells[(needle_loc + 1) as usize + (haystack_loc + 1) as usize * self.width]
    }

    fn set(&mut self, needle_loc: isize, haystack_loc: isize, value: u32) {
        self.cells[(needle_loc + 1) as usize + (haystack_loc + 1) as usize * self.width] = value;
    }
}

/// Score a single query token against a single haystack token.
fn token_distance(needle: &str, haystack: &str, s: &Settings) -> u32 {
    let needle: Vec<char> = needle.chars().collect();
    let haystack: Vec<char> = haystack.chars().collect();
    let len_needle = needle.len();
    let len_haystack = haystack.len();

    // Empty tokens skip the matrix entirely.
    if len_needle == 0 {
        return s.drop_penalty * len_haystack as u32;
    }
    if len_haystack == 0 {
        return s.add_penalty * len_needle as u32;
    }

    let mut m = PenaltyMatrix::new(len_needle, len_haystack);

    // First row: query characters with no haystack to match are pure adds.
    let mut acc = 0;
    for i in 0..len_needle {
        if !is_ignored(needle[i]) {
            acc += s.add_penalty;
        }
        m.set(i as isize, -1, acc);
    }

    // First column: skipping into the haystack is cheap across its lead,
    // expensive once the query should have started matching.
    let lead = len_haystack.saturating_sub(len_needle);
    let mut acc = 0;
    for j in 0..len_haystack {
        if !is_ignored(haystack[j]) {
            acc += if j < lead { s.add_penalty_pre } else { s.drop_penalty };
        }
        m.set(-1, j as isize, acc);
    }

    for i in 0..len_needle {
        for j in 0..len_haystack {
            let (ni, hj) = (i as isize, j as isize);

            let subst = m.get(ni - 1, hj - 1) + swap_cost(needle[i], haystack[j], s);

            // Consume a query character against nothing.
            let drop = m.get(ni - 1, hj)
                + if is_ignored(needle[i]) {
                    0
                } else if i < j {
                    s.drop_penalty
                } else {
                    s.drop_penalty_end
                };

            // Consume a haystack character against nothing.
            let add = m.get(ni, hj - 1)
                + if is_ignored(haystack[j]) {
                    0
                } else if len_haystack as isize - len_needle as isize - ni > 0 {
                    s.add_penalty_pre
                } else {
                    s.add_penalty
                };

            // Adjacent transposition; otherwise priced so it cannot win.
            let transpose = if i > 0
                && j > 0
                && needle[i] == haystack[j - 1]
                && haystack[j] == needle[i - 1]
            {
                m.get(ni - 2, hj - 2) + s.transpose_penalty
            } else {
                drop + 1
            };

            m.set(ni, hj, subst.min(drop).min(add).min(transpose));
        }
    }

    m.get(len_needle as isize - 1, len_haystack as isize - 1)
}

/// Score `needle` against an ancestry path given as separate segments.
///
/// Segments are joined with `" > "` and both sides are tokenized before
/// scoring. A `None` on either side takes the length-based fast path; both
/// sides `None` is a caller error answered with the `u32::MAX` sentinel.
pub fn score(needle: Option<&str>, haystacks: Option<&[&str]>, s: &Settings) -> u32 {
    match (needle, haystacks) {
        (None, None) => {
            warn!("distance requested for a null pair");
            u32::MAX
        }
        (None, Some(h)) => {
            s.drop_penalty * h.first().map_or(0, |e| e.chars().count()) as u32
        }
        (Some(n), None) => s.add_penalty * n.chars().count() as u32,
        (Some(n), Some(h)) => best_fit_mean(n, h, s, None),
    }
}

/// Like [`score`], additionally reporting which haystack token was the best
/// fit for each query token.
pub fn score_with_matches(needle: &str, haystacks: &[&str], s: &Settings) -> (u32, Vec<String>) {
    let mut matches = Vec::new();
    let distance = best_fit_mean(needle, haystacks, s, Some(&mut matches));
    (distance, matches)
}

fn best_fit_mean(
    needle: &str,
    haystacks: &[&str],
    s: &Settings,
    mut matches: Option<&mut Vec<String>>,
) -> u32 {
    let joined = haystacks.join(" > ");

    let needle_tokens: Vec<&str> = needle.split(SEPARATORS).collect();
    let haystack_tokens: Vec<&str> = joined.split(SEPARATORS).collect();

    let mut total = 0u32;
    for needle_token in &needle_tokens {
        let mut best = u32::MAX;
        let mut best_token = "";

        for haystack_token in &haystack_tokens {
            let distance = token_distance(needle_token, haystack_token, s);
            if distance < best {
                best = distance;
                best_token = haystack_token;
            }
        }

        total += best;
        if let Some(out) = matches.as_deref_mut() {
            out.push(best_token.to_string());
        }
    }

    // Splitting always yields at least one token, even for the empty string.
    total / needle_tokens.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Settings {
        Settings::default()
    }

    #[test]
    fn identical_strings_score_zero() {
        let s = s();
        for text in ["save", "Quit", "Open Recent"] {
            assert_eq!(score(Some(text), Some(&[text]), &s), 0, "{text}");
        }
    }

    #[test]
    fn null_needle_prices_the_first_haystack_entry() {
        let s = s();
        assert_eq!(score(None, Some(&["File"]), &s), 4 * s.drop_penalty);
    }

    #[test]
    fn null_haystack_prices_the_needle() {
        let s = s();
        assert_eq!(score(Some("quit"), None, &s), 4 * s.add_penalty);
    }

    #[test]
    fn null_pair_returns_the_sentinel() {
        assert_eq!(score(None, None, &s()), u32::MAX);
    }

    #[test]
    fn underscores_are_free_wherever_they_land() {
        let s = s();
        let clean = score(Some("abc"), Some(&["abc"]), &s);
        for noisy in ["_abc", "a_bc", "ab_c", "abc_", "_a_b_c_"] {
            assert_eq!(score(Some("abc"), Some(&[noisy]), &s), clean, "{noisy}");
        }
    }

    #[test]
    fn case_differences_stay_cheap() {
        let s = s();
        let d = score(Some("abc"), Some(&["ABC"]), &s);
        assert!(d <= 3 * s.swap_penalty_case, "got {d}");
        assert!(d < s.swap_penalty);
    }

    #[test]
    fn missing_character_costs_one_add() {
        let s = s();
        // "qit" against "Quit": one skipped letter plus the case fold.
        let d = token_distance("qit", "Quit", &s);
        assert_eq!(d, s.add_penalty_pre + s.swap_penalty_case);
    }

    #[test]
    fn transposition_beats_two_substitutions() {
        let s = s();
        let d = token_distance("prnit", "Print", &s);
        assert_eq!(d, s.transpose_penalty + s.swap_penalty_case);
        assert!(d < 2 * s.swap_penalty);
    }

    #[test]
    fn empty_tokens_take_the_fast_paths() {
        let s = s();
        assert_eq!(token_distance("", "File", &s), 4 * s.drop_penalty);
        assert_eq!(token_distance("abc", "", &s), 3 * s.add_penalty);
    }

    #[test]
    fn best_fit_picks_the_cheapest_token_per_query_word() {
        let s = s();
        let (d, matches) = score_with_matches("save", &["File", "Save As…"], &s);
        assert_eq!(matches, vec!["Save".to_string()]);
        assert!(d <= s.swap_penalty_case);
    }

    #[test]
    fn token_order_does_not_matter_for_two_word_queries() {
        let s = s();
        let a = score(Some("save file"), Some(&["File > Save"]), &s);
        let b = score(Some("file save"), Some(&["File > Save"]), &s);
        assert_eq!(a, b);
    }

    #[test]
    fn mean_is_taken_over_query_tokens() {
        let s = s();
        let single = score(Some("copy"), Some(&["Edit > Copy"]), &s);
        let double = score(Some("copy copy"), Some(&["Edit > Copy"]), &s);
        assert_eq!(single, double);
    }

    #[test]
    fn haystack_segments_join_like_a_breadcrumb() {
        let s = s();
        let joined = score(Some("save"), Some(&["File > Save"]), &s);
        let split = score(Some("save"), Some(&["File", "Save"]), &s);
        assert_eq!(joined, split);
    }
}
