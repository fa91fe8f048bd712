// tests/distance_laws.rs
// Laws the distance scorer must uphold, checked with the default weights.
// These tests are self-contained: plain strings in, penalties out.

use hud_search::distance::{score, score_with_matches};
use hud_search::settings::Settings;

fn s() -> Settings {
    Settings::default()
}

#[test]
fn matching_yourself_costs_nothing() {
    let s = s();
    for text in ["save", "Quit", "Open Recent", "File > Save As…"] {
        assert_eq!(
            score(Some(text), Some(&[text]), &s),
            0,
            "expected a zero distance for {text:?} against itself"
        );
    }
}

#[test]
fn null_sides_price_by_length() {
    let s = s();
    assert_eq!(score(None, Some(&["Paste"]), &s), 5 * s.drop_penalty);
    assert_eq!(score(Some("paste"), None, &s), 5 * s.add_penalty);
}

#[test]
fn null_pair_is_a_caller_error() {
    assert_eq!(score(None, None, &s()), u32::MAX);
}

#[test]
fn accelerator_underscores_change_nothing() {
    let s = s();
    let clean = score(Some("quit"), Some(&["quit"]), &s);
    for noisy in ["_quit", "q_uit", "qui_t", "quit_", "_q_u_i_t_"] {
        assert_eq!(
            score(Some("quit"), Some(&[noisy]), &s),
            clean,
            "underscores in {noisy:?} must be free"
        );
    }
}

#[test]
fn case_folding_stays_close_to_exact() {
    let s = s();
    let d = score(Some("abc"), Some(&["ABC"]), &s);
    assert!(d <= 3 * s.swap_penalty_case, "got {d}");
    assert!(
        d < s.swap_penalty,
        "a pure case difference must stay cheaper than one substitution"
    );
}

#[test]
fn query_token_order_is_irrelevant() {
    let s = s();
    let forward = score(Some("save file"), Some(&["File > Save"]), &s);
    let backward = score(Some("file save"), Some(&["File > Save"]), &s);
    assert_eq!(forward, backward);
}

#[test]
fn each_query_token_takes_its_best_fit() {
    let s = s();
    let (d, matches) = score_with_matches("copy edit", &["Edit > Copy"], &s);
    assert_eq!(matches, vec!["Copy".to_string(), "Edit".to_string()]);
    assert!(d <= s.swap_penalty_case);
}

#[test]
fn dropped_letter_beats_a_different_word() {
    let s = s();
    let quit = score(Some("qit"), Some(&["File > Quit"]), &s);
    let edit = score(Some("qit"), Some(&["Edit"]), &s);
    assert_eq!(quit, s.add_penalty_pre + s.swap_penalty_case);
    assert!(
        quit < edit,
        "one skipped letter ({quit}) must outrank a different word ({edit})"
    );
}

#[test]
fn transposed_letters_beat_two_substitutions() {
    let s = s();
    let d = score(Some("prnit"), Some(&["Print"]), &s);
    assert_eq!(d, s.transpose_penalty + s.swap_penalty_case);
    assert!(d < 2 * s.swap_penalty);
}

#[test]
fn prefix_queries_score_well_against_longer_items() {
    let s = s();
    let exact = score(Some("save"), Some(&["File > Save"]), &s);
    let longer = score(Some("save"), Some(&["File > Save As…"]), &s);
    assert!(
        longer <= exact + 4 * s.add_penalty_pre,
        "a longer item must only cost its extra lead: {longer} vs {exact}"
    );
}

#[test]
fn breadcrumb_separators_do_not_leak_into_tokens() {
    let s = s();
    let joined = score(Some("save"), Some(&["File > Save"]), &s);
    let segments = score(Some("save"), Some(&["File", "Save"]), &s);
    assert_eq!(joined, segments);
}
