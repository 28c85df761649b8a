/*!
Fuzzy highlighting of a speaker's name inside a block of text.

Every word of the text is compared to the full name and to each part of
the name. Words close enough to one of them are wrapped in a [Marker];
everything else is passed through untouched.

```
use name_highlight::{highlight_with, Marker};

let out = highlight_with("Mr. Smith responded", "John Smith", 80, &Marker::BRACKETS);
assert_eq!(out, "Mr. [[Smith]] responded");
```
*/
mod config;
mod similarity;

use log::debug;
use regex::Regex;

use std::{borrow::Cow, collections::BTreeSet, sync::OnceLock};

pub use crate::config::*;
pub use crate::similarity::ratio;

fn word_pattern() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is a valid regex"))
}

/// Finds the words of `text` that match `speaker_name`.
///
/// A word matches when it is not a stopword and its similarity to the full
/// name, or to one of the whitespace-separated parts of the name, reaches
/// `threshold` (0-100). The returned spans are sorted, distinct and never
/// overlap.
pub fn find_spans(text: &str, speaker_name: &str, threshold: u32) -> Vec<HighlightSpan> {
    if text.is_empty() || speaker_name.is_empty() {
        return Vec::new();
    }

    // The full name is tried first, then each part in order.
    let names: Vec<String> = std::iter::once(speaker_name)
        .chain(speaker_name.split_whitespace())
        .map(str::to_lowercase)
        .collect();
    let threshold = threshold as f64;

    let mut spans: BTreeSet<HighlightSpan> = BTreeSet::new();
    for m in word_pattern().find_iter(text) {
        let word = m.as_str().to_lowercase();
        if is_stopword(&word) {
            continue;
        }
        if let Some(name) = names
            .iter()
            .find(|name| similarity::ratio_lowercase(&word, name) >= threshold)
        {
            debug!("find_spans: {:?} matched {:?} at {:?}", m.as_str(), name, m.range());
            spans.insert(HighlightSpan {
                start: m.start(),
                end: m.end(),
            });
        }
    }
    spans.into_iter().collect()
}

/// Wraps the occurrences of `speaker_name` in `text` with the HTML `<mark>` marker.
///
/// Empty inputs, and texts without any match, are returned unchanged.
pub fn highlight<'a>(text: &'a str, speaker_name: &str, threshold: u32) -> Cow<'a, str> {
    highlight_with(text, speaker_name, threshold, &Marker::HTML)
}

/// Same as [highlight], with a caller-provided marker.
pub fn highlight_with<'a>(
    text: &'a str,
    speaker_name: &str,
    threshold: u32,
    marker: &Marker,
) -> Cow<'a, str> {
    let spans = find_spans(text, speaker_name, threshold);
    if spans.is_empty() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(apply_spans(text, &spans, marker))
}

/// Variant of [highlight] for values that may be missing altogether.
///
/// A missing text stays missing; a missing name leaves the text unchanged.
pub fn highlight_opt<'a>(
    text: Option<&'a str>,
    speaker_name: Option<&str>,
    threshold: u32,
    marker: &Marker,
) -> Option<Cow<'a, str>> {
    let text = text?;
    match speaker_name {
        Some(name) => Some(highlight_with(text, name, threshold, marker)),
        None => Some(Cow::Borrowed(text)),
    }
}

// The spans must be sorted, non-overlapping and fall on char boundaries.
fn apply_spans(text: &str, spans: &[HighlightSpan], marker: &Marker) -> String {
    let extra = spans.len() * (marker.open.len() + marker.close.len());
    let mut res = String::with_capacity(text.len() + extra);
    let mut last_end = 0;
    for span in spans {
        res.push_str(&text[last_end..span.start]);
        res.push_str(marker.open);
        res.push_str(&text[span.range()]);
        res.push_str(marker.close);
        last_end = span.end;
    }
    res.push_str(&text[last_end..]);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn marked_words(text: &str, name: &str, threshold: u32) -> Vec<String> {
        find_spans(text, name, threshold)
            .iter()
            .map(|s| text[s.range()].to_string())
            .collect()
    }

    fn strip(out: &str, marker: &Marker) -> String {
        out.replace(marker.open, "").replace(marker.close, "")
    }

    #[test]
    fn empty_inputs_are_identity() {
        init();
        assert_eq!(highlight("", "Jane Doe", 80), "");
        assert_eq!(highlight("Jane Doe was here", "", 80), "Jane Doe was here");
        assert!(matches!(
            highlight("Jane Doe was here", "", 80),
            Cow::Borrowed(_)
        ));
        assert_eq!(
            highlight_opt(Some("Jane Doe was here"), None, 80, &Marker::HTML).as_deref(),
            Some("Jane Doe was here")
        );
        assert_eq!(highlight_opt(None, Some("Jane"), 80, &Marker::HTML), None);
    }

    #[test]
    fn exact_match_highlights_each_name_part() {
        init();
        let out = highlight_with("Jane Doe was here", "Jane Doe", 80, &Marker::BRACKETS);
        assert_eq!(out, "[[Jane]] [[Doe]] was here");

        let html = highlight("Jane Doe was here", "Jane Doe", 80);
        assert_eq!(
            html,
            format!(
                "{o}Jane{c} {o}Doe{c} was here",
                o = Marker::HTML.open,
                c = Marker::HTML.close
            )
        );
    }

    #[test]
    fn stopwords_are_never_highlighted() {
        init();
        let text = "In the meeting, Ann spoke";
        assert_eq!(marked_words(text, "Ann", 80), vec!["Ann"]);
        // Even when every other word matches.
        let loose = marked_words(text, "Ann", 0);
        assert_eq!(loose, vec!["meeting", "Ann", "spoke"]);
        // A name made of stopwords cannot match itself.
        assert!(find_spans("The Will", "Will", 100).is_empty());
    }

    #[test]
    fn lower_thresholds_match_more() {
        init();
        let text = "Jon Smyth, John Smith and Joan Smithers met Mr Smit in Johnstown.";
        let name = "John Smith";
        let mut previous: Option<BTreeSet<HighlightSpan>> = None;
        for t in (0..=100).rev().step_by(5) {
            let current: BTreeSet<HighlightSpan> = find_spans(text, name, t).into_iter().collect();
            if let Some(stricter) = previous {
                assert!(stricter.is_subset(&current), "threshold {}", t);
            }
            previous = Some(current);
        }
    }

    #[test]
    fn stripping_markers_gives_back_the_text() {
        init();
        let text = "Smith: \"I agree with Mrs. Smith-Jones,\" said Smith (again), smiths.";
        for t in [0, 60, 80, 100] {
            let out = highlight(text, "Anna Smith", t);
            assert_eq!(strip(&out, &Marker::HTML), text);
        }
        let spans = find_spans(text, "Anna Smith", 0);
        for w in spans.windows(2) {
            assert!(w[0].end <= w[1].start);
        }
    }

    #[test]
    fn unrelated_text_is_unchanged() {
        init();
        let text = "Completely unrelated text";
        assert!(matches!(highlight(text, "Zyxwvq", 90), Cow::Borrowed(t) if t == text));
    }

    #[test]
    fn name_parts_match_on_their_own() {
        init();
        let out = highlight_with("Mr. Smith responded", "John Smith", 80, &Marker::BRACKETS);
        assert_eq!(out, "Mr. [[Smith]] responded");
    }

    #[test]
    fn fuzzy_variants_depend_on_threshold() {
        init();
        // "smyth" is one substitution away from "smith".
        assert_eq!(marked_words("Mr Smyth said", "John Smith", 80), vec!["Smyth"]);
        assert!(marked_words("Mr Smyth said", "John Smith", 85).is_empty());
    }

    #[test]
    fn punctuation_and_unicode() {
        init();
        assert!(find_spans("... --- !!!", "Ann", 0).is_empty());
        let text = "Zoë Müller spoke after Müller's aide.";
        let out = highlight_with(text, "Zoë Müller", 80, &Marker::BRACKETS);
        assert_eq!(out, "[[Zoë]] [[Müller]] spoke after [[Müller]]'s aide.");
    }

    #[test]
    fn markup_in_text_is_not_escaped() {
        init();
        let out = highlight_with("<b>Ann</b> & co", "Ann", 80, &Marker::BRACKETS);
        assert_eq!(out, "<b>[[Ann]]</b> & co");
    }

    #[test]
    fn threshold_above_100_matches_nothing() {
        init();
        assert!(find_spans("Ann Ann", "Ann", 101).is_empty());
    }
}
