// ********* Stopwords ***********

/// Common function words and filler terms that are never highlighted,
/// whatever their similarity to the name.
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they", "clear", "non",
];

/// Case-insensitive membership test against [STOPWORDS].
pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

// ******** Output data structures *********

/// A half-open byte range of the scanned text that matched the name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// The text inserted around each highlighted span.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Marker<'a> {
    pub open: &'a str,
    pub close: &'a str,
}

impl<'a> Marker<'a> {
    /// Inline `<mark>` element, gold background.
    pub const HTML: Marker<'static> = Marker {
        open: r#"<mark style="background-color: #FFD700; padding: 2px 4px; border-radius: 3px;">"#,
        close: "</mark>",
    };

    /// Bold yellow for terminals that understand ANSI escapes.
    pub const ANSI: Marker<'static> = Marker {
        open: "\x1b[1;33m",
        close: "\x1b[0m",
    };

    /// Plain-text fallback.
    pub const BRACKETS: Marker<'static> = Marker {
        open: "[[",
        close: "]]",
    };
}

impl Default for Marker<'static> {
    fn default() -> Self {
        Marker::HTML
    }
}

// ********* Configuration **********

/// The matching sensitivity exposed to reviewers.
///
/// Lower thresholds match more variations of the name, at the cost of
/// more false positives. Interactive adjustments stay within
/// [HighlightSettings::MIN_THRESHOLD, HighlightSettings::MAX_THRESHOLD] and move by
/// [HighlightSettings::STEP].
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct HighlightSettings {
    pub threshold: u32,
}

impl HighlightSettings {
    pub const MIN_THRESHOLD: u32 = 60;
    pub const MAX_THRESHOLD: u32 = 100;
    pub const STEP: u32 = 5;

    pub const DEFAULT_SETTINGS: HighlightSettings = HighlightSettings { threshold: 80 };

    /// Clamps the value to the allowed range and snaps it to the nearest step.
    pub fn with_threshold(threshold: u32) -> HighlightSettings {
        let clamped = threshold.clamp(Self::MIN_THRESHOLD, Self::MAX_THRESHOLD);
        let snapped = (clamped + Self::STEP / 2) / Self::STEP * Self::STEP;
        HighlightSettings {
            threshold: snapped.min(Self::MAX_THRESHOLD),
        }
    }

    pub fn stricter(self) -> HighlightSettings {
        Self::with_threshold(self.threshold.saturating_add(Self::STEP))
    }

    pub fn looser(self) -> HighlightSettings {
        Self::with_threshold(self.threshold.saturating_sub(Self::STEP))
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self::DEFAULT_SETTINGS
    }
}
