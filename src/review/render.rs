use name_highlight::{highlight_with, HighlightSettings, Marker};

use crate::review::{
    feedback::{FeedbackStore, FieldFeedback},
    reports::ReportLookup,
    *,
};

const NO_REPORT: &str = "No report associated with this speaker";
const REPORT_NOT_FOUND: &str = "Report file not found or could not be loaded";

fn vote_label(fb: &FieldFeedback) -> &'static str {
    match fb.approved {
        Some(true) => "correct",
        Some(false) => "incorrect",
        None => "not rated",
    }
}

fn missing_summary(field: SummaryField) -> String {
    format!("No {} extracted", field.key())
}

/// Plain text page for one entry: the summaries with their annotations,
/// then the report with the speaker's name highlighted.
pub fn render_entry(
    entry: &ReviewEntry,
    total: usize,
    report: &ReportLookup,
    store: &FeedbackStore,
    highlight: HighlightSettings,
    marker: &Marker,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("==== {} ====", entry.display_name));
    lines.push(format!(
        "Entry {} / {}    name matching sensitivity: {}",
        entry.index + 1,
        total,
        highlight.threshold
    ));
    for field in SummaryField::ALL {
        let fb = store.get(entry.index, field);
        lines.push(String::new());
        lines.push(format!("-- Extracted {} [{}]", field.label(), vote_label(&fb)));
        lines.push(match entry.summary(field) {
            Some(s) => s.to_string(),
            None => missing_summary(field),
        });
        if let Some(c) = &fb.comment {
            lines.push(format!("Comment: {}", c));
        }
    }
    lines.push(String::new());
    match report {
        ReportLookup::NoReport => lines.push(NO_REPORT.to_string()),
        ReportLookup::NotFound(name) => {
            lines.push(format!("-- Report {}", name));
            lines.push(REPORT_NOT_FOUND.to_string());
        }
        ReportLookup::Loaded { name, text } => {
            lines.push(format!("-- Report {}", name));
            lines.push(highlight_with(text, &entry.speaker, highlight.threshold, marker).into_owned());
        }
    }
    lines.join("\n")
}

/// HTML fragment for one entry, with the report on the left and the
/// summaries on the right. The texts are inserted as they are.
pub fn render_entry_html(
    entry: &ReviewEntry,
    total: usize,
    report: &ReportLookup,
    store: &FeedbackStore,
    highlight: HighlightSettings,
) -> String {
    let report_html = match report {
        ReportLookup::NoReport => format!("<p class=\"info\">{}</p>", NO_REPORT),
        ReportLookup::NotFound(_) => format!("<p class=\"warning\">{}</p>", REPORT_NOT_FOUND),
        ReportLookup::Loaded { text, .. } => {
            highlight_with(text, &entry.speaker, highlight.threshold, &Marker::HTML).into_owned()
        }
    };

    let mut summaries: Vec<String> = Vec::new();
    for field in SummaryField::ALL {
        let fb = store.get(entry.index, field);
        let body = match entry.summary(field) {
            Some(s) => format!("<p>{}</p>", s),
            None => format!("<p class=\"info\">{}</p>", missing_summary(field)),
        };
        let comment = match &fb.comment {
            Some(c) => format!("\n    <p class=\"comment\">{}</p>", c),
            None => String::new(),
        };
        summaries.push(format!(
            "    <h3>Extracted {}</h3>\n    <p class=\"vote {}\">{}</p>\n    {}{}",
            field.label(),
            vote_label(&fb).replace(' ', "-"),
            vote_label(&fb),
            body,
            comment
        ));
    }

    format!(
        "<div class=\"entry\">\n  <div class=\"report\">{}</div>\n  <div class=\"summaries\">\n    <h1>{}</h1>\n    <p><strong>{} / {}</strong></p>\n{}\n  </div>\n</div>",
        report_html,
        entry.display_name,
        entry.index + 1,
        total,
        summaries.join("\n")
    )
}

pub fn render_progress(annotated: usize, total: usize) -> String {
    let percent = if total > 0 { annotated * 100 / total } else { 0 };
    format!("Entries annotated: {} / {} ({}%)", annotated, total, percent)
}

/// A reminder to export the annotations, shown every ten annotated entries.
pub fn save_reminder(annotated: usize) -> Option<&'static str> {
    if annotated > 0 && annotated % 10 == 0 {
        Some("Reminder: don't forget to export your annotations to save your progress!")
    } else {
        None
    }
}
