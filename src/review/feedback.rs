use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;

use crate::review::*;

const ROW_PREFIX: &str = "row_";
const COMMENT_SUFFIX: &str = "_comment";

/// What the reviewer said about one summary.
///
/// The vote and the comment are independent: writing a comment does not
/// approve or reject the summary.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FieldFeedback {
    pub approved: Option<bool>,
    pub comment: Option<String>,
}

impl FieldFeedback {
    pub fn is_empty(&self) -> bool {
        self.approved.is_none() && self.comment.is_none()
    }
}

pub type RowFeedback = BTreeMap<SummaryField, FieldFeedback>;

/// The annotations of all the rows, saved to a JSON file after every change.
///
/// The file maps `row_<index>` to an object holding, for each summary, the
/// vote under the summary name and the comment under `<summary>_comment`:
///
/// ```json
/// { "row_3": { "issue": true, "issue_comment": "ok", "position": false } }
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackStore {
    path: PathBuf,
    rows: BTreeMap<usize, RowFeedback>,
}

impl FeedbackStore {
    /// Reads the store. A missing file is an empty store.
    pub fn load(path: &Path) -> ReviewResult<FeedbackStore> {
        let path_s = path.display().to_string();
        if !path.exists() {
            info!("No feedback file at {:?}, starting from scratch", path_s);
            return Ok(FeedbackStore::with_rows(path, BTreeMap::new()));
        }
        let contents = fs::read_to_string(path).context(OpeningFileSnafu {
            path: path_s.clone(),
        })?;
        let js: JSValue =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: path_s })?;
        let rows = rows_from_json(&js)?;
        debug!("FeedbackStore::load: {} annotated rows", rows.len());
        Ok(FeedbackStore::with_rows(path, rows))
    }

    pub fn with_rows(path: &Path, rows: BTreeMap<usize, RowFeedback>) -> FeedbackStore {
        FeedbackStore {
            path: path.to_path_buf(),
            rows,
        }
    }

    pub fn get(&self, row: usize, field: SummaryField) -> FieldFeedback {
        self.rows
            .get(&row)
            .and_then(|r| r.get(&field))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of rows with at least one vote or comment.
    pub fn annotated_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn vote(&mut self, row: usize, field: SummaryField, approved: bool) -> ReviewResult<()> {
        info!("vote: row {} {}: {}", row, field, approved);
        self.update(row, field, |f| f.approved = Some(approved))
    }

    /// Sets the comment. An empty (or blank) text removes it.
    pub fn comment(&mut self, row: usize, field: SummaryField, text: &str) -> ReviewResult<()> {
        info!("comment: row {} {}: {:?}", row, field, text);
        let comment = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self.update(row, field, |f| f.comment = comment)
    }

    /// Replaces all the annotations, e.g. with a previously exported file.
    pub fn replace(&mut self, rows: BTreeMap<usize, RowFeedback>) -> ReviewResult<()> {
        self.rows = rows;
        self.save()
    }

    fn update<F>(&mut self, row: usize, field: SummaryField, f: F) -> ReviewResult<()>
    where
        F: FnOnce(&mut FieldFeedback),
    {
        let row_fb = self.rows.entry(row).or_default();
        let field_fb = row_fb.entry(field).or_default();
        f(field_fb);
        // Entries left without content are dropped so that they do not count as annotated.
        if field_fb.is_empty() {
            row_fb.remove(&field);
        }
        if row_fb.is_empty() {
            self.rows.remove(&row);
        }
        self.save()
    }

    pub fn to_json(&self) -> JSValue {
        let mut res: JSMap<String, JSValue> = JSMap::new();
        for (row, fields) in self.rows.iter() {
            let mut obj: JSMap<String, JSValue> = JSMap::new();
            for (field, fb) in fields.iter() {
                if let Some(approved) = fb.approved {
                    obj.insert(field.key().to_string(), json!(approved));
                }
                if let Some(comment) = &fb.comment {
                    obj.insert(format!("{}{}", field.key(), COMMENT_SUFFIX), json!(comment));
                }
            }
            res.insert(format!("{}{}", ROW_PREFIX, row), JSValue::Object(obj));
        }
        JSValue::Object(res)
    }

    pub fn to_pretty_json(&self) -> ReviewResult<String> {
        serde_json::to_string_pretty(&self.to_json()).context(SerializingJsonSnafu {})
    }

    /// Rewrites the whole file. The content goes to a temporary file first,
    /// which then replaces the old file.
    pub fn save(&self) -> ReviewResult<()> {
        let contents = self.to_pretty_json()?;
        let tmp = self.path.with_extension("json.tmp");
        let tmp_s = tmp.display().to_string();
        fs::write(&tmp, contents).context(WritingFileSnafu { path: tmp_s })?;
        fs::rename(&tmp, &self.path).context(WritingFileSnafu {
            path: self.path.display().to_string(),
        })?;
        debug!("save: {} rows written to {:?}", self.rows.len(), self.path);
        Ok(())
    }
}

/// Parses the content of a feedback file. Unknown keys are skipped.
pub fn rows_from_json(js: &JSValue) -> ReviewResult<BTreeMap<usize, RowFeedback>> {
    let obj = match js.as_object() {
        Some(o) => o,
        None => whatever!("The annotations must be a JSON object, found {}", js),
    };
    let mut rows: BTreeMap<usize, RowFeedback> = BTreeMap::new();
    for (key, value) in obj.iter() {
        let row = match key
            .strip_prefix(ROW_PREFIX)
            .and_then(|s| s.parse::<usize>().ok())
        {
            Some(r) => r,
            None => {
                warn!("rows_from_json: skipping unknown key {:?}", key);
                continue;
            }
        };
        let fields = match value.as_object() {
            Some(o) => o,
            None => whatever!("The annotations of {} must be a JSON object", key),
        };
        let mut row_fb: RowFeedback = BTreeMap::new();
        for (fkey, fvalue) in fields.iter() {
            let (name, is_comment) = match fkey.strip_suffix(COMMENT_SUFFIX) {
                Some(n) => (n, true),
                None => (fkey.as_str(), false),
            };
            let field = match SummaryField::from_key(name) {
                Some(f) => f,
                None => {
                    warn!("rows_from_json: {}: skipping unknown key {:?}", key, fkey);
                    continue;
                }
            };
            let entry = row_fb.entry(field).or_default();
            match (is_comment, fvalue) {
                (true, JSValue::String(s)) if !s.is_empty() => entry.comment = Some(s.clone()),
                (true, JSValue::String(_)) | (true, JSValue::Null) => {}
                (false, JSValue::Bool(b)) => entry.approved = Some(*b),
                (false, JSValue::Null) => {}
                _ => whatever!("Unexpected value for {}.{}: {}", key, fkey, fvalue),
            }
        }
        row_fb.retain(|_, fb| !fb.is_empty());
        if !row_fb.is_empty() {
            rows.insert(row, row_fb);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::load(&dir.path().join("feedback.json")).unwrap();
        assert_eq!(store.annotated_rows(), 0);
        assert_eq!(store.get(0, SummaryField::Issue), FieldFeedback::default());
    }

    #[test]
    fn changes_are_saved_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let mut store = FeedbackStore::load(&path).unwrap();
        store.vote(3, SummaryField::Issue, true).unwrap();
        store.vote(3, SummaryField::Issue, false).unwrap();
        store.comment(3, SummaryField::Proposal, "vague").unwrap();
        store.vote(0, SummaryField::Argument, true).unwrap();

        let reloaded = FeedbackStore::load(&path).unwrap();
        assert_eq!(reloaded, store);
        assert_eq!(reloaded.annotated_rows(), 2);
        assert_eq!(reloaded.get(3, SummaryField::Issue).approved, Some(false));
        assert_eq!(
            reloaded.get(3, SummaryField::Proposal),
            FieldFeedback {
                approved: None,
                comment: Some("vague".to_string())
            }
        );
        assert!(!dir.path().join("feedback.json.tmp").exists());
    }

    #[test]
    fn comment_does_not_vote() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FeedbackStore::load(&dir.path().join("f.json")).unwrap();
        store.comment(1, SummaryField::Position, "unclear").unwrap();
        assert_eq!(store.get(1, SummaryField::Position).approved, None);
        assert_eq!(
            store.to_json(),
            json!({"row_1": {"position_comment": "unclear"}})
        );
    }

    #[test]
    fn clearing_the_last_comment_unannotates_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FeedbackStore::load(&dir.path().join("f.json")).unwrap();
        store.comment(2, SummaryField::Issue, "typo").unwrap();
        assert_eq!(store.annotated_rows(), 1);
        store.comment(2, SummaryField::Issue, "  ").unwrap();
        assert_eq!(store.annotated_rows(), 0);
    }

    #[test]
    fn reads_files_from_earlier_sessions() {
        let js = json!({
            "row_0": {"issue": true, "issue_comment": "", "position": false},
            "row_12": {"argument_comment": "too long", "proposal": null},
            "row_5": {},
            "notes": "free text",
            "row_1": {"mood": "happy", "issue": true}
        });
        let rows = rows_from_json(&js).unwrap();
        assert_eq!(rows.keys().cloned().collect::<Vec<usize>>(), vec![0, 1, 12]);
        assert_eq!(
            rows[&0].get(&SummaryField::Issue),
            Some(&FieldFeedback {
                approved: Some(true),
                comment: None
            })
        );
        assert_eq!(
            rows[&12].get(&SummaryField::Argument).unwrap().comment.as_deref(),
            Some("too long")
        );
        assert!(rows[&12].get(&SummaryField::Proposal).is_none());
    }

    #[test]
    fn file_keys_are_case_sensitive() {
        let js = json!({
            "row_0": {"ISSUE": true, "issue": false, "Position_comment": "x"}
        });
        let rows = rows_from_json(&js).unwrap();
        assert_eq!(rows[&0].len(), 1);
        assert_eq!(rows[&0][&SummaryField::Issue].approved, Some(false));
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(rows_from_json(&json!([1, 2])).is_err());
        assert!(rows_from_json(&json!({"row_0": "yes"})).is_err());
        assert!(rows_from_json(&json!({"row_0": {"issue": "yes"}})).is_err());
    }
}
