use std::io::{BufRead, Write};

use name_highlight::{HighlightSettings, Marker};

use crate::review::{
    feedback::FeedbackStore,
    render,
    reports::{ReportLibrary, ReportLookup},
    *,
};

/// Navigation state of a review session.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Session {
    /// Index of the displayed entry, always below `total`.
    pub current: usize,
    pub total: usize,
    pub highlight: HighlightSettings,
}

impl Session {
    /// Moves to the next entry. Stays on the last one.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.total {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous entry. Stays on the first one.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to an entry, given by its 1-based number.
    pub fn goto(&mut self, number: usize) -> ReviewResult<()> {
        self.current = entry_index(number, self.total)?;
        Ok(())
    }
}

/// One line typed by the reviewer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    Next,
    Previous,
    Goto(usize),
    Vote(SummaryField, bool),
    Comment(SummaryField, String),
    Threshold(u32),
    Stricter,
    Looser,
    Show,
    Progress,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  n, next                    next entry
  p, prev                    previous entry
  g, goto <number>           jump to an entry
  up <summary>               mark a summary as correct
  down <summary>             mark a summary as incorrect
  c, comment <summary> <text>
                             comment a summary (no text removes the comment)
  t, threshold <60..100>     set the name matching sensitivity
  +, -                       stricter or looser name matching
  s, show                    print the current entry again
  progress                   number of annotated entries
  h, help                    this message
  q, quit                    leave the session
<summary> is one of: issue, position, argument, proposal";

impl FromStr for Command {
    type Err = ReviewError;

    fn from_str(line: &str) -> ReviewResult<Command> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let cmd = match (word.to_lowercase().as_str(), rest) {
            ("n" | "next", "") => Command::Next,
            ("p" | "prev" | "previous", "") => Command::Previous,
            ("g" | "goto", n) => match n.parse::<usize>() {
                Ok(x) => Command::Goto(x),
                Err(_) => whatever!("goto expects an entry number, got {:?}", n),
            },
            ("up", f) => Command::Vote(f.parse()?, true),
            ("down", f) => Command::Vote(f.parse()?, false),
            ("c" | "comment", r) => {
                let (f, text) = match r.split_once(char::is_whitespace) {
                    Some((f, t)) => (f, t.trim()),
                    None => (r, ""),
                };
                Command::Comment(f.parse()?, text.to_string())
            }
            ("t" | "threshold", n) => match n.parse::<u32>() {
                Ok(x) => Command::Threshold(x),
                Err(_) => whatever!("threshold expects a number, got {:?}", n),
            },
            ("+", "") => Command::Stricter,
            ("-", "") => Command::Looser,
            ("s" | "show", "") => Command::Show,
            ("progress", "") => Command::Progress,
            ("h" | "help" | "?", "") => Command::Help,
            ("q" | "quit" | "exit", "") => Command::Quit,
            _ => whatever!("Unknown command {:?}, type 'help' for the list of commands", line),
        };
        Ok(cmd)
    }
}

/// Whether the loop goes on after a command.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Flow {
    Continue,
    Stop,
}

/// Holds everything an interactive session works on.
pub struct Reviewer {
    entries: Vec<ReviewEntry>,
    reports: ReportLibrary,
    store: FeedbackStore,
    session: Session,
    marker: Marker<'static>,
}

impl Reviewer {
    pub fn new(
        entries: Vec<ReviewEntry>,
        reports: ReportLibrary,
        store: FeedbackStore,
        session: Session,
        marker: Marker<'static>,
    ) -> Reviewer {
        Reviewer {
            entries,
            reports,
            store,
            session,
            marker,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn current_entry(&self) -> &ReviewEntry {
        &self.entries[self.session.current]
    }

    /// Renders the current entry, followed by the save reminder when it is due.
    pub fn render_current(&mut self) -> String {
        let entry = &self.entries[self.session.current];
        let report: ReportLookup = self.reports.lookup(entry.report.as_deref());
        let mut page = render::render_entry(
            entry,
            self.session.total,
            &report,
            &self.store,
            self.session.highlight,
            &self.marker,
        );
        if let Some(reminder) = render::save_reminder(self.store.annotated_rows()) {
            page.push('\n');
            page.push_str(reminder);
        }
        page
    }

    /// Applies one command and returns the text to display.
    pub fn handle(&mut self, cmd: &Command) -> ReviewResult<(Flow, String)> {
        debug!("handle: {:?} in {:?}", cmd, self.session);
        let out = match cmd {
            Command::Next => {
                if !self.session.next() {
                    return Ok((Flow::Continue, "Already at the last entry".to_string()));
                }
                self.render_current()
            }
            Command::Previous => {
                if !self.session.previous() {
                    return Ok((Flow::Continue, "Already at the first entry".to_string()));
                }
                self.render_current()
            }
            Command::Goto(n) => {
                self.session.goto(*n)?;
                self.render_current()
            }
            Command::Vote(field, approved) => {
                let row = self.current_entry().index;
                self.store.vote(row, *field, *approved)?;
                self.render_current()
            }
            Command::Comment(field, text) => {
                let row = self.current_entry().index;
                self.store.comment(row, *field, text)?;
                self.render_current()
            }
            Command::Threshold(t) => {
                self.session.highlight = HighlightSettings::with_threshold(*t);
                self.render_current()
            }
            Command::Stricter => {
                self.session.highlight = self.session.highlight.stricter();
                self.render_current()
            }
            Command::Looser => {
                self.session.highlight = self.session.highlight.looser();
                self.render_current()
            }
            Command::Show => self.render_current(),
            Command::Progress => {
                render::render_progress(self.store.annotated_rows(), self.session.total)
            }
            Command::Help => HELP.to_string(),
            Command::Quit => {
                return Ok((
                    Flow::Stop,
                    "Remember to export your annotations before leaving!".to_string(),
                ))
            }
        };
        Ok((Flow::Continue, out))
    }

    /// Reads commands until `quit` or the end of the input.
    ///
    /// Invalid commands are reported and the session goes on; failures to
    /// save the annotations or to write the output end the session.
    pub fn run_loop<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> ReviewResult<()> {
        let first = self.render_current();
        write_out(&mut output, &first)?;
        write_out(&mut output, "Type 'help' for the list of commands.")?;
        for line_r in input.lines() {
            let line = line_r.context(OpeningFileSnafu { path: "<input>" })?;
            if line.trim().is_empty() {
                continue;
            }
            let cmd = match line.parse::<Command>() {
                Ok(c) => c,
                Err(e) => {
                    write_out(&mut output, &e.to_string())?;
                    continue;
                }
            };
            let (flow, out) = match self.handle(&cmd) {
                Ok(x) => x,
                Err(e @ ReviewError::IndexOutOfRange { .. }) => (Flow::Continue, e.to_string()),
                Err(e) => return Err(e),
            };
            write_out(&mut output, &out)?;
            if flow == Flow::Stop {
                break;
            }
        }
        info!("Session ended on entry {}", self.session.current + 1);
        Ok(())
    }
}

fn write_out<W: Write>(output: &mut W, text: &str) -> ReviewResult<()> {
    writeln!(output, "{}", text).context(WritingFileSnafu { path: "<output>" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(index: usize, speaker: &str) -> ReviewEntry {
        ReviewEntry {
            index,
            speaker: speaker.to_string(),
            display_name: speaker.to_string(),
            report: None,
            issue: Some(format!("issue {}", index)),
            position: None,
            argument: None,
            proposal: None,
        }
    }

    fn reviewer(dir: &std::path::Path, n: usize) -> Reviewer {
        let entries: Vec<ReviewEntry> = (0..n).map(|i| entry(i, &format!("Speaker {}", i))).collect();
        let session = Session {
            current: 0,
            total: n,
            highlight: HighlightSettings::default(),
        };
        Reviewer::new(
            entries,
            ReportLibrary::new(dir),
            FeedbackStore::with_rows(&dir.join("fb.json"), BTreeMap::new()),
            session,
            Marker::BRACKETS,
        )
    }

    #[test]
    fn navigation_is_clamped() {
        let mut s = Session {
            current: 0,
            total: 3,
            highlight: HighlightSettings::default(),
        };
        assert!(!s.previous());
        assert_eq!(s.current, 0);
        assert!(s.next());
        assert!(s.next());
        assert!(!s.next());
        assert_eq!(s.current, 2);
        s.goto(1).unwrap();
        assert_eq!(s.current, 0);
        assert!(s.goto(4).is_err());
        assert_eq!(s.current, 0);
    }

    #[test]
    fn commands_parse() {
        assert_eq!("n".parse::<Command>().unwrap(), Command::Next);
        assert_eq!(" prev ".parse::<Command>().unwrap(), Command::Previous);
        assert_eq!("goto 12".parse::<Command>().unwrap(), Command::Goto(12));
        assert_eq!(
            "up position".parse::<Command>().unwrap(),
            Command::Vote(SummaryField::Position, true)
        );
        assert_eq!(
            "DOWN issue".parse::<Command>().unwrap(),
            Command::Vote(SummaryField::Issue, false)
        );
        assert_eq!(
            "c argument  not what was said ".parse::<Command>().unwrap(),
            Command::Comment(SummaryField::Argument, "not what was said".to_string())
        );
        assert_eq!(
            "comment proposal".parse::<Command>().unwrap(),
            Command::Comment(SummaryField::Proposal, "".to_string())
        );
        assert_eq!("t 65".parse::<Command>().unwrap(), Command::Threshold(65));
        assert_eq!("+".parse::<Command>().unwrap(), Command::Stricter);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert!("goto x".parse::<Command>().is_err());
        assert!("up conclusion".parse::<Command>().is_err());
        assert!("next 3".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn sensitivity_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reviewer(dir.path(), 2);
        r.handle(&Command::Looser).unwrap();
        assert_eq!(r.session().highlight.threshold, 75);
        r.handle(&Command::Threshold(20)).unwrap();
        assert_eq!(r.session().highlight.threshold, 60);
        r.handle(&Command::Stricter).unwrap();
        assert_eq!(r.session().highlight.threshold, 65);
    }

    #[test]
    fn loop_survives_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = reviewer(dir.path(), 2);
        let script = "dance\ngoto 9\n\nnext\nnext\nup issue\nprogress\nquit\nnext\n";
        let mut out: Vec<u8> = Vec::new();
        r.run_loop(script.as_bytes(), &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Unknown command \"dance\""));
        assert!(printed.contains("Entry 9 does not exist"));
        assert!(printed.contains("Already at the last entry"));
        assert!(printed.contains("Entries annotated: 1 / 2"));
        // The command after quit is not applied.
        assert_eq!(r.session().current, 1);
        let store = FeedbackStore::load(&dir.path().join("fb.json")).unwrap();
        assert_eq!(store.get(1, SummaryField::Issue).approved, Some(true));
    }
}
