//! Console walkthrough of a dialog
//!
//! Prints each branch, offers the follow-up branches as numbered choices and
//! descends into the chosen one until a branch ends the dialog.

use std::fmt::Display;
use std::io::Write;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{BranchView, Dialog, Utterance};
use crate::infrastructure::traits::{Key, KeySource};

/// Title printed for dialogs without a name.
pub const UNNAMED_DIALOG: &str = "Unnamed Dialog";

/// Choice keys: digits first, then letters.
const CHOICE_KEYS: &str = "123456789abcdefghijklmnopqrstuvwxyz";

/// Upper bound of the pause after a single line.
pub const MAX_LINE_PAUSE: Duration = Duration::from_secs(60);

/// Delays between printed parts of a dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    /// Pause before each branch is printed
    pub branch_pause: Duration,
    /// Seconds per natural-log unit of line length
    pub time_scale: f64,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            branch_pause: Duration::ZERO,
            time_scale: 0.0,
        }
    }

    /// Pause after a line: `ceil(ln(chars) * time_scale)` seconds, capped at
    /// [`MAX_LINE_PAUSE`].
    pub fn line_pause(&self, text: &str) -> Duration {
        let chars = text.chars().count();
        if chars <= 1 || self.time_scale.is_nan() || self.time_scale <= 0.0 {
            return Duration::ZERO;
        }
        let seconds = ((chars as f64).ln() * self.time_scale).ceil();
        Duration::try_from_secs_f64(seconds)
            .map_or(MAX_LINE_PAUSE, |pause| pause.min(MAX_LINE_PAUSE))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            branch_pause: Duration::from_secs(1),
            time_scale: 0.1,
        }
    }
}

/// Outcome of a walkthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Zero-based child positions chosen, in order
    pub choices: Vec<usize>,
    /// False if the player cancelled before reaching an ending
    pub finished: bool,
}

/// Plays a dialog on a writer, reading choices from a key source.
pub struct Walkthrough<'a> {
    keys: &'a mut dyn KeySource,
    out: &'a mut dyn Write,
    pacing: Pacing,
}

impl<'a> Walkthrough<'a> {
    pub fn new(keys: &'a mut dyn KeySource, out: &'a mut dyn Write, pacing: Pacing) -> Self {
        Self { keys, out, pacing }
    }

    #[instrument(level = "debug", skip_all, fields(name = ?dialog.name()))]
    pub fn run<B, N>(&mut self, dialog: &Dialog<B, N>) -> ApplicationResult<WalkReport>
    where
        B: Display,
        N: Utterance,
    {
        let title = dialog.name().unwrap_or(UNNAMED_DIALOG);
        self.emit(format_args!("{}\n", title.red()))?;

        let mut choices = Vec::new();
        let mut current = dialog.start();
        loop {
            self.write_lines(current)?;
            if !current.continues() {
                return Ok(WalkReport {
                    choices,
                    finished: true,
                });
            }
            self.write_choices(current)?;

            let Some(choice) = self.read_choice(current.child_count())? else {
                debug!("walkthrough cancelled at {}", current.path());
                return Ok(WalkReport {
                    choices,
                    finished: false,
                });
            };
            choices.push(choice);
            match current.child(choice) {
                Some(next) => current = next,
                None => {
                    return Ok(WalkReport {
                        choices,
                        finished: false,
                    })
                }
            }
        }
    }

    fn write_lines<B, N: Utterance>(
        &mut self,
        branch: BranchView<'_, B, N>,
    ) -> ApplicationResult<()> {
        thread::sleep(self.pacing.branch_pause);
        for line in branch.lines() {
            match line.speaker() {
                Some(speaker) => {
                    self.emit(format_args!("{}: {}\n", speaker.yellow(), line.text()))?
                }
                None => self.emit(format_args!("{}\n", line.text()))?,
            }
            thread::sleep(self.pacing.line_pause(line.text()));
        }
        Ok(())
    }

    fn write_choices<B: Display, N: Utterance>(
        &mut self,
        branch: BranchView<'_, B, N>,
    ) -> ApplicationResult<()> {
        for (position, child) in branch.children().enumerate() {
            let label = choice_label(child);
            match choice_key(position) {
                Some(key) => {
                    self.emit(format_args!("{} {}\n", format!("[{}]", key).cyan(), label))?
                }
                None => debug!("choice {} has no key and cannot be selected", position + 1),
            }
        }
        Ok(())
    }

    /// Reads keys until one selects a choice; other keys are ignored.
    fn read_choice(&mut self, count: usize) -> ApplicationResult<Option<usize>> {
        loop {
            let key = self
                .keys
                .next_key()
                .with_context("read choice key")?;
            match key {
                Key::Cancel => return Ok(None),
                Key::Char(c) => {
                    if let Some(position) = choice_position(c).filter(|&p| p < count) {
                        self.emit(format_args!("{}\n", format!("[{}]", c).green()))?;
                        return Ok(Some(position));
                    }
                }
            }
        }
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) -> ApplicationResult<()> {
        self.out
            .write_fmt(args)
            .and_then(|_| self.out.flush())
            .with_context("write walkthrough")
    }
}

/// Text offered for a follow-up branch: its entry label, else its first line.
pub fn choice_label<B: Display, N: Utterance>(branch: BranchView<'_, B, N>) -> String {
    match (branch.entry(), branch.first_line()) {
        (Some(entry), _) => entry.to_string(),
        (None, Some(line)) => line.text().to_string(),
        (None, None) => "...".to_string(),
    }
}

fn choice_key(position: usize) -> Option<char> {
    CHOICE_KEYS.chars().nth(position)
}

fn choice_position(key: char) -> Option<usize> {
    CHOICE_KEYS.chars().position(|c| c == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DialogBuilder, DialogLine, TextDialog};
    use crate::util::testing::ScriptedKeys;
    use rstest::rstest;

    fn two_choices() -> TextDialog {
        let mut builder = DialogBuilder::named("door");
        builder.start_branch(|b| {
            b.add_line(DialogLine::new("Guard", "Halt!"))
                .add_branch(|c| {
                    c.entry("Flee".to_string())
                        .add_line(DialogLine::new("Player", "I run."));
                })
                .add_branch(|c| {
                    c.add_line(DialogLine::new("Player", "Let me in."))
                        .add_line(DialogLine::new("Guard", "Fine."));
                });
        });
        builder.build().unwrap()
    }

    fn play(dialog: &TextDialog, keys: &[Key]) -> (WalkReport, String) {
        let mut keys = ScriptedKeys::new(keys.iter().copied());
        let mut out = Vec::new();
        let report = Walkthrough::new(&mut keys, &mut out, Pacing::none())
            .run(dialog)
            .unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn given_invalid_keys_when_choosing_then_they_are_ignored() {
        let (report, out) = play(&two_choices(), &[Key::Char('x'), Key::Char('7'), Key::Char('2')]);

        assert_eq!(
            report,
            WalkReport {
                choices: vec![1],
                finished: true
            }
        );
        assert!(out.contains("door"));
        assert!(out.contains("Halt!"));
        assert!(out.contains("Flee"));
        assert!(out.contains("Let me in."));
        assert!(out.contains("Fine."));
        assert!(!out.contains("I run."));
    }

    #[test]
    fn given_cancel_key_when_choosing_then_stops_unfinished() {
        let (report, out) = play(&two_choices(), &[Key::Cancel]);

        assert!(!report.finished);
        assert!(report.choices.is_empty());
        assert!(out.contains("Halt!"));
        assert!(!out.contains("Fine."));
    }

    #[test]
    fn given_terminal_start_when_playing_then_finishes_without_reading_keys() {
        let mut builder = DialogBuilder::<String, DialogLine>::new();
        builder.start_branch(|b| {
            b.add_line(DialogLine::new("Npc", "Bye."));
        });
        let (report, out) = play(&builder.build().unwrap(), &[]);

        assert!(report.finished);
        assert!(out.contains(UNNAMED_DIALOG));
    }

    #[rstest]
    #[case(0, Some('1'))]
    #[case(8, Some('9'))]
    #[case(9, Some('a'))]
    #[case(35, None)]
    fn given_position_when_mapping_key_then_digits_come_first(
        #[case] position: usize,
        #[case] key: Option<char>,
    ) {
        assert_eq!(choice_key(position), key);
        if let Some(k) = key {
            assert_eq!(choice_position(k), Some(position));
        }
    }

    #[rstest]
    #[case("", 0)]
    #[case("a", 0)]
    #[case("Meow", 1)]
    #[case("You are the smartest person I have ever met.", 1)]
    fn given_line_when_pacing_then_scales_with_log_length(
        #[case] text: &str,
        #[case] seconds: u64,
    ) {
        let pacing = Pacing::default();
        assert_eq!(pacing.line_pause(text), Duration::from_secs(seconds));
    }

    #[rstest]
    #[case(1e3)]
    #[case(1e20)]
    #[case(f64::MAX)]
    #[case(f64::INFINITY)]
    fn given_huge_time_scale_when_pacing_then_pause_is_capped(#[case] time_scale: f64) {
        let pacing = Pacing {
            time_scale,
            ..Pacing::none()
        };
        assert_eq!(pacing.line_pause("Meow"), MAX_LINE_PAUSE);
    }

    #[test]
    fn given_nan_time_scale_when_pacing_then_no_pause() {
        let pacing = Pacing {
            time_scale: f64::NAN,
            ..Pacing::none()
        };
        assert_eq!(pacing.line_pause("Meow"), Duration::ZERO);
    }
}
