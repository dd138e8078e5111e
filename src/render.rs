//! Colored terminal rendering for timetable-core types.

use owo_colors::OwoColorize;
use timetable_core::{Occurrence, Progress, Subject, TimeBlock};

pub trait Render {
    fn render(&self) -> String;
}

const BAR_WIDTH: usize = 20;

impl Render for Progress {
    fn render(&self) -> String {
        let filled = BAR_WIDTH * usize::from(self.percent) / 100;
        let bar = format!(
            "{}{}",
            "█".repeat(filled).green(),
            "░".repeat(BAR_WIDTH - filled).dimmed()
        );
        format!(
            "{} {}/{} done ({}%)",
            bar, self.completed, self.total, self.percent
        )
    }
}

impl Render for Subject {
    fn render(&self) -> String {
        format!("{} {}", swatch(self), self.name)
    }
}

impl Render for Occurrence {
    fn render(&self) -> String {
        let time = format!("{}-{}", self.start_time, self.end_time);
        let check = if self.done {
            "✓".green().to_string()
        } else {
            "○".dimmed().to_string()
        };
        let title = match &self.subject {
            Some(subject) => format!("{} {}", swatch(subject), subject.name),
            None => self.title().dimmed().to_string(),
        };
        let title = if self.done {
            title.strikethrough().to_string()
        } else {
            title
        };

        let mut line = format!("{} {} {}", check, time, title);
        if let Some(note) = &self.note {
            line.push_str(&format!(" {}", note.dimmed()));
        }
        line.push_str(&format!(" {}", short_id(&self.source_block_id.to_string()).dimmed()));
        line
    }
}

/// One line per block for `timetable block list`.
pub fn render_block(block: &TimeBlock, subject: Option<&Subject>) -> String {
    let subject = match subject {
        Some(subject) => subject.render(),
        None => "No subject".dimmed().to_string(),
    };
    let mut line = format!(
        "{} {:<16} {} {}",
        short_id(&block.id.to_string()).dimmed(),
        block.schedule.to_string(),
        block.window,
        subject
    );
    if let Some(note) = &block.note {
        line.push_str(&format!(" {}", note.dimmed()));
    }
    line
}

/// Colored dot in the subject's color.
fn swatch(subject: &Subject) -> String {
    let (r, g, b) = subject.color.rgb();
    "●".truecolor(r, g, b).to_string()
}

/// First 8 characters of an id, enough to address it on the command line.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
