use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use timetable_core::time::parse_date;
use timetable_core::{BlockDraft, MinuteOfDay, Schedule, Timetable, Weekday, Window};

use crate::commands::{find_block, find_subject};
use crate::render::{pluralize, render_block};

#[derive(Args, Debug, Default)]
pub struct BlockArgs {
    /// Repeat every week on this day (MO..SU or a day name)
    #[arg(short, long, conflicts_with = "date")]
    pub weekday: Option<String>,

    /// Happen once on this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Start time (HH:MM)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Subject name or id
    #[arg(long)]
    pub subject: Option<String>,

    #[arg(short, long)]
    pub note: Option<String>,
}

impl BlockArgs {
    fn schedule(&self) -> Result<Option<Schedule>> {
        if let Some(weekday) = &self.weekday {
            return Ok(Some(Schedule::Weekly(weekday.parse::<Weekday>()?)));
        }
        if let Some(date) = &self.date {
            return Ok(Some(Schedule::Once(parse_date(date)?)));
        }
        Ok(None)
    }

    /// Overlay the given flags onto `draft`.
    fn apply(&self, timetable: &Timetable, mut draft: BlockDraft) -> Result<BlockDraft> {
        if let Some(schedule) = self.schedule()? {
            draft.schedule = schedule;
        }

        let start = match &self.start {
            Some(s) => s.parse::<MinuteOfDay>()?,
            None => draft.window.start,
        };
        let end = match &self.end {
            Some(s) => s.parse::<MinuteOfDay>()?,
            None => draft.window.end,
        };
        draft.window = Window::new(start, end)?;

        if let Some(subject) = &self.subject {
            draft.subject_id = Some(find_subject(timetable, subject)?.id);
        }
        if let Some(note) = &self.note {
            draft = draft.with_note(note);
        }
        Ok(draft)
    }
}

pub fn add(timetable: &Timetable, args: BlockArgs) -> Result<()> {
    let schedule = args
        .schedule()?
        .context("Pass --weekday for a weekly block or --date for a one-off block")?;
    let (Some(start), Some(end)) = (&args.start, &args.end) else {
        anyhow::bail!("Both --start and --end are required");
    };

    let draft = args.apply(timetable, BlockDraft::new(None, start, end, schedule, None)?)?;
    let block = timetable.create_block(draft)?;
    let subject = block
        .subject_id
        .and_then(|id| timetable.list_subjects().ok()?.into_iter().find(|s| s.id == id));

    println!("{} {}", "Created".green(), render_block(&block, subject.as_ref()));
    Ok(())
}

pub fn list(timetable: &Timetable) -> Result<()> {
    let blocks = timetable.list_blocks()?;
    let subjects = timetable.list_subjects()?;

    if blocks.is_empty() {
        println!("{}", "No time blocks yet. Add one with `timetable block add`".dimmed());
        return Ok(());
    }

    let weekly = blocks.iter().filter(|b| b.is_weekly()).count();
    println!(
        "{}",
        format!(
            "{} weekly, {} one-off {}",
            weekly,
            blocks.len() - weekly,
            pluralize("block", blocks.len())
        )
        .dimmed()
    );
    for block in &blocks {
        let subject = block
            .subject_id
            .and_then(|id| subjects.iter().find(|s| s.id == id));
        println!("{}", render_block(block, subject));
    }

    Ok(())
}

pub fn edit(timetable: &Timetable, query: &str, args: BlockArgs, no_subject: bool) -> Result<()> {
    let block = find_block(timetable, query)?;
    let mut draft = args.apply(timetable, BlockDraft::from(&block))?;
    if no_subject {
        draft.subject_id = None;
    }

    let updated = timetable.update_block(block.id, draft)?;
    let subject = updated
        .subject_id
        .and_then(|id| timetable.list_subjects().ok()?.into_iter().find(|s| s.id == id));

    println!("{} {}", "Updated".yellow(), render_block(&updated, subject.as_ref()));
    Ok(())
}

pub fn rm(timetable: &Timetable, query: &str) -> Result<()> {
    let block = find_block(timetable, query)?;
    timetable.delete_block(block.id)?;
    println!("{} {}", "Deleted".red(), render_block(&block, None));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::timetable;
    use chrono::NaiveDate;
    use timetable_core::{Color, Repeat};

    fn args() -> BlockArgs {
        BlockArgs {
            start: Some("08:00".into()),
            end: Some("09:30".into()),
            ..BlockArgs::default()
        }
    }

    #[test]
    fn add_weekly_with_subject() {
        let timetable = timetable();
        let math = timetable.create_subject("Math", Color::default()).unwrap();

        add(
            &timetable,
            BlockArgs {
                weekday: Some("monday".into()),
                subject: Some("math".into()),
                ..args()
            },
        )
        .unwrap();

        let blocks = timetable.list_blocks().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].schedule, Schedule::Weekly(Weekday::Monday));
        assert_eq!(blocks[0].subject_id, Some(math.id));
    }

    #[test]
    fn add_requires_a_schedule_and_times() {
        let timetable = timetable();
        assert!(add(&timetable, args()).is_err());
        assert!(add(
            &timetable,
            BlockArgs {
                date: Some("2024-01-05".into()),
                ..BlockArgs::default()
            }
        )
        .is_err());
        assert!(timetable.list_blocks().unwrap().is_empty());
    }

    #[test]
    fn edit_switches_weekly_to_one_off_and_keeps_window() {
        let timetable = timetable();
        add(
            &timetable,
            BlockArgs {
                weekday: Some("FR".into()),
                ..args()
            },
        )
        .unwrap();
        let id = timetable.list_blocks().unwrap()[0].id.to_string();

        edit(
            &timetable,
            &id,
            BlockArgs {
                date: Some("2024-01-05".into()),
                ..BlockArgs::default()
            },
            false,
        )
        .unwrap();

        let block = &timetable.list_blocks().unwrap()[0];
        assert_eq!(block.schedule.repeat(), Repeat::None);
        assert_eq!(block.schedule.date(), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(block.window.to_string(), "08:00-09:30");
    }

    #[test]
    fn edit_rejects_inverted_window() {
        let timetable = timetable();
        add(
            &timetable,
            BlockArgs {
                weekday: Some("MO".into()),
                ..args()
            },
        )
        .unwrap();
        let id = timetable.list_blocks().unwrap()[0].id.to_string();

        let inverted = BlockArgs {
            end: Some("07:00".into()),
            ..BlockArgs::default()
        };
        assert!(edit(&timetable, &id, inverted, false).is_err());
    }
}
