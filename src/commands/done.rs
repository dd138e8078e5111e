use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use timetable_core::Timetable;

use crate::commands::find_block;

pub fn run(timetable: &Timetable, block: &str, date: Option<NaiveDate>, done: bool) -> Result<()> {
    let block = find_block(timetable, block)?;
    let date = timetable.toggle_completion(block.id, date, done)?;

    let label = format!("{} {} on {}", block.schedule, block.window, date);
    if done {
        println!("{} {}", "✓".green(), label);
    } else {
        println!("{} {}", "○".dimmed(), format!("{label} marked not done").dimmed());
    }

    Ok(())
}
