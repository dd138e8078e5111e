use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use timetable_core::Timetable;

use crate::commands::print_occurrences;
use crate::render::Render;

pub fn run(timetable: &Timetable, start: Option<NaiveDate>, json: bool) -> Result<()> {
    let view = timetable.week(start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Week of {} to {}", view.week_start, view.week_end).bold()
    );
    println!("{}", view.progress.render());

    let today = timetable.clock().today();
    for day in &view.days {
        println!();
        let label = format!("{} {}", day.weekday, day.date.format("%a %b %-d"));
        if day.date == today {
            println!("{} {}", label.bold().cyan(), "(today)".dimmed());
        } else {
            println!("{}", label.bold());
        }
        print_occurrences(&day.occurrences);
    }

    Ok(())
}
