use anyhow::Result;
use owo_colors::OwoColorize;
use timetable_core::{Occurrence, Timetable};

use crate::render::Render;

pub fn run(timetable: &Timetable, json: bool) -> Result<()> {
    let view = timetable.today()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "{} {}",
        view.date.format("%A %-d %B").bold(),
        format!("now {}", view.now).dimmed()
    );
    println!("{}", view.progress.render());

    if view.occurrences.is_empty() {
        println!();
        println!("{}", "Nothing scheduled today".dimmed());
        return Ok(());
    }

    section("Ongoing", &view.ongoing);
    section("Upcoming", &view.upcoming);
    section("Done", &view.done);

    Ok(())
}

fn section(label: &str, occurrences: &[Occurrence]) {
    if occurrences.is_empty() {
        return;
    }
    println!();
    println!("{}", label.bold());
    for occurrence in occurrences {
        println!("  {}", occurrence.render());
    }
}
