use anyhow::Result;
use owo_colors::OwoColorize;
use timetable_core::date_range::MAX_RANGE_DAYS;
use timetable_core::{DateRange, Occurrence, Progress, Timetable};

use crate::commands::print_occurrences;
use crate::render::{Render, pluralize};

pub fn run(timetable: &Timetable, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let range = DateRange::from_args(from, to, timetable.clock().today())?.limited_to(MAX_RANGE_DAYS)?;
    let occurrences = timetable.occurrences(range)?;

    println!(
        "{} {}",
        format!("{} to {}", range.from(), range.to()).bold(),
        format!(
            "({} {})",
            occurrences.len(),
            pluralize("occurrence", occurrences.len())
        )
        .dimmed()
    );
    println!("{}", Progress::of(&occurrences).render());

    for day in range.days() {
        let on_day: Vec<Occurrence> = occurrences
            .iter()
            .filter(|o| o.effective_date == day)
            .cloned()
            .collect();
        if on_day.is_empty() {
            continue;
        }
        println!();
        println!("{}", day.format("%a %b %-d").bold());
        print_occurrences(&on_day);
    }

    Ok(())
}
