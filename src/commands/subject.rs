use anyhow::Result;
use owo_colors::OwoColorize;
use timetable_core::{Color, Timetable};

use crate::commands::find_subject;
use crate::render::{Render, short_id};

pub fn add(timetable: &Timetable, name: &str, color: Option<&str>) -> Result<()> {
    let color = color.map(str::parse::<Color>).transpose()?.unwrap_or_default();
    let subject = timetable.create_subject(name, color)?;
    println!("{} {}", "Created".green(), subject.render());
    Ok(())
}

pub fn list(timetable: &Timetable) -> Result<()> {
    let subjects = timetable.list_subjects()?;
    if subjects.is_empty() {
        println!("{}", "No subjects yet. Add one with `timetable subject add`".dimmed());
        return Ok(());
    }

    for subject in &subjects {
        println!(
            "{} {} {}",
            short_id(&subject.id.to_string()).dimmed(),
            subject.render(),
            subject.color.as_str().dimmed()
        );
    }
    Ok(())
}

pub fn edit(
    timetable: &Timetable,
    query: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    let subject = find_subject(timetable, query)?;
    let color = color.map(str::parse::<Color>).transpose()?;
    let updated = timetable.update_subject(subject.id, name, color)?;
    println!("{} {}", "Updated".yellow(), updated.render());
    Ok(())
}

pub fn rm(timetable: &Timetable, query: &str) -> Result<()> {
    let subject = find_subject(timetable, query)?;
    timetable.delete_subject(subject.id)?;
    println!("{} {}", "Deleted".red(), subject.render());
    Ok(())
}
