pub mod block;
pub mod config;
pub mod done;
pub mod range;
pub mod subject;
pub mod today;
pub mod week;

use anyhow::Result;
use owo_colors::OwoColorize;
use timetable_core::{Occurrence, Subject, TimeBlock, Timetable};

use crate::render::Render;

/// Find a block by full id or unique id prefix.
pub fn find_block(timetable: &Timetable, query: &str) -> Result<TimeBlock> {
    let query = query.trim().to_ascii_lowercase();
    let matches: Vec<TimeBlock> = timetable
        .list_blocks()?
        .into_iter()
        .filter(|b| b.id.to_string().starts_with(&query))
        .collect();

    match matches.as_slice() {
        [block] => Ok(block.clone()),
        [] => anyhow::bail!("No time block matches '{}'", query),
        _ => anyhow::bail!("'{}' matches {} blocks, use a longer id", query, matches.len()),
    }
}

/// Find a subject by id prefix or by name (case-insensitive).
pub fn find_subject(timetable: &Timetable, query: &str) -> Result<Subject> {
    let query = query.trim();
    let subjects = timetable.list_subjects()?;

    if let Some(subject) = subjects.iter().find(|s| s.name.eq_ignore_ascii_case(query)) {
        return Ok(subject.clone());
    }

    let lower = query.to_ascii_lowercase();
    let matches: Vec<&Subject> = subjects
        .iter()
        .filter(|s| s.id.to_string().starts_with(&lower))
        .collect();

    match matches.as_slice() {
        [subject] => Ok((*subject).clone()),
        [] => {
            let available: Vec<_> = subjects.iter().map(|s| s.name.as_str()).collect();
            anyhow::bail!(
                "Subject '{}' not found. Available: {}",
                query,
                available.join(", ")
            );
        }
        _ => anyhow::bail!("'{}' matches {} subjects, use a longer id", query, matches.len()),
    }
}

pub fn print_occurrences(occurrences: &[Occurrence]) {
    if occurrences.is_empty() {
        println!("  {}", "Nothing scheduled".dimmed());
        return;
    }
    for occurrence in occurrences {
        println!("  {}", occurrence.render());
    }
}
