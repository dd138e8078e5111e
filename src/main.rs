mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use timetable_core::Timetable;
use timetable_core::time::parse_date;
use tracing_subscriber::EnvFilter;

use crate::commands::block::BlockArgs;

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Plan study time blocks and tick them off as you go")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's blocks grouped into ongoing, upcoming and done
    Today {
        /// Print the raw JSON view instead
        #[arg(long)]
        json: bool,
    },
    /// Show the week containing a date (this week by default)
    Week {
        /// Any date in the week (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// List every occurrence between two dates
    Range {
        /// First date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Last date (YYYY-MM-DD), defaults to --from
        #[arg(long)]
        to: Option<String>,
    },
    /// Mark a block's occurrence as done
    Done {
        /// Block id (a unique prefix is enough)
        block: String,

        /// Date of the occurrence (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Mark it as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Manage time blocks
    Block {
        #[command(subcommand)]
        command: BlockCommand,
    },
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        command: SubjectCommand,
    },
    /// Show configuration and data paths
    Config,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// Create a weekly block (--weekday) or a one-off block (--date)
    Add(BlockArgs),
    List,
    /// Change some fields of a block
    Edit {
        block: String,

        #[command(flatten)]
        args: BlockArgs,

        /// Detach the block from its subject
        #[arg(long, conflicts_with = "subject")]
        no_subject: bool,
    },
    Rm {
        block: String,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    Add {
        name: String,

        /// Display color (#RRGGBB or #RGB)
        #[arg(short, long)]
        color: Option<String>,
    },
    List,
    Edit {
        /// Subject name or id
        subject: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a subject. Its blocks are kept without a subject.
    Rm {
        subject: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse().command)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Config => commands::config::run(),
        Commands::Today { json } => commands::today::run(&Timetable::load()?, json),
        Commands::Week { start, json } => {
            let start = start.as_deref().map(parse_date).transpose()?;
            commands::week::run(&Timetable::load()?, start, json)
        }
        Commands::Range { from, to } => {
            commands::range::run(&Timetable::load()?, from.as_deref(), to.as_deref())
        }
        Commands::Done { block, date, undo } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            commands::done::run(&Timetable::load()?, &block, date, !undo)
        }
        Commands::Block { command } => {
            let timetable = &Timetable::load()?;
            match command {
                BlockCommand::Add(args) => commands::block::add(timetable, args),
                BlockCommand::List => commands::block::list(timetable),
                BlockCommand::Edit {
                    block,
                    args,
                    no_subject,
                } => commands::block::edit(timetable, &block, args, no_subject),
                BlockCommand::Rm { block } => commands::block::rm(timetable, &block),
            }
        }
        Commands::Subject { command } => {
            let timetable = &Timetable::load()?;
            match command {
                SubjectCommand::Add { name, color } => {
                    commands::subject::add(timetable, &name, color.as_deref())
                }
                SubjectCommand::List => commands::subject::list(timetable),
                SubjectCommand::Edit {
                    subject,
                    name,
                    color,
                } => commands::subject::edit(timetable, &subject, name.as_deref(), color.as_deref()),
                SubjectCommand::Rm { subject } => commands::subject::rm(timetable, &subject),
            }
        }
    }
}
