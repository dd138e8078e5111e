use anyhow::Result;
use owo_colors::OwoColorize;
use timetable_core::config::TimetableConfig;

pub fn run() -> Result<()> {
    let config_path = TimetableConfig::config_path()?;
    let config = TimetableConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", config.data_path().display());
    println!();
    println!("{}", "Settings".bold());
    for line in config.to_toml()?.lines() {
        println!("  {}", line);
    }

    Ok(())
}
