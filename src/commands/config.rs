use anyhow::Result;
use fulcrum_core::config::FulcrumConfig;
use owo_colors::OwoColorize;

/// Show the config, saving any settings given on the command line first.
pub fn run(
    mut config: FulcrumConfig,
    timezone: Option<String>,
    repeat_interval_days: Option<i64>,
) -> Result<()> {
    let config_path = FulcrumConfig::config_path()?;

    if timezone.is_some() || repeat_interval_days.is_some() {
        if let Some(timezone) = timezone {
            config.timezone = timezone;
        }
        if let Some(days) = repeat_interval_days {
            config.repeat_interval_days = days;
        }
        config.validate()?;
        config.save()?;
        println!("{}", format!("  Saved {}", config_path.display()).green());
        println!();
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Timezone:         {}", config.timezone);
    println!("  Repeat interval:  {} days", config.repeat_interval_days);

    Ok(())
}
