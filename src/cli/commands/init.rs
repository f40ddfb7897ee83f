//! Initialize command.

use console::style;

use crate::config::Settings;

/// Create the database schema and check the origin catalog.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let ctx = settings.open_database().await?;
    println!(
        "  {} Database ready at {}",
        style("✓").green(),
        ctx.pool().database_url()
    );

    if settings.origin_config.exists() {
        let catalog = settings.load_catalog()?;
        println!(
            "  {} Loaded {} hosts from {}",
            style("✓").green(),
            catalog.len(),
            settings.origin_config.display()
        );
    } else {
        println!(
            "{} No origin catalog at {}",
            style("!").yellow(),
            settings.origin_config.display()
        );
        println!("  Set ORIGIN_CONFIG or pass --origins before running serve");
    }

    println!("{} Initialized collectionbox", style("✓").green());
    Ok(())
}
