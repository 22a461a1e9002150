//! Backend health check.

use console::style;

use crate::api::ContractApi;
use crate::config::Settings;

pub async fn cmd_health(settings: &Settings) -> anyhow::Result<()> {
    let client = settings.make_client()?;
    match client.health().await {
        Ok(true) => {
            println!("{} {} is healthy", style("✓").green(), settings.api_url);
        }
        Ok(false) => {
            println!(
                "{} {} responded but reported not ok",
                style("!").yellow(),
                settings.api_url
            );
        }
        Err(error) => {
            println!(
                "{} {} is unreachable: {}",
                style("✗").red(),
                settings.api_url,
                error
            );
            std::process::exit(1);
        }
    }
    Ok(())
}
