use anyhow::Result;
use tracing::{error, info};

use flower_scraper::browser::WebDriverLauncher;
use flower_scraper::storage::GoogleSheets;
use flower_scraper::utils::{http, logging};
use flower_scraper::{Config, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let guard = logging::init(config.log_file.as_deref())?;

    info!("Starting flower scraper");

    let client = http::create_client()?;
    let store = GoogleSheets::new(client, &config.spreadsheet_id, config.credentials_path.clone());

    let launcher = WebDriverLauncher::from_config(&config);

    match Session::new(&config, &launcher, &store).run().await {
        Ok(outcome) => {
            info!(
                status = outcome.status.key(),
                products = outcome.products,
                "Run finished with {}",
                outcome.status
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
