use std::sync::Arc;

use tracing::{error, info};

use funnel_core::{config::Config, store::SqliteStore};

#[tokio::main]
async fn main() -> Result<(), funnel_core::Error> {
    funnel_core::logging::init("funnel")?;

    let cfg = Arc::new(Config::load()?);
    let store = SqliteStore::open(&cfg.database_path).await?;
    info!(database = %cfg.database_path.display(), "record store opened");

    // Runs until Ctrl-C; startup failures (network, Telegram) are retried after a pause.
    loop {
        match funnel_telegram::router::run_polling(cfg.clone(), store.clone()).await {
            Ok(()) => break,
            Err(e) => {
                error!(error = %e, "polling failed, restarting");
                tokio::time::sleep(cfg.restart_delay).await;
            }
        }
    }

    Ok(())
}
