//! Foreground client loop.

use tokio::signal;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::error::Result;

/// Run the client until shutdown or a fatal error.
pub async fn execute(config: Config) -> Result<()> {
    info!("ballast starting");

    let result = tokio::select! {
        result = App::run(config) => result,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    info!("ballast stopped");
    result
}
