//! CLI module graph.

mod command;
mod pool;
mod pools;
mod run;
mod transact;
mod wallet;

pub use command::{ActionArgs, Cli, Commands, PoolArgs};

use crate::config::Config;
use crate::domain::PoolAction;
use crate::error::Result;

/// Dispatch a parsed command.
pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run => run::execute(config).await,
        Commands::Pools => pools::execute(config).await,
        Commands::Pool(args) => pool::execute(config, &args.address).await,
        Commands::Deposit(args) => {
            transact::execute(PoolAction::Deposit, config, &args.token, args.amount).await
        }
        Commands::Redeem(args) => {
            transact::execute(PoolAction::Redeem, config, &args.token, args.amount).await
        }
        Commands::Wallet => wallet::execute(config).await,
    }
}
