//! Wallet status view.

use crate::adapter::evm::EvmChain;
use crate::config::Config;
use crate::error::Result;
use crate::port::ChainClient;

/// Display the connected wallet and session.
pub async fn execute(config: Config) -> Result<()> {
    let chain = EvmChain::connect(&config).await?;
    let session = chain.session();

    println!();
    println!("Wallet Status");
    println!("{}", "\u{2501}".repeat(37));
    println!("Account:   {}", session.account);
    println!("Network:   {}", session.network_id);
    if session.is_read_only() {
        println!("Mode:      \u{25cb} read-only (WALLET_PRIVATE_KEY not set)");
    } else {
        println!("Mode:      \u{25cf} transactions enabled");
    }
    println!();
    Ok(())
}
