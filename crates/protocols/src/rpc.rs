//! Thin wrapper over the nonblocking Solana RPC client.

use anyhow::{Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Maximum keys per `getMultipleAccounts` request.
pub const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Fetches raw account data.
#[derive(Clone)]
pub struct RpcProvider {
    client: Arc<RpcClient>,
}

impl RpcProvider {
    /// Connects to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_client(Arc::new(RpcClient::new(url.into())))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Data of one account that must exist.
    pub async fn get_account_data(&self, address: &Pubkey) -> Result<Vec<u8>> {
        let account = self
            .client
            .get_account(address)
            .await
            .with_context(|| format!("Failed to fetch account {address}"))?;
        Ok(account.data)
    }

    /// Data of many accounts, `None` where an account does not exist.
    /// Requests are split into chunks of [`MAX_MULTIPLE_ACCOUNTS`].
    pub async fn get_multiple_account_data(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let mut data = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            debug!(count = chunk.len(), "Fetching accounts");
            let accounts = self
                .client
                .get_multiple_accounts(chunk)
                .await
                .with_context(|| format!("Failed to fetch {} accounts", chunk.len()))?;
            data.extend(accounts.into_iter().map(|a| a.map(|a| a.data)));
        }
        Ok(data)
    }
}
