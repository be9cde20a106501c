//! Typed access to the explorer REST endpoints.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::types::{
    AddressStatistics, Balance, BlockRow, BlockchainInfo, PageQuery, Payload, Query, TxPage,
};

pub fn blockchain_info_path() -> String {
    "/api/blockchain-info".to_string()
}

pub fn blocks_path(end: u64, start: u64) -> String {
    format!("/api/blocks/{end}/{start}")
}

pub fn block_txs_path(hash: &str) -> String {
    format!("/api/block/{}/transactions", urlencoding::encode(hash))
}

pub fn address_txs_path(address: &str, page: PageQuery) -> String {
    format!(
        "/api/address/{}/transactions?page={}&rows={}&offset={}",
        urlencoding::encode(address),
        page.page,
        page.rows,
        page.offset()
    )
}

pub fn address_balances_path(address: &str) -> String {
    format!("/api/address/{}/balances", urlencoding::encode(address))
}

pub fn address_statistics_path(address: &str) -> String {
    format!("/api/address/{}/statistics", urlencoding::encode(address))
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ExplorerApi {
    async fn blockchain_info(&self) -> Result<BlockchainInfo>;
    /// Blocks with heights in `start..=end`.
    async fn blocks(&self, end: u64, start: u64) -> Result<Vec<BlockRow>>;
    async fn block_txs(&self, hash: &str) -> Result<TxPage>;
    async fn address_txs(&self, address: &str, page: PageQuery) -> Result<TxPage>;
    async fn address_balances(&self, address: &str) -> Result<Vec<Balance>>;
    async fn address_statistics(&self, address: &str) -> Result<AddressStatistics>;
}

/// Run one query against an API and wrap the response.
pub async fn execute<A: ExplorerApi + ?Sized>(api: &A, query: &Query) -> Result<Payload> {
    Ok(match query {
        Query::ChainInfo => Payload::ChainInfo(api.blockchain_info().await?),
        Query::Blocks { end, start } => Payload::Blocks(api.blocks(*end, *start).await?),
        Query::BlockTxs { hash } => Payload::Txs(api.block_txs(hash).await?),
        Query::AddressTxs { address, page } => Payload::Txs(api.address_txs(address, *page).await?),
        Query::AddressBalances { address } => {
            Payload::Balances(api.address_balances(address).await?)
        }
        Query::AddressStats { address } => Payload::Stats(api.address_statistics(address).await?),
    })
}

/// HTTP implementation over reqwest.
#[derive(Clone)]
pub struct HttpApi {
    base: String,
    client: reqwest::Client,
    retries: u8,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout_ms: u64, retries: u8) -> Result<Self> {
        let parsed = url::Url::parse(base_url).with_context(|| format!("invalid API url {base_url}"))?;
        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .user_agent(concat!("ecashx/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        #[cfg(target_arch = "wasm32")]
        let client = {
            let _ = timeout_ms;
            reqwest::Client::new()
        };
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            client,
            retries,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url_for(path);
        log::debug!("[ecashx][api] GET {url}");
        let response = crate::net::send_with_backoff(self.client.get(&url), path, self.retries)
            .await
            .map_err(|e| anyhow!("request to {url} failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("explorer API error ({status}) for {path}: {body}"));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to parse response of {path}"))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ExplorerApi for HttpApi {
    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        self.get_json(&blockchain_info_path()).await
    }

    async fn blocks(&self, end: u64, start: u64) -> Result<Vec<BlockRow>> {
        self.get_json(&blocks_path(end, start)).await
    }

    async fn block_txs(&self, hash: &str) -> Result<TxPage> {
        self.get_json(&block_txs_path(hash)).await
    }

    async fn address_txs(&self, address: &str, page: PageQuery) -> Result<TxPage> {
        self.get_json(&address_txs_path(address, page)).await
    }

    async fn address_balances(&self, address: &str) -> Result<Vec<Balance>> {
        self.get_json(&address_balances_path(address)).await
    }

    async fn address_statistics(&self, address: &str) -> Result<AddressStatistics> {
        self.get_json(&address_statistics_path(address)).await
    }
}
