use serde::{Deserialize, Serialize};

/// One row of `/api/blocks/{end}/{start}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRow {
    pub hash: String,
    pub height: u64,
    #[serde(default)]
    pub version: i32,
    pub timestamp: i64,
    pub difficulty: f64,
    pub size: u64,
    pub num_txs: u64,
    #[serde(default)]
    pub median_time: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_id: String,
    pub token_type: u32,
    pub token_ticker: String,
    pub token_name: String,
    pub decimals: u32,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlpAction {
    SlpV1Genesis,
    SlpV1Mint,
    SlpV1Send,
    SlpV1Nft1GroupGenesis,
    SlpV1Nft1GroupMint,
    SlpV1Nft1GroupSend,
    SlpV1Nft1UniqueChildGenesis,
    SlpV1Nft1UniqueChildSend,
}

impl SlpAction {
    pub fn label(self) -> &'static str {
        match self {
            SlpAction::SlpV1Genesis => "GENESIS",
            SlpAction::SlpV1Mint => "MINT",
            SlpAction::SlpV1Send => "SEND",
            SlpAction::SlpV1Nft1GroupGenesis => "NFT1 Group GENESIS",
            SlpAction::SlpV1Nft1GroupMint => "NFT1 MINT",
            SlpAction::SlpV1Nft1GroupSend => "NFT1 Group SEND",
            SlpAction::SlpV1Nft1UniqueChildGenesis => "NFT1 Child GENESIS",
            SlpAction::SlpV1Nft1UniqueChildSend => "NFT1 Child SEND",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRow {
    pub tx_hash: String,
    #[serde(default)]
    pub block_height: Option<i64>,
    #[serde(default)]
    pub timestamp: i64,
    pub is_coinbase: bool,
    pub size: u64,
    pub num_inputs: u32,
    pub num_outputs: u32,
    pub sats_input: i64,
    pub sats_output: i64,
    #[serde(default)]
    pub delta_sats: i64,
    #[serde(default)]
    pub delta_tokens: i64,
    #[serde(default)]
    pub token_idx: Option<usize>,
    #[serde(default)]
    pub is_burned_slp: bool,
    #[serde(default)]
    pub token_input: u64,
    #[serde(default)]
    pub token_output: u64,
    #[serde(default)]
    pub slp_action: Option<SlpAction>,
    /// Resolved from the page's token table by [`TxPage::into_rows`].
    #[serde(skip)]
    pub token: Option<TokenInfo>,
}

impl TxRow {
    /// Coinbase transactions pay no fee.
    pub fn fee(&self) -> Option<i64> {
        if self.is_coinbase {
            None
        } else {
            Some(self.sats_input - self.sats_output)
        }
    }
}

/// Transactions plus the tokens they reference by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPage {
    pub txs: Vec<TxRow>,
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
    /// Total transactions across all pages, when the server reports it.
    #[serde(default)]
    pub total: Option<u64>,
}

impl TxPage {
    pub fn into_rows(self) -> Vec<TxRow> {
        let tokens = self.tokens;
        self.txs
            .into_iter()
            .map(|mut tx| {
                tx.token = tx.token_idx.and_then(|idx| tokens.get(idx).cloned());
                tx
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub tx_hash: String,
    pub out_idx: u32,
    pub sats_amount: i64,
    #[serde(default)]
    pub token_amount: u64,
    #[serde(default)]
    pub is_coinbase: bool,
    /// Negative while unconfirmed.
    pub block_height: i64,
}

/// A balance group. The first group of an address is the native coin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default)]
    pub token_idx: Option<usize>,
    pub sats_amount: i64,
    #[serde(default)]
    pub token_amount: u64,
    #[serde(default)]
    pub utxos: Vec<Utxo>,
    #[serde(default)]
    pub token: Option<TokenInfo>,
}

/// A token outpoint paired with its token, for the eToken outpoints tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenUtxo {
    pub utxo: Utxo,
    pub token: Option<TokenInfo>,
}

/// Split balance groups into the rows of the three balance tabs.
pub fn split_balances(groups: Vec<Balance>) -> (Vec<Utxo>, Vec<Balance>, Vec<TokenUtxo>) {
    let mut groups = groups.into_iter();
    let ecash = groups.next().map(|b| b.utxos).unwrap_or_default();
    let mut token_balances = Vec::new();
    let mut token_utxos = Vec::new();
    for group in groups {
        token_utxos.extend(group.utxos.iter().map(|utxo| TokenUtxo {
            utxo: utxo.clone(),
            token: group.token.clone(),
        }));
        token_balances.push(group);
    }
    (ecash, token_balances, token_utxos)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressStatistics {
    pub received_tx_count: u64,
    pub sent_tx_count: u64,
    pub utxo_count: u64,
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainInfo {
    pub tip_height: u64,
    pub tip_hash: String,
}

/// Which request a response belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    ChainInfo,
    Blocks,
    BlockTxs,
    AddressTxs,
    AddressBalances,
    AddressStats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub slot: Slot,
    pub generation: u64,
}

/// Hands out tickets with strictly increasing generations.
#[derive(Debug, Default)]
pub struct Tickets {
    next: u64,
}

impl Tickets {
    pub fn issue(&mut self, slot: Slot) -> Ticket {
        self.next += 1;
        Ticket {
            slot,
            generation: self.next,
        }
    }
}

/// Page position sent with address transaction requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub rows: u32,
}

impl PageQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.rows)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    ChainInfo,
    Blocks { end: u64, start: u64 },
    BlockTxs { hash: String },
    AddressTxs { address: String, page: PageQuery },
    AddressBalances { address: String },
    AddressStats { address: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub query: Query,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    ChainInfo(BlockchainInfo),
    Blocks(Vec<BlockRow>),
    Txs(TxPage),
    Balances(Vec<Balance>),
    Stats(AddressStatistics),
}

#[derive(Debug)]
pub enum AppEvent {
    Loaded {
        ticket: Ticket,
        result: Result<Payload, String>,
    },
    Quit,
}
