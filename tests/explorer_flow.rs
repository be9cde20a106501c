//! End-to-end view flows against an in-memory explorer

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use ecashx::api::{execute, ExplorerApi};
use ecashx::params::MemoryHistory;
use ecashx::table::LoadState;
use ecashx::tabs::Tab;
use ecashx::theme::Theme;
use ecashx::types::{
    AddressStatistics, AppEvent, Balance, BlockRow, BlockchainInfo, PageQuery, TokenInfo, TxPage,
    TxRow, Utxo,
};
use ecashx::views::View;
use ecashx::App;

#[derive(Default)]
struct FakeExplorer {
    tip: u64,
    address_txs: u64,
    fail_blocks: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeExplorer {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn block(height: u64) -> BlockRow {
    BlockRow {
        hash: format!("{height:064x}"),
        height,
        version: 1,
        timestamp: 1_700_000_000 + height as i64 * 600,
        difficulty: 2.5e11,
        size: 1_000 + height,
        num_txs: 1 + height % 5,
        median_time: 0,
    }
}

fn tx(n: u64) -> TxRow {
    TxRow {
        tx_hash: format!("{n:064x}"),
        block_height: Some(800_000),
        timestamp: 1_700_000_000,
        is_coinbase: false,
        size: 220,
        num_inputs: 1,
        num_outputs: 2,
        sats_input: 10_000,
        sats_output: 9_780,
        delta_sats: -10_000,
        delta_tokens: 0,
        token_idx: None,
        is_burned_slp: false,
        token_input: 0,
        token_output: 0,
        slp_action: None,
        token: None,
    }
}

fn utxo(n: u32, token_amount: u64) -> Utxo {
    Utxo {
        tx_hash: format!("{n:064x}"),
        out_idx: n,
        sats_amount: 546,
        token_amount,
        is_coinbase: false,
        block_height: 800_000,
    }
}

#[async_trait]
impl ExplorerApi for FakeExplorer {
    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        self.record("info".into());
        Ok(BlockchainInfo {
            tip_height: self.tip,
            tip_hash: format!("{:064x}", self.tip),
        })
    }

    async fn blocks(&self, end: u64, start: u64) -> Result<Vec<BlockRow>> {
        self.record(format!("blocks {end}/{start}"));
        if self.fail_blocks {
            return Err(anyhow!("explorer API error (503) for /api/blocks"));
        }
        Ok((start..=end.min(self.tip)).map(block).collect())
    }

    async fn block_txs(&self, hash: &str) -> Result<TxPage> {
        self.record(format!("block {hash}"));
        Ok(TxPage {
            txs: (0..30).map(tx).collect(),
            tokens: Vec::new(),
            total: None,
        })
    }

    async fn address_txs(&self, address: &str, page: PageQuery) -> Result<TxPage> {
        self.record(format!("txs {address} {} {}", page.page, page.rows));
        let start = page.offset().min(self.address_txs);
        let end = (start + u64::from(page.rows)).min(self.address_txs);
        Ok(TxPage {
            txs: (start..end).map(tx).collect(),
            tokens: Vec::new(),
            total: Some(self.address_txs),
        })
    }

    async fn address_balances(&self, address: &str) -> Result<Vec<Balance>> {
        self.record(format!("balances {address}"));
        let token = TokenInfo {
            token_id: "aa".repeat(32),
            token_type: 1,
            token_ticker: "TOK".into(),
            token_name: "Token".into(),
            decimals: 2,
            group_id: None,
        };
        Ok(vec![
            Balance {
                token_idx: None,
                sats_amount: 1_638,
                token_amount: 0,
                utxos: vec![utxo(0, 0), utxo(1, 0), utxo(2, 0)],
                token: None,
            },
            Balance {
                token_idx: Some(0),
                sats_amount: 546,
                token_amount: 12_345,
                utxos: vec![utxo(3, 12_345)],
                token: Some(token),
            },
        ])
    }

    async fn address_statistics(&self, address: &str) -> Result<AddressStatistics> {
        self.record(format!("stats {address}"));
        Ok(AddressStatistics {
            received_tx_count: 40,
            sent_tx_count: 5,
            utxo_count: 4,
            first_seen: Some(1_600_000_000),
            last_seen: None,
        })
    }
}

/// Resolve every queued request until the app stops asking.
async fn settle(app: &mut App, api: &FakeExplorer) {
    loop {
        let reqs = app.take_requests();
        if reqs.is_empty() {
            return;
        }
        for req in reqs {
            let result = execute(api, &req.query).await.map_err(|e| format!("{e:#}"));
            app.on_event(AppEvent::Loaded {
                ticket: req.ticket,
                result,
            });
        }
    }
}

fn app(url: &str) -> App {
    App::new(30, Theme::Nord, 100, MemoryHistory::new(url))
}

#[tokio::test]
async fn blocks_page_follows_the_tip() {
    let api = FakeExplorer {
        tip: 1_000,
        ..FakeExplorer::default()
    };
    let mut app = app("/blocks?rows=25&page=2");
    settle(&mut app, &api).await;

    assert_eq!(api.calls(), vec!["info", "blocks 975/951"]);
    let View::Blocks(view) = app.view() else {
        panic!("expected blocks view");
    };
    let heights: Vec<u64> = view.table().all_rows().iter().map(|b| b.height).collect();
    assert_eq!(heights.first(), Some(&975));
    assert_eq!(heights.last(), Some(&951));
    assert_eq!(app.view().table().last_page(), 41);

    // the tip is reused for the next page
    app.next_page();
    settle(&mut app, &api).await;
    assert_eq!(api.calls().last().map(String::as_str), Some("blocks 950/926"));
    assert!(app.url().contains("page=3"));
}

#[tokio::test]
async fn failed_blocks_keep_the_table_failed_and_toast() {
    let api = FakeExplorer {
        tip: 10,
        fail_blocks: true,
        ..FakeExplorer::default()
    };
    let mut app = app("/blocks");
    settle(&mut app, &api).await;

    assert!(matches!(
        app.view().table().state(),
        LoadState::Failed(msg) if msg.contains("503")
    ));
    assert!(app.toast_is_error());
}

#[tokio::test]
async fn block_transactions_page_locally() {
    let api = FakeExplorer::default();
    let hash = "0".repeat(60) + "beef";
    let mut app = app(&format!("/block/{hash}?rows=10"));
    settle(&mut app, &api).await;
    assert_eq!(api.calls(), vec![format!("block {hash}")]);
    assert_eq!(app.view().table().last_page(), 3);

    app.last_page();
    settle(&mut app, &api).await;
    // no refetch for local pages
    assert_eq!(api.calls().len(), 1);
    assert_eq!(app.view().table().cells().len(), 10);
    assert!(app.url().contains("page=3"));
}

#[tokio::test]
async fn address_tabs_share_one_balance_fetch() {
    let api = FakeExplorer {
        address_txs: 45,
        ..FakeExplorer::default()
    };
    let mut app = app("/address/ecash:qqtest?txr=20");
    settle(&mut app, &api).await;

    let calls = api.calls();
    assert_eq!(calls.len(), 3, "{calls:?}");
    assert!(calls.contains(&"txs ecash:qqtest 1 20".to_string()));
    assert_eq!(app.view().tab_count(Tab::Transactions), Some(45));
    assert_eq!(app.view().tab_count(Tab::EcashOutpoints), Some(3));
    assert_eq!(app.view().tab_count(Tab::EtokenBalances), Some(1));
    assert_eq!(app.view().tab_count(Tab::EtokenOutpoints), Some(1));
    assert_eq!(app.view().table().last_page(), 3);

    let summary = app.view().summary();
    let balance = summary.iter().find(|(k, _)| *k == "Balance").unwrap();
    assert_eq!(balance.1.to_plain(), "16.38 XEC");

    // switching to a balance tab needs no new request
    app.next_tab();
    settle(&mut app, &api).await;
    assert_eq!(api.calls().len(), 3);
    assert_eq!(app.view().tab(), Some(Tab::EcashOutpoints));
    assert_eq!(app.view().table().cells().len(), 3);

    // back on transactions, page 3 goes to the server
    app.prev_tab();
    app.last_page();
    settle(&mut app, &api).await;
    assert_eq!(
        api.calls().last().map(String::as_str),
        Some("txs ecash:qqtest 3 20")
    );
    assert_eq!(app.view().table().cells().len(), 5);
    assert!(app.url().contains("txp=3"));
}

#[tokio::test]
async fn fetch_worker_round_trip() {
    use ecashx::source::run_fetcher;
    use tokio::sync::mpsc::unbounded_channel;

    let api = Arc::new(FakeExplorer {
        tip: 3,
        ..FakeExplorer::default()
    });
    let (req_tx, req_rx) = unbounded_channel();
    let (ev_tx, mut ev_rx) = unbounded_channel();
    let worker = tokio::spawn(run_fetcher(Arc::clone(&api), req_rx, ev_tx));

    let mut app = app("/blocks");
    // chain info, then the block range it implies
    for _ in 0..2 {
        for req in app.take_requests() {
            req_tx.send(req).unwrap();
        }
        let ev = ev_rx.recv().await.unwrap();
        app.on_event(ev);
    }
    assert!(app.take_requests().is_empty());
    assert_eq!(app.view().table().cells().len(), 4);

    drop(req_tx);
    worker.await.unwrap().unwrap();
}
