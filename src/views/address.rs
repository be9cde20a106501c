//! Address page: transactions, eCash outpoints, eToken balances and eToken
//! outpoints, each on its own tab with its own page position in the URL.

use crate::format::{
    render_integer, render_sats, render_signed_amount, render_signed_sats,
    render_timestamp, shorten_hash, token_type_label, Emphasis, Rendered,
};
use crate::params::{ParamState, UrlState};
use crate::table::{Align, Column, Loaded, Paging, TableConfig, TableController, TableView};
use crate::tabs::Tab;
use crate::types::{
    split_balances, AddressStatistics, Balance, FetchRequest, PageQuery, Payload, Query, Slot,
    Ticket, Tickets, TokenUtxo, TxRow, Utxo,
};

use super::blocks::unexpected;
use super::{height_cell, outpoint, token_amount};

fn tx_columns() -> Vec<Column<TxRow>> {
    vec![
        Column::new("Transaction", 21, Align::Left, |tx| {
            Rendered::plain(shorten_hash(&tx.tx_hash, 10))
        }),
        Column::new("Block", 9, Align::Right, |tx| height_cell(tx.block_height)),
        Column::new("Date (UTC)", 19, Align::Left, |tx| render_timestamp(tx.timestamp)),
        Column::new("Amount XEC", 18, Align::Right, |tx| render_signed_sats(tx.delta_sats)),
        Column::new("Token amount", 28, Align::Left, |tx| match &tx.token {
            Some(token) => {
                let mut out = render_signed_amount(tx.delta_tokens, token.decimals);
                out.push(format!(" {}", token.token_ticker), Emphasis::Small);
                out
            }
            None => Rendered::new(),
        }),
    ]
}

fn ecash_utxo_columns() -> Vec<Column<Utxo>> {
    vec![
        Column::new("Outpoint", 24, Align::Left, |u| outpoint(&u.tx_hash, u.out_idx)),
        Column::new("Block", 9, Align::Right, |u| height_cell(Some(u.block_height))),
        Column::new("Amount XEC", 18, Align::Right, |u| render_sats(u.sats_amount)),
        Column::new("Coinbase", 8, Align::Left, |u| {
            Rendered::plain(if u.is_coinbase { "yes" } else { "" })
        }),
    ]
}

fn token_balance_columns() -> Vec<Column<Balance>> {
    vec![
        Column::new("Ticker", 10, Align::Left, |b| {
            Rendered::plain(b.token.as_ref().map(|t| t.token_ticker.clone()).unwrap_or_default())
        }),
        Column::new("Name", 24, Align::Left, |b| {
            Rendered::plain(b.token.as_ref().map(|t| t.token_name.clone()).unwrap_or_default())
        }),
        Column::new("Type", 10, Align::Left, |b| {
            Rendered::plain(b.token.as_ref().map(|t| token_type_label(t.token_type)).unwrap_or(""))
        }),
        Column::new("Balance", 24, Align::Right, |b| token_amount(b.token_amount, b.token.as_ref())),
        Column::new("Outpoints", 9, Align::Right, |b| render_integer(b.utxos.len() as u64)),
        Column::new("Token ID", 21, Align::Left, |b| {
            Rendered::plain(
                b.token
                    .as_ref()
                    .map(|t| shorten_hash(&t.token_id, 10))
                    .unwrap_or_default(),
            )
        }),
    ]
}

fn token_utxo_columns() -> Vec<Column<TokenUtxo>> {
    vec![
        Column::new("Outpoint", 24, Align::Left, |t| outpoint(&t.utxo.tx_hash, t.utxo.out_idx)),
        Column::new("Block", 9, Align::Right, |t| height_cell(Some(t.utxo.block_height))),
        Column::new("Token amount", 28, Align::Right, |t| {
            token_amount(t.utxo.token_amount, t.token.as_ref())
        }),
        Column::new("XEC", 12, Align::Right, |t| render_sats(t.utxo.sats_amount)),
    ]
}

pub struct AddressView {
    address: String,
    tab: Tab,
    stats: Option<AddressStatistics>,
    stats_ticket: Option<Ticket>,
    ecash_balance: Option<i64>,
    balances_loaded: bool,
    /// Page position of the transactions currently shown.
    txs_loaded: Option<PageQuery>,
    txs: TableController<TxRow>,
    ecash_utxos: TableController<Utxo>,
    token_balances: TableController<Balance>,
    token_utxos: TableController<TokenUtxo>,
}

impl AddressView {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            tab: Tab::default(),
            stats: None,
            stats_ticket: None,
            ecash_balance: None,
            balances_loaded: false,
            txs_loaded: None,
            txs: TableController::new("address-transactions", TableConfig::new(tx_columns(), Paging::Server)),
            ecash_utxos: TableController::new(
                "ecash-outpoints",
                TableConfig::new(ecash_utxo_columns(), Paging::Client),
            ),
            token_balances: TableController::new(
                "etoken-balances",
                TableConfig::new(token_balance_columns(), Paging::Client),
            ),
            token_utxos: TableController::new(
                "etoken-outpoints",
                TableConfig::new(token_utxo_columns(), Paging::Client),
            ),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn stats(&self) -> Option<&AddressStatistics> {
        self.stats.as_ref()
    }

    pub fn txs(&self) -> &TableController<TxRow> {
        &self.txs
    }

    pub fn ecash_utxos(&self) -> &TableController<Utxo> {
        &self.ecash_utxos
    }

    pub fn token_balances(&self) -> &TableController<Balance> {
        &self.token_balances
    }

    pub fn token_utxos(&self) -> &TableController<TokenUtxo> {
        &self.token_utxos
    }

    pub fn table_for(&self, tab: Tab) -> &dyn TableView {
        match tab {
            Tab::Transactions => &self.txs,
            Tab::EcashOutpoints => &self.ecash_utxos,
            Tab::EtokenBalances => &self.token_balances,
            Tab::EtokenOutpoints => &self.token_utxos,
        }
    }

    pub fn table(&self) -> &dyn TableView {
        self.table_for(self.tab)
    }

    pub fn table_mut(&mut self) -> &mut dyn TableView {
        match self.tab {
            Tab::Transactions => &mut self.txs,
            Tab::EcashOutpoints => &mut self.ecash_utxos,
            Tab::EtokenBalances => &mut self.token_balances,
            Tab::EtokenOutpoints => &mut self.token_utxos,
        }
    }

    /// Row count per tab, when known.
    pub fn tab_count(&self, tab: Tab) -> Option<u64> {
        match tab {
            Tab::Transactions => self.txs.total(),
            _ if !self.balances_loaded => None,
            other => self.table_for(other).total(),
        }
    }

    pub fn summary(&self) -> Vec<(&'static str, Rendered)> {
        let mut out = vec![("Address", Rendered::plain(self.address.clone()))];
        if let Some(sats) = self.ecash_balance {
            let mut balance = render_sats(sats);
            balance.push(" XEC", Emphasis::Normal);
            out.push(("Balance", balance));
        }
        if let Some(stats) = &self.stats {
            out.push(("Received txs", render_integer(stats.received_tx_count)));
            out.push(("Sent txs", render_integer(stats.sent_tx_count)));
            out.push(("Outpoints", render_integer(stats.utxo_count)));
            if let Some(ts) = stats.first_seen {
                out.push(("First seen", render_timestamp(ts)));
            }
            if let Some(ts) = stats.last_seen {
                out.push(("Last seen", render_timestamp(ts)));
            }
        }
        out
    }

    pub fn refresh(&mut self) {
        self.stats = None;
        self.balances_loaded = false;
        self.txs_loaded = None;
    }

    pub fn load<S: UrlState>(&mut self, state: &ParamState<S>, tickets: &mut Tickets) -> Vec<FetchRequest> {
        self.tab = state.current_tab();
        self.txs
            .set_position(state.tab_page(Tab::Transactions), state.tab_rows(Tab::Transactions));
        self.ecash_utxos
            .set_position(state.tab_page(Tab::EcashOutpoints), state.tab_rows(Tab::EcashOutpoints));
        self.token_balances
            .set_position(state.tab_page(Tab::EtokenBalances), state.tab_rows(Tab::EtokenBalances));
        self.token_utxos
            .set_position(state.tab_page(Tab::EtokenOutpoints), state.tab_rows(Tab::EtokenOutpoints));

        let mut requests = Vec::new();
        let address = self.address.clone();

        if self.stats.is_none() && self.stats_ticket.is_none() {
            let ticket = tickets.issue(Slot::AddressStats);
            self.stats_ticket = Some(ticket);
            requests.push(FetchRequest {
                ticket,
                query: Query::AddressStats {
                    address: address.clone(),
                },
            });
        }

        if !self.balances_loaded && self.ecash_utxos.pending().is_none() {
            let ticket = tickets.issue(Slot::AddressBalances);
            self.ecash_utxos.begin_load(ticket);
            self.token_balances.begin_load(ticket);
            self.token_utxos.begin_load(ticket);
            requests.push(FetchRequest {
                ticket,
                query: Query::AddressBalances {
                    address: address.clone(),
                },
            });
        }

        if self.tab == Tab::Transactions {
            let page = PageQuery {
                page: self.txs.page(),
                rows: self.txs.rows_per_page(),
            };
            if self.txs_loaded != Some(page) {
                let ticket = tickets.issue(Slot::AddressTxs);
                self.txs.begin_load(ticket);
                requests.push(FetchRequest {
                    ticket,
                    query: Query::AddressTxs { address, page },
                });
            }
        }
        requests
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, String>,
        _tickets: &mut Tickets,
    ) -> Vec<FetchRequest> {
        match ticket.slot {
            Slot::AddressStats => {
                if self.stats_ticket != Some(ticket) {
                    return Vec::new();
                }
                self.stats_ticket = None;
                match result {
                    Ok(Payload::Stats(stats)) => self.stats = Some(stats),
                    Ok(other) => log::warn!("[ecashx][address] {}", unexpected(&other)),
                    Err(e) => log::warn!("[ecashx][address] statistics failed: {e}"),
                }
            }
            Slot::AddressBalances => match result {
                Ok(Payload::Balances(groups)) => {
                    if self.ecash_utxos.pending() != Some(ticket) {
                        return Vec::new();
                    }
                    self.ecash_balance = groups.first().map(|g| g.sats_amount);
                    let (ecash, balances, token_utxos) = split_balances(groups);
                    self.ecash_utxos.finish_load(ticket, Ok(Loaded::new(ecash, None)));
                    self.token_balances.finish_load(ticket, Ok(Loaded::new(balances, None)));
                    self.token_utxos.finish_load(ticket, Ok(Loaded::new(token_utxos, None)));
                    self.balances_loaded = true;
                }
                other => {
                    let message = match other {
                        Ok(payload) => unexpected(&payload),
                        Err(e) => e,
                    };
                    self.ecash_utxos.finish_load(ticket, Err(message.clone()));
                    self.token_balances.finish_load(ticket, Err(message.clone()));
                    self.token_utxos.finish_load(ticket, Err(message));
                }
            },
            Slot::AddressTxs => {
                let page = PageQuery {
                    page: self.txs.page(),
                    rows: self.txs.rows_per_page(),
                };
                let loaded = match result {
                    Ok(Payload::Txs(txs)) => {
                        let total = txs.total;
                        Ok(Loaded::new(txs.into_rows(), total))
                    }
                    Ok(other) => Err(unexpected(&other)),
                    Err(e) => Err(e),
                };
                let ok = loaded.is_ok();
                if self.txs.finish_load(ticket, loaded) && ok {
                    self.txs_loaded = Some(page);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn set_page<S: UrlState>(&self, state: &mut ParamState<S>, page: u32) {
        state.set_tab_page(self.tab, page);
    }

    pub fn set_rows<S: UrlState>(&self, state: &mut ParamState<S>, rows: u32) {
        state.set_tab_rows(self.tab, rows);
    }

    pub fn switch_tab<S: UrlState>(&mut self, state: &mut ParamState<S>, tab: Tab) {
        state.set_current_tab(tab);
        self.tab = tab;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MemoryHistory;
    use crate::types::TxPage;

    const ADDR: &str = "ecash:qq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx";

    fn state(query: &str) -> ParamState<MemoryHistory> {
        ParamState::new(MemoryHistory::new(format!("/address/{ADDR}{query}")))
    }

    fn utxo(hash: &str, token_amount: u64) -> Utxo {
        Utxo {
            tx_hash: hash.into(),
            out_idx: 1,
            sats_amount: 546,
            token_amount,
            is_coinbase: false,
            block_height: 700_000,
        }
    }

    fn groups() -> Vec<Balance> {
        vec![
            Balance {
                token_idx: None,
                sats_amount: 123_456,
                token_amount: 0,
                utxos: vec![utxo("a", 0), utxo("b", 0), utxo("c", 0)],
                token: None,
            },
            Balance {
                token_idx: Some(0),
                sats_amount: 546,
                token_amount: 1_000,
                utxos: vec![utxo("d", 1_000)],
                token: None,
            },
        ]
    }

    #[test]
    fn first_load_requests_stats_balances_and_txs() {
        let s = state("?txp=2&txr=25");
        let mut tickets = Tickets::default();
        let mut view = AddressView::new(ADDR);
        let reqs = view.load(&s, &mut tickets);
        let queries: Vec<&Query> = reqs.iter().map(|r| &r.query).collect();
        assert_eq!(queries.len(), 3);
        assert!(queries.contains(&&Query::AddressTxs {
            address: ADDR.into(),
            page: PageQuery { page: 2, rows: 25 },
        }));
    }

    #[test]
    fn balances_fill_three_tabs() {
        let s = state("?currentTab=ecash-outpoints&ecor=2");
        let mut tickets = Tickets::default();
        let mut view = AddressView::new(ADDR);
        let reqs = view.load(&s, &mut tickets);
        // no transaction request while another tab is active
        assert_eq!(reqs.len(), 2);
        let balances = reqs
            .iter()
            .find(|r| r.ticket.slot == Slot::AddressBalances)
            .unwrap();
        view.apply(balances.ticket, Ok(Payload::Balances(groups())), &mut tickets);

        assert_eq!(view.tab(), Tab::EcashOutpoints);
        assert_eq!(view.ecash_utxos().all_rows().len(), 3);
        assert_eq!(view.ecash_utxos().visible_rows().len(), 2);
        assert_eq!(view.token_balances().all_rows().len(), 1);
        assert_eq!(view.token_utxos().all_rows().len(), 1);
        assert_eq!(view.tab_count(Tab::EcashOutpoints), Some(3));
        assert!(view
            .summary()
            .iter()
            .any(|(k, v)| *k == "Balance" && v.to_plain() == "1,234.56 XEC"));

        // balances stay cached across tab switches
        assert!(view.load(&s, &mut tickets).iter().all(|r| r.ticket.slot != Slot::AddressBalances));
    }

    #[test]
    fn tab_switch_writes_url_and_loads_transactions() {
        let mut s = state("?currentTab=etoken-balances");
        let mut tickets = Tickets::default();
        let mut view = AddressView::new(ADDR);
        view.load(&s, &mut tickets);
        view.switch_tab(&mut s, Tab::Transactions);
        assert_eq!(s.current_tab(), Tab::Transactions);
        let reqs = view.load(&s, &mut tickets);
        assert!(reqs.iter().any(|r| r.ticket.slot == Slot::AddressTxs));
    }

    #[test]
    fn tx_pages_are_server_side() {
        let mut s = state("?txr=2");
        let mut tickets = Tickets::default();
        let mut view = AddressView::new(ADDR);
        let reqs = view.load(&s, &mut tickets);
        let txs = reqs.iter().find(|r| r.ticket.slot == Slot::AddressTxs).unwrap();
        let page = TxPage {
            txs: Vec::new(),
            tokens: Vec::new(),
            total: Some(9),
        };
        view.apply(txs.ticket, Ok(Payload::Txs(page)), &mut tickets);
        assert_eq!(view.txs().last_page(), 5);

        // same page is not refetched, a new page is
        assert!(view.load(&s, &mut tickets).iter().all(|r| r.ticket.slot != Slot::AddressTxs));
        view.set_page(&mut s, 3);
        let reqs = view.load(&s, &mut tickets);
        assert!(reqs.iter().any(|r| r.query
            == Query::AddressTxs {
                address: ADDR.into(),
                page: PageQuery { page: 3, rows: 2 },
            }));
    }

    #[test]
    fn stale_stats_are_ignored() {
        let s = state("");
        let mut tickets = Tickets::default();
        let mut view = AddressView::new(ADDR);
        view.load(&s, &mut tickets);
        let bogus = tickets.issue(Slot::AddressStats);
        view.apply(bogus, Ok(Payload::Stats(AddressStatistics::default())), &mut tickets);
        assert!(view.stats().is_none());
    }
}
