//! One view per explorer page. Each owns its table controllers, turns URL
//! parameters into fetch requests and applies the responses.

pub mod address;
pub mod block_txs;
pub mod blocks;

pub use address::AddressView;
pub use block_txs::{BlockTarget, BlockTxsView};
pub use blocks::BlocksView;

use crate::format::{render_amount, render_integer, shorten_hash, Emphasis, Rendered};
use crate::params::{ParamState, UrlState};
use crate::router::Route;
use crate::table::TableView;
use crate::tabs::Tab;
use crate::types::{FetchRequest, Payload, Ticket, Tickets, TokenInfo};

pub(crate) fn token_amount(amount: u64, token: Option<&TokenInfo>) -> Rendered {
    let decimals = token.map(|t| t.decimals).unwrap_or(0);
    let mut out = render_amount(amount, decimals);
    if let Some(t) = token {
        out.push(format!(" {}", t.token_ticker), Emphasis::Small);
    }
    out
}

pub(crate) fn outpoint(tx_hash: &str, out_idx: u32) -> Rendered {
    let mut out = Rendered::plain(shorten_hash(tx_hash, 8));
    out.push(format!(":{out_idx}"), Emphasis::Small);
    out
}

/// Block height, or `mempool` for unconfirmed entries.
pub(crate) fn height_cell(height: Option<i64>) -> Rendered {
    match height.and_then(|h| u64::try_from(h).ok()) {
        Some(h) => render_integer(h),
        None => Rendered::plain("mempool"),
    }
}

pub enum View {
    Blocks(BlocksView),
    Block(BlockTxsView),
    Address(AddressView),
}

impl View {
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::Blocks => View::Blocks(BlocksView::new()),
            Route::Block { hash } => View::Block(BlockTxsView::new(BlockTarget::Hash(hash.clone()))),
            Route::BlockHeight { height } => View::Block(BlockTxsView::new(BlockTarget::Height(*height))),
            Route::Address { address } => View::Address(AddressView::new(address.clone())),
        }
    }

    pub fn title(&self) -> String {
        match self {
            View::Blocks(_) => "Blocks".to_string(),
            View::Block(v) => v.title(),
            View::Address(_) => "Address".to_string(),
        }
    }

    pub fn summary(&self) -> Vec<(&'static str, Rendered)> {
        match self {
            View::Blocks(v) => v.summary(),
            View::Block(v) => v.summary(),
            View::Address(v) => v.summary(),
        }
    }

    /// Active tab, for views that have tabs.
    pub fn tab(&self) -> Option<Tab> {
        match self {
            View::Address(v) => Some(v.tab()),
            _ => None,
        }
    }

    pub fn tab_count(&self, tab: Tab) -> Option<u64> {
        match self {
            View::Address(v) => v.tab_count(tab),
            _ => None,
        }
    }

    pub fn table(&self) -> &dyn TableView {
        match self {
            View::Blocks(v) => v.table(),
            View::Block(v) => v.table(),
            View::Address(v) => v.table(),
        }
    }

    pub fn table_mut(&mut self) -> &mut dyn TableView {
        match self {
            View::Blocks(v) => v.table_mut(),
            View::Block(v) => v.table_mut(),
            View::Address(v) => v.table_mut(),
        }
    }

    pub fn load<S: UrlState>(&mut self, state: &ParamState<S>, tickets: &mut Tickets) -> Vec<FetchRequest> {
        match self {
            View::Blocks(v) => v.load(state, tickets),
            View::Block(v) => v.load(state, tickets),
            View::Address(v) => v.load(state, tickets),
        }
    }

    /// Apply a response; returns follow-up requests.
    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, String>,
        tickets: &mut Tickets,
    ) -> Vec<FetchRequest> {
        match self {
            View::Blocks(v) => v.apply(ticket, result, tickets),
            View::Block(v) => v.apply(ticket, result, tickets),
            View::Address(v) => v.apply(ticket, result, tickets),
        }
    }

    pub fn refresh(&mut self) {
        match self {
            View::Blocks(v) => v.refresh(),
            View::Block(v) => v.refresh(),
            View::Address(v) => v.refresh(),
        }
    }

    pub fn set_page<S: UrlState>(&self, state: &mut ParamState<S>, page: u32) {
        match self {
            View::Blocks(v) => v.set_page(state, page),
            View::Block(v) => v.set_page(state, page),
            View::Address(v) => v.set_page(state, page),
        }
    }

    pub fn set_rows<S: UrlState>(&self, state: &mut ParamState<S>, rows: u32) {
        match self {
            View::Blocks(v) => v.set_rows(state, rows),
            View::Block(v) => v.set_rows(state, rows),
            View::Address(v) => v.set_rows(state, rows),
        }
    }

    /// Returns `false` when the view has no ordering.
    pub fn toggle_order<S: UrlState>(&self, state: &mut ParamState<S>) -> bool {
        match self {
            View::Blocks(v) => {
                v.toggle_order(state);
                true
            }
            _ => false,
        }
    }

    /// Returns `false` when the view has no tabs.
    pub fn switch_tab<S: UrlState>(&mut self, state: &mut ParamState<S>, tab: Tab) -> bool {
        match self {
            View::Address(v) => {
                v.switch_tab(state, tab);
                true
            }
            _ => false,
        }
    }

    pub fn open_selected(&self) -> Option<Route> {
        match self {
            View::Blocks(v) => v.open_selected(),
            View::Block(_) | View::Address(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_cells() {
        assert_eq!(height_cell(Some(700_000)).to_plain(), "700,000");
        assert_eq!(height_cell(Some(-1)).to_plain(), "mempool");
        assert_eq!(height_cell(None).to_plain(), "mempool");
        assert_eq!(outpoint("abcdef0123456789abcdef", 3).to_plain(), "abcdef01…89abcdef:3");
        let token = TokenInfo {
            token_id: "ff".into(),
            token_type: 1,
            token_ticker: "TOK".into(),
            token_name: "Token".into(),
            decimals: 2,
            group_id: None,
        };
        assert_eq!(token_amount(123_456, Some(&token)).to_plain(), "1,234.56 TOK");
        assert_eq!(token_amount(42, None).to_plain(), "42");
    }

    #[test]
    fn route_picks_view() {
        assert!(matches!(View::for_route(&Route::Blocks), View::Blocks(_)));
        assert!(matches!(
            View::for_route(&Route::BlockHeight { height: 1 }),
            View::Block(_)
        ));
        let v = View::for_route(&Route::Address { address: "qq".into() });
        assert_eq!(v.tab(), Some(Tab::Transactions));
        assert_eq!(v.table().name(), "address-transactions");
    }
}
