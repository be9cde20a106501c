//! Latest blocks list.
//!
//! Page 1 in descending order ends at the chain tip, so the tip is fetched
//! first and cached until refresh. Explicit `start`/`end` query parameters
//! bypass the page arithmetic.

use chrono::Utc;

use crate::format::{
    render_age, render_block_hash, render_byte_size, render_difficulty, render_hashrate,
    render_integer, render_timestamp, shorten_hash, Rendered,
};
use crate::params::{Order, PaginationParams, ParamState, UrlState};
use crate::router::Route;
use crate::table::{Align, Column, Loaded, Paging, TableConfig, TableController};
use crate::types::{BlockRow, BlockchainInfo, FetchRequest, Payload, Query, Slot, Ticket, Tickets};

/// Heights `(start, end)` shown on `page`, both inclusive.
pub fn block_range(tip: u64, page: u32, rows: u32, order: Order) -> (u64, u64) {
    let rows = u64::from(rows.max(1));
    let last_page = (tip + 1).div_ceil(rows);
    let page = u64::from(page.max(1)).min(last_page);
    let skip = (page - 1) * rows;
    match order {
        Order::Desc => {
            let end = tip - skip;
            (end.saturating_sub(rows - 1), end)
        }
        Order::Asc => {
            let start = skip;
            (start, (start + rows - 1).min(tip))
        }
    }
}

fn columns() -> Vec<Column<BlockRow>> {
    vec![
        Column::new("Height", 9, Align::Right, |b| render_integer(b.height)),
        Column::new("Hash", 27, Align::Left, |b| {
            render_block_hash(&shorten_hash(&b.hash, 13))
        }),
        Column::new("Date (UTC)", 19, Align::Left, |b| render_timestamp(b.timestamp)),
        Column::new("Age", 16, Align::Left, |b| render_age(b.timestamp, Utc::now())),
        Column::new("Txs", 6, Align::Right, |b| render_integer(b.num_txs)),
        Column::new("Size", 10, Align::Right, |b| render_byte_size(b.size)),
        Column::new("Hashrate", 12, Align::Right, |b| render_hashrate(b.difficulty)),
        Column::new("Difficulty", 44, Align::Left, |b| render_difficulty(b.difficulty)),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Position {
    page: u32,
    rows: u32,
    order: Order,
    range: Option<(u64, u64)>,
}

impl Position {
    fn from_params(p: &PaginationParams) -> Self {
        let range = match (p.start, p.end) {
            (Some(a), Some(b)) => Some((u64::from(a.min(b)), u64::from(a.max(b)))),
            _ => None,
        };
        Self {
            // an explicit range is always a single page
            page: if range.is_some() { 1 } else { p.page },
            rows: p.rows,
            order: p.order,
            range,
        }
    }
}

pub struct BlocksView {
    table: TableController<BlockRow>,
    tip: Option<BlockchainInfo>,
    tip_ticket: Option<Ticket>,
    position: Position,
}

impl Default for BlocksView {
    fn default() -> Self {
        Self::new()
    }
}

impl BlocksView {
    pub fn new() -> Self {
        Self {
            table: TableController::new("blocks", TableConfig::new(columns(), Paging::Server)),
            tip: None,
            tip_ticket: None,
            position: Position {
                page: 1,
                rows: crate::params::DEFAULT_ROWS,
                order: Order::Desc,
                range: None,
            },
        }
    }

    pub fn table(&self) -> &TableController<BlockRow> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableController<BlockRow> {
        &mut self.table
    }

    pub fn tip(&self) -> Option<&BlockchainInfo> {
        self.tip.as_ref()
    }

    pub fn order(&self) -> Order {
        self.position.order
    }

    pub fn summary(&self) -> Vec<(&'static str, Rendered)> {
        let mut out = Vec::new();
        if let Some(tip) = &self.tip {
            out.push(("Tip", render_integer(tip.tip_height)));
            out.push(("Tip hash", render_block_hash(&tip.tip_hash)));
        }
        if let Some((start, end)) = self.position.range {
            let mut range = render_integer(start);
            range.push(" – ", crate::format::Emphasis::Normal);
            range.append(render_integer(end));
            out.push(("Range", range));
        }
        out.push(("Order", Rendered::plain(self.position.order.to_string())));
        out
    }

    /// Forget the cached tip so the next load starts from the current chain.
    pub fn refresh(&mut self) {
        self.tip = None;
    }

    pub fn load<S: UrlState>(&mut self, state: &ParamState<S>, tickets: &mut Tickets) -> Vec<FetchRequest> {
        self.position = Position::from_params(state.params());
        self.table.set_position(self.position.page, self.position.rows);

        if let Some((start, end)) = self.position.range {
            return vec![self.request_blocks(tickets, start, end)];
        }
        match self.tip.as_ref().map(|t| t.tip_height) {
            Some(tip) => {
                let (start, end) = block_range(tip, self.position.page, self.position.rows, self.position.order);
                vec![self.request_blocks(tickets, start, end)]
            }
            None => {
                let ticket = tickets.issue(Slot::ChainInfo);
                self.tip_ticket = Some(ticket);
                self.table.begin_load(ticket);
                vec![FetchRequest {
                    ticket,
                    query: Query::ChainInfo,
                }]
            }
        }
    }

    fn request_blocks(&mut self, tickets: &mut Tickets, start: u64, end: u64) -> FetchRequest {
        let ticket = tickets.issue(Slot::Blocks);
        self.table.begin_load(ticket);
        FetchRequest {
            ticket,
            query: Query::Blocks { end, start },
        }
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, String>,
        tickets: &mut Tickets,
    ) -> Vec<FetchRequest> {
        match ticket.slot {
            Slot::ChainInfo => {
                if self.tip_ticket != Some(ticket) {
                    return Vec::new();
                }
                self.tip_ticket = None;
                match result {
                    Ok(Payload::ChainInfo(info)) => {
                        let (start, end) = block_range(
                            info.tip_height,
                            self.position.page,
                            self.position.rows,
                            self.position.order,
                        );
                        self.tip = Some(info);
                        vec![self.request_blocks(tickets, start, end)]
                    }
                    Ok(other) => {
                        self.table.finish_load(ticket, Err(unexpected(&other)));
                        Vec::new()
                    }
                    Err(e) => {
                        self.table.finish_load(ticket, Err(e));
                        Vec::new()
                    }
                }
            }
            Slot::Blocks => {
                let loaded = match result {
                    Ok(Payload::Blocks(mut rows)) => {
                        match self.position.order {
                            Order::Desc => rows.sort_by(|a, b| b.height.cmp(&a.height)),
                            Order::Asc => rows.sort_by(|a, b| a.height.cmp(&b.height)),
                        }
                        if self.position.range.is_some() {
                            Ok(Loaded::single_page(rows))
                        } else {
                            let total = self.tip.as_ref().map(|t| t.tip_height + 1);
                            Ok(Loaded::new(rows, total))
                        }
                    }
                    Ok(other) => Err(unexpected(&other)),
                    Err(e) => Err(e),
                };
                self.table.finish_load(ticket, loaded);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn set_page<S: UrlState>(&self, state: &mut ParamState<S>, page: u32) {
        state.update(|p| {
            p.page = page.max(1);
            p.start = None;
            p.end = None;
        });
    }

    pub fn set_rows<S: UrlState>(&self, state: &mut ParamState<S>, rows: u32) {
        state.update(|p| {
            p.rows = rows.max(1);
            p.page = 1;
        });
    }

    pub fn toggle_order<S: UrlState>(&self, state: &mut ParamState<S>) {
        state.update(|p| {
            p.order = p.order.toggled();
            p.page = 1;
            p.start = None;
            p.end = None;
        });
    }

    pub fn open_selected(&self) -> Option<Route> {
        self.table.selected_row().map(|b| Route::Block {
            hash: b.hash.clone(),
        })
    }
}

pub(crate) fn unexpected(payload: &Payload) -> String {
    let kind = match payload {
        Payload::ChainInfo(_) => "chain info",
        Payload::Blocks(_) => "blocks",
        Payload::Txs(_) => "transactions",
        Payload::Balances(_) => "balances",
        Payload::Stats(_) => "statistics",
    };
    format!("unexpected {kind} response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MemoryHistory;

    fn block(height: u64) -> BlockRow {
        BlockRow {
            hash: format!("{height:064x}"),
            height,
            version: 1,
            timestamp: 1_600_000_000 + height as i64 * 600,
            difficulty: 1e11,
            size: 250,
            num_txs: 1,
            median_time: 0,
        }
    }

    fn tip(height: u64) -> Payload {
        Payload::ChainInfo(BlockchainInfo {
            tip_height: height,
            tip_hash: "00ff".into(),
        })
    }

    #[test]
    fn range_for_descending_pages() {
        assert_eq!(block_range(1000, 1, 100, Order::Desc), (901, 1000));
        assert_eq!(block_range(1000, 2, 100, Order::Desc), (801, 900));
        assert_eq!(block_range(1000, 11, 100, Order::Desc), (0, 0));
        // past the end clamps to the last page
        assert_eq!(block_range(1000, 99, 100, Order::Desc), (0, 0));
    }

    #[test]
    fn range_for_ascending_pages() {
        assert_eq!(block_range(1000, 1, 100, Order::Asc), (0, 99));
        assert_eq!(block_range(1000, 11, 100, Order::Asc), (1000, 1000));
        assert_eq!(block_range(5, 1, 100, Order::Asc), (0, 5));
    }

    #[test]
    fn tip_then_blocks() {
        let state = ParamState::new(MemoryHistory::new("/blocks?page=2&rows=10"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();

        let reqs = view.load(&state, &mut tickets);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].query, Query::ChainInfo);

        let follow = view.apply(reqs[0].ticket, Ok(tip(100)), &mut tickets);
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].query, Query::Blocks { end: 90, start: 81 });

        let rows: Vec<BlockRow> = (81..=90).map(block).collect();
        view.apply(follow[0].ticket, Ok(Payload::Blocks(rows)), &mut tickets);
        let table = view.table();
        assert_eq!(table.all_rows()[0].height, 90);
        assert_eq!(table.total(), Some(101));
        assert_eq!(table.last_page(), 11);

        // the tip is cached for the next page
        let reqs = view.load(&state, &mut tickets);
        assert!(matches!(reqs[0].query, Query::Blocks { .. }));
    }

    #[test]
    fn explicit_range_skips_tip() {
        let state = ParamState::new(MemoryHistory::new("/blocks?start=20&end=10"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();
        let reqs = view.load(&state, &mut tickets);
        assert_eq!(reqs[0].query, Query::Blocks { end: 20, start: 10 });
    }

    #[test]
    fn explicit_range_is_one_page() {
        let state = ParamState::new(MemoryHistory::new("/blocks?start=1&end=30&rows=10&page=3"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();
        let reqs = view.load(&state, &mut tickets);
        assert_eq!(reqs[0].query, Query::Blocks { end: 30, start: 1 });

        view.apply(reqs[0].ticket, Ok(Payload::Blocks((1..=30).map(block).collect())), &mut tickets);
        let table = view.table();
        assert_eq!(table.page(), 1);
        assert_eq!(table.last_page(), 1);
        assert_eq!(table.visible_rows().len(), 30);
    }

    #[test]
    fn ascending_order_sorts_rows_up() {
        let state = ParamState::new(MemoryHistory::new("/blocks?order=asc&rows=3"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();
        let reqs = view.load(&state, &mut tickets);
        let follow = view.apply(reqs[0].ticket, Ok(tip(50)), &mut tickets);
        assert_eq!(follow[0].query, Query::Blocks { end: 2, start: 0 });
        view.apply(
            follow[0].ticket,
            Ok(Payload::Blocks(vec![block(2), block(1), block(0)])),
            &mut tickets,
        );
        let heights: Vec<u64> = view.table().all_rows().iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![0, 1, 2]);
    }

    #[test]
    fn tip_failure_marks_table_failed() {
        let state = ParamState::new(MemoryHistory::new("/blocks"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();
        let reqs = view.load(&state, &mut tickets);
        let follow = view.apply(reqs[0].ticket, Err("offline".into()), &mut tickets);
        assert!(follow.is_empty());
        assert_eq!(
            view.table().state(),
            &crate::table::LoadState::Failed("offline".into())
        );
    }

    #[test]
    fn paging_writes_url() {
        let mut state = ParamState::new(MemoryHistory::new("/blocks?start=1&end=5"));
        let view = BlocksView::new();
        view.set_page(&mut state, 4);
        assert_eq!(state.params().page, 4);
        assert_eq!(state.params().start, None);
        view.toggle_order(&mut state);
        assert_eq!(state.params().order, Order::Asc);
        assert_eq!(state.params().page, 1);
    }

    #[test]
    fn selected_block_opens_its_transactions() {
        let state = ParamState::new(MemoryHistory::new("/blocks?start=1&end=1"));
        let mut tickets = Tickets::default();
        let mut view = BlocksView::new();
        let reqs = view.load(&state, &mut tickets);
        view.apply(reqs[0].ticket, Ok(Payload::Blocks(vec![block(1)])), &mut tickets);
        assert_eq!(
            view.open_selected(),
            Some(Route::Block {
                hash: format!("{:064x}", 1)
            })
        );
    }
}
