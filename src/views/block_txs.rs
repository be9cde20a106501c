//! Transactions of one block, paged locally.

use crate::format::{
    render_block_hash, render_byte_size, render_difficulty, render_integer, render_sats,
    render_timestamp, shorten_hash, Emphasis, Rendered,
};
use crate::params::{ParamState, UrlState};
use crate::table::{Align, Column, Loaded, Paging, TableConfig, TableController};
use crate::types::{BlockRow, FetchRequest, Payload, Query, Slot, Ticket, Tickets, TxRow};

use super::blocks::unexpected;
use super::token_amount;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockTarget {
    Hash(String),
    Height(u64),
}

fn token_cell(tx: &TxRow) -> Rendered {
    let mut out = Rendered::new();
    if tx.is_burned_slp {
        out.push("burned ", Emphasis::Small);
        out.append(token_amount(tx.token_input, tx.token.as_ref()));
        return out;
    }
    if tx.token.is_none() {
        return out;
    }
    out.append(token_amount(tx.token_output, tx.token.as_ref()));
    if let Some(action) = tx.slp_action {
        out.push(format!(" {}", action.label()), Emphasis::Small);
    }
    out
}

fn columns() -> Vec<Column<TxRow>> {
    vec![
        Column::new("Transaction", 21, Align::Left, |tx| {
            Rendered::plain(shorten_hash(&tx.tx_hash, 10))
        }),
        Column::new("Size", 10, Align::Right, |tx| render_byte_size(tx.size)),
        Column::new("In", 5, Align::Right, |tx| render_integer(u64::from(tx.num_inputs))),
        Column::new("Out", 5, Align::Right, |tx| render_integer(u64::from(tx.num_outputs))),
        Column::new("Output XEC", 18, Align::Right, |tx| render_sats(tx.sats_output)),
        Column::new("Fee XEC", 12, Align::Right, |tx| match tx.fee() {
            Some(fee) => render_sats(fee),
            None => Rendered::plain("coinbase"),
        }),
        Column::new("Token", 32, Align::Left, token_cell),
    ]
}

pub struct BlockTxsView {
    target: BlockTarget,
    header: Option<BlockRow>,
    header_ticket: Option<Ticket>,
    loaded: bool,
    table: TableController<TxRow>,
}

impl BlockTxsView {
    pub fn new(target: BlockTarget) -> Self {
        Self {
            target,
            header: None,
            header_ticket: None,
            loaded: false,
            table: TableController::new("block-transactions", TableConfig::new(columns(), Paging::Client)),
        }
    }

    pub fn target(&self) -> &BlockTarget {
        &self.target
    }

    pub fn header(&self) -> Option<&BlockRow> {
        self.header.as_ref()
    }

    pub fn table(&self) -> &TableController<TxRow> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableController<TxRow> {
        &mut self.table
    }

    pub fn title(&self) -> String {
        match &self.target {
            BlockTarget::Hash(hash) => format!("Block {}", shorten_hash(hash, 12)),
            BlockTarget::Height(height) => format!("Block #{}", render_integer(*height)),
        }
    }

    pub fn summary(&self) -> Vec<(&'static str, Rendered)> {
        let mut out = Vec::new();
        if let BlockTarget::Hash(hash) = &self.target {
            out.push(("Hash", render_block_hash(hash)));
        }
        match &self.header {
            Some(b) => {
                out.push(("Height", render_integer(b.height)));
                out.push(("Date", render_timestamp(b.timestamp)));
                out.push(("Transactions", render_integer(b.num_txs)));
                out.push(("Size", crate::format::render_byte_size_long(b.size)));
                out.push(("Difficulty", render_difficulty(b.difficulty)));
            }
            None => {
                let height = self
                    .table
                    .all_rows()
                    .iter()
                    .find_map(|tx| tx.block_height)
                    .and_then(|h| u64::try_from(h).ok());
                if let Some(h) = height {
                    out.push(("Height", render_integer(h)));
                }
                if self.loaded {
                    out.push((
                        "Transactions",
                        render_integer(self.table.all_rows().len() as u64),
                    ));
                }
            }
        }
        out
    }

    pub fn refresh(&mut self) {
        self.loaded = false;
    }

    /// Rows arrive all at once, so paging only refetches after a refresh.
    pub fn load<S: UrlState>(&mut self, state: &ParamState<S>, tickets: &mut Tickets) -> Vec<FetchRequest> {
        let params = state.params();
        self.table.set_position(params.page, params.rows);
        if self.loaded || self.table.pending().is_some() {
            return Vec::new();
        }
        match self.target.clone() {
            BlockTarget::Hash(hash) => vec![self.request_txs(tickets, hash)],
            BlockTarget::Height(height) => {
                let ticket = tickets.issue(Slot::Blocks);
                self.header_ticket = Some(ticket);
                self.table.begin_load(ticket);
                vec![FetchRequest {
                    ticket,
                    query: Query::Blocks {
                        end: height,
                        start: height,
                    },
                }]
            }
        }
    }

    fn request_txs(&mut self, tickets: &mut Tickets, hash: String) -> FetchRequest {
        let ticket = tickets.issue(Slot::BlockTxs);
        self.table.begin_load(ticket);
        FetchRequest {
            ticket,
            query: Query::BlockTxs { hash },
        }
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, String>,
        tickets: &mut Tickets,
    ) -> Vec<FetchRequest> {
        match ticket.slot {
            Slot::Blocks => {
                if self.header_ticket != Some(ticket) {
                    return Vec::new();
                }
                self.header_ticket = None;
                let height = match &self.target {
                    BlockTarget::Height(h) => *h,
                    BlockTarget::Hash(_) => return Vec::new(),
                };
                match result {
                    Ok(Payload::Blocks(rows)) => match rows.into_iter().find(|b| b.height == height) {
                        Some(block) => {
                            let hash = block.hash.clone();
                            self.header = Some(block);
                            vec![self.request_txs(tickets, hash)]
                        }
                        None => {
                            self.table
                                .finish_load(ticket, Err(format!("no block at height {height}")));
                            Vec::new()
                        }
                    },
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
            Slot::BlockTxs => {
                let loaded = match result {
                    Ok(Payload::Txs(page)) => Ok(Loaded::new(page.into_rows(), None)),
                    Ok(other) => Err(unexpected(&other)),
                    Err(e) => Err(e),
                };
                let ok = loaded.is_ok();
                if self.table.finish_load(ticket, loaded) && ok {
                    self.loaded = true;
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn set_page<S: UrlState>(&self, state: &mut ParamState<S>, page: u32) {
        state.update(|p| p.page = page.max(1));
    }

    pub fn set_rows<S: UrlState>(&self, state: &mut ParamState<S>, rows: u32) {
        state.update(|p| {
            p.rows = rows.max(1);
            p.page = 1;
        });
    }
}
