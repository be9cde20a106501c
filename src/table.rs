//! Generic table controller.
//!
//! A [`TableController`] owns the rows of one table, its column
//! configuration, page position, load state and the planned pagination bar.
//! Loads are split in two: [`TableController::begin_load`] records the
//! ticket of the request in flight and [`TableController::finish_load`]
//! accepts only the response carrying that same ticket, so a slow response
//! to an earlier page can never overwrite a newer one.

use maud::{html, Markup};

use crate::format::Rendered;
use crate::pagination::{total_pages, Pagination, WidthUnit};
use crate::types::Ticket;

/// Rows-per-page choices offered by every table.
pub const PAGE_LENGTHS: [u32; 5] = [10, 25, 50, 100, 200];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column<R> {
    pub title: &'static str,
    /// Width hint in terminal cells.
    pub width: u16,
    pub align: Align,
    pub render: fn(&R) -> Rendered,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> Column<R> {
    pub const fn new(title: &'static str, width: u16, align: Align, render: fn(&R) -> Rendered) -> Self {
        Self {
            title,
            width,
            align,
            render,
        }
    }
}

/// Where page slicing happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paging {
    /// The server returns one page per request.
    Server,
    /// The server returns every row and the table pages locally.
    Client,
}

pub struct TableConfig<R> {
    pub columns: Vec<Column<R>>,
    pub page_lengths: &'static [u32],
    pub paging: Paging,
}

impl<R> TableConfig<R> {
    pub fn new(columns: Vec<Column<R>>, paging: Paging) -> Self {
        Self {
            columns,
            page_lengths: &PAGE_LENGTHS,
            paging,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableEvent {
    Loading { ticket: Ticket },
    Loaded { rows: usize },
    Failed { message: String },
    PageChanged { page: u32, rows: u32 },
    Resized { slots: usize },
}

/// Rows of a finished load plus the server-reported total, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded<R> {
    pub rows: Vec<R>,
    pub total: Option<u64>,
    pub single_page: bool,
}

impl<R> Loaded<R> {
    pub fn new(rows: Vec<R>, total: Option<u64>) -> Self {
        Self {
            rows,
            total,
            single_page: false,
        }
    }

    /// Every row of a bounded query, shown as one page whatever the page length.
    pub fn single_page(rows: Vec<R>) -> Self {
        Self {
            total: Some(rows.len() as u64),
            rows,
            single_page: true,
        }
    }
}

type Listener = Box<dyn FnMut(&TableEvent)>;

pub struct TableController<R> {
    name: &'static str,
    config: TableConfig<R>,
    rows: Vec<R>,
    total: Option<u64>,
    single_page: bool,
    page: u32,
    rows_per_page: u32,
    state: LoadState,
    pending: Option<Ticket>,
    width: u32,
    unit: WidthUnit,
    pagination: Pagination,
    selected: usize,
    listeners: Vec<Listener>,
}

impl<R> TableController<R> {
    pub fn new(name: &'static str, config: TableConfig<R>) -> Self {
        let mut table = Self {
            name,
            config,
            rows: Vec::new(),
            total: None,
            single_page: false,
            page: 1,
            rows_per_page: crate::params::DEFAULT_ROWS,
            state: LoadState::Idle,
            pending: None,
            width: 80,
            unit: WidthUnit::Cells,
            pagination: Pagination {
                current: 1,
                last: 1,
                pages: vec![1],
            },
            selected: 0,
            listeners: Vec::new(),
        };
        table.replan();
        table
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TableEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: TableEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.config.columns
    }

    pub fn page_lengths(&self) -> &'static [u32] {
        self.config.page_lengths
    }

    pub fn paging(&self) -> Paging {
        self.config.paging
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn total(&self) -> Option<u64> {
        match self.config.paging {
            Paging::Server => self.total,
            Paging::Client => Some(self.rows.len() as u64),
        }
    }

    pub fn all_rows(&self) -> &[R] {
        &self.rows
    }

    /// Move to a page position read from the URL.
    pub fn set_position(&mut self, page: u32, rows_per_page: u32) {
        let page = page.max(1);
        let rows_per_page = rows_per_page.max(1);
        if page == self.page && rows_per_page == self.rows_per_page {
            return;
        }
        self.page = page;
        self.rows_per_page = rows_per_page;
        self.selected = 0;
        self.replan();
        self.emit(TableEvent::PageChanged {
            page,
            rows: rows_per_page,
        });
    }

    /// Next entry of the page-length menu, wrapping around.
    pub fn next_page_length(&self) -> u32 {
        let menu = self.config.page_lengths;
        match menu.iter().position(|&n| n == self.rows_per_page) {
            Some(idx) => menu[(idx + 1) % menu.len()],
            None => menu
                .iter()
                .copied()
                .find(|&n| n > self.rows_per_page)
                .or_else(|| menu.first().copied())
                .unwrap_or(self.rows_per_page),
        }
    }

    pub fn begin_load(&mut self, ticket: Ticket) {
        self.pending = Some(ticket);
        self.state = LoadState::Loading;
        self.emit(TableEvent::Loading { ticket });
    }

    /// Apply a response. Returns `false` if the ticket is not the one in
    /// flight, in which case nothing changes.
    pub fn finish_load(&mut self, ticket: Ticket, result: Result<Loaded<R>, String>) -> bool {
        if self.pending != Some(ticket) {
            log::debug!(
                "[ecashx][table] {} dropping stale response gen={} (pending {:?})",
                self.name,
                ticket.generation,
                self.pending.map(|t| t.generation)
            );
            return false;
        }
        self.pending = None;
        match result {
            Ok(loaded) => {
                let count = loaded.rows.len();
                self.rows = loaded.rows;
                self.total = loaded.total;
                self.single_page = loaded.single_page;
                self.state = LoadState::Ready;
                self.selected = self.selected.min(self.visible_len().saturating_sub(1));
                self.replan();
                log::debug!("[ecashx][table] {} loaded {count} rows", self.name);
                self.emit(TableEvent::Loaded { rows: count });
            }
            Err(message) => {
                log::warn!("[ecashx][table] {} load failed: {message}", self.name);
                self.state = LoadState::Failed(message.clone());
                self.emit(TableEvent::Failed { message });
            }
        }
        true
    }

    pub fn last_page(&self) -> u32 {
        if self.single_page {
            return 1;
        }
        match self.config.paging {
            Paging::Client => total_pages(self.rows.len() as u64, self.rows_per_page),
            Paging::Server => match self.total {
                Some(total) => total_pages(total, self.rows_per_page),
                // Unknown total: a full page suggests there is another one.
                None if self.rows.len() >= self.rows_per_page as usize => self.page + 1,
                None => self.page,
            },
        }
    }

    fn effective_page(&self) -> u32 {
        self.page.min(self.last_page()).max(1)
    }

    pub fn visible_rows(&self) -> &[R] {
        match self.config.paging {
            Paging::Server => &self.rows,
            Paging::Client => {
                let per = self.rows_per_page as usize;
                let start = (self.effective_page() as usize - 1) * per;
                let start = start.min(self.rows.len());
                let end = (start + per).min(self.rows.len());
                &self.rows[start..end]
            }
        }
    }

    fn visible_len(&self) -> usize {
        self.visible_rows().len()
    }

    pub fn on_resize(&mut self, width: u32, unit: WidthUnit) {
        if width == self.width && unit == self.unit {
            return;
        }
        self.width = width;
        self.unit = unit;
        self.replan();
        let slots = self.pagination.pages.len();
        self.emit(TableEvent::Resized { slots });
    }

    fn replan(&mut self) {
        self.pagination = Pagination::plan(self.page, self.last_page(), self.width, self.unit);
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.visible_rows().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_len().saturating_sub(1);
    }

    pub fn cells(&self) -> Vec<Vec<Rendered>> {
        self.visible_rows()
            .iter()
            .map(|row| self.config.columns.iter().map(|c| (c.render)(row)).collect())
            .collect()
    }

    /// The visible page as an HTML table.
    pub fn to_markup(&self) -> Markup {
        html! {
            table class="table" data-table=(self.name) {
                thead {
                    tr {
                        @for col in &self.config.columns {
                            th class=(align_class(col.align)) { (col.title) }
                        }
                    }
                }
                tbody {
                    @for row in self.visible_rows() {
                        tr {
                            @for col in &self.config.columns {
                                td class=(align_class(col.align)) { ((col.render)(row).to_markup()) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn align_class(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Right => "right",
    }
}

/// Row-type erased view of a table, used by the renderer.
pub trait TableView {
    fn name(&self) -> &'static str;
    fn headers(&self) -> Vec<(&'static str, u16, Align)>;
    fn cells(&self) -> Vec<Vec<Rendered>>;
    fn state(&self) -> &LoadState;
    fn pending(&self) -> Option<Ticket>;
    fn pagination(&self) -> &Pagination;
    fn selected(&self) -> usize;
    fn rows_per_page(&self) -> u32;
    fn total(&self) -> Option<u64>;
    fn page(&self) -> u32;
    fn last_page(&self) -> u32;
    fn next_page_length(&self) -> u32;
    fn on_resize(&mut self, width: u32, unit: WidthUnit);
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn select_first(&mut self);
    fn select_last(&mut self);
    fn html(&self) -> String;
}

impl<R> TableView for TableController<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn headers(&self) -> Vec<(&'static str, u16, Align)> {
        self.config
            .columns
            .iter()
            .map(|c| (c.title, c.width, c.align))
            .collect()
    }

    fn cells(&self) -> Vec<Vec<Rendered>> {
        TableController::cells(self)
    }

    fn state(&self) -> &LoadState {
        &self.state
    }

    fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    fn total(&self) -> Option<u64> {
        TableController::total(self)
    }

    fn page(&self) -> u32 {
        self.page
    }

    fn last_page(&self) -> u32 {
        TableController::last_page(self)
    }

    fn next_page_length(&self) -> u32 {
        TableController::next_page_length(self)
    }

    fn on_resize(&mut self, width: u32, unit: WidthUnit) {
        TableController::on_resize(self, width, unit)
    }

    fn select_next(&mut self) {
        TableController::select_next(self)
    }

    fn select_prev(&mut self) {
        TableController::select_prev(self)
    }

    fn select_first(&mut self) {
        TableController::select_first(self)
    }

    fn select_last(&mut self) {
        TableController::select_last(self)
    }

    fn html(&self) -> String {
        self.to_markup().into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::render_integer;
    use crate::types::{Slot, Tickets};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn table(paging: Paging) -> TableController<u64> {
        let columns = vec![Column::new("n", 8, Align::Right, |n: &u64| render_integer(*n))];
        TableController::new("numbers", TableConfig::new(columns, paging))
    }

    #[test]
    fn stale_ticket_is_dropped() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Server);
        let first = tickets.issue(Slot::Blocks);
        t.begin_load(first);
        let second = tickets.issue(Slot::Blocks);
        t.begin_load(second);

        // the slow first response arrives after the second request went out
        assert!(!t.finish_load(first, Ok(Loaded::new(vec![1, 2], None))));
        assert!(t.is_loading());
        assert!(t.all_rows().is_empty());

        assert!(t.finish_load(second, Ok(Loaded::new(vec![3], None))));
        assert_eq!(t.all_rows(), &[3]);
        assert_eq!(t.state(), &LoadState::Ready);

        // late duplicates after completion are ignored too
        assert!(!t.finish_load(second, Ok(Loaded::new(vec![9], None))));
        assert_eq!(t.all_rows(), &[3]);
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Server);
        let a = tickets.issue(Slot::Blocks);
        t.begin_load(a);
        t.finish_load(a, Ok(Loaded::new(vec![1, 2, 3], Some(3))));
        let b = tickets.issue(Slot::Blocks);
        t.begin_load(b);
        t.finish_load(b, Err("boom".into()));
        assert_eq!(t.all_rows(), &[1, 2, 3]);
        assert_eq!(t.state(), &LoadState::Failed("boom".into()));
    }

    #[test]
    fn client_paging_slices_rows() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Client);
        t.set_position(2, 10);
        let ticket = tickets.issue(Slot::BlockTxs);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new((1..=25).collect(), None)));
        assert_eq!(t.last_page(), 3);
        assert_eq!(t.visible_rows(), &(11..=20).collect::<Vec<_>>()[..]);
        assert_eq!(t.total(), Some(25));

        // out-of-range pages show the last page
        t.set_position(9, 10);
        assert_eq!(t.visible_rows(), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn server_paging_without_total_is_open_ended() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Server);
        t.set_position(4, 2);
        let ticket = tickets.issue(Slot::AddressTxs);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![7, 8], None)));
        assert_eq!(t.last_page(), 5);
        let ticket = tickets.issue(Slot::AddressTxs);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![7], None)));
        assert_eq!(t.last_page(), 4);
    }

    #[test]
    fn single_page_loads_ignore_page_length() {
        let mut t = table(Paging::Server);
        let mut tickets = Tickets::default();
        let ticket = tickets.issue(Slot::Blocks);
        t.set_position(1, 10);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::single_page((1..=30).collect())));
        assert_eq!(t.last_page(), 1);
        assert_eq!(t.total(), Some(30));
        assert_eq!(t.visible_rows().len(), 30);
        assert_eq!(t.pagination().pages, vec![1]);

        let ticket = tickets.issue(Slot::Blocks);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![1], Some(30))));
        assert_eq!(t.last_page(), 3);
    }

    #[test]
    fn listeners_see_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut t = table(Paging::Server);
        t.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let mut tickets = Tickets::default();
        let ticket = tickets.issue(Slot::Blocks);
        t.set_position(2, 50);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![1], Some(120))));
        t.on_resize(200, WidthUnit::Cells);

        let seen = seen.borrow();
        assert_eq!(seen[0], TableEvent::PageChanged { page: 2, rows: 50 });
        assert_eq!(seen[1], TableEvent::Loading { ticket });
        assert_eq!(seen[2], TableEvent::Loaded { rows: 1 });
        assert!(matches!(seen[3], TableEvent::Resized { .. }));
    }

    #[test]
    fn page_length_menu_cycles() {
        let mut t = table(Paging::Server);
        assert_eq!(t.next_page_length(), 200);
        t.set_position(1, 200);
        assert_eq!(t.next_page_length(), 10);
        t.set_position(1, 30);
        assert_eq!(t.next_page_length(), 50);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Server);
        let ticket = tickets.issue(Slot::Blocks);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![1, 2], None)));
        t.select_next();
        t.select_next();
        assert_eq!(t.selected(), 1);
        assert_eq!(t.selected_row(), Some(&2));
        t.select_prev();
        t.select_prev();
        assert_eq!(t.selected(), 0);
    }

    #[test]
    fn html_has_header_and_cells() {
        let mut tickets = Tickets::default();
        let mut t = table(Paging::Server);
        let ticket = tickets.issue(Slot::Blocks);
        t.begin_load(ticket);
        t.finish_load(ticket, Ok(Loaded::new(vec![1234], None)));
        let html = t.html();
        assert!(html.contains("<th class=\"right\">n</th>"));
        assert!(html.contains("digit-sep"));
    }
}
