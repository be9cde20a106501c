use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::pagination::WidthUnit;
use crate::params::{MemoryHistory, ParamState, UrlState};
use crate::router::{self, Link, Route};
use crate::table::LoadState;
use crate::tabs::Tab;
use crate::theme::Theme;
use crate::types::{AppEvent, FetchRequest, Tickets};
use crate::views::View;

const TOAST_DURATION: Duration = Duration::from_secs(2);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Free-text go-to prompt: hash, height, address or explorer URL.
    GoTo,
    /// Page number prompt.
    Page,
}

struct Toast {
    message: String,
    shown_at: Instant,
    error: bool,
}

pub struct App<S: UrlState = MemoryHistory> {
    quit: bool,
    fps: u32,
    theme: Theme,

    state: ParamState<S>,
    route: Route,
    view: View,
    tickets: Tickets,
    // requests the event loop forwards to the fetch worker
    outbox: Vec<FetchRequest>,

    input_mode: InputMode,
    input: String,
    toast: Option<Toast>,

    // last width reported by the renderer, in cells
    table_width: u16,
}

impl<S: UrlState> App<S> {
    pub fn new(fps: u32, theme: Theme, default_rows: u32, history: S) -> Self {
        let mut state = ParamState::with_default_rows(history, default_rows);
        let route = match router::parse(&state.url()) {
            Some(link) => link.route,
            None => {
                log::warn!("[ecashx][app] unknown location {}, showing blocks", state.url());
                state.history_mut().replace(&Route::Blocks.path());
                state.sync();
                Route::Blocks
            }
        };
        let view = View::for_route(&route);
        let mut app = Self {
            quit: false,
            fps,
            theme,
            state,
            route,
            view,
            tickets: Tickets::default(),
            outbox: Vec::new(),
            input_mode: InputMode::Normal,
            input: String::new(),
            toast: None,
            table_width: 0,
        };
        app.reload();
        app
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
    pub fn quit_flag(&self) -> bool {
        self.quit
    }
    pub fn quit(&mut self) {
        self.quit = true;
    }
    pub fn theme(&self) -> Theme {
        self.theme
    }
    pub fn route(&self) -> &Route {
        &self.route
    }
    pub fn view(&self) -> &View {
        &self.view
    }
    pub fn url(&self) -> String {
        self.state.url()
    }
    /// The current location on the explorer site at `base`.
    pub fn shareable_url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.state.url())
    }
    pub fn params(&self) -> &ParamState<S> {
        &self.state
    }
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn is_loading(&self) -> bool {
        matches!(self.view.table().state(), LoadState::Loading)
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Show a toast notification for 2 seconds
    pub fn show_toast(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast {
            message: msg.into(),
            shown_at: Instant::now(),
            error: false,
        });
    }

    pub fn show_error(&mut self, msg: impl Into<String>) {
        self.toast = Some(Toast {
            message: msg.into(),
            shown_at: Instant::now(),
            error: true,
        });
    }

    /// Get current toast message if still active (visible for 2 seconds)
    pub fn toast_message(&self) -> Option<&str> {
        self.active_toast().map(|t| t.message.as_str())
    }

    pub fn toast_is_error(&self) -> bool {
        self.active_toast().is_some_and(|t| t.error)
    }

    fn active_toast(&self) -> Option<&Toast> {
        self.toast
            .as_ref()
            .filter(|t| t.shown_at.elapsed() < TOAST_DURATION)
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.show_toast(format!("Theme: {}", self.theme));
    }

    // ----- navigation -----

    pub fn open(&mut self, route: Route) {
        self.navigate(Link::new(route));
    }

    pub fn navigate(&mut self, link: Link) {
        log::info!("[ecashx][app] open {}", link.to_url());
        self.state.navigate(&link.to_url());
        self.install(link.route);
    }

    pub fn back(&mut self) {
        if !self.state.history_mut().back() {
            self.show_toast("No earlier page");
            return;
        }
        self.state.sync();
        let route = router::parse(&self.state.url())
            .map(|l| l.route)
            .unwrap_or(Route::Blocks);
        self.install(route);
    }

    fn install(&mut self, route: Route) {
        self.view = View::for_route(&route);
        self.route = route;
        self.reload();
    }

    /// Ask the current view for whatever its parameters say is missing.
    fn reload(&mut self) {
        let reqs = self.view.load(&self.state, &mut self.tickets);
        self.outbox.extend(reqs);
        if self.table_width > 0 {
            self.view
                .table_mut()
                .on_resize(u32::from(self.table_width), WidthUnit::Cells);
        }
    }

    pub fn refresh(&mut self) {
        self.view.refresh();
        self.reload();
        self.show_toast("Refreshing");
    }

    pub fn on_resize(&mut self, width: u16) {
        self.table_width = width;
        self.view
            .table_mut()
            .on_resize(u32::from(width), WidthUnit::Cells);
    }

    // ----- paging -----

    pub fn go_to_page(&mut self, page: u32) {
        let table = self.view.table();
        let target = page.clamp(1, table.last_page().max(1));
        if target == table.page() {
            return;
        }
        self.view.set_page(&mut self.state, target);
        self.reload();
    }

    pub fn next_page(&mut self) {
        let page = self.view.table().page();
        self.go_to_page(page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        let page = self.view.table().page();
        if page > 1 {
            self.go_to_page(page - 1);
        }
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        let last = self.view.table().last_page();
        self.go_to_page(last);
    }

    pub fn cycle_rows(&mut self) {
        let rows = self.view.table().next_page_length();
        self.view.set_rows(&mut self.state, rows);
        self.reload();
        self.show_toast(format!("{rows} rows per page"));
    }

    pub fn toggle_order(&mut self) {
        if self.view.toggle_order(&mut self.state) {
            self.reload();
            self.show_toast(format!("Order: {}", self.state.params().order));
        }
    }

    // ----- tabs and rows -----

    pub fn next_tab(&mut self) {
        if let Some(tab) = self.view.tab() {
            self.switch_tab(tab.next());
        }
    }

    pub fn prev_tab(&mut self) {
        if let Some(tab) = self.view.tab() {
            self.switch_tab(tab.prev());
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.view.switch_tab(&mut self.state, tab) {
            self.reload();
        }
    }

    pub fn up(&mut self) {
        self.view.table_mut().select_prev();
    }
    pub fn down(&mut self) {
        self.view.table_mut().select_next();
    }
    pub fn home(&mut self) {
        self.view.table_mut().select_first();
    }
    pub fn end(&mut self) {
        self.view.table_mut().select_last();
    }

    pub fn open_selected(&mut self) {
        if let Some(route) = self.view.open_selected() {
            self.open(route);
        }
    }

    // ----- prompts -----

    pub fn start_goto(&mut self) {
        self.input_mode = InputMode::GoTo;
        self.input.clear();
    }

    pub fn start_page_prompt(&mut self) {
        self.input_mode = InputMode::Page;
        self.input.clear();
    }

    pub fn input_add_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn input_backspace(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn submit_input(&mut self) {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        let text = std::mem::take(&mut self.input);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match mode {
            InputMode::GoTo => {
                let link = router::classify_search(text)
                    .map(Link::new)
                    .or_else(|| router::parse(text));
                match link {
                    Some(link) => self.navigate(link),
                    None => self.show_error(format!("Nothing matches \"{text}\"")),
                }
            }
            InputMode::Page => match text.parse::<u32>() {
                Ok(page) if page > 0 => self.go_to_page(page),
                _ => self.show_error(format!("Not a page number: {text}")),
            },
            InputMode::Normal => {}
        }
    }

    // ----- events -----

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::Loaded { ticket, result } => {
                // only the response the visible table waits for may toast
                let awaited = self.view.table().pending() == Some(ticket);
                let follow = self.view.apply(ticket, result, &mut self.tickets);
                self.outbox.extend(follow);
                if awaited {
                    if let LoadState::Failed(msg) = self.view.table().state() {
                        let message = format!("Load failed: {msg}");
                        self.show_error(message);
                    }
                }
            }
        }
    }
}
