// Native binary for ecashx - Terminal UI mode

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::OpenOptions,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use ecashx::{
    api::{execute as fetch, HttpApi},
    app::{App, InputMode},
    config::{load, Config},
    params::MemoryHistory,
    platform, router, source,
    types::{AppEvent, FetchRequest},
    ui,
};

fn init_logging(cfg: &Config) -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)
        .with_context(|| format!("failed to open log file {}", cfg.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn initial_history(cfg: &Config) -> Result<MemoryHistory> {
    let url = match cfg.location.as_deref() {
        Some(location) => router::parse(location)
            .with_context(|| format!("not an explorer location: {location}"))?
            .to_url(),
        None => "/blocks".to_string(),
    };
    Ok(MemoryHistory::new(url))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg)?;
    cfg.print_summary();

    let api = Arc::new(HttpApi::new(&cfg.api_url, cfg.timeout_ms, cfg.retries)?);
    let mut app = App::new(cfg.render_fps, cfg.theme, cfg.rows, initial_history(&cfg)?);

    if cfg.html {
        return print_html(&mut app, api.as_ref()).await;
    }

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // app + channels
    let (tx, rx) = unbounded_channel::<AppEvent>();
    let (req_tx, req_rx) = unbounded_channel::<FetchRequest>();
    let source_task: JoinHandle<Result<()>> =
        tokio::spawn(source::run_fetcher(Arc::clone(&api), req_rx, tx));

    // main loop
    let result = run_loop(&mut app, &mut terminal, rx, req_tx, &cfg).await;

    // cleanup
    source_task.abort();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

/// One-shot mode: resolve the location's requests directly and print the
/// active table as an HTML fragment.
async fn print_html(app: &mut App, api: &HttpApi) -> Result<()> {
    loop {
        let reqs = app.take_requests();
        if reqs.is_empty() {
            break;
        }
        for req in reqs {
            let result = fetch(api, &req.query).await.map_err(|e| format!("{e:#}"));
            app.on_event(AppEvent::Loaded {
                ticket: req.ticket,
                result,
            });
        }
    }
    if let ecashx::table::LoadState::Failed(msg) = app.view().table().state() {
        anyhow::bail!("{} failed to load: {msg}", app.url());
    }
    println!("{}", app.view().table().html());
    Ok(())
}

fn forward_requests(app: &mut App, req_tx: &UnboundedSender<FetchRequest>) {
    for req in app.take_requests() {
        if req_tx.send(req).is_err() {
            log::error!("[ecashx] fetch worker is gone");
            app.show_error("Fetch worker stopped");
        }
    }
}

async fn run_loop(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
    req_tx: UnboundedSender<FetchRequest>,
    cfg: &Config,
) -> Result<()> {
    let mut last_frame = Instant::now();
    // first frame sizes the pagination bar before the initial requests go out
    terminal.draw(|f| ui::draw(f, app))?;
    forward_requests(app, &req_tx);

    loop {
        // frame budget (coalesced renders)
        let frame_ms = 1000u32.saturating_div(app.fps()) as u64;
        let budget = Duration::from_millis(frame_ms.max(1));
        let wait = budget.saturating_sub(last_frame.elapsed());

        // input or fetch results
        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(app, k, cfg);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            app.on_event(ev);
        }
        forward_requests(app, &req_tx);

        if last_frame.elapsed() >= budget {
            terminal.draw(|f| ui::draw(f, app))?;
            last_frame = Instant::now();
        }
        if app.quit_flag() {
            break;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, k: KeyEvent, cfg: &Config) {
    // prompt modes take every printable key
    if app.input_mode() != InputMode::Normal {
        match k.code {
            KeyCode::Char(c) => app.input_add_char(c),
            KeyCode::Backspace => app.input_backspace(),
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => app.cancel_input(),
            _ => {}
        }
        return;
    }

    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.on_event(AppEvent::Quit);
        }

        // pages
        (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => app.next_page(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), KeyModifiers::NONE) => app.prev_page(),
        (KeyCode::Home, _) => app.first_page(),
        (KeyCode::End, _) => app.last_page(),
        (KeyCode::Char('r'), _) => app.cycle_rows(),
        (KeyCode::Char('o'), _) => app.toggle_order(),

        // rows within the page
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.down(),
        (KeyCode::PageUp, _) => app.home(),
        (KeyCode::PageDown, _) => app.end(),
        (KeyCode::Enter, _) => app.open_selected(),

        // tabs
        (KeyCode::Tab, _) => app.next_tab(),
        (KeyCode::BackTab, _) => app.prev_tab(),

        // prompts and navigation
        (KeyCode::Char('g'), _) | (KeyCode::Char('/'), _) => app.start_goto(),
        (KeyCode::Char('p'), _) => app.start_page_prompt(),
        (KeyCode::Backspace, _) => app.back(),
        (KeyCode::F(5), _) | (KeyCode::Char('R'), _) => app.refresh(),
        (KeyCode::Char('b'), _) => app.open(router::Route::Blocks),
        (KeyCode::Char('t'), _) => app.cycle_theme(),

        (KeyCode::Char('y'), _) => {
            let url = app.shareable_url(&cfg.api_url);
            if platform::copy_to_clipboard(&url) {
                app.show_toast(format!("Copied {url}"));
            } else {
                app.show_error("Clipboard unavailable");
            }
        }

        _ => {}
    }
}
