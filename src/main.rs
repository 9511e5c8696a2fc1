use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use match_predictor::api::HttpMatchApi;
use match_predictor::config::{AppConfig, Theme};
use match_predictor::logging::init_logging;
use match_predictor::provider::spawn_provider;
use match_predictor::route::Route;
use match_predictor::state::{self, AppState, ProviderCommand, apply_delta};
use match_predictor::ui::ui;

struct App {
    state: AppState,
    theme: Theme,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(config.results_page_size),
            theme: config.theme,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let command = match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = !self.state.help_overlay;
                None
            }
            KeyCode::Char('1') => Some(self.state.navigate(Route::Fixtures)),
            KeyCode::Char('2') => Some(self.state.navigate(Route::Results)),
            KeyCode::Enter => self.state.open_selected(),
            KeyCode::Char('b') | KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                    None
                } else {
                    self.state.go_back()
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev();
                None
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let command = self.state.refresh();
                if command.is_none() {
                    self.state.push_log("[INFO] Refresh already in progress");
                }
                command
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.state.load_more(),
            KeyCode::Char('[') => self.state.step_matchday(-1),
            KeyCode::Char(']') => self.state.step_matchday(1),
            KeyCode::Char('m') | KeyCode::Char('M') => self.state.clear_matchday(),
            _ => None,
        };
        if let Some(command) = command {
            self.send(command);
        }
    }

    fn send(&mut self, command: ProviderCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracing::error!("provider channel closed");
            self.state.push_log("[WARN] Request failed: provider stopped");
        }
    }
}

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config).context("init logging")?;

    let initial = std::env::args()
        .nth(1)
        .map(|arg| Route::parse(&arg))
        .unwrap_or(Route::Fixtures);
    tracing::info!(base_url = %config.api_base_url, route = %initial, "starting");

    let api = HttpMatchApi::new(&config).context("build api client")?;
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(api, tx, cmd_rx);

    let mut app = App::new(&config, cmd_tx);
    let command = app.state.navigate(initial);
    app.send(command);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("ui loop failed: {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, &app.state, &app.theme))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
