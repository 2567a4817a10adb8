use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use blocklab_core::config::BuilderConfig;
use blocklab_core::gateway::HttpGateway;
use blocklab_core::logging;

use blocklab_tui::app::AppState;
use blocklab_tui::worker::{self, WorkerCommand};
use blocklab_tui::{input, persistence, ui};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_path = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let config = BuilderConfig::resolve(config_path.as_deref()).context("loading configuration")?;

    // Paths
    let state_dir = BuilderConfig::config_dir();
    let state_path = state_dir.join("state.json");
    let log_path = state_dir.join("blocklab-tui.log");
    logging::init_file(&log_path, &config.log_level)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    info!(api = %config.api_base_url, "starting editor");

    // Worker
    let gateway = HttpGateway::from_config(&config).context("building HTTP client")?;
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, Box::new(gateway))
        .context("spawning worker thread")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, &config, state_path.clone());
    persistence::apply(&mut app, persistence::load(&state_path));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %e, "failed to persist editor state");
    }

    // Shutdown worker; a save already queued still completes first.
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("editor closed");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp, Instant::now());
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Timers
        app.tick(Instant::now());

        if !app.running {
            break;
        }
    }
    Ok(())
}
