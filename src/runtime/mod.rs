use std::io::{self, Stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::source::{Poller, SourceMsg};

mod event_loop;
mod logging;
mod settings;
mod startup;
mod timers;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    let log_file = logging::init_logging(&settings.logging)?;
    info!(log_file = %log_file.display(), source = ?settings.source.kind, "tunecard starting");
    if let Some(problem) = config_problem {
        warn!(%problem, "config rejected, running with defaults");
    }

    let http = startup::build_http_client()?;
    let source = startup::build_source(&settings, &http)?;
    let artwork = startup::artwork_loader(&settings, &http);

    let (tx, rx) = mpsc::channel::<SourceMsg>();
    let poller = Poller::spawn(
        source,
        artwork,
        Duration::from_millis(settings.source.poll_interval_ms),
        tx,
    );

    let mut terminal = setup_terminal()?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings, Instant::now());
        event_loop::run(&mut terminal, &mut state, &poller, &rx)
    })();

    // Late results from an in-flight fetch are discarded with the receiver.
    poller.shutdown();
    drop(rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("tunecard stopped");
    run_result
}

/// Enter raw mode and the alternate screen. A failure part way leaves the
/// terminal as it was found.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    undo_on_err(execute!(stdout, EnterAlternateScreen), || {
        let _ = disable_raw_mode();
    })?;
    let terminal = undo_on_err(Terminal::new(CrosstermBackend::new(stdout)), || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;
    Ok(terminal)
}

/// Run `undo` when `result` is an error, then hand the result back.
fn undo_on_err<T, E>(result: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        undo();
    }
    result
}
