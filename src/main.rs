mod bench;
mod view;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;

use podlink::logging::{self, LOG_DIR, LOG_FILE_PREFIX};
use podlink::{AccessoryEvent, LinkConfig};

use bench::Bench;
use view::BenchView;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging(LOG_DIR, LOG_FILE_PREFIX) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Podlink bench starting ===");

    let config = match std::env::args().nth(1) {
        Some(path) => LinkConfig::load(&path)
            .with_context(|| format!("failed to load link configuration from {}", path))?,
        None => LinkConfig::default(),
    };

    let (mut bench, events) = Bench::new(config);
    bench.note("press D to plug the accessory in, H for help");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut bench, events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Bench error");
    }

    tracing::info!("Podlink bench shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    bench: &mut Bench,
    mut events: UnboundedReceiver<AccessoryEvent>,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let frame_ms = FRAME_INTERVAL.as_millis() as u64;

    loop {
        terminal.draw(|f| BenchView::render(f, bench))?;

        tokio::select! {
            _ = frames.tick() => bench.step(frame_ms),
            Some(event) = events.recv() => bench.record(event),
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => bench.handle_key_event(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::warn!(error = %e, "Terminal input error"),
                None => break,
            },
        }

        if bench.should_quit {
            break;
        }
    }

    Ok(())
}
