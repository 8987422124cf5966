// tabdash-cli/src/main.rs
mod app;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tabdash_core::{
    Canvas, ConfigFile, EventBus, JsonFileStorage, MemoryStorage, SettingsStorage, SettingsStore,
    WidgetRegistry, config::LoggingConfig,
};

use crate::app::App;

#[derive(Debug, Default)]
struct Args {
    settings: Option<PathBuf>,
    ephemeral: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    for arg in args {
        if arg == "--ephemeral" {
            parsed.ephemeral = true;
        } else if let Some(path) = arg.strip_prefix("--settings=") {
            parsed.settings = Some(PathBuf::from(path));
        } else {
            eprintln!("Warning: ignoring unknown argument '{}'", arg);
        }
    }
    parsed
}

/// Route tracing output to a file; the terminal belongs to the UI.
/// The returned guard flushes pending lines when dropped.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let path = config
        .file
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("tabdash").join("tabdash.log")))?;
    let dir = path.parent()?;
    let file_name = path.file_name()?;
    std::fs::create_dir_all(dir).ok()?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn open_storage(args: &Args, config: &ConfigFile) -> Result<Box<dyn SettingsStorage>, Box<dyn std::error::Error>> {
    if args.ephemeral {
        tracing::info!("using in-memory settings, nothing will be saved to disk");
        return Ok(Box::new(MemoryStorage::new()));
    }

    let path = match args.settings.clone().or_else(|| config.storage.path.clone()) {
        Some(path) => path,
        None => JsonFileStorage::default_path()?,
    };
    tracing::info!(path = %path.display(), "using settings file");
    Ok(Box::new(JsonFileStorage::new(path)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args(std::env::args().skip(1));

    // Load config
    let (config, config_error) = match ConfigFile::load() {
        Ok(config) => (config, None),
        Err(e) => (ConfigFile::default(), Some(e)),
    };
    let _log_guard = init_logging(&config.logging);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "failed to load config, using defaults");
    }

    // Built-in widgets register themselves at link time
    tracing::debug!(builtin = ?tabdash_widgets::BUILTIN_WIDGETS, "discovering widgets");
    let registry = WidgetRegistry::discover();
    if !registry.duplicate_ids().is_empty() {
        tracing::warn!(ids = ?registry.duplicate_ids(), "duplicate widget ids ignored");
    }

    let storage = open_storage(&args, &config)?;
    let bus = EventBus::new();
    let (_settings_sub, settings_events) = bus.subscribe("settings.*");
    let mut store = SettingsStore::with_options(storage, bus, config.settings.store_options());
    store.load_settings(&registry);

    let canvas = Canvas::new(config.canvas.drag_persistence());
    let mut app = App::new(store, registry, canvas, config.canvas.default_widget_size());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &settings_events);

    // Cleanup
    for container in app.containers.values_mut() {
        container.unmount();
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    settings_events: &crossbeam::channel::Receiver<tabdash_core::BusEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    while !app.should_quit {
        while let Ok(event) = settings_events.try_recv() {
            app.handle_bus_event(&event);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        // Handle input with timeout
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                // Only handle key press events, not key release
                CEvent::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                CEvent::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        // Update widgets on tick
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
