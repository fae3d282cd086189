mod app;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::LevelFilter;
use ratatui::DefaultTerminal;
use tui_roadmap::config::RenderConfig;
use tui_roadmap::data;
use tui_roadmap::geo::GeoPosition;
use tui_roadmap::map::RoadMap;
use tui_roadmap::style::StyleSheet;

/// Longest the loop sleeps when no repaint is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "tui-roadmap")]
#[command(about = "Vector road map in the terminal, drawn with Braille dots")]
#[command(version)]
struct Cli {
    /// GeoJSON file or directory of GeoJSON files; a synthetic city is
    /// shown when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// JSON rendering configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output goes here; the terminal belongs to the map
    #[arg(long, default_value = "tui-roadmap.log")]
    log_file: PathBuf,

    /// More log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let file = File::create(&cli.log_file)
        .with_context(|| format!("cannot create log file {}", cli.log_file.display()))?;
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = RenderConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let style = StyleSheet::road_defaults(config.projection_areas);
    let map = match &cli.data {
        Some(path) => data::load_roads(path, &style)
            .with_context(|| format!("loading map data from {}", path.display()))?,
        None => data::sample_network(GeoPosition::from_degrees(-81.38, 28.54), &style),
    };

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &config, map, style);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_at(mouse.column, mouse.row, true),
        MouseEventKind::ScrollDown => app.zoom_at(mouse.column, mouse.row, false),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.start_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: &RenderConfig, map: RoadMap, style: StyleSheet) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, map, style, size.width as usize, size.height as usize);
    let mut redraw = true;

    loop {
        if app.tick(Instant::now()) {
            redraw = true;
        }
        if redraw {
            terminal.draw(|frame| ui::render(frame, &app))?;
            redraw = false;
        }

        let timeout = app.refresh.time_until_due(Instant::now()).unwrap_or(IDLE_POLL);
        if !event::poll(timeout)? {
            continue;
        }
        redraw = true;
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                // Pan with hjkl or arrow keys
                KeyCode::Left | KeyCode::Char('h') => app.pan(-20, 0),
                KeyCode::Right | KeyCode::Char('l') => app.pan(20, 0),
                KeyCode::Up | KeyCode::Char('k') => app.pan(0, -12),
                KeyCode::Down | KeyCode::Char('j') => app.pan(0, 12),

                // Zoom
                KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                // Camera
                KeyCode::Char('[') => app.rotate(false),
                KeyCode::Char(']') => app.rotate(true),
                KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_3d(),
                KeyCode::PageUp => app.move_horizon(true),
                KeyCode::PageDown => app.move_horizon(false),

                // Display toggles
                KeyCode::Char('u') | KeyCode::Char('U') => app.toggle_units(),
                KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_squares(),
                KeyCode::Char('a') | KeyCode::Char('A') => app.toggle_areas(),
                KeyCode::Char('L') => app.toggle_labels(),
                KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_freeze(),

                KeyCode::Enter => app.highlight_at_cursor(),
                KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),
                _ => redraw = false,
            },
            Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
            Event::Resize(width, height) => app.resize(width as usize, height as usize),
            _ => redraw = false,
        }

        if app.should_quit {
            break;
        }
    }

    log::info!("Exiting");
    Ok(())
}
