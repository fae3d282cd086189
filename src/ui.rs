use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use tui_roadmap::braille::BrailleCanvas;

/// Longest label printed over the map, in characters
const MAX_LABEL: usize = 24;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.highlighted {
        Some(name) => format!(" Road Map: {name} "),
        None => " Road Map ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor_pos = app
        .mouse_cell()
        .filter(|&(cx, cy)| cx < inner.width && cy < inner.height);
    frame.render_widget(MapWidget { app, cursor_pos }, inner);
}

/// Braille layers with the road labels overlaid
struct MapWidget<'a> {
    app: &'a App,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget<'_> {
    /// Draw one layer. Dots already on screen from lower layers are kept;
    /// the cell takes the color of the top layer.
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            let y = area.y + row as u16;
            for col in 0..cols {
                let bits = canvas.cell(col, row) as u32;
                if bits == 0 {
                    continue;
                }
                let x = area.x + col as u16;
                let cell = &mut buf[(x, y)];
                let below = cell
                    .symbol()
                    .chars()
                    .next()
                    .map(|c| c as u32)
                    .filter(|c| (0x2800..=0x28ff).contains(c))
                    .map_or(0, |c| c - 0x2800);
                let ch = char::from_u32(0x2800 + (bits | below)).unwrap_or(' ');
                cell.set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;
        for (ink, canvas) in app.layers.layers() {
            Self::render_layer(canvas, ink.color, area, buf);
        }

        if app.renderer.settings().show_labels {
            for label in app.renderer.labels() {
                let text: String = label.text.chars().take(MAX_LABEL).collect();
                let len = text.chars().count() as i32;
                let col = label.position.x / 2 - len / 2;
                let row = label.position.y / 4;
                if row < 0 || row >= area.height as i32 {
                    continue;
                }
                let style = Style::default()
                    .fg(app.layers.ink(label.pen).color)
                    .add_modifier(Modifier::BOLD);
                let y = area.y + row as u16;
                for (i, ch) in text.chars().enumerate() {
                    let c = col + i as i32;
                    if c < 0 || c >= area.width as i32 {
                        continue;
                    }
                    buf[(area.x + c as u16, y)].set_char(ch).set_style(style);
                }
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn toggle_span(on: bool, on_text: &'static str, off_text: &'static str) -> Span<'static> {
    Span::styled(
        if on { on_text } else { off_text },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = app.renderer.settings();
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_label(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", dim),
        Span::styled(app.scale_label(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", dim),
        Span::styled(app.orientation_label(), Style::default().fg(Color::Cyan)),
        Span::styled(" ", dim),
        Span::styled(app.view_mode(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        toggle_span(settings.show_squares, "[G]rid ", "[g]rid "),
        toggle_span(settings.show_areas, "[A]reas ", "[a]reas "),
        toggle_span(settings.show_labels, "[L]abels ", "[l]abels "),
    ];
    if app.refresh.is_frozen() {
        spans.push(Span::styled("FROZEN ", Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled("| ", dim));
    spans.push(Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom []:rotate v:3D u:units ⏎:highlight r:reset q:quit",
        dim,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
