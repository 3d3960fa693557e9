use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use jmc_flame_core::config::Config;
use jmc_flame_core::model::{CallForest, FlameSession, NodeDetail, NodeId, ViewAction};
use jmc_flame_core::views::{LabelPolicy, Orientation, render_tooltip};
use jmc_flame_protocol::{Point, RenderCommand, TextAlign, ThemeToken, ViewEvent, Viewport};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::{Buffer, Cell},
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Paragraph},
};

const DOUBLE_CLICK: Duration = Duration::from_millis(400);

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::Border => Color::DarkGray,
        ThemeToken::TextPrimary => Color::Black,
        ThemeToken::TextMuted => Color::Gray,
        ThemeToken::TooltipText => Color::Black,
        ThemeToken::StatusBarBackground => Color::DarkGray,
        ThemeToken::StatusBarText => Color::White,
    }
}

fn fill_to_color(fill: jmc_flame_protocol::Color) -> Color {
    Color::Rgb(fill.r, fill.g, fill.b)
}

/// Dark text on light fills, light text on dark fills.
fn text_on(bg: Color, preferred: Color) -> Color {
    match bg {
        Color::Rgb(r, g, b) if jmc_flame_protocol::Color::rgb(r, g, b).luma() < 0.5 => Color::White,
        _ => preferred,
    }
}

/// Rows 1..h-1 of the terminal; row 0 is the title bar, the last row the status bar.
fn content_area(width: u16, height: u16) -> Rect {
    Rect::new(0, 1, width, height.saturating_sub(2))
}

/// One cell per sample-width unit, and at least one row per call level so
/// deep stacks scroll instead of collapsing.
fn viewport_for(forest: &CallForest, content: Rect) -> Viewport {
    let rows = usize::from(content.height).max(forest.depth()).max(1);
    Viewport::new(f64::from(content.width.max(1)), rows as f64)
}

/// An open view on the stack: its session, cached commands and scroll offset.
struct View {
    session: FlameSession,
    commands: Vec<RenderCommand>,
    scroll_y: f64,
}

impl View {
    fn new(session: FlameSession, config: &Config, labels: &LabelPolicy, content: Rect) -> Self {
        let commands = session.render(&config.colors, labels);
        let overflow = (session.layout().viewport.height - f64::from(content.height)).max(0.0);
        // Start where the roots are.
        let scroll_y = match session.layout().orientation {
            Orientation::BottomUp => overflow,
            Orientation::TopDown => 0.0,
        };
        Self {
            session,
            commands,
            scroll_y,
        }
    }

    fn max_scroll(&self, content: Rect) -> f64 {
        (self.session.layout().viewport.height - f64::from(content.height)).max(0.0)
    }
}

struct Viewer<'a> {
    config: &'a Config,
    labels: LabelPolicy,
    content: Rect,
    views: Vec<View>,
    hovered: Option<NodeId>,
    pointer: Option<Point>,
    detail: Option<NodeDetail>,
    status: Option<String>,
    last_click: Option<(NodeId, Instant)>,
}

impl<'a> Viewer<'a> {
    fn new(forest: CallForest, config: &'a Config, content: Rect) -> Result<Self> {
        let labels = LabelPolicy::terminal();
        let viewport = viewport_for(&forest, content);
        let session = FlameSession::new(forest, viewport, config.view.orientation)?;
        let root = View::new(session, config, &labels, content);
        Ok(Self {
            config,
            labels,
            content,
            views: vec![root],
            hovered: None,
            pointer: None,
            detail: None,
            status: None,
            last_click: None,
        })
    }

    fn top(&self) -> Option<&View> {
        self.views.last()
    }

    fn clear_hover(&mut self) {
        self.hovered = None;
        self.pointer = None;
        self.detail = None;
        self.last_click = None;
    }

    /// Lay every open view out again for a new terminal size.
    fn resize(&mut self, content: Rect) {
        self.content = content;
        let Some(root) = self.views.first() else {
            return;
        };
        let viewport = viewport_for(root.session.forest(), content);
        let orientation = self.config.view.orientation;
        for view in &mut self.views {
            match FlameSession::new(view.session.forest().clone(), viewport, orientation) {
                Ok(session) => *view = View::new(session, self.config, &self.labels, content),
                Err(err) => tracing::warn!("keeping previous layout: {err}"),
            }
        }
        self.clear_hover();
    }

    fn open(&mut self, session: FlameSession) {
        tracing::debug!(title = session.title(), depth = self.views.len() + 1, "opened view");
        let view = View::new(session, self.config, &self.labels, self.content);
        self.views.push(view);
        self.status = None;
        self.clear_hover();
    }

    /// Close the top view. Returns `true` when no views are left.
    fn close_top(&mut self) -> bool {
        if self.views.len() <= 1 {
            return true;
        }
        self.views.pop();
        self.status = None;
        self.clear_hover();
        false
    }

    fn scroll(&mut self, rows: f64) {
        let content = self.content;
        if let Some(view) = self.views.last_mut() {
            view.scroll_y = (view.scroll_y + rows).clamp(0.0, view.max_scroll(content));
        }
        self.clear_hover();
    }

    fn dispatch(&mut self, event: ViewEvent) {
        let action = match self.top() {
            Some(view) => view.session.handle_event(event),
            None => return,
        };
        match action {
            Ok(ViewAction::ShowDetail(detail)) => self.detail = Some(detail),
            Ok(ViewAction::HideDetail) => self.detail = None,
            Ok(ViewAction::OpenView(session)) => self.open(*session),
            Ok(ViewAction::Ignore) => {}
            Err(err) => {
                tracing::warn!("zoom failed: {err}");
                self.status = Some(format!("cannot zoom: {err}"));
            }
        }
    }

    /// Terminal cell to view coordinates (cell centres).
    fn to_view_point(&self, column: u16, row: u16) -> Option<Point> {
        let view = self.top()?;
        let c = self.content;
        if column < c.x || column >= c.x + c.width || row < c.y || row >= c.y + c.height {
            return None;
        }
        Some(Point::new(
            f64::from(column - c.x) + 0.5,
            f64::from(row - c.y) + view.scroll_y + 0.5,
        ))
    }

    fn hover(&mut self, column: u16, row: u16) {
        let pointer = self.to_view_point(column, row);
        let hit = pointer.and_then(|p| self.top().and_then(|v| v.session.layout().hit_test(p)));
        self.pointer = pointer;
        if hit == self.hovered {
            return;
        }
        if self.hovered.is_some() {
            self.dispatch(ViewEvent::Leave);
        }
        self.hovered = hit;
        if let Some(id) = hit {
            self.dispatch(ViewEvent::Enter(id.frame_id()));
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        self.hover(column, row);
        let Some(id) = self.hovered else {
            return;
        };
        let now = Instant::now();
        match self.last_click {
            Some((prev, at)) if prev == id && now.duration_since(at) <= DOUBLE_CLICK => {
                self.last_click = None;
                self.dispatch(ViewEvent::Activate(id.frame_id()));
            }
            _ => self.last_click = Some((id, now)),
        }
    }

    fn activate_hovered(&mut self) {
        if let Some(id) = self.hovered {
            self.dispatch(ViewEvent::Activate(id.frame_id()));
        }
    }

    fn title_line(&self) -> String {
        let Some(view) = self.top() else {
            return String::new();
        };
        format!(
            " jmc-flame | {} | view {} | {} samples | dbl-click/Enter zoom | Esc back | q quit ",
            view.session.title(),
            self.views.len(),
            view.session.forest().total_samples(),
        )
    }

    /// The part of the top view currently on screen.
    fn visible_viewport(&self, view: &View) -> Viewport {
        let full = view.session.layout().viewport;
        Viewport {
            y: full.y + view.scroll_y,
            height: f64::from(self.content.height).min(full.height),
            ..full
        }
    }

    /// Tooltip for the hovered node, placed against the visible rows so it
    /// never lands above the first one.
    fn tooltip(&self) -> Vec<RenderCommand> {
        match (self.top(), &self.detail, self.pointer) {
            (Some(view), Some(detail), Some(pointer)) => {
                render_tooltip(detail, pointer, &self.visible_viewport(view), &self.labels)
            }
            _ => Vec::new(),
        }
    }

    /// Status text and its colour: errors and details in full, otherwise a
    /// muted hint.
    fn status_line(&self) -> (String, ThemeToken) {
        if let Some(status) = &self.status {
            return (status.clone(), ThemeToken::StatusBarText);
        }
        match &self.detail {
            Some(detail) => (detail.to_string(), ThemeToken::StatusBarText),
            None => ("hover a frame for details".to_string(), ThemeToken::TextMuted),
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let Some(view) = self.top() else {
            return;
        };

        let bar = Style::default()
            .fg(theme_to_color(ThemeToken::StatusBarText))
            .bg(theme_to_color(ThemeToken::StatusBarBackground));
        frame.render_widget(
            Paragraph::new(self.title_line()).style(bar),
            Rect::new(0, 0, area.width, 1),
        );

        let content = self.content.intersection(area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme_to_color(ThemeToken::Background))),
            content,
        );
        draw_commands(frame.buffer_mut(), content, &view.commands, view.scroll_y);
        draw_commands(frame.buffer_mut(), content, &self.tooltip(), view.scroll_y);

        let (status, token) = self.status_line();
        if area.height > 1 {
            frame.render_widget(
                Paragraph::new(format!(" {status}")).style(bar.fg(theme_to_color(token))),
                Rect::new(0, area.height - 1, area.width, 1),
            );
        }
    }
}

fn cell_at(buf: &mut Buffer, content: Rect, col: i64, row: i64) -> Option<&mut Cell> {
    if col < 0 || row < 0 || col >= i64::from(content.width) || row >= i64::from(content.height) {
        return None;
    }
    buf.cell_mut((content.x + col as u16, content.y + row as u16))
}

/// Rasterize render commands into terminal cells. View coordinates are
/// cells already; `scroll_y` rows are skipped at the top.
fn draw_commands(buf: &mut Buffer, content: Rect, commands: &[RenderCommand], scroll_y: f64) {
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                border_color,
                ..
            } => {
                let x0 = rect.x.round() as i64;
                let x1 = rect.right().round() as i64;
                let y0 = (rect.y - scroll_y).round() as i64;
                let y1 = (rect.bottom() - scroll_y).round() as i64;
                let bg = fill_to_color(*fill);
                for row in y0..y1 {
                    for col in x0..x1 {
                        if let Some(c) = cell_at(buf, content, col, row) {
                            c.set_char(' ').set_bg(bg);
                        }
                    }
                    // A thin left edge keeps same-coloured siblings apart.
                    if let Some(border) = border_color.filter(|_| x1 - x0 >= 2) {
                        if let Some(c) = cell_at(buf, content, x0, row) {
                            c.set_char('▏').set_fg(theme_to_color(border));
                        }
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let len = text.chars().count() as f64;
                let start = match align {
                    TextAlign::Left => position.x,
                    TextAlign::Center => position.x - len / 2.0,
                    TextAlign::Right => position.x - len,
                };
                let row = (position.y - scroll_y).floor() as i64;
                let col0 = start.round() as i64;
                for (i, ch) in text.chars().enumerate() {
                    if let Some(c) = cell_at(buf, content, col0 + i as i64, row) {
                        let fg = text_on(c.bg, theme_to_color(*color));
                        c.set_char(ch).set_fg(fg);
                    }
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

pub fn run(forest: CallForest, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, forest, config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    forest: CallForest,
    config: &Config,
) -> Result<()> {
    let size = terminal.size()?;
    let mut viewer = Viewer::new(forest, config, content_area(size.width, size.height))?;

    loop {
        let size = terminal.size()?;
        let content = content_area(size.width, size.height);
        if content != viewer.content {
            viewer.resize(content);
        }

        terminal.draw(|frame| viewer.draw(frame))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Esc | KeyCode::Backspace => {
                    if viewer.close_top() {
                        break;
                    }
                }
                KeyCode::Enter => viewer.activate_hovered(),
                KeyCode::Up => viewer.scroll(-1.0),
                KeyCode::Down => viewer.scroll(1.0),
                KeyCode::PageUp => viewer.scroll(-f64::from(viewer.content.height)),
                KeyCode::PageDown => viewer.scroll(f64::from(viewer.content.height)),
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved => viewer.hover(mouse.column, mouse.row),
                MouseEventKind::Down(MouseButton::Left) => viewer.click(mouse.column, mouse.row),
                MouseEventKind::ScrollUp => viewer.scroll(-1.0),
                MouseEventKind::ScrollDown => viewer.scroll(1.0),
                _ => {}
            },
            _ => {}
        }
    }
    Ok(())
}
