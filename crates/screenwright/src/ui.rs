use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use screencore::{render::render_element, Element, ElementKind, Session};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::config::Theme;
use crate::status::MessageType;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Editor area
            Constraint::Length(2), // Status bar
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);
    match app.session() {
        Some(session) => draw_structured(f, session, &app.config.theme, chunks[1]),
        None => draw_plain(f, app, chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let name = app
        .file_manager
        .current_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| String::from("[New File]"));
    let modified = if app.is_modified() { " [Modified]" } else { "" };
    let mode = if app.is_structured() {
        "STRUCTURED"
    } else {
        "PLAIN"
    };

    let title = Paragraph::new(format!("  Screenwright -- {}{}  {}", name, modified, mode))
        .style(Style::default().bg(Color::Blue).fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(title, area);
}

fn draw_plain(f: &mut Frame, app: &App, area: Rect) {
    let (cursor_line, cursor_col) = app.buffer.cursor_position();
    let offset = scroll_offset(cursor_line, area.height);

    let lines: Vec<Line> = (offset..app.buffer.line_count())
        .take(area.height as usize)
        .filter_map(|index| app.buffer.line(index))
        .map(Line::from)
        .collect();
    f.render_widget(Paragraph::new(lines), area);

    let prefix: String = app
        .buffer
        .line(cursor_line)
        .unwrap_or_default()
        .chars()
        .take(cursor_col)
        .collect();
    let x = area.x.saturating_add(prefix.width().min(u16::MAX as usize) as u16);
    let y = area.y + (cursor_line - offset) as u16;
    if x < area.x + area.width && y < area.y + area.height {
        f.set_cursor(x, y);
    }
}

fn draw_structured(f: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let cursor = session.cursor();
    let offset = cursor.map_or(0, |index| scroll_offset(index, area.height));
    let mut cursor_position = None;

    let lines: Vec<Line> = session
        .document()
        .iter()
        .enumerate()
        .skip(offset)
        .take(area.height as usize)
        .map(|(index, element)| {
            let focused = cursor == Some(index);
            let draft = focused.then(|| session.draft());
            let (text, placeholder) = display_text(element, draft);
            let column = column_for(element.kind, text.width(), area.width);

            if focused {
                let typed = if placeholder { 0 } else { text.width() };
                cursor_position = Some((column + typed, index - offset));
            }

            let mut style = kind_style(element.kind, theme);
            if placeholder {
                style = style.add_modifier(Modifier::DIM | Modifier::ITALIC);
            }
            if focused {
                style = style.bg(Color::DarkGray);
            }
            Line::from(vec![
                Span::raw(" ".repeat(column)),
                Span::styled(text, style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);

    if let Some((column, row)) = cursor_position {
        let x = area.x.saturating_add(column.min(u16::MAX as usize) as u16);
        let y = area.y + row as u16;
        if x < area.x + area.width && y < area.y + area.height {
            f.set_cursor(x, y);
        }
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let key = |label: &'static str| {
        Span::styled(
            label,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };
    let mut spans = Vec::new();
    match app.session() {
        Some(session) => {
            spans.push(Span::styled(
                format!("[{}] ", session.active_kind().label()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            spans.extend([
                key("Enter"),
                Span::raw(" Next  "),
                key("Tab"),
                Span::raw(" Cycle  "),
                key("Alt+1-7"),
                Span::raw(" Kind  "),
                key("^Z/^Y"),
                Span::raw(" Undo/Redo  "),
                key("^T"),
                Span::raw(" Plain"),
            ]);
            let suggestions = session.suggestions();
            if !suggestions.is_empty() {
                spans.push(Span::raw("  "));
                spans.push(key("^N"));
                spans.push(Span::raw(format!(" {}", suggestions.join(", "))));
            }
        }
        None => spans.extend([
            key("^T"),
            Span::raw(" Structured  "),
            key("^S"),
            Span::raw(" Save  "),
            key("^Q"),
            Span::raw(" Quit"),
        ]),
    }
    let shortcuts = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(shortcuts, chunks[0]);

    if let Some(message) = app.status.current() {
        let color = match message.message_type {
            MessageType::Info => Color::Cyan,
            MessageType::Success => Color::Green,
            MessageType::Warning => Color::Yellow,
            MessageType::Error => Color::Red,
        };
        let status = Paragraph::new(message.content.as_str()).style(Style::default().fg(color));
        f.render_widget(status, chunks[1]);
    }
}

/// The text to show for an element and whether it is placeholder text.
///
/// The focused element shows the draft as typed; others show their markup line.
fn display_text(element: &Element, draft: Option<&str>) -> (String, bool) {
    if element.is_blank() {
        let shown = if element.text().is_empty() {
            element.kind.placeholder()
        } else {
            element.text()
        };
        return (shown.to_string(), true);
    }
    match draft {
        Some(draft) => (draft.to_string(), false),
        None => (
            render_element(element).unwrap_or_else(|| element.text().to_string()),
            false,
        ),
    }
}

// Screenplay page layout, scaled down to the terminal.
fn column_for(kind: ElementKind, text_width: usize, area_width: u16) -> usize {
    let width = area_width as usize;
    let free = width.saturating_sub(text_width);
    let indent = match kind {
        ElementKind::SceneHeading | ElementKind::Action => 0,
        ElementKind::Character => 20,
        ElementKind::Parenthetical => 15,
        ElementKind::Dialogue => 10,
        ElementKind::Transition => free,
        ElementKind::Centered => free / 2,
    };
    indent.min(free)
}

fn scroll_offset(line: usize, height: u16) -> usize {
    line.saturating_sub((height as usize).saturating_sub(1))
}

fn kind_style(kind: ElementKind, theme: &Theme) -> Style {
    let base = match kind {
        ElementKind::SceneHeading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        ElementKind::Character => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ElementKind::Dialogue => Style::default().fg(Color::White),
        ElementKind::Parenthetical => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        ElementKind::Transition => Style::default().fg(Color::Magenta),
        ElementKind::Centered => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ElementKind::Action => Style::default(),
    };
    match theme.color_for(kind).and_then(|hex| hex.parse::<Color>().ok()) {
        Some(color) => base.fg(color),
        None => base,
    }
}
