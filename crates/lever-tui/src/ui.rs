use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use unicode_width::UnicodeWidthChar;

use lever_core::Author;

use crate::app::{display_text, App};

const PLACEHOLDER: &str = "Ask Lever AI...";

fn author_style(author: Author) -> Style {
    let color = match author {
        Author::User => Color::Cyan,
        Author::Ai => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, thread, input row, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(10),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.send_area = Some(send_area);

    render_header(app, frame, header_area);
    render_thread(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_send_button(app, frame, send_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Lever AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(app.proxy.url().to_string(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_thread(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store thread dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let thread = thread_paragraph(app)
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(thread, area);
}

/// The thread as drawn inside its border. Scroll limits are measured on this
/// same paragraph so they follow its word wrapping.
pub fn thread_paragraph(app: &App) -> Paragraph<'static> {
    let history = app.session.history();
    let loading = app.session.loading();

    let text = if history.is_empty() && !loading {
        Text::from(Span::styled(
            "Type a message and press Enter to send.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in history {
            lines.push(Line::from(Span::styled(
                format!("{}:", msg.author.display_name()),
                author_style(msg.author),
            )));
            // Keep the message's own line breaks
            for line in display_text(msg).lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if loading {
            lines.push(Line::from(Span::styled(
                format!("{}:", Author::Ai.display_name()),
                author_style(Author::Ai),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(text).wrap(Wrap { trim: false })
}

/// Visible part of the draft and the cursor column for a box `width` columns
/// wide. Measured in terminal columns, so wide characters take two.
fn visible_draft(draft: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());

    // Scroll right until the cursor cell fits inside the box
    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(|c| c.width().unwrap_or(0)).sum();
    while start < cursor && cursor_col >= width {
        cursor_col -= chars[start].width().unwrap_or(0);
        start += 1;
    }

    let mut used = 0;
    let visible = chars[start..]
        .iter()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect();

    (visible, cursor_col as u16)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.session.loading() { Color::DarkGray } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let draft = &app.session.draft().text;

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = visible_draft(draft, app.cursor, inner_width);

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_send_button(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = !app.session.loading() && !app.session.draft().text.is_empty();
    let style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Green).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let button = Paragraph::new(Span::styled(" Send ", style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, status_style) = if app.session.loading() {
        (" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![
        Span::styled(status_text, status_style),
        Span::raw(" "),
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    let count = app.session.history().len();
    if count > 0 {
        spans.push(Span::styled(
            format!("  {} messages", count),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
