use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use lever_core::{ChatKey, PendingSend};

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent, events: &UnboundedSender<AppEvent>) {
    match event {
        AppEvent::Key(key) => handle_key(app, key, events),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse, events),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(outcome) => {
            app.session.complete_send(outcome);
            app.scroll_to_bottom();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, events: &UnboundedSender<AppEvent>) {
    if key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    {
        app.should_quit = true;
        return;
    }

    let chat_key = if key.code == KeyCode::Enter { ChatKey::Enter } else { ChatKey::Other };
    if let Some(pending) = app.session.handle_key(chat_key) {
        start_send(app, pending, events);
        return;
    }

    match key.code {
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1) / 2),
        KeyCode::Backspace => edit_draft(app, |text, cursor| {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }),
        KeyCode::Delete => edit_draft(app, |text, cursor| {
            if *cursor < text.chars().count() {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }),
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.draft().text.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.session.draft().text.chars().count();
        }
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            edit_draft(app, |text, cursor| {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.insert(byte_pos, c);
                *cursor += 1;
            })
        }
        _ => {}
    }
}

/// Apply an edit to a copy of the draft and hand the full new value to the session.
fn edit_draft(app: &mut App, edit: impl FnOnce(&mut String, &mut usize)) {
    let mut text = app.session.draft().text.clone();
    let mut cursor = app.cursor.min(text.chars().count());
    edit(&mut text, &mut cursor);
    app.cursor = cursor;
    app.session.handle_input_change(text);
}

fn submit(app: &mut App, events: &UnboundedSender<AppEvent>) {
    if let Some(pending) = app.session.handle_submit() {
        start_send(app, pending, events);
    }
}

/// Run the request on a background task; the reply comes back as `AppEvent::Reply`.
fn start_send(app: &mut App, pending: PendingSend, events: &UnboundedSender<AppEvent>) {
    app.cursor = 0;
    // Scroll to bottom so "Thinking..." is visible
    app.scroll_to_bottom();

    debug!(url = app.proxy.url(), "sending prompt");
    let proxy = app.proxy.clone();
    let events = events.clone();
    tokio::spawn(async move {
        let outcome = proxy.send(&pending).await;
        let _ = events.send(AppEvent::Reply(outcome));
    });
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, events: &UnboundedSender<AppEvent>) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let on_send = app.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) if on_send => submit(app, events),
        _ => {}
    }
}
