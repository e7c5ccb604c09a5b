use ratatui::layout::Rect;

use lever_core::{Author, ChatSession, Message, ProxyClient};

use crate::ui;

pub struct App {
    pub should_quit: bool,

    // Chat state (draft, history, loading)
    pub session: ChatSession,
    pub cursor: usize, // cursor position in the draft, in chars

    // Thread view
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the thread pane for scroll calculations
    pub chat_width: u16,  // Inner width of the thread pane for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_area: Option<Rect>,

    pub proxy: ProxyClient,
}

impl App {
    pub fn new(proxy: ProxyClient) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            chat_area: None,
            send_area: None,
            proxy,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    /// Scroll the thread so the newest message (or "Thinking...") is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        // Fall back to a sensible size before the first render
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        self.thread_height(wrap_width).saturating_sub(visible_height)
    }

    /// Number of terminal rows the thread occupies at `wrap_width` columns.
    pub fn thread_height(&self, wrap_width: u16) -> u16 {
        let rows = ui::thread_paragraph(self).line_count(wrap_width.max(1));
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

/// Text shown for a message. Completions usually open with blank lines; those
/// are not drawn.
pub fn display_text(message: &Message) -> &str {
    match message.author {
        Author::Ai => message.text.trim_start_matches('\n'),
        Author::User => &message.text,
    }
}
