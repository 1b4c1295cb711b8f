pub mod form;
pub mod form_widget;
pub mod preview;
pub mod status_bar;

use crate::app::AppMsg;
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders};

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64);
    fn on_key(&mut self, key: KeyCode) -> Vec<AppMsg> {
        let _ = key;
        Vec::new()
    }
}

/// Rounded panel whose border and title follow focus.
pub fn themed_panel<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let (border, title_style) = if focused {
        (theme.border_focused(), theme.text_active_bold())
    } else {
        (theme.border_unfocused(), theme.text_muted())
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(Span::styled(title, title_style))
}
