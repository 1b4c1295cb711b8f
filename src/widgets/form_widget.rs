use crate::app::AppMsg;
use crate::goals::FieldId;
use crate::theme::Theme;
use crate::widgets::form::{draw_form, FieldKind, FormState, OPTIONS_VISIBLE};
use crossterm::event::KeyCode;
use ratatui::crossterm::event as rt_event;
use ratatui::prelude::*;
use tui_textarea::TextArea;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Focus {
    Text,
    TextArea,
    Select,
    Slider,
    Submit,
    Other,
}

pub struct FormWidget {
    pub form: FormState,
    theme: Theme,
    editor: Option<TextArea<'static>>,
}

fn editor_block(label: &str) -> ratatui::widgets::Block<'static> {
    ratatui::widgets::Block::default()
        .borders(ratatui::widgets::Borders::ALL)
        .title(format!("Editing: {label} — Ctrl+S Save • Esc Cancel"))
}

impl FormWidget {
    pub fn new(form: FormState, theme: Theme) -> Self {
        Self {
            form,
            theme,
            editor: None,
        }
    }

    fn focus(&self) -> Focus {
        match self.form.fields.get(self.form.selected).map(|f| &f.kind) {
            Some(FieldKind::Text) => Focus::Text,
            Some(FieldKind::TextArea { .. }) => Focus::TextArea,
            Some(FieldKind::Select { .. }) => Focus::Select,
            Some(FieldKind::Slider { .. }) => Focus::Slider,
            Some(FieldKind::Hidden) => Focus::Other,
            None => Focus::Submit,
        }
    }

    pub fn editing_textarea(&self) -> bool {
        self.form.editing && self.focus() == Focus::TextArea
    }

    fn open_textarea(&mut self) {
        let Some(fld) = self.form.fields.get(self.form.selected) else {
            return;
        };
        let mut ta = TextArea::default();
        if !fld.value.is_empty() {
            ta.insert_str(&fld.value);
        }
        ta.set_block(editor_block(&fld.label));
        self.editor = Some(ta);
        self.form.editing = true;
    }

    /// Saves the overlay editor into the custom goal field.
    pub fn commit_textarea(&mut self) -> Vec<AppMsg> {
        if !self.editing_textarea() {
            return Vec::new();
        }
        let Some(ta) = self.editor.take() else {
            return Vec::new();
        };
        let text = ta.lines().join("\n");
        let sel = self.form.selected;
        let mut msgs = Vec::new();
        if let Some(fld) = self.form.fields.get_mut(sel) {
            fld.value = text;
            msgs.push(AppMsg::FieldInput(fld.id));
            msgs.push(AppMsg::FieldChange(fld.id));
        }
        self.form.editing = false;
        msgs
    }

    pub fn cancel_textarea(&mut self) -> bool {
        if !self.editing_textarea() {
            return false;
        }
        self.editor = None;
        self.form.editing = false;
        true
    }

    /// Inserts pasted text into the focused text field as one input event.
    pub fn paste(&mut self, text: &str) -> Vec<AppMsg> {
        if self.editing_textarea() {
            if let Some(ta) = self.editor.as_mut() {
                ta.insert_str(text);
            }
            return Vec::new();
        }
        let sel = self.form.selected;
        match self.form.fields.get_mut(sel) {
            Some(fld) if matches!(fld.kind, FieldKind::Text) => {
                fld.value.push_str(text.trim_end_matches(['\r', '\n']));
                self.form.editing = true;
                vec![AppMsg::FieldInput(fld.id)]
            }
            _ => Vec::new(),
        }
    }

    fn finish_text_edit(&mut self) -> Vec<AppMsg> {
        let mut msgs = Vec::new();
        if self.form.editing {
            if let Some(fld) = self.form.fields.get(self.form.selected) {
                if matches!(fld.kind, FieldKind::Text) {
                    msgs.push(AppMsg::FieldChange(fld.id));
                }
            }
            self.form.editing = false;
        }
        msgs
    }

    fn shift_focus(&mut self, forward: bool) -> Vec<AppMsg> {
        let mut msgs = self.finish_text_edit();
        let prev = self.form.focused_field();
        if self.form.move_focus(forward) {
            if let Some(id) = prev {
                msgs.push(AppMsg::FieldBlur(id));
            }
        }
        msgs
    }

    fn step_slider(&mut self, up: bool) -> Vec<AppMsg> {
        let sel = self.form.selected;
        if let Some(fld) = self.form.fields.get(sel) {
            if let FieldKind::Slider { max, position } = fld.kind {
                let next = if up {
                    (position + 1).min(max)
                } else {
                    position.saturating_sub(1)
                };
                if next != position {
                    self.form.set_slider(next);
                    return vec![AppMsg::RiskInput(next)];
                }
            }
        }
        Vec::new()
    }

    fn quick_select(&mut self, forward: bool) -> Vec<AppMsg> {
        let sel = self.form.selected;
        let Some(fld) = self.form.fields.get_mut(sel) else {
            return Vec::new();
        };
        let next = match &fld.kind {
            FieldKind::Select {
                options, selected, ..
            } if !options.is_empty() => {
                if forward {
                    (selected + 1) % options.len()
                } else if *selected == 0 {
                    options.len() - 1
                } else {
                    selected - 1
                }
            }
            _ => return Vec::new(),
        };
        fld.commit_option(next);
        if let FieldKind::Select { cursor, .. } = &mut fld.kind {
            *cursor = next;
        }
        vec![AppMsg::FieldInput(fld.id), AppMsg::FieldChange(fld.id)]
    }

    fn forward_to_editor(&mut self, key: KeyCode) -> bool {
        if !self.editing_textarea() {
            return false;
        }
        let code = match key {
            KeyCode::Up => rt_event::KeyCode::Up,
            KeyCode::Down => rt_event::KeyCode::Down,
            KeyCode::Left => rt_event::KeyCode::Left,
            KeyCode::Right => rt_event::KeyCode::Right,
            KeyCode::Enter => rt_event::KeyCode::Enter,
            KeyCode::Backspace => rt_event::KeyCode::Backspace,
            KeyCode::Delete => rt_event::KeyCode::Delete,
            KeyCode::Home => rt_event::KeyCode::Home,
            KeyCode::End => rt_event::KeyCode::End,
            KeyCode::Tab => rt_event::KeyCode::Tab,
            KeyCode::Char(c) => rt_event::KeyCode::Char(c),
            _ => return false,
        };
        if let Some(ta) = self.editor.as_mut() {
            let _ = ta.input(rt_event::KeyEvent::new(code, rt_event::KeyModifiers::NONE));
        }
        true
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

impl crate::widgets::Widget for FormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64) {
        // Suppress the field cursor while the overlay editor owns input
        let cursor_on = tick % 2 == 0 && !self.editing_textarea();
        draw_form(f, area, &self.form, &self.theme, focused, cursor_on, tick);
        if self.editing_textarea() {
            if let Some(ta) = self.editor.as_ref() {
                let rect = centered_rect(80, 70, area);
                f.render_widget(ratatui::widgets::Clear, rect);
                f.render_widget(ta, rect);
            }
        }
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<AppMsg> {
        if key == KeyCode::Esc && self.cancel_textarea() {
            return Vec::new();
        }
        if self.forward_to_editor(key) {
            return Vec::new();
        }
        let sel = self.form.selected;
        let focus = self.focus();
        match key {
            KeyCode::Up | KeyCode::Down => {
                let down = key == KeyCode::Down;
                if self.form.editing {
                    if let Some(fld) = self.form.fields.get_mut(sel) {
                        if let FieldKind::Select {
                            cursor,
                            options,
                            offset,
                            ..
                        } = &mut fld.kind
                        {
                            if down && *cursor + 1 < options.len() {
                                *cursor += 1;
                            } else if !down && *cursor > 0 {
                                *cursor -= 1;
                            }
                            if *cursor < *offset {
                                *offset = *cursor;
                            }
                            if *cursor >= *offset + OPTIONS_VISIBLE {
                                *offset = *cursor + 1 - OPTIONS_VISIBLE;
                            }
                            return Vec::new();
                        }
                    }
                }
                self.shift_focus(down)
            }
            KeyCode::Tab => self.shift_focus(true),
            KeyCode::BackTab => self.shift_focus(false),
            KeyCode::Left | KeyCode::Right => {
                let right = key == KeyCode::Right;
                match focus {
                    Focus::Slider => self.step_slider(right),
                    Focus::Select if !self.form.editing => self.quick_select(right),
                    _ => Vec::new(),
                }
            }
            KeyCode::Enter => {
                let editing = self.form.editing;
                match focus {
                    Focus::Submit if self.form.disabled => Vec::new(),
                    Focus::Submit => vec![AppMsg::Submit],
                    Focus::Text => {
                        if editing {
                            self.finish_text_edit()
                        } else {
                            self.form.editing = true;
                            Vec::new()
                        }
                    }
                    Focus::TextArea => {
                        self.open_textarea();
                        Vec::new()
                    }
                    Focus::Select => {
                        let Some(fld) = self.form.fields.get_mut(sel) else {
                            return Vec::new();
                        };
                        if editing {
                            let cursor = match &fld.kind {
                                FieldKind::Select { cursor, .. } => *cursor,
                                _ => 0,
                            };
                            fld.commit_option(cursor);
                            self.form.editing = false;
                            vec![AppMsg::FieldInput(fld.id), AppMsg::FieldChange(fld.id)]
                        } else {
                            if let FieldKind::Select {
                                cursor, selected, ..
                            } = &mut fld.kind
                            {
                                *cursor = *selected;
                            }
                            self.form.editing = true;
                            Vec::new()
                        }
                    }
                    _ => Vec::new(),
                }
            }
            KeyCode::Esc => {
                if focus == Focus::Select {
                    self.form.editing = false;
                    Vec::new()
                } else {
                    self.finish_text_edit()
                }
            }
            KeyCode::Backspace => {
                if !self.form.editing {
                    return Vec::new();
                }
                match self.form.fields.get_mut(sel) {
                    Some(fld) if matches!(fld.kind, FieldKind::Text) => {
                        fld.value.pop();
                        vec![AppMsg::FieldInput(fld.id)]
                    }
                    _ => Vec::new(),
                }
            }
            KeyCode::Char(c) => match self.form.fields.get_mut(sel) {
                Some(fld) if matches!(fld.kind, FieldKind::Text) => {
                    // Typing on a focused text field starts editing it
                    self.form.editing = true;
                    fld.value.push(c);
                    vec![AppMsg::FieldInput(fld.id)]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// Field that currently owns keyboard focus, for status hints.
pub fn focus_hint(form: &FormState) -> &'static str {
    match form.focused_field() {
        Some(FieldId::RiskSlider) => "←/→ adjust risk",
        Some(FieldId::Goal) | Some(FieldId::Timeline) => {
            if form.editing {
                "↑/↓ choose  Enter pick  Esc close"
            } else {
                "←/→ cycle  Enter open list"
            }
        }
        Some(FieldId::Amount) => "type digits  Ctrl+V paste  Enter done",
        Some(FieldId::CustomGoal) => "Enter edit",
        Some(FieldId::Risk) => "",
        None => "Enter submit",
    }
}
