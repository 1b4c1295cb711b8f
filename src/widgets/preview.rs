use crate::goals::preview::Preview;
use crate::theme::Theme;
use crate::widgets::themed_panel;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Summary panel of the entered values. Drawn only while the preview is visible.
pub struct PreviewWidget {
    pub preview: Preview,
    theme: Theme,
}

impl PreviewWidget {
    pub fn new(theme: Theme) -> Self {
        Self {
            preview: Preview::default(),
            theme,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.preview.visible
    }

    /// Height the panel needs, borders included.
    pub fn height(&self) -> u16 {
        if self.preview.visible {
            self.preview.rows.len() as u16 + 2
        } else {
            0
        }
    }
}

impl crate::widgets::Widget for PreviewWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        if !self.preview.visible || area.height == 0 {
            return;
        }
        let (body, bar) = self.theme.preview_item();
        let lines: Vec<Line> = self
            .preview
            .rows
            .iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled("▍ ", bar),
                    Span::styled(format!("{}: ", r.label), body.add_modifier(Modifier::BOLD)),
                    Span::styled(r.value.replace('\n', " "), body),
                ])
            })
            .collect();
        let block = themed_panel("Preview", focused, &self.theme);
        let p = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::preview::{build_preview, PreviewInputs};
    use crate::widgets::Widget;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn renders_rows_with_accent_bar() {
        let mut w = PreviewWidget::new(Theme::default());
        w.preview = build_preview(&PreviewInputs {
            goal: "retirement",
            goal_text: "Retirement",
            risk_label: "Moderate",
            amount: "500",
            ..Default::default()
        });
        assert_eq!(w.height(), 5);
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|f| w.render(f, Rect::new(0, 0, 40, 5), false, 0))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let row = |y: u16| -> String {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(1).contains("▍ Goal: Retirement"));
        assert!(row(2).contains("Risk Tolerance: Moderate"));
        assert!(row(3).contains("Investment Amount: $500"));
        assert_eq!(buf[(1, 1)].fg, Theme::default().accent);
    }

    #[test]
    fn hidden_preview_takes_no_space() {
        let w = PreviewWidget::new(Theme::default());
        assert!(!w.is_visible());
        assert_eq!(w.height(), 0);
    }
}
