use crate::goals::amount::format_amount_input;
use crate::goals::preview::PreviewInputs;
use crate::goals::risk::{apply_risk, RiskSink};
use crate::goals::submission::Submission;
use crate::goals::validate::FieldMark;
use crate::goals::FieldId;
use crate::model::{FormConfig, OptionItem, OptionalField};
use crate::theme::Theme;
use crate::widgets::themed_panel;
use ratatui::prelude::*;
use ratatui::widgets::*;

#[derive(Clone, Debug)]
pub enum FieldKind {
    Text,
    // Multi-line text edited through the overlay editor
    TextArea {
        edit_lines: usize,
    },
    Select {
        options: Vec<String>,
        values: Vec<String>,
        cursor: usize,
        selected: usize,
        offset: usize,
    },
    Slider {
        max: usize,
        position: usize,
    },
    // Submitted but never drawn or focused
    Hidden,
}

pub const OPTIONS_VISIBLE: usize = 8;
pub const SUBMIT_LABEL: &str = "Get Recommendations";
pub const SUBMITTING_LABEL: &str = "Submitting…";

#[derive(Clone, Debug)]
pub struct FormField {
    pub id: FieldId,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
    pub value: String,
    pub mark: FieldMark,
}

impl FormField {
    fn new(id: FieldId, label: &str, kind: FieldKind) -> Self {
        Self {
            id,
            label: label.to_string(),
            required: false,
            kind,
            value: String::new(),
            mark: FieldMark::valid(),
        }
    }

    fn select(id: FieldId, label: &str, placeholder: &str, items: &[OptionItem]) -> Self {
        let mut options = vec![placeholder.to_string()];
        let mut values = vec![String::new()];
        for it in items {
            options.push(it.label.clone());
            values.push(it.value.clone());
        }
        Self::new(
            id,
            label,
            FieldKind::Select {
                options,
                values,
                cursor: 0,
                selected: 0,
                offset: 0,
            },
        )
    }

    pub fn is_focusable(&self) -> bool {
        !matches!(self.kind, FieldKind::Hidden)
    }

    /// Display text of the chosen option; empty for the placeholder or non-select fields.
    pub fn selected_text(&self) -> &str {
        match &self.kind {
            FieldKind::Select {
                options, selected, ..
            } if !self.value.is_empty() => options.get(*selected).map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }

    /// Picks the option whose value equals `value`; unknown values leave the field unchanged.
    pub fn select_value(&mut self, value: &str) -> bool {
        if let FieldKind::Select {
            values,
            selected,
            cursor,
            ..
        } = &mut self.kind
        {
            if let Some(idx) = values.iter().position(|v| v == value) {
                *selected = idx;
                *cursor = idx;
                self.value = values[idx].clone();
                return true;
            }
        }
        false
    }

    /// Commits option `idx` of a select field.
    pub fn commit_option(&mut self, idx: usize) {
        if let FieldKind::Select {
            values, selected, ..
        } = &mut self.kind
        {
            if let Some(v) = values.get(idx) {
                *selected = idx;
                self.value = v.clone();
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub title: String,
    pub fields: Vec<FormField>,
    // Index into `fields`; `fields.len()` is the submit button
    pub selected: usize,
    pub editing: bool,
    pub message: Option<String>,
    // Submit button only; fields stay editable
    pub disabled: bool,
    pub loading: bool,
    pub risk_display: String,
}

impl RiskSink for FormState {
    fn set_label(&mut self, label: &str) {
        self.risk_display = label.to_string();
    }
    fn set_token(&mut self, token: &str) {
        if let Some(f) = self.field_mut(FieldId::Risk) {
            f.value = token.to_string();
        }
    }
}

impl FormState {
    pub fn from_config(cfg: &FormConfig) -> Self {
        let mut fields = Vec::new();
        let mut goal = FormField::select(FieldId::Goal, "Investment Goal", "Select your goal", &cfg.goals);
        goal.required = true;
        fields.push(goal);
        fields.push(FormField::new(
            FieldId::RiskSlider,
            "Risk Tolerance",
            FieldKind::Slider { max: 2, position: 1 },
        ));
        fields.push(FormField::new(FieldId::Risk, "Risk", FieldKind::Hidden));
        if cfg.has_field(OptionalField::Amount) {
            fields.push(FormField::new(FieldId::Amount, "Investment Amount ($)", FieldKind::Text));
        }
        if cfg.has_field(OptionalField::Timeline) {
            fields.push(FormField::select(
                FieldId::Timeline,
                "Timeline",
                "Select timeline",
                &cfg.timelines,
            ));
        }
        if cfg.has_field(OptionalField::CustomGoal) {
            fields.push(FormField::new(
                FieldId::CustomGoal,
                "Custom Goal",
                FieldKind::TextArea { edit_lines: 4 },
            ));
        }
        let mut form = FormState {
            title: cfg.title.clone(),
            fields,
            ..Default::default()
        };
        let init = &cfg.initial;
        if let Some(g) = &init.goal {
            if let Some(f) = form.field_mut(FieldId::Goal) {
                f.select_value(g);
            }
        }
        if let Some(t) = &init.timeline {
            if let Some(f) = form.field_mut(FieldId::Timeline) {
                f.select_value(t);
            }
        }
        for (id, v) in [
            (FieldId::Amount, &init.amount),
            (FieldId::CustomGoal, &init.custom_goal),
        ] {
            if let (Some(v), Some(f)) = (v, form.field_mut(id)) {
                f.value = v.clone();
            }
        }
        // Seeded amounts go through the same cleaning as typed ones
        if let Some(f) = form.field_mut(FieldId::Amount) {
            if !f.value.is_empty() {
                let result = format_amount_input(&f.value);
                f.value = result.cleaned;
                f.mark = result.mark;
            }
        }
        let risk = init.risk.unwrap_or(1);
        form.set_slider(risk);
        apply_risk(risk, &mut form);
        form
    }

    pub fn field(&self, id: FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Raw value of a field; absent fields read as empty.
    pub fn value(&self, id: FieldId) -> &str {
        self.field(id).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, id: FieldId, value: String) -> bool {
        match self.field_mut(id) {
            Some(f) => {
                f.value = value;
                true
            }
            None => false,
        }
    }

    pub fn set_mark(&mut self, id: FieldId, mark: FieldMark) {
        if let Some(f) = self.field_mut(id) {
            f.mark = mark;
        }
    }

    pub fn set_slider(&mut self, position: usize) {
        if let Some(f) = self.field_mut(FieldId::RiskSlider) {
            if let FieldKind::Slider { position: p, .. } = &mut f.kind {
                *p = position;
            }
            f.value = position.to_string();
        }
    }

    pub fn submit_index(&self) -> usize {
        self.fields.len()
    }

    pub fn focused_field(&self) -> Option<FieldId> {
        self.fields.get(self.selected).map(|f| f.id)
    }

    /// Moves focus by one step in `forward` direction, skipping hidden fields.
    /// Returns true when focus changed.
    pub fn move_focus(&mut self, forward: bool) -> bool {
        let last = self.submit_index();
        let mut idx = self.selected;
        loop {
            if forward {
                if idx >= last {
                    return false;
                }
                idx += 1;
            } else {
                if idx == 0 {
                    return false;
                }
                idx -= 1;
            }
            let focusable = self.fields.get(idx).map(|f| f.is_focusable()).unwrap_or(true);
            if focusable {
                self.selected = idx;
                return true;
            }
        }
    }

    pub fn required_values(&self) -> Vec<(FieldId, &str)> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| (f.id, f.value.as_str()))
            .collect()
    }

    pub fn preview_inputs(&self) -> PreviewInputs<'_> {
        PreviewInputs {
            goal: self.value(FieldId::Goal),
            goal_text: self.field(FieldId::Goal).map(|f| f.selected_text()).unwrap_or(""),
            risk_label: &self.risk_display,
            amount: self.value(FieldId::Amount),
            timeline: self.value(FieldId::Timeline),
            timeline_text: self
                .field(FieldId::Timeline)
                .map(|f| f.selected_text())
                .unwrap_or(""),
            custom: self.value(FieldId::CustomGoal),
        }
    }

    /// Payload of every present field that carries a submitted name.
    pub fn submission(&self) -> Submission {
        Submission::from_fields(
            self.fields
                .iter()
                .filter(|f| !matches!(f.kind, FieldKind::Slider { .. }))
                .map(|f| (f.id.name(), f.value.as_str())),
        )
    }
}

fn value_style(form: &FormState, i: usize, theme: &Theme) -> Style {
    if i == form.selected {
        if form.editing {
            theme.text_editing_bold()
        } else {
            theme.text_active_bold()
        }
    } else {
        Style::default()
    }
}

pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    form: &FormState,
    theme: &Theme,
    highlight: bool,
    cursor_on: bool,
    tick: u64,
) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, fld) in form.fields.iter().enumerate() {
        if !fld.is_focusable() {
            continue;
        }
        let sel = if i == form.selected { '›' } else { ' ' };
        let req = if fld.required { " *" } else { "" };
        let edge = Span::styled("▌", theme.field_border(&fld.mark));
        let label_style = if fld.mark.invalid {
            theme.text_error()
        } else {
            Style::default()
        };
        let head = Span::styled(format!("{sel} {}{req}: ", fld.label), label_style);
        match &fld.kind {
            FieldKind::Text => {
                let mut val = fld.value.clone();
                if form.editing && i == form.selected && cursor_on {
                    val.push('▏');
                }
                lines.push(Line::from(vec![
                    edge,
                    head,
                    Span::styled(val, value_style(form, i, theme)),
                ]));
            }
            FieldKind::TextArea { edit_lines } => {
                lines.push(Line::from(vec![edge, head]));
                let mut body: Vec<&str> = fld.value.lines().collect();
                if body.is_empty() {
                    body.push("");
                }
                let more = body.len().saturating_sub(*edit_lines);
                for bl in body.iter().take(*edit_lines) {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(bl.to_string(), value_style(form, i, theme)),
                    ]));
                }
                if more > 0 {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "    … ({} more line{})",
                            more,
                            if more == 1 { "" } else { "s" }
                        ),
                        theme.text_muted(),
                    )));
                }
            }
            FieldKind::Select {
                options,
                cursor,
                selected,
                offset,
                ..
            } => {
                let summary = options
                    .get(*selected)
                    .cloned()
                    .unwrap_or_else(|| "(none)".into());
                let summary_style = if fld.value.is_empty() && i != form.selected {
                    theme.text_muted()
                } else {
                    value_style(form, i, theme)
                };
                lines.push(Line::from(vec![
                    edge,
                    head,
                    Span::styled(summary, summary_style),
                ]));
                if form.editing && i == form.selected {
                    let start = (*offset).min(options.len());
                    let end = (start + OPTIONS_VISIBLE).min(options.len());
                    for (oi, opt) in options.iter().enumerate().take(end).skip(start) {
                        let mark = if oi == *selected { "(•)" } else { "( )" };
                        let cur = if oi == *cursor { '›' } else { ' ' };
                        let st = if oi == *cursor {
                            theme.list_cursor_style()
                        } else {
                            theme.text_muted()
                        };
                        lines.push(Line::from(vec![Span::styled(
                            format!("    {cur} {mark} {opt}"),
                            st,
                        )]));
                    }
                }
            }
            FieldKind::Slider { max, position } => {
                let mut track = String::new();
                for p in 0..=*max {
                    if p > 0 {
                        track.push_str("──");
                    }
                    track.push(if p == *position { '●' } else { '○' });
                }
                lines.push(Line::from(vec![
                    edge,
                    head,
                    Span::styled(format!("◀ {track} ▶  "), value_style(form, i, theme)),
                    Span::styled(form.risk_display.clone(), theme.text_active_bold()),
                ]));
            }
            FieldKind::Hidden => {}
        }
        if let Some(tip) = &fld.mark.tooltip {
            lines.push(Line::from(Span::styled(
                format!("    ! {tip}"),
                theme.text_error(),
            )));
        }
    }
    lines.push(Line::from(""));
    let on_button = form.selected == form.submit_index();
    let button = if form.loading {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][tick as usize % 6];
        Span::styled(format!("  [ {spinner} {SUBMITTING_LABEL} ]"), theme.text_muted())
    } else {
        let st = if form.disabled {
            theme.text_muted()
        } else if on_button {
            theme.list_cursor_style()
        } else {
            theme.text_active_bold()
        };
        Span::styled(format!("  [ {SUBMIT_LABEL} ]"), st)
    };
    lines.push(Line::from(button));
    if let Some(msg) = &form.message {
        lines.push(Line::from(Span::styled(msg.clone(), theme.text_muted())));
    }
    let title = if form.editing {
        format!("{} — editing", form.title)
    } else {
        form.title.clone()
    };
    let block = themed_panel(&title, highlight, theme);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InitialValues;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render_lines(form: &FormState, w: u16, h: u16) -> Vec<String> {
        let backend = TestBackend::new(w, h);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| {
                let area = Rect::new(0, 0, w, h);
                draw_form(f, area, form, &theme, true, false, 0);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = Vec::new();
        for y in 0..buf.area.height {
            let mut line = String::new();
            for x in 0..buf.area.width {
                line.push_str(buf[(x, y)].symbol());
            }
            out.push(line.trim_end().to_string());
        }
        out
    }

    #[test]
    fn config_builds_contract_fields_and_syncs_risk() {
        let form = FormState::from_config(&FormConfig::default());
        for id in [
            FieldId::Goal,
            FieldId::RiskSlider,
            FieldId::Risk,
            FieldId::Amount,
            FieldId::Timeline,
            FieldId::CustomGoal,
        ] {
            assert!(form.field(id).is_some(), "missing {id:?}");
        }
        assert_eq!(form.risk_display, "Moderate");
        assert_eq!(form.value(FieldId::Risk), "medium");
        assert_eq!(form.value(FieldId::Goal), "");
        assert_eq!(form.required_values(), vec![(FieldId::Goal, "")]);
    }

    #[test]
    fn omitted_fields_read_empty_and_ignore_writes() {
        let cfg = FormConfig {
            fields: vec![],
            ..Default::default()
        };
        let mut form = FormState::from_config(&cfg);
        assert!(form.field(FieldId::Amount).is_none());
        assert_eq!(form.value(FieldId::Amount), "");
        assert!(!form.set_value(FieldId::Amount, "500".into()));
        form.set_mark(FieldId::Timeline, FieldMark::invalid(None));
        assert!(form.submission().get("investment_amount").is_none());
    }

    #[test]
    fn focus_skips_hidden_risk_field() {
        let mut form = FormState::from_config(&FormConfig::default());
        assert_eq!(form.focused_field(), Some(FieldId::Goal));
        assert!(form.move_focus(true));
        assert_eq!(form.focused_field(), Some(FieldId::RiskSlider));
        assert!(form.move_focus(true));
        assert_eq!(form.focused_field(), Some(FieldId::Amount));
        assert!(form.move_focus(false));
        assert_eq!(form.focused_field(), Some(FieldId::RiskSlider));
        while form.move_focus(true) {}
        assert_eq!(form.selected, form.submit_index());
        assert_eq!(form.focused_field(), None);
    }

    #[test]
    fn initial_values_select_options() {
        let cfg = FormConfig {
            initial: InitialValues {
                goal: Some("retirement".into()),
                risk: Some(2),
                amount: Some("1,500".into()),
                timeline: Some("long_term".into()),
                custom_goal: None,
            },
            ..Default::default()
        };
        let form = FormState::from_config(&cfg);
        let inputs = form.preview_inputs();
        assert_eq!(inputs.goal, "retirement");
        assert_eq!(inputs.goal_text, "Retirement");
        assert_eq!(inputs.risk_label, "Aggressive");
        assert_eq!(inputs.timeline_text, "Long term (10+ years)");
        let sub = form.submission();
        assert_eq!(sub.get("risk"), Some("high"));
        assert_eq!(sub.get("investment_amount"), Some("1,500"));
        assert!(sub.get("risk_slider").is_none());
    }

    #[test]
    fn renders_invalid_tooltip_and_submit_button() {
        let mut form = FormState::from_config(&FormConfig::default());
        form.set_value(FieldId::Amount, "99".into());
        form.set_mark(
            FieldId::Amount,
            FieldMark::invalid(Some(crate::goals::amount::AMOUNT_RANGE_MESSAGE)),
        );
        let lines = render_lines(&form, 70, 20).join("\n");
        assert!(lines.contains("› Investment Goal *: Select your goal"));
        assert!(lines.contains("Investment Amount ($): 99"));
        assert!(lines.contains("! Amount must be between $100 and $10,000,000"));
        assert!(lines.contains("○──●──○"));
        assert!(lines.contains("[ Get Recommendations ]"));
    }

    #[test]
    fn seeded_amount_is_cleaned_and_flagged() {
        let cfg = FormConfig {
            initial: crate::model::InitialValues {
                amount: Some("$50".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let form = FormState::from_config(&cfg);
        let fld = form.field(FieldId::Amount).unwrap();
        assert_eq!(fld.value, "50");
        assert!(fld.mark.invalid);

        let cfg = FormConfig {
            initial: crate::model::InitialValues {
                amount: Some("USD 2,500".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let form = FormState::from_config(&cfg);
        assert_eq!(form.value(FieldId::Amount), "2,500");
        assert!(!form.field(FieldId::Amount).unwrap().mark.invalid);
    }

    #[test]
    fn loading_state_swaps_button_label() {
        let mut form = FormState::from_config(&FormConfig::default());
        form.loading = true;
        form.disabled = true;
        let lines = render_lines(&form, 70, 20).join("\n");
        assert!(lines.contains("Submitting…"));
        assert!(!lines.contains("Get Recommendations"));
    }
}
