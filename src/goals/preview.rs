use crate::goals::amount::{format_amount, parse_investment_amount};

/// Rule for preview items in the HTML export; `--bg` and `--accent` come from the
/// surrounding page theme.
pub const PREVIEW_ITEM_CSS: &str = ".preview-item {
    margin: 8px 0;
    padding: 8px;
    background: var(--bg);
    border-radius: 4px;
    border-left: 3px solid var(--accent);
}";

pub const NOT_SPECIFIED: &str = "Not specified";

/// Raw values read from the form. `*_text` are the display texts of selected options.
#[derive(Clone, Debug, Default)]
pub struct PreviewInputs<'a> {
    pub goal: &'a str,
    pub goal_text: &'a str,
    pub risk_label: &'a str,
    pub amount: &'a str,
    pub timeline: &'a str,
    pub timeline_text: &'a str,
    pub custom: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preview {
    pub visible: bool,
    pub rows: Vec<PreviewRow>,
}

pub fn build_preview(inputs: &PreviewInputs) -> Preview {
    let any = !inputs.goal.is_empty()
        || !inputs.amount.is_empty()
        || !inputs.timeline.is_empty()
        || !inputs.custom.is_empty();
    if !any {
        return Preview::default();
    }
    let mut rows = Vec::new();
    let goal = if inputs.goal.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        inputs.goal_text.to_string()
    };
    rows.push(PreviewRow {
        label: "Goal",
        value: goal,
    });
    rows.push(PreviewRow {
        label: "Risk Tolerance",
        value: inputs.risk_label.to_string(),
    });
    if let Some(v) = parse_investment_amount(inputs.amount) {
        rows.push(PreviewRow {
            label: "Investment Amount",
            value: format!("${}", format_amount(v)),
        });
    }
    if !inputs.timeline.is_empty() {
        rows.push(PreviewRow {
            label: "Timeline",
            value: inputs.timeline_text.to_string(),
        });
    }
    if !inputs.custom.is_empty() {
        rows.push(PreviewRow {
            label: "Custom Goal",
            value: inputs.custom.to_string(),
        });
    }
    Preview {
        visible: true,
        rows,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Preview {
    /// Markup for the preview container; empty while the panel is hidden.
    pub fn to_html(&self) -> String {
        if !self.visible {
            return String::new();
        }
        self.rows
            .iter()
            .map(|r| {
                format!(
                    "<div class=\"preview-item\"><strong>{}:</strong> {}</div>",
                    r.label,
                    escape_html(&r.value)
                )
            })
            .collect()
    }

    #[cfg(test)]
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(goal: &'a str, amount: &'a str, timeline: &'a str, custom: &'a str) -> PreviewInputs<'a> {
        PreviewInputs {
            goal,
            goal_text: if goal.is_empty() { "" } else { "Retirement" },
            risk_label: "Moderate",
            amount,
            timeline,
            timeline_text: if timeline.is_empty() { "" } else { "Long term (10+ years)" },
            custom,
        }
    }

    #[test]
    fn hidden_when_nothing_entered() {
        let p = build_preview(&inputs("", "", "", ""));
        assert!(!p.visible);
        assert!(p.rows.is_empty());
        assert_eq!(p.to_html(), "");
    }

    #[test]
    fn any_single_field_shows_panel() {
        for p in [
            build_preview(&inputs("retirement", "", "", "")),
            build_preview(&inputs("", "500", "", "")),
            build_preview(&inputs("", "", "long_term", "")),
            build_preview(&inputs("", "", "", "Boat")),
        ] {
            assert!(p.visible);
            assert_eq!(p.rows[0].label, "Goal");
            assert_eq!(p.rows[1].label, "Risk Tolerance");
        }
    }

    #[test]
    fn rows_follow_fixed_order() {
        let p = build_preview(&inputs("retirement", "1,500", "long_term", "Boat"));
        let labels: Vec<&str> = p.rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            ["Goal", "Risk Tolerance", "Investment Amount", "Timeline", "Custom Goal"]
        );
        assert_eq!(p.row("Investment Amount"), Some("$1,500"));
        assert_eq!(p.row("Timeline"), Some("Long term (10+ years)"));
    }

    #[test]
    fn out_of_range_amount_has_no_row() {
        let p = build_preview(&inputs("", "99", "", ""));
        assert!(p.visible);
        assert_eq!(p.row("Goal"), Some(NOT_SPECIFIED));
        assert!(p.row("Investment Amount").is_none());

        let p = build_preview(&inputs("", "500", "", ""));
        assert_eq!(p.row("Investment Amount"), Some("$500"));
    }

    #[test]
    fn amount_row_rounds_half_up() {
        let p = build_preview(&inputs("", "100.0625", "", ""));
        assert_eq!(p.row("Investment Amount"), Some("$100.063"));
    }

    #[test]
    fn html_is_escaped_and_stable() {
        let i = inputs("retirement", "", "", "<b>yacht</b>");
        let a = build_preview(&i).to_html();
        let b = build_preview(&i).to_html();
        assert_eq!(a, b);
        assert!(a.starts_with("<div class=\"preview-item\"><strong>Goal:</strong> Retirement</div>"));
        assert!(a.contains("&lt;b&gt;yacht&lt;/b&gt;"));
    }
}
