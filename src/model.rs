use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Optional form fields. The goal selector and risk slider are always present.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptionalField {
    Amount,
    Timeline,
    CustomGoal,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct InitialValues {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub risk: Option<usize>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub custom_goal: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_goals")]
    pub goals: Vec<OptionItem>,
    #[serde(default = "default_timelines")]
    pub timelines: Vec<OptionItem>,
    // Which optional fields the form carries; all of them when omitted
    #[serde(default = "default_fields")]
    pub fields: Vec<OptionalField>,
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default)]
    pub initial: InitialValues,
    // Write the submitted payload here instead of stdout
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            goals: default_goals(),
            timelines: default_timelines(),
            fields: default_fields(),
            submit_delay_ms: default_submit_delay_ms(),
            theme: ThemeName::Dark,
            initial: InitialValues::default(),
            output: None,
        }
    }
}

impl FormConfig {
    pub fn has_field(&self, field: OptionalField) -> bool {
        self.fields.contains(&field)
    }
}

fn default_title() -> String {
    "Investment Goals".to_string()
}

fn default_goals() -> Vec<OptionItem> {
    vec![
        OptionItem::new("build_wealth", "Build Wealth"),
        OptionItem::new("save_for_college", "Save for College"),
        OptionItem::new("short_term", "Short-term Savings"),
        OptionItem::new("retirement", "Retirement"),
        OptionItem::new("emergency_fund", "Emergency Fund"),
    ]
}

fn default_timelines() -> Vec<OptionItem> {
    vec![
        OptionItem::new("short_term", "Short term (under 3 years)"),
        OptionItem::new("medium_term", "Medium term (3-10 years)"),
        OptionItem::new("long_term", "Long term (10+ years)"),
    ]
}

fn default_fields() -> Vec<OptionalField> {
    vec![
        OptionalField::Amount,
        OptionalField::Timeline,
        OptionalField::CustomGoal,
    ]
}

fn default_submit_delay_ms() -> u64 {
    500
}

pub(crate) fn validate_form_config(cfg: &FormConfig) -> Result<(), String> {
    use std::collections::HashSet;
    if cfg.goals.is_empty() {
        return Err("goals must list at least one option".to_string());
    }
    for (which, items) in [("goals", &cfg.goals), ("timelines", &cfg.timelines)] {
        let mut seen = HashSet::new();
        for (i, it) in items.iter().enumerate() {
            if it.value.is_empty() {
                return Err(format!("{which}[{i}] has an empty value"));
            }
            if !seen.insert(&it.value) {
                return Err(format!(
                    "duplicate {which} value: '{}' at index {}",
                    it.value, i
                ));
            }
        }
    }
    if let Some(r) = cfg.initial.risk {
        if r > 2 {
            return Err(format!("initial risk {r} is outside 0..=2"));
        }
    }
    if let Some(g) = &cfg.initial.goal {
        if !g.is_empty() && !cfg.goals.iter().any(|o| &o.value == g) {
            return Err(format!("initial goal '{g}' is not one of the goal options"));
        }
    }
    if let Some(t) = &cfg.initial.timeline {
        if !t.is_empty() && !cfg.timelines.iter().any(|o| &o.value == t) {
            return Err(format!(
                "initial timeline '{t}' is not one of the timeline options"
            ));
        }
    }
    Ok(())
}
