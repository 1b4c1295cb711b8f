/// Ordinal risk tolerance selected with the slider.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

pub const RISK_LEVELS: [RiskLevel; 3] = [
    RiskLevel::Conservative,
    RiskLevel::Moderate,
    RiskLevel::Aggressive,
];

impl RiskLevel {
    pub fn from_index(index: usize) -> Option<Self> {
        RISK_LEVELS.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Conservative",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Aggressive => "Aggressive",
        }
    }

    /// Machine-readable value submitted in the hidden risk field.
    pub fn token(self) -> &'static str {
        match self {
            RiskLevel::Conservative => "low",
            RiskLevel::Moderate => "medium",
            RiskLevel::Aggressive => "high",
        }
    }
}

/// Output targets for a risk update: the visible label and the submitted token.
pub trait RiskSink {
    fn set_label(&mut self, label: &str);
    fn set_token(&mut self, token: &str);
}

/// Writes label and token for `index` into `sink`. An index outside 0..=2 has no
/// level, so both targets are cleared.
pub fn apply_risk(index: usize, sink: &mut impl RiskSink) -> Option<RiskLevel> {
    let level = RiskLevel::from_index(index);
    sink.set_label(level.map(RiskLevel::label).unwrap_or_default());
    sink.set_token(level.map(RiskLevel::token).unwrap_or_default());
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Targets {
        label: String,
        token: String,
    }

    impl RiskSink for Targets {
        fn set_label(&mut self, label: &str) {
            self.label = label.to_string();
        }
        fn set_token(&mut self, token: &str) {
            self.token = token.to_string();
        }
    }

    #[test]
    fn every_slider_position_writes_matching_label_and_token() {
        let expected = [
            ("Conservative", "low"),
            ("Moderate", "medium"),
            ("Aggressive", "high"),
        ];
        for (i, (label, token)) in expected.iter().enumerate() {
            let mut t = Targets::default();
            let level = apply_risk(i, &mut t);
            assert_eq!(level, Some(RISK_LEVELS[i]));
            assert_eq!(t.label, *label);
            assert_eq!(t.token, *token);
        }
    }

    #[test]
    fn out_of_range_index_clears_both_targets() {
        let mut t = Targets {
            label: "Moderate".into(),
            token: "medium".into(),
        };
        assert!(apply_risk(3, &mut t).is_none());
        assert!(t.label.is_empty());
        assert!(t.token.is_empty());
    }
}
