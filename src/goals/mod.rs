pub mod amount;
pub mod preview;
pub mod risk;
pub mod submission;
pub mod validate;

use serde::{Deserialize, Serialize};

/// Fixed identifiers of the goals form. Handlers address fields only through these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Goal,
    RiskSlider,
    Risk,
    Amount,
    Timeline,
    CustomGoal,
}

impl FieldId {
    /// Name carried by the submitted payload.
    pub fn name(self) -> &'static str {
        match self {
            FieldId::Goal => "goal",
            FieldId::RiskSlider => "risk_slider",
            FieldId::Risk => "risk",
            FieldId::Amount => "investment_amount",
            FieldId::Timeline => "time_horizon",
            FieldId::CustomGoal => "custom_goal",
        }
    }
}
