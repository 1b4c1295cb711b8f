use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Lifecycle of one submit attempt. `Submitting` is terminal for the run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Blocked,
    Submitting,
}

/// Field values handed to the receiving endpoint, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Submission(BTreeMap<String, String>);

impl Submission {
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).with_context(|| "serializing submission")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_raw_values_in_name_order() {
        let s = Submission::from_fields([
            ("risk", "medium"),
            ("goal", "retirement"),
            ("investment_amount", "1,5.00"),
        ]);
        assert_eq!(s.get("investment_amount"), Some("1,5.00"));
        assert_eq!(
            s.to_json().unwrap(),
            r#"{"goal":"retirement","investment_amount":"1,5.00","risk":"medium"}"#
        );
    }
}
