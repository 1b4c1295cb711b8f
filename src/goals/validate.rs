use crate::goals::FieldId;

/// Visual validity of one field: border state plus optional tooltip text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMark {
    pub invalid: bool,
    pub tooltip: Option<String>,
}

impl FieldMark {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn invalid(tooltip: Option<&str>) -> Self {
        Self {
            invalid: true,
            tooltip: tooltip.map(str::to_string),
        }
    }
}

/// Outcome of checking every required field. Unlike a first-failure scan, each
/// required field gets a mark.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequiredOutcome {
    pub marks: Vec<(FieldId, FieldMark)>,
    pub failures: Vec<FieldId>,
}

impl RequiredOutcome {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn validate_required<'a>(
    required: impl IntoIterator<Item = (FieldId, &'a str)>,
) -> RequiredOutcome {
    let mut out = RequiredOutcome::default();
    for (id, value) in required {
        if value.is_empty() {
            out.marks.push((id, FieldMark::invalid(None)));
            out.failures.push(id);
        } else {
            out.marks.push((id, FieldMark::valid()));
        }
    }
    out
}

/// Mark applied when focus leaves a required field.
pub fn blur_mark(value: &str) -> FieldMark {
    if value.is_empty() {
        FieldMark::invalid(None)
    } else {
        FieldMark::valid()
    }
}

/// Mark applied while typing into a required field; `None` leaves the mark as is.
pub fn input_mark(value: &str) -> Option<FieldMark> {
    if value.is_empty() {
        None
    } else {
        Some(FieldMark::valid())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Block { failures: Vec<FieldId> },
}

/// Combines required and amount checks into the submit decision.
pub fn gate(required: &RequiredOutcome, amount_ok: bool) -> GateDecision {
    let mut failures = required.failures.clone();
    if !amount_ok {
        failures.push(FieldId::Amount);
    }
    if failures.is_empty() {
        GateDecision::Proceed
    } else {
        GateDecision::Block { failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_check_marks_every_field() {
        let out = validate_required([
            (FieldId::Goal, ""),
            (FieldId::Timeline, "long_term"),
            (FieldId::CustomGoal, ""),
        ]);
        assert!(!out.ok());
        assert_eq!(out.failures, vec![FieldId::Goal, FieldId::CustomGoal]);
        assert_eq!(out.marks.len(), 3);
        assert!(!out.marks[1].1.invalid);
        assert!(out.marks[2].1.invalid);
    }

    #[test]
    fn blur_and_input_marks() {
        assert!(blur_mark("").invalid);
        assert!(!blur_mark("retirement").invalid);
        assert_eq!(input_mark(""), None);
        assert_eq!(input_mark("x"), Some(FieldMark::valid()));
    }

    #[test]
    fn gate_collects_amount_failure() {
        let ok = validate_required([(FieldId::Goal, "retirement")]);
        assert_eq!(gate(&ok, true), GateDecision::Proceed);
        assert_eq!(
            gate(&ok, false),
            GateDecision::Block {
                failures: vec![FieldId::Amount]
            }
        );
        let missing = validate_required([(FieldId::Goal, "")]);
        assert_eq!(
            gate(&missing, false),
            GateDecision::Block {
                failures: vec![FieldId::Goal, FieldId::Amount]
            }
        );
    }
}
