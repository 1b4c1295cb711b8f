use crate::goals::amount::{format_amount_input, validate_amount};
use crate::goals::preview::build_preview;
use crate::goals::risk::apply_risk;
use crate::goals::submission::{SubmitPhase, Submission};
use crate::goals::validate::{blur_mark, gate, input_mark, validate_required, GateDecision};
use crate::goals::FieldId;
use crate::ui::{AppState, ToastLevel};
use std::time::Duration;

/// Form events, one per user interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppMsg {
    /// Slider moved to a new position.
    RiskInput(usize),
    /// Field text or selection changed; the new raw value is already in the field.
    FieldInput(FieldId),
    /// Field edit committed.
    FieldChange(FieldId),
    /// Focus left the field.
    FieldBlur(FieldId),
    Submit,
    SubmitDelayElapsed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    ScheduleSubmit {
        delay: Duration,
    },
    CompleteSubmission {
        submission: Submission,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

pub(crate) fn recompute_preview(state: &mut AppState) {
    let preview = build_preview(&state.form.form.preview_inputs());
    if preview.visible != state.preview.preview.visible {
        state.dbg(format!("preview visible={}", preview.visible));
    }
    state.preview.preview = preview;
}

// Any edit after a blocked submit returns the form to idle.
fn resume_editing(state: &mut AppState) {
    if state.phase == SubmitPhase::Blocked {
        state.phase = SubmitPhase::Idle;
        state.form.form.message = None;
        state.dbg("phase: blocked -> idle");
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    // Edits keep flowing during the delay; only a second submit is refused.
    if state.phase == SubmitPhase::Submitting && msg == Submit {
        state.dbg("submit ignored: already submitting");
        return effects;
    }
    match msg {
        RiskInput(index) => {
            resume_editing(state);
            match apply_risk(index, &mut state.form.form) {
                Some(level) => state.dbg(format!("risk {index} -> {}", level.token())),
                None => state.dbg(format!("risk index {index} has no level")),
            }
            recompute_preview(state);
        }
        FieldInput(id) => {
            let form = &mut state.form.form;
            let Some(fld) = form.field(id) else {
                return effects;
            };
            let required = fld.required;
            if id == FieldId::Amount {
                let result = format_amount_input(&fld.value);
                form.set_value(id, result.cleaned);
                form.set_mark(id, result.mark);
            }
            if required {
                if let Some(mark) = input_mark(form.value(id)) {
                    form.set_mark(id, mark);
                }
            }
            resume_editing(state);
            recompute_preview(state);
        }
        FieldChange(id) => {
            if state.form.form.field(id).is_none() {
                return effects;
            }
            resume_editing(state);
            recompute_preview(state);
        }
        FieldBlur(id) => {
            let form = &mut state.form.form;
            if let Some(fld) = form.field(id) {
                if fld.required {
                    let mark = blur_mark(&fld.value);
                    form.set_mark(id, mark);
                }
            }
        }
        Submit => {
            state.phase = SubmitPhase::Validating;
            let form = &mut state.form.form;
            let required = validate_required(form.required_values());
            for (id, mark) in required.marks.clone() {
                form.set_mark(id, mark);
            }
            // The amount is only checked once every required field passes.
            let amount_ok = if required.ok() && form.field(FieldId::Amount).is_some() {
                let (ok, mark) = validate_amount(form.value(FieldId::Amount));
                form.set_mark(FieldId::Amount, mark);
                ok
            } else {
                true
            };
            match gate(&required, amount_ok) {
                GateDecision::Block { failures } => {
                    state.phase = SubmitPhase::Blocked;
                    state.form.form.message = Some("Please fix the highlighted fields".into());
                    state.dbg(format!("submit blocked: {failures:?}"));
                    effects.push(Effect::ShowToast {
                        text: "Submission blocked".into(),
                        level: ToastLevel::Error,
                        seconds: 3,
                    });
                }
                GateDecision::Proceed => {
                    state.phase = SubmitPhase::Submitting;
                    let form = &mut state.form.form;
                    form.loading = true;
                    form.disabled = true;
                    form.editing = false;
                    form.message = None;
                    // Payload is fixed at the moment the gate passes
                    state.pending_submission = Some(form.submission());
                    state.dbg("phase: submitting");
                    effects.push(Effect::ShowToast {
                        text: "All fields valid".into(),
                        level: ToastLevel::Success,
                        seconds: 2,
                    });
                    effects.push(Effect::ScheduleSubmit {
                        delay: state.submit_delay,
                    });
                }
            }
        }
        SubmitDelayElapsed => {
            if state.phase == SubmitPhase::Submitting {
                if let Some(submission) = state.pending_submission.take() {
                    state.dbg("submit delay elapsed");
                    effects.push(Effect::CompleteSubmission { submission });
                }
            }
        }
    }
    effects
}
