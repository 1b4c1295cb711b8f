use crate::app::{recompute_preview, update, AppMsg, Effect};
use crate::goals::preview::PREVIEW_ITEM_CSS;
use crate::goals::submission::{SubmitPhase, Submission};
use crate::model::{validate_form_config, FormConfig};
use crate::theme::Theme;
use crate::widgets::form::FormState;
use crate::widgets::form_widget::{focus_hint, FormWidget};
use crate::widgets::preview::PreviewWidget;
use crate::widgets::status_bar::draw_footer_combined;
use crate::widgets::Widget;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const CONFIG_FILE: &str = "goals.yaml";
const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub struct AppState {
    pub config: FormConfig,
    pub form: FormWidget,
    pub preview: PreviewWidget,
    pub phase: SubmitPhase,
    pub submit_delay: Duration,
    pub submit_deadline: Option<Instant>,
    // Snapshot taken when the submit gate passed
    pub pending_submission: Option<Submission>,
    pub finished: Option<Submission>,
    pub quit: bool,
    pub tick: u64,
    pub toast: Option<Toast>,
    pub theme: Theme,
    pub show_debug: bool,
    // Debug log (rendered in bottom debug pane)
    pub debug_log: VecDeque<String>,
}

impl AppState {
    pub fn new(config: FormConfig) -> Self {
        let theme = Theme::from_name(config.theme);
        let form = FormState::from_config(&config);
        let mut state = AppState {
            form: FormWidget::new(form, theme.clone()),
            preview: PreviewWidget::new(theme.clone()),
            phase: SubmitPhase::Idle,
            submit_delay: Duration::from_millis(config.submit_delay_ms),
            submit_deadline: None,
            pending_submission: None,
            finished: None,
            quit: false,
            tick: 0,
            toast: None,
            theme,
            show_debug: false,
            debug_log: VecDeque::new(),
            config,
        };
        recompute_preview(&mut state);
        state.dbg(format!("form ready: {}", state.config.title));
        state
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::ScheduleSubmit { delay } => {
                state.dbg(format!("submit scheduled in {}ms", delay.as_millis()));
                state.submit_deadline = Some(Instant::now() + delay);
            }
            Effect::CompleteSubmission { submission } => {
                state.dbg(format!(
                    "submission complete: goal={}",
                    submission.get("goal").unwrap_or("")
                ));
                state.submit_deadline = None;
                state.finished = Some(submission);
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

fn dispatch(state: &mut AppState, msgs: Vec<AppMsg>) {
    for msg in msgs {
        state.dbg(format!("msg {msg:?}"));
        let effects = update(state, msg);
        run_effects(state, effects);
    }
}

// Completes a pending submission once its delay has passed.
fn pump_submit_deadline(state: &mut AppState, now: Instant) {
    if let Some(deadline) = state.submit_deadline {
        if now >= deadline {
            state.submit_deadline = None;
            dispatch(state, vec![AppMsg::SubmitDelayElapsed]);
        }
    }
}

pub(crate) fn handle_key(state: &mut AppState, code: KeyCode, modifiers: KeyModifiers) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') if ctrl => {
            state.dbg("abort requested");
            state.quit = true;
        }
        KeyCode::F(12) => state.show_debug = !state.show_debug,
        KeyCode::Char('s') if ctrl => {
            let msgs = state.form.commit_textarea();
            dispatch(state, msgs);
        }
        KeyCode::Char('v') if ctrl => match arboard::Clipboard::new().and_then(|mut c| c.get_text())
        {
            Ok(text) => {
                let msgs = state.form.paste(&text);
                if !msgs.is_empty() {
                    run_effects(
                        state,
                        vec![Effect::ShowToast {
                            text: format!("Pasted {} chars", text.chars().count()),
                            level: ToastLevel::Info,
                            seconds: 1,
                        }],
                    );
                }
                dispatch(state, msgs);
            }
            Err(e) => {
                state.dbg(format!("clipboard: {e}"));
                run_effects(
                    state,
                    vec![Effect::ShowToast {
                        text: "Clipboard unavailable".into(),
                        level: ToastLevel::Error,
                        seconds: 2,
                    }],
                );
            }
        },
        _ => {
            let msgs = state.form.on_key(code);
            dispatch(state, msgs);
        }
    }
}

fn emit_submission(config: &FormConfig, submission: &Submission) -> Result<()> {
    let json = submission.to_json()?;
    match &config.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing submission to {path}"))?;
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    validate_form_config(&cfg).map_err(|e| anyhow!("invalid {CONFIG_FILE}: {e}"))?;
    let mut state = AppState::new(cfg);
    // Headless smoke mode
    if env_flag("GOALS_TUI_HEADLESS") {
        return run_headless(&mut state);
    }
    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    handle_key(&mut state, key.code, key.modifiers);
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        pump_submit_deadline(&mut state, Instant::now());
        if last_tick.elapsed() >= TICK_RATE {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
        if state.quit || state.finished.is_some() {
            break Ok(());
        }
    };
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res?;
    if let Some(submission) = state.finished.take() {
        emit_submission(&state.config, &submission)?;
    }
    Ok(())
}

fn run_headless(state: &mut AppState) -> Result<()> {
    let ticks: u64 = std::env::var("GOALS_TUI_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let auto_submit = env_flag("GOALS_TUI_HEADLESS_SUBMIT");
    let summary = env_flag("GOALS_TUI_SMOKE_SUMMARY");
    let backend = ratatui::backend::TestBackend::new(80, 30);
    let mut terminal = Terminal::new(backend)?;
    let mut submit_sent = false;
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state))?;
        if auto_submit && !submit_sent {
            dispatch(state, vec![AppMsg::Submit]);
            submit_sent = true;
        }
        pump_submit_deadline(state, Instant::now());
        if state.finished.is_some() {
            break;
        }
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(TICK_RATE);
    }
    if summary {
        println!("{}", smoke_summary(state));
    }
    // The summary already carries the payload when it would go to stdout
    if let Some(submission) = state.finished.take() {
        if !summary || state.config.output.is_some() {
            emit_submission(&state.config, &submission)?;
        }
    }
    Ok(())
}

fn smoke_summary(state: &AppState) -> serde_json::Value {
    serde_json::json!({
        "ok": state.phase != SubmitPhase::Blocked,
        "phase": state.phase,
        "preview_visible": state.preview.preview.visible,
        "preview_css": PREVIEW_ITEM_CSS,
        "preview_html": state.preview.preview.to_html(),
        "submission": state.finished,
    })
}

fn read_config(path: &Path) -> Result<FormConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))
}

fn find_config_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("GOALS_TUI_CONFIG_DIR") {
        return Some(PathBuf::from(base).join(CONFIG_FILE));
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    if let Some(p) = candidates.iter().find(|p| p.exists()) {
        return Some(p.clone());
    }
    // Walk up ancestors looking for <ancestor>/.tui/goals.yaml
    let mut cur = cwd.as_path();
    while let Some(parent) = cur.parent() {
        let p = parent.join(".tui").join(CONFIG_FILE);
        if p.exists() {
            return Some(p);
        }
        cur = parent;
    }
    None
}

fn load_config() -> Result<FormConfig> {
    let mut cfg = match find_config_path() {
        Some(path) => read_config(&path)?,
        None => FormConfig::default(),
    };
    if let Some(ms) = std::env::var("GOALS_TUI_SUBMIT_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        cfg.submit_delay_ms = ms;
    }
    Ok(cfg)
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    // Fill entire screen with theme background
    let screen = f.area();
    let bg = Block::default().style(state.theme.base_style());
    f.render_widget(bg, screen);

    let layout_h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(5),
            Constraint::Percentage(90),
            Constraint::Percentage(5),
        ])
        .split(screen);
    let content_area = layout_h[1];

    const DEBUG_H: u16 = 6;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(state.preview.height()),
            Constraint::Length(if state.show_debug { DEBUG_H } else { 0 }),
            Constraint::Length(1),
        ])
        .split(content_area);

    let tick = state.tick;
    state.form.render(f, chunks[0], true, tick);
    if state.preview.is_visible() {
        state.preview.render(f, chunks[1], false, tick);
    }
    if state.show_debug {
        draw_debug(f, chunks[2], state);
    }
    let help_text = if state.phase == SubmitPhase::Submitting {
        format!("{}  Ctrl+C abort", focus_hint(&state.form.form))
    } else {
        format!(
            "{}  ↑/↓ move  F12 debug  Ctrl+C quit",
            focus_hint(&state.form.form)
        )
    };
    draw_footer_combined(f, chunks[3], state, help_text.as_str());
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    // Take last `area.height` lines
    let h = area.height as usize;
    let total = state.debug_log.len();
    let start = total.saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::FieldId;

    #[test]
    fn deadline_completes_submission_after_delay() {
        let mut st = AppState::new(FormConfig::default());
        st.form.form.field_mut(FieldId::Goal).unwrap().select_value("retirement");
        dispatch(&mut st, vec![AppMsg::Submit]);
        let deadline = st.submit_deadline.expect("deadline scheduled");
        pump_submit_deadline(&mut st, deadline - Duration::from_millis(1));
        assert!(st.finished.is_none());
        assert!(st.form.form.loading);
        pump_submit_deadline(&mut st, deadline);
        let sub = st.finished.as_ref().expect("submitted");
        assert_eq!(sub.get("goal"), Some("retirement"));
        assert!(st.submit_deadline.is_none());
    }

    #[test]
    fn keys_drive_the_form_through_submission() {
        let mut st = AppState::new(FormConfig::default());
        // Goal: cycle to the first option
        handle_key(&mut st, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(st.form.form.value(FieldId::Goal), "build_wealth");
        assert!(st.preview.preview.visible);
        handle_key(&mut st, KeyCode::Down, KeyModifiers::NONE);
        handle_key(&mut st, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(st.form.form.value(FieldId::Risk), "low");
        handle_key(&mut st, KeyCode::Down, KeyModifiers::NONE);
        for c in "1a,50,0".chars() {
            handle_key(&mut st, KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(st.form.form.value(FieldId::Amount), "150,0");
        assert_eq!(st.preview.preview.row("Investment Amount"), Some("$1,500"));
        while st.form.form.move_focus(true) {}
        handle_key(&mut st, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(st.phase, SubmitPhase::Submitting);
        let deadline = st.submit_deadline;
        assert!(deadline.is_some());
        // The button is disabled; pressing it again schedules nothing new.
        handle_key(&mut st, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(st.submit_deadline, deadline);
        // Fields stay editable while the submit is pending.
        handle_key(&mut st, KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(st.form.form.focused_field(), Some(FieldId::CustomGoal));
    }

    #[test]
    fn smoke_summary_carries_style_rule_and_payload() {
        let mut st = AppState::new(FormConfig::default());
        let s = smoke_summary(&st);
        assert_eq!(s["preview_visible"], false);
        assert_eq!(s["preview_css"], PREVIEW_ITEM_CSS);
        assert!(s["preview_css"]
            .as_str()
            .is_some_and(|css| css.contains("border-left: 3px solid var(--accent)")));
        assert!(s["submission"].is_null());

        st.form.form.field_mut(FieldId::Goal).unwrap().select_value("retirement");
        dispatch(&mut st, vec![AppMsg::FieldInput(FieldId::Goal), AppMsg::Submit]);
        let deadline = st.submit_deadline.expect("deadline scheduled");
        pump_submit_deadline(&mut st, deadline);
        let s = smoke_summary(&st);
        assert_eq!(s["phase"], "submitting");
        assert_eq!(s["submission"]["goal"], "retirement");
        assert!(s["preview_html"]
            .as_str()
            .is_some_and(|h| h.contains("<strong>Goal:</strong> Retirement")));
    }

    #[test]
    fn debug_toggle_and_abort() {
        let mut st = AppState::new(FormConfig::default());
        handle_key(&mut st, KeyCode::F(12), KeyModifiers::NONE);
        assert!(st.show_debug);
        handle_key(&mut st, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(st.quit);
        assert!(st.finished.is_none());
    }

    #[test]
    fn render_shows_preview_only_when_visible() {
        let mut st = AppState::new(FormConfig::default());
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        let text = |t: &Terminal<ratatui::backend::TestBackend>| -> String {
            let buf = t.backend().buffer();
            let mut s = String::new();
            for y in 0..buf.area.height {
                for x in 0..buf.area.width {
                    s.push_str(buf[(x, y)].symbol());
                }
                s.push('\n');
            }
            s
        };
        assert!(!text(&terminal).contains("Preview"));
        handle_key(&mut st, KeyCode::Right, KeyModifiers::NONE);
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        let out = text(&terminal);
        assert!(out.contains("Preview"));
        assert!(out.contains("Goal: Build Wealth"));
    }
}
