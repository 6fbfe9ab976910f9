//! Main application state and key handling.
//!
//! The app only translates key presses into store, builder and runner calls.
//! It gates every runner call on the runner's current state.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

use super::theme::Theme;
use super::widgets::{
    ChoiceList, FeedbackLine, KeyHints, Logo, ProgressPanel, QuestionCard, ResultScreen, TextInput,
};
use crate::clock::Clock;
use crate::config::Config;
use crate::models::{Catalog, Direction, ProgressOverview};
use crate::quiz::{
    build_session, review_pool, Advance, AnswerFeedback, QuizRunner, QuizSummary, RunnerState,
    StudyContext,
};
use crate::storage::UserStore;

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Quiz,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupFocus {
    Name,
    Levels,
}

/// A destructive action waiting for y/n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    ResetUser,
    QuitQuiz,
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    /// Where preference changes are written; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
    pub theme: Theme,

    // Core collaborators
    pub store: UserStore,
    pub catalog: Catalog,
    pub clock: Clock,

    // Setup
    pub focus: SetupFocus,
    pub name_input: String,
    pub user: Option<String>,
    pub level_state: ListState,
    pub direction: Direction,

    // Quiz
    pub runner: Option<QuizRunner>,
    pub feedback: Option<AnswerFeedback>,
    pub picked: Option<String>,
    pub typed_input: String,

    // Result
    pub summary: Option<QuizSummary>,

    pub confirm: Option<Confirm>,

    // Status message (shown temporarily)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(store: UserStore, catalog: Catalog, config: Config, clock: Clock) -> Self {
        let theme = Theme::from_name(&config.theme);
        let direction = config.direction;

        let level_index = config
            .level
            .as_deref()
            .and_then(|id| catalog.levels.iter().position(|l| l.id == id))
            .unwrap_or(0);
        let level_state = if catalog.levels.is_empty() {
            ListState::default()
        } else {
            ListState::default().with_selected(Some(level_index))
        };

        let user = store.last_active_user().map(str::to_string);
        let focus = if user.is_some() {
            SetupFocus::Levels
        } else {
            SetupFocus::Name
        };

        Self {
            screen: Screen::Setup,
            running: true,
            config,
            config_path: Some(Config::default_path()),
            theme,
            store,
            catalog,
            clock,
            focus,
            name_input: user.clone().unwrap_or_default(),
            user,
            level_state,
            direction,
            runner: None,
            feedback: None,
            picked: None,
            typed_input: String::new(),
            summary: None,
            confirm: None,
            status_message: None,
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        self.save_config();
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggle();
        self.config.direction = self.direction;
        self.save_config();
    }

    fn save_config(&mut self) {
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "failed to save config");
        }
    }

    pub fn overview(&self) -> Option<ProgressOverview> {
        let user = self.user.as_deref()?;
        self.store.record(user).ok().map(|r| r.overview())
    }

    /// Make the typed name the active user. Returns false when the name is rejected.
    pub fn select_user_from_input(&mut self) -> bool {
        match self.store.select_user(&self.name_input) {
            Ok(name) => {
                self.name_input = name.clone();
                self.user = Some(name);
                true
            }
            Err(e) => {
                self.set_status(e.to_string());
                false
            }
        }
    }

    fn selected_level_id(&self) -> Option<String> {
        self.level_state
            .selected()
            .and_then(|i| self.catalog.levels.get(i))
            .map(|l| l.id.clone())
    }

    pub fn start_quiz(&mut self) {
        if !self.select_user_from_input() {
            return;
        }
        let Some(level_id) = self.selected_level_id() else {
            self.set_status("No level selected".to_string());
            return;
        };

        let session = match self.catalog.pool_for(&level_id) {
            Ok(pool) => build_session(pool, self.direction, false, &mut rand::rng()),
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        info!(level = %level_id, direction = ?self.direction, "starting quiz");
        self.config.level = Some(level_id);
        self.save_config();
        self.begin(QuizRunner::new(session));
    }

    pub fn start_review(&mut self) {
        if !self.select_user_from_input() {
            return;
        }
        let Some(user) = self.user.as_deref() else {
            return;
        };

        let pool = match self.store.record(user).map_err(anyhow::Error::from).and_then(|r| {
            review_pool(r).map_err(anyhow::Error::from)
        }) {
            Ok(pool) => pool,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        info!(words = pool.len(), "starting review");
        let session = build_session(&pool, self.direction, true, &mut rand::rng());
        self.begin(QuizRunner::new(session));
    }

    fn begin(&mut self, runner: QuizRunner) {
        self.runner = Some(runner);
        self.feedback = None;
        self.picked = None;
        self.typed_input.clear();
        self.summary = None;
        self.screen = Screen::Quiz;
    }

    fn awaiting_answer(&self) -> bool {
        matches!(
            self.runner.as_ref().map(QuizRunner::state),
            Some(RunnerState::AwaitingAnswer(_))
        )
    }

    pub fn submit_choice(&mut self, number: usize) {
        if !self.awaiting_answer() {
            return;
        }
        let (Some(runner), Some(user)) = (self.runner.as_mut(), self.user.as_deref()) else {
            return;
        };
        let Some(choice) = runner
            .current_question()
            .and_then(|q| q.choices().get(number.wrapping_sub(1)))
            .cloned()
        else {
            return;
        };

        match StudyContext::new(&mut self.store, user, self.clock) {
            Ok(mut ctx) => {
                self.feedback = Some(runner.submit_choice(&mut ctx, &choice));
                self.picked = Some(choice);
            }
            Err(e) => self.status_message = Some((e.to_string(), Instant::now())),
        }
    }

    pub fn submit_typed(&mut self) {
        if !self.awaiting_answer() {
            return;
        }
        let (Some(runner), Some(user)) = (self.runner.as_mut(), self.user.as_deref()) else {
            return;
        };

        match StudyContext::new(&mut self.store, user, self.clock) {
            Ok(mut ctx) => self.feedback = Some(runner.submit_typed(&mut ctx, &self.typed_input)),
            Err(e) => self.status_message = Some((e.to_string(), Instant::now())),
        }
    }

    pub fn advance(&mut self) {
        let Some(runner) = self.runner.as_mut() else {
            return;
        };
        if !matches!(runner.state(), RunnerState::AnswerCommitted(_)) {
            return;
        }

        match runner.advance() {
            Advance::Next(index) => {
                debug!(index, "next question");
                self.feedback = None;
                self.picked = None;
                self.typed_input.clear();
            }
            Advance::Finished(summary) => {
                self.summary = Some(summary);
                self.runner = None;
                self.screen = Screen::Result;
            }
        }
    }

    /// Drop the running session; committed answers are already saved.
    pub fn abandon_quiz(&mut self) {
        if self.runner.take().is_some() {
            info!("quiz abandoned");
        }
        self.feedback = None;
        self.screen = Screen::Setup;
    }

    pub fn reset_user(&mut self) {
        if !self.select_user_from_input() {
            return;
        }
        if let Some(user) = self.user.clone() {
            match self.store.reset_user(&user) {
                Ok(()) => self.set_status(format!("Progress of '{}' was reset", user)),
                Err(e) => self.set_status(e.to_string()),
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if let Some(confirm) = self.confirm.take() {
            if matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
                match confirm {
                    Confirm::ResetUser => self.reset_user(),
                    Confirm::QuitQuiz => self.abandon_quiz(),
                }
            }
            return;
        }

        match self.screen {
            Screen::Setup => match self.focus {
                SetupFocus::Name => self.handle_name_keys(key),
                SetupFocus::Levels => self.handle_setup_keys(key),
            },
            Screen::Quiz => self.handle_quiz_keys(key),
            Screen::Result => self.handle_result_keys(key),
        }
    }

    fn handle_name_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => self.name_input.push(c),
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Enter => {
                if self.select_user_from_input() {
                    self.set_status(format!("Saved user '{}'", self.name_input));
                    self.focus = SetupFocus::Levels;
                }
            }
            KeyCode::Tab | KeyCode::Esc => self.focus = SetupFocus::Levels,
            _ => {}
        }
    }

    fn handle_setup_keys(&mut self, key: KeyCode) {
        let level_count = self.catalog.levels.len();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Char('u') => self.focus = SetupFocus::Name,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('d') => self.toggle_direction(),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.level_state.selected().unwrap_or(0);
                let new_i = if i == 0 { level_count.saturating_sub(1) } else { i - 1 };
                self.level_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.level_state.selected().unwrap_or(0);
                let new_i = if i >= level_count.saturating_sub(1) { 0 } else { i + 1 };
                self.level_state.select(Some(new_i));
            }
            KeyCode::Enter => self.start_quiz(),
            KeyCode::Char('r') => self.start_review(),
            KeyCode::Char('x') => {
                if self.select_user_from_input() {
                    self.confirm = Some(Confirm::ResetUser);
                }
            }
            _ => {}
        }
    }

    fn handle_quiz_keys(&mut self, key: KeyCode) {
        if key == KeyCode::Esc {
            self.confirm = Some(Confirm::QuitQuiz);
            return;
        }

        if !self.awaiting_answer() {
            if matches!(key, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n')) {
                self.advance();
            }
            return;
        }

        let typed = self
            .runner
            .as_ref()
            .and_then(QuizRunner::current_question)
            .is_some_and(|q| q.is_typed());

        if typed {
            match key {
                KeyCode::Char(c) => self.typed_input.push(c),
                KeyCode::Backspace => {
                    self.typed_input.pop();
                }
                KeyCode::Enter => self.submit_typed(),
                _ => {}
            }
        } else if let KeyCode::Char(c @ '1'..='9') = key {
            if let Some(n) = c.to_digit(10) {
                self.submit_choice(n as usize);
            }
        }
    }

    fn handle_result_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.screen = Screen::Setup,
            KeyCode::Char('r') => self.start_review(),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg_dark)),
            area,
        );

        match self.screen {
            Screen::Setup => self.render_setup(frame, area),
            Screen::Quiz => self.render_quiz(frame, area),
            Screen::Result => self.render_result(frame, area),
        }

        if let Some(confirm) = self.confirm {
            self.render_confirm(frame, area, confirm);
        }
    }

    fn render_setup(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(1),   // Top padding
            Constraint::Length(6),   // Logo
            Constraint::Length(1),   // Spacing
            Constraint::Min(10),     // Body
            Constraint::Length(1),   // Status
            Constraint::Length(2),   // Help
        ])
        .split(area);

        frame.render_widget(Logo::new(&self.theme), chunks[1]);

        let body = centered_rect(80, 100, chunks[3]);
        let columns = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(body);
        let left = Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).split(columns[0]);

        frame.render_widget(
            TextInput::new("User", &self.name_input, self.focus == SetupFocus::Name, &self.theme),
            left[0],
        );

        let items: Vec<ListItem> = self
            .catalog
            .levels
            .iter()
            .map(|level| {
                ListItem::new(Line::from(vec![
                    Span::styled(level.name.as_str(), self.theme.title()),
                    Span::styled(format!(" ({} words)", level.words.len()), self.theme.muted()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(self.theme.border(self.focus == SetupFocus::Levels))
                    .title(format!(" Levels · {} ", self.direction.name()))
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, left[1], &mut self.level_state);

        frame.render_widget(
            ProgressPanel::new(self.user.as_deref(), self.overview(), &self.theme),
            columns[1],
        );

        self.render_status(frame, chunks[4]);

        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints_data: Vec<(&str, &str)> = match self.focus {
            SetupFocus::Name => vec![("Enter", "save user"), ("Tab", "levels")],
            SetupFocus::Levels => vec![
                ("j/k", "nav"),
                ("Enter", "start"),
                ("r", "review misses"),
                ("d", "direction"),
                ("u", "user"),
                ("x", "reset"),
                ("t", &theme_hint),
                ("q", "quit"),
            ],
        };
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[5]);
    }

    fn render_quiz(&mut self, frame: &mut Frame, area: Rect) {
        let Some(runner) = self.runner.as_ref() else {
            return;
        };
        let Some(question) = runner.current_question() else {
            return;
        };
        let session = runner.session();

        let choice_height = (question.choices().len() as u16 * 3).max(3);
        let chunks = Layout::vertical([
            Constraint::Length(2),              // Header
            Constraint::Min(7),                 // Question
            Constraint::Length(1),              // Spacing
            Constraint::Length(choice_height),  // Answer area
            Constraint::Length(1),              // Feedback
            Constraint::Length(2),              // Hints
        ])
        .split(area);

        let mode = if session.is_review { "review" } else { "quiz" };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{} / {}", session.current_index + 1, session.len()),
                self.theme.title(),
            ),
            Span::styled(format!("  {}", mode), self.theme.muted()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        frame.render_widget(
            QuestionCard::new(question, &self.theme),
            centered_rect(70, 100, chunks[1]),
        );

        let answer_area = centered_rect(60, 100, chunks[3]);
        if question.is_typed() {
            frame.render_widget(
                TextInput::new("Answer", &self.typed_input, self.feedback.is_none(), &self.theme),
                answer_area,
            );
        } else {
            frame.render_widget(
                ChoiceList::new(
                    question.choices(),
                    self.picked.as_deref(),
                    self.feedback.as_ref(),
                    &self.theme,
                ),
                answer_area,
            );
        }

        if let Some(ref feedback) = self.feedback {
            frame.render_widget(FeedbackLine::new(feedback, &self.theme), chunks[4]);
        }

        let hints: &[(&str, &str)] = match (self.feedback.is_some(), question.is_typed()) {
            (true, _) => &[("Enter", "next"), ("Esc", "quit")],
            (false, true) => &[("Enter", "check"), ("Esc", "quit")],
            (false, false) => &[("1-4", "answer"), ("Esc", "quit")],
        };
        frame.render_widget(KeyHints::new(hints, &self.theme), chunks[5]);
    }

    fn render_result(&mut self, frame: &mut Frame, area: Rect) {
        let Some(ref summary) = self.summary else {
            return;
        };

        let chunks = Layout::vertical([
            Constraint::Min(10),    // Summary
            Constraint::Length(1),  // Status
            Constraint::Length(2),  // Help
        ])
        .split(area);
        frame.render_widget(
            ResultScreen::new(summary, &self.theme),
            centered_rect(60, 80, chunks[0]),
        );
        self.render_status(frame, chunks[1]);
        frame.render_widget(
            KeyHints::new(&[("Enter", "back"), ("r", "retry misses")], &self.theme),
            chunks[2],
        );
    }

    /// Recent status message, hidden after a few seconds.
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some((ref msg, time)) = self.status_message {
            if time.elapsed().as_secs() < 5 {
                let status = Paragraph::new(msg.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.colors.warning));
                frame.render_widget(status, area);
            }
        }
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect, confirm: Confirm) {
        let question = match confirm {
            Confirm::ResetUser => format!(
                "Reset all progress of '{}'?",
                self.user.as_deref().unwrap_or_default()
            ),
            Confirm::QuitQuiz => "Quit this quiz and go back?".to_string(),
        };

        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(question, self.theme.title())),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", self.theme.key_highlight()),
                Span::styled(" yes   ", self.theme.key_hint()),
                Span::styled("any key", self.theme.key_highlight()),
                Span::styled(" no", self.theme.key_hint()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.warning))
                    .style(Style::default().bg(self.theme.colors.bg_card)),
            ),
            popup,
        );
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fixed_on;
    use crate::quiz::QuizError;
    use crate::storage::MemoryBackend;

    fn app_with(backend: MemoryBackend) -> App {
        let mut app = App::new(
            UserStore::open(backend),
            Catalog::bundled().unwrap(),
            Config::default(),
            fixed_on("2024-04-01"),
        );
        app.config_path = None;
        app
    }

    fn type_name(app: &mut App, name: &str) {
        app.focus = SetupFocus::Name;
        for c in name.chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
    }

    fn answer_current(app: &mut App, correct: bool) {
        let question = app.runner.as_ref().unwrap().current_question().unwrap().clone();
        if question.is_typed() {
            let text = if correct { question.expected.clone() } else { "???".to_string() };
            for c in text.chars() {
                app.handle_key(KeyCode::Char(c));
            }
            app.handle_key(KeyCode::Enter);
        } else {
            let index = question
                .choices()
                .iter()
                .position(|c| (*c == question.expected) == correct)
                .unwrap();
            let key = char::from_digit(index as u32 + 1, 10).unwrap();
            app.handle_key(KeyCode::Char(key));
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut app = app_with(MemoryBackend::new());
        app.focus = SetupFocus::Levels;
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.screen, Screen::Setup);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn quiz_flow_through_keys() {
        let backend = MemoryBackend::new();
        let mut app = app_with(backend.clone());
        type_name(&mut app, "mika");
        assert_eq!(app.user.as_deref(), Some("mika"));
        assert_eq!(app.focus, SetupFocus::Levels);

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.screen, Screen::Quiz);

        for i in 0..10 {
            answer_current(&mut app, i % 3 != 0);
            assert!(app.feedback.is_some());
            app.handle_key(KeyCode::Enter);
        }

        assert_eq!(app.screen, Screen::Result);
        let summary = app.summary.clone().unwrap();
        assert_eq!(summary.correct_count, 6);
        assert_eq!(summary.total_count, 10);

        let record = UserStore::open(backend).record("mika").unwrap().clone();
        assert_eq!(record.total_answered, 10);
        assert_eq!(record.total_correct, 6);
    }

    #[test]
    fn review_without_misses_stays_on_setup() {
        let mut app = app_with(MemoryBackend::new());
        type_name(&mut app, "nao");
        app.handle_key(KeyCode::Char('r'));

        assert_eq!(app.screen, Screen::Setup);
        assert!(app.runner.is_none());
    }

    #[test]
    fn retry_after_perfect_quiz_reports_no_misses() {
        let mut app = app_with(MemoryBackend::new());
        type_name(&mut app, "qiu");
        app.handle_key(KeyCode::Enter);
        for _ in 0..10 {
            answer_current(&mut app, true);
            app.handle_key(KeyCode::Enter);
        }
        assert_eq!(app.screen, Screen::Result);

        app.handle_key(KeyCode::Char('r'));

        assert_eq!(app.screen, Screen::Result);
        assert!(app.runner.is_none());
        let (message, _) = app.status_message.clone().unwrap();
        assert_eq!(message, QuizError::EmptyReviewList.to_string());

        let backend = ratatui::backend::TestBackend::new(100, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains(&message));
    }

    #[test]
    fn retry_after_misses_starts_review() {
        let mut app = app_with(MemoryBackend::new());
        type_name(&mut app, "ryo");
        app.handle_key(KeyCode::Enter);
        for i in 0..10 {
            answer_current(&mut app, i != 0);
            app.handle_key(KeyCode::Enter);
        }

        app.handle_key(KeyCode::Char('r'));

        assert_eq!(app.screen, Screen::Quiz);
        assert!(app.runner.as_ref().unwrap().session().is_review);
    }

    #[test]
    fn quitting_mid_quiz_needs_confirmation() {
        let mut app = app_with(MemoryBackend::new());
        type_name(&mut app, "oto");
        app.handle_key(KeyCode::Enter);

        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Quiz);

        app.handle_key(KeyCode::Esc);
        app.handle_key(KeyCode::Char('y'));
        assert_eq!(app.screen, Screen::Setup);
        assert!(app.runner.is_none());
    }

    #[test]
    fn reset_clears_progress_after_confirmation() {
        let mut app = app_with(MemoryBackend::new());
        type_name(&mut app, "pia");
        app.store.update("pia", |r| r.total_answered = 12).unwrap();

        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.confirm, Some(Confirm::ResetUser));
        app.handle_key(KeyCode::Char('y'));

        assert_eq!(app.store.record("pia").unwrap().total_answered, 0);
    }

    #[test]
    fn direction_toggle_updates_config() {
        let mut app = app_with(MemoryBackend::new());
        app.focus = SetupFocus::Levels;
        app.handle_key(KeyCode::Char('d'));

        assert_eq!(app.direction, Direction::JaToEn);
        assert_eq!(app.config.direction, Direction::JaToEn);
    }

    #[test]
    fn last_active_user_is_restored() {
        let backend = MemoryBackend::new();
        let mut store = UserStore::open(backend.clone());
        store.select_user("rei").unwrap();

        let app = app_with(backend);
        assert_eq!(app.user.as_deref(), Some("rei"));
        assert_eq!(app.name_input, "rei");
        assert_eq!(app.focus, SetupFocus::Levels);
    }
}
