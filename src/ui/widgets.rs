//! Custom widgets for the quiz TUI.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::{icons, Theme};
use crate::models::{ProgressOverview, WordPair};
use crate::quiz::{AnswerFeedback, Question, QuizSummary};

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo<'a> {
    theme: &'a Theme,
}

impl<'a> Logo<'a> {
    const ART: &'static str = r#"
 __     __              _
 \ \   / /__   ___ __ _| |__
  \ \ / / _ \ / __/ _` | '_ \
   \ V / (_) | (_| (_| | |_) |
    \_/ \___/ \___\__,_|_.__/
        word quiz trainer"#;

    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for Logo<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| Line::from(Span::styled(line, Style::default().fg(self.theme.colors.primary))))
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Progress Panel Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct ProgressPanel<'a> {
    user: Option<&'a str>,
    overview: Option<ProgressOverview>,
    theme: &'a Theme,
}

impl<'a> ProgressPanel<'a> {
    pub fn new(user: Option<&'a str>, overview: Option<ProgressOverview>, theme: &'a Theme) -> Self {
        Self { user, overview, theme }
    }

    fn row(&self, label: &'a str, value: String, style: Style) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), self.theme.muted()),
            Span::styled(value, style),
        ])
    }
}

impl Widget for ProgressPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.user {
            Some(name) => format!(" {} ", name),
            None => " no user ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border(false))
            .title(title)
            .title_style(self.theme.highlight());

        let inner = block.inner(area);
        block.render(area, buf);

        let value = Style::default().fg(self.theme.colors.text).add_modifier(Modifier::BOLD);
        let lines = match self.overview {
            Some(ref o) => vec![
                self.row("Answered", o.total_answered.to_string(), value),
                self.row("Correct", o.total_correct.to_string(), self.theme.correct()),
                self.row("Accuracy", format!("{}%", o.accuracy_percent), value),
                self.row("Misses", o.miss_count.to_string(), self.theme.wrong()),
                self.row("Streak", format!("{} {}", o.streak, icons::FIRE), value),
                self.row("Badge", format!("{} {}", icons::STAR, o.badge.label()), self.theme.badge()),
            ],
            None => vec![
                Line::from(""),
                Line::from(Span::styled("Enter a name to start", self.theme.muted())),
            ],
        };

        Paragraph::new(lines).render(inner, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Question Card Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct QuestionCard<'a> {
    question: &'a Question,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(question: &'a Question, theme: &'a Theme) -> Self {
        Self { question, theme }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (pill, pill_style) = if self.question.is_typed() {
            (" TYPE ", self.theme.pill_typed())
        } else {
            (" CHOICE ", self.theme.pill_choice())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.accent))
            .style(Style::default().bg(self.theme.colors.bg_card))
            .title(Line::from(Span::styled(pill, pill_style)))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![Line::from(Span::styled(self.question.prompt.as_str(), self.theme.prompt()))];
        if self.question.is_typed() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("type the English word", self.theme.muted())));
        }

        let content_height = lines.len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;
        let content_area = Rect {
            y: inner.y + vertical_padding,
            height: inner.height.saturating_sub(vertical_padding),
            ..inner
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Choice List Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct ChoiceList<'a> {
    choices: &'a [String],
    picked: Option<&'a str>,
    feedback: Option<&'a AnswerFeedback>,
    theme: &'a Theme,
}

impl<'a> ChoiceList<'a> {
    pub fn new(
        choices: &'a [String],
        picked: Option<&'a str>,
        feedback: Option<&'a AnswerFeedback>,
        theme: &'a Theme,
    ) -> Self {
        Self { choices, picked, feedback, theme }
    }

    fn style_for(&self, choice: &str) -> Style {
        let Some(feedback) = self.feedback else {
            return Style::default().fg(self.theme.colors.text);
        };
        if choice == feedback.expected {
            self.theme.correct()
        } else if Some(choice) == self.picked {
            self.theme.wrong()
        } else {
            Style::default().fg(self.theme.colors.text_dim)
        }
    }
}

impl Widget for ChoiceList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::vertical(self.choices.iter().map(|_| Constraint::Length(3))).split(area);

        for (i, choice) in self.choices.iter().enumerate() {
            let style = self.style_for(choice);
            let button = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style);

            let inner = button.inner(rows[i]);
            button.render(rows[i], buf);

            Paragraph::new(Line::from(vec![
                Span::styled(format!("{}  ", i + 1), self.theme.key_highlight()),
                Span::styled(choice.as_str(), style),
            ]))
            .render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Text Input Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct TextInput<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TextInput<'a> {
    pub fn new(label: &'a str, value: &'a str, focused: bool, theme: &'a Theme) -> Self {
        Self { label, value, focused, theme }
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border(self.focused))
            .title(format!(" {} ", self.label))
            .title_style(self.theme.highlight());

        let cursor = if self.focused { "▏" } else { "" };
        Paragraph::new(Line::from(vec![
            Span::styled(self.value, Style::default().fg(self.theme.colors.text)),
            Span::styled(cursor, self.theme.highlight()),
        ]))
        .block(block)
        .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Feedback Line Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FeedbackLine<'a> {
    feedback: &'a AnswerFeedback,
    theme: &'a Theme,
}

impl<'a> FeedbackLine<'a> {
    pub fn new(feedback: &'a AnswerFeedback, theme: &'a Theme) -> Self {
        Self { feedback, theme }
    }
}

impl Widget for FeedbackLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = if self.feedback.correct {
            Line::from(Span::styled(format!("{} Correct!", icons::CHECK), self.theme.correct()))
        } else {
            let word = &self.feedback.word;
            Line::from(vec![
                Span::styled(format!("{} Wrong. ", icons::CROSS), self.theme.wrong()),
                Span::styled("Answer: ", self.theme.muted()),
                Span::styled(self.feedback.expected.as_str(), self.theme.correct()),
                Span::styled(format!("  ({} = {})", word.source, word.target), self.theme.muted()),
            ])
        };

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.text_dim)),
                ]
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Result Screen Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct ResultScreen<'a> {
    summary: &'a QuizSummary,
    theme: &'a Theme,
}

impl<'a> ResultScreen<'a> {
    pub fn new(summary: &'a QuizSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }

    fn miss_line(&self, word: &'a WordPair) -> Line<'a> {
        Line::from(vec![
            Span::styled(word.source.as_str(), Style::default().fg(self.theme.colors.text)),
            Span::styled(" — ", self.theme.muted()),
            Span::styled(word.target.as_str(), self.theme.muted()),
        ])
    }
}

impl Widget for ResultScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.summary.is_review { "REVIEW COMPLETE" } else { "QUIZ COMPLETE" };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.success))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(title, self.theme.correct()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("Correct ", self.theme.muted()),
                Span::styled(
                    format!("{} / {}", self.summary.correct_count, self.summary.total_count),
                    self.theme.highlight(),
                ),
                Span::styled(format!("  (misses {})", self.summary.wrong_count), self.theme.muted()),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!("{} Words to review", icons::BOOK), self.theme.title())),
        ];

        if self.summary.unique_misses.is_empty() {
            text.push(Line::from(Span::styled("No misses this time.", self.theme.correct())));
        } else {
            text.extend(self.summary.unique_misses.iter().map(|w| self.miss_line(w)));
        }

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn result_screen_lists_misses() {
        let theme = Theme::default();
        let summary = QuizSummary {
            correct_count: 8,
            total_count: 10,
            wrong_count: 2,
            unique_misses: vec![WordPair::new("river", "kawa")],
            is_review: false,
        };
        let area = Rect::new(0, 0, 50, 12);
        let mut buf = Buffer::empty(area);
        ResultScreen::new(&summary, &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("8 / 10"));
        assert!(text.contains("river"));
    }

    #[test]
    fn progress_panel_shows_badge() {
        let theme = Theme::default();
        let record = UserRecord {
            total_answered: 60,
            total_correct: 55,
            ..Default::default()
        };
        let area = Rect::new(0, 0, 40, 9);
        let mut buf = Buffer::empty(area);
        ProgressPanel::new(Some("ami"), Some(record.overview()), &theme).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("consistency"));
        assert!(text.contains("92%"));
    }
}
