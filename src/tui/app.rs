use crate::catalog::{Contestant, ContestantId, Criterion};
use crate::session::JudgeSession;
use crate::store::ScoreStore;

/// Input focus within a contestant tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Criterion(usize),
    Comments,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
}

/// Judging screen state: one tab per contestant, then "Judge Ranking".
pub struct App<S> {
    pub session: JudgeSession<S>,
    pub tab: usize,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub should_quit: bool,
}

impl<S: ScoreStore> App<S> {
    pub fn new(session: JudgeSession<S>) -> Self {
        let focus = first_focus(&session.settings().criteria);
        Self {
            session,
            tab: 0,
            focus,
            input_mode: InputMode::Normal,
            should_quit: false,
        }
    }

    pub fn tab_titles(&self) -> Vec<String> {
        self.session
            .settings()
            .contestants
            .iter()
            .map(|c| c.name.clone())
            .chain(std::iter::once("Judge Ranking".to_string()))
            .collect()
    }

    pub fn tab_count(&self) -> usize {
        self.session.settings().contestants.len() + 1
    }

    pub fn is_ranking_tab(&self) -> bool {
        self.tab >= self.session.settings().contestants.len()
    }

    pub fn active_contestant(&self) -> Option<&Contestant> {
        self.session.settings().contestants.get(self.tab)
    }

    fn active_contestant_id(&self) -> Option<ContestantId> {
        self.active_contestant().map(|c| c.id.clone())
    }

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % self.tab_count();
        self.focus = first_focus(&self.session.settings().criteria);
    }

    pub fn previous_tab(&mut self) {
        let count = self.tab_count();
        self.tab = (self.tab + count - 1) % count;
        self.focus = first_focus(&self.session.settings().criteria);
    }

    /// Criteria fields in order, then the comments box, wrapping around.
    pub fn next_field(&mut self) {
        let criteria = self.session.settings().criteria.len();
        self.focus = match self.focus {
            Focus::Criterion(i) if i + 1 < criteria => Focus::Criterion(i + 1),
            Focus::Criterion(_) => Focus::Comments,
            Focus::Comments => first_focus(&self.session.settings().criteria),
        };
    }

    pub fn previous_field(&mut self) {
        let criteria = self.session.settings().criteria.len();
        self.focus = match self.focus {
            Focus::Criterion(0) => Focus::Comments,
            Focus::Criterion(i) => Focus::Criterion(i - 1),
            Focus::Comments if criteria > 0 => Focus::Criterion(criteria - 1),
            Focus::Comments => Focus::Comments,
        };
    }

    /// Displayed text of a criterion field: the score, or empty when absent.
    pub fn field_value(&self, criterion: &Criterion) -> String {
        self.active_contestant()
            .and_then(|c| self.session.shape().score(&c.id, &criterion.id))
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    pub fn comment_value(&self) -> &str {
        match self.active_contestant() {
            Some(c) => self.session.shape().comments(&c.id),
            None => "",
        }
    }

    /// Append a typed character to the focused field. Criterion fields only
    /// change when the resulting text is a valid score.
    pub fn type_char(&mut self, c: char) {
        match self.focus {
            Focus::Criterion(_) => {
                let raw = format!("{}{}", self.focused_field_value(), c);
                self.set_focused_score(&raw);
            }
            Focus::Comments => {
                let text = format!("{}{}", self.comment_value(), c);
                self.set_comment(&text);
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Criterion(_) => {
                let mut raw = self.focused_field_value();
                raw.pop();
                self.set_focused_score(&raw);
            }
            Focus::Comments => {
                let mut text = self.comment_value().to_string();
                text.pop();
                self.set_comment(&text);
            }
        }
    }

    /// Empty the focused field (a criterion becomes absent).
    pub fn clear_field(&mut self) {
        match self.focus {
            Focus::Criterion(_) => self.set_focused_score(""),
            Focus::Comments => self.set_comment(""),
        }
    }

    /// Save the contestant on screen. The outcome shows as a flash message.
    pub async fn save_active(&mut self) {
        if let Some(contestant) = self.active_contestant_id() {
            // failures are logged and flashed by the session
            let _ = self.session.save(&contestant).await;
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    fn focused_field_value(&self) -> String {
        match self.focus {
            Focus::Criterion(i) => self
                .session
                .settings()
                .criteria
                .get(i)
                .map(|criterion| self.field_value(criterion))
                .unwrap_or_default(),
            Focus::Comments => String::new(),
        }
    }

    fn set_focused_score(&mut self, raw: &str) {
        let Focus::Criterion(i) = self.focus else {
            return;
        };
        let Some(contestant) = self.active_contestant_id() else {
            return;
        };
        let Some(criterion) = self.session.settings().criteria.get(i).map(|c| c.id.clone()) else {
            return;
        };
        self.session.set_score(&contestant, &criterion, raw);
    }

    fn set_comment(&mut self, text: &str) {
        if let Some(contestant) = self.active_contestant_id() {
            self.session.set_comment(&contestant, text);
        }
    }
}

fn first_focus(criteria: &[Criterion]) -> Focus {
    if criteria.is_empty() {
        Focus::Comments
    } else {
        Focus::Criterion(0)
    }
}
