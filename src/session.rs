//! Per-visit session state: server session id, relationship label, picked
//! level and the ordered history of questions already shown.
//!
//! Question requests are numbered. Only the response to the most recently
//! issued request is applied, so a slow reply can never overwrite a newer one
//! on screen or slip into the history out of order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::{QuestionRequest, QuestionResponse};
use crate::error::AppError;

/// Difficulty / question pool identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[default]
    A,
    B,
    C,
    D,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::A, Level::B, Level::C, Level::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::A => "A",
            Level::B => "B",
            Level::C => "C",
            Level::D => "D",
        }
    }
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the player did with the current card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Skip,
    Done,
}

/// Trim the typed label; blank input becomes `fallback`.
pub fn normalize_relationship(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Identifies one issued question request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket(u64);

#[derive(Debug, Default, Clone)]
pub struct SessionState {
    session_id: Option<String>,
    relationship: String,
    level: Option<Level>,
    history: Vec<String>,
    generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Record a freshly started server session. Starting again begins a new
    /// session: level and history are dropped and tickets from the previous
    /// session go stale.
    pub fn begin(&mut self, session_id: String, relationship: String) {
        self.session_id = Some(session_id);
        self.relationship = relationship;
        self.level = None;
        self.history.clear();
        self.generation += 1;
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = Some(level);
    }

    /// Build the next question request and issue a ticket for it. Any ticket
    /// issued earlier becomes stale.
    pub fn question_request(
        &mut self,
        action: Option<Action>,
    ) -> Result<(QuestionRequest, RequestTicket), AppError> {
        let session_id = self.session_id.clone().ok_or(AppError::NoSession)?;
        self.generation += 1;
        let req = QuestionRequest {
            session_id: Some(session_id),
            level: self.level.unwrap_or_default().as_str().to_string(),
            action,
            history: self.history.clone(),
        };
        Ok((req, RequestTicket(self.generation)))
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply a question response. Returns `false` (and changes nothing) when
    /// the ticket has been superseded by a newer request.
    pub fn accept_question(&mut self, ticket: RequestTicket, resp: &QuestionResponse) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        // the server may move the player to another pool
        if let Ok(level) = resp.level.parse::<Level>() {
            self.level = Some(level);
        }
        self.history.push(resp.question.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(level: &str, question: &str) -> QuestionResponse {
        QuestionResponse { level: level.into(), question: question.into() }
    }

    #[test]
    fn blank_relationship_falls_back() {
        for input in ["", " ", "\t\n", "　"] {
            assert_eq!(normalize_relationship(input, "朋友"), "朋友", "input {:?}", input);
        }
    }

    #[test]
    fn relationship_is_trimmed() {
        assert_eq!(normalize_relationship("  媽媽 ", "朋友"), "媽媽");
        assert_eq!(normalize_relationship("old friend", "朋友"), "old friend");
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!("b".parse::<Level>().unwrap(), Level::B);
        assert_eq!(" D ".parse::<Level>().unwrap(), Level::D);
        assert!(matches!("E".parse::<Level>(), Err(AppError::UnknownLevel(_))));
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn question_request_needs_a_session() {
        let mut st = SessionState::new();
        assert!(matches!(st.question_request(None), Err(AppError::NoSession)));
    }

    #[test]
    fn question_request_carries_full_history() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "媽媽".into());
        st.set_level(Level::C);
        let (_, t) = st.question_request(None).unwrap();
        assert!(st.accept_question(t, &response("C", "Q1")));
        let (req, _) = st.question_request(Some(Action::Done)).unwrap();
        assert_eq!(req.session_id.as_deref(), Some("s1"));
        assert_eq!(req.level, "C");
        assert_eq!(req.action, Some(Action::Done));
        assert_eq!(req.history, vec!["Q1".to_string()]);
    }

    #[test]
    fn history_is_not_deduplicated() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "x".into());
        for _ in 0..2 {
            let (_, t) = st.question_request(Some(Action::Skip)).unwrap();
            assert!(st.accept_question(t, &response("A", "same")));
        }
        assert_eq!(st.history(), ["same", "same"]);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "x".into());
        st.set_level(Level::A);
        let (_, first) = st.question_request(None).unwrap();
        let (_, second) = st.question_request(Some(Action::Skip)).unwrap();
        assert!(!st.accept_question(first, &response("A", "old")));
        assert!(st.history().is_empty());
        assert!(st.accept_question(second, &response("A", "new")));
        assert_eq!(st.history(), ["new"]);
    }

    #[test]
    fn server_level_override_is_adopted() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "x".into());
        st.set_level(Level::B);
        let (_, t) = st.question_request(None).unwrap();
        st.accept_question(t, &response("D", "deep"));
        assert_eq!(st.level(), Some(Level::D));
        // unknown levels are displayed but not adopted
        let (_, t) = st.question_request(None).unwrap();
        st.accept_question(t, &response("Z", "odd"));
        assert_eq!(st.level(), Some(Level::D));
    }

    #[test]
    fn ticket_from_previous_session_is_stale() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "a".into());
        st.set_level(Level::A);
        let (_, old) = st.question_request(None).unwrap();
        st.begin("s2".into(), "b".into());
        assert!(!st.is_current(old));
        assert!(!st.accept_question(old, &response("C", "from s1")));
        assert!(st.history().is_empty());
        assert_eq!(st.level(), None);
    }

    #[test]
    fn restarting_begins_a_clean_session() {
        let mut st = SessionState::new();
        st.begin("s1".into(), "a".into());
        st.set_level(Level::B);
        let (_, t) = st.question_request(None).unwrap();
        st.accept_question(t, &response("B", "Q1"));
        st.begin("s2".into(), "b".into());
        assert_eq!(st.session_id(), Some("s2"));
        assert_eq!(st.relationship(), "b");
        assert_eq!(st.level(), None);
        assert!(st.history().is_empty());
    }
}
