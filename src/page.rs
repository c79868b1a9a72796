//! The four screens of the game and the transitions allowed between them.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A screen of the single-page UI. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Rules,
    Level,
    Question,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Rules, Page::Level, Page::Question];

    pub fn key(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Rules => "rules",
            Page::Level => "level",
            Page::Question => "question",
        }
    }

    /// Id of the page container element.
    pub fn element_id(self) -> &'static str {
        match self {
            Page::Home => "page-home",
            Page::Rules => "page-rules",
            Page::Level => "page-level",
            Page::Question => "page-question",
        }
    }

    pub fn from_key(key: &str) -> Result<Page, AppError> {
        Page::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| AppError::UnknownPage(key.to_string()))
    }
}

impl FromStr for Page {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::from_key(s)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn is_valid_transition(from: Page, to: Page) -> bool {
    use Page::*;
    from == to
        || matches!(
            (from, to),
            (Home, Rules)
                | (Rules, Home)
                | (Rules, Level)
                | (Level, Rules)
                | (Level, Question)
                | (Question, Level)
        )
}

/// Tracks the active page and rejects moves outside the screen flow.
#[derive(Debug, Clone)]
pub struct PageFlow {
    current: Page,
}

impl PageFlow {
    pub fn new() -> Self {
        Self { current: Page::Home }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Move to `to`. On rejection the active page is left as it was.
    pub fn go(&mut self, to: Page) -> Result<Page, AppError> {
        if !is_valid_transition(self.current, to) {
            return Err(AppError::InvalidTransition { from: self.current, to });
        }
        self.current = to;
        Ok(to)
    }
}

impl Default for PageFlow {
    fn default() -> Self {
        Self::new()
    }
}
