//! Screen controller: reacts to button presses, talks to the API and keeps
//! the view in sync with the session.

use std::cell::{Ref, RefCell};

use crate::api::{ApiClient, Transport};
use crate::error::AppError;
use crate::page::{Page, PageFlow};
use crate::session::{Action, Level, SessionState, normalize_relationship};

/// The parts of the page the controller reads from and writes to.
pub trait View {
    /// Mark `page` as the only active page.
    fn show_page(&self, page: Page);
    fn relationship_input(&self) -> String;
    fn set_relationship_label(&self, text: &str);
    fn set_badge(&self, text: &str);
    fn set_question(&self, text: &str);
}

pub struct Controller<T, V> {
    api: ApiClient<T>,
    view: V,
    flow: RefCell<PageFlow>,
    state: RefCell<SessionState>,
}

impl<T: Transport, V: View> Controller<T, V> {
    pub fn new(api: ApiClient<T>, view: V) -> Self {
        let flow = PageFlow::new();
        view.show_page(flow.current());
        Self {
            api,
            view,
            flow: RefCell::new(flow),
            state: RefCell::new(SessionState::new()),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> Ref<'_, SessionState> {
        self.state.borrow()
    }

    pub fn current_page(&self) -> Page {
        self.flow.borrow().current()
    }

    /// Show the page registered under `key` (`home`, `rules`, `level`, `question`).
    pub fn show_page(&self, key: &str) -> Result<(), AppError> {
        self.navigate(Page::from_key(key)?)
    }

    pub fn navigate(&self, page: Page) -> Result<(), AppError> {
        self.flow.borrow_mut().go(page)?;
        self.view.show_page(page);
        Ok(())
    }

    /// Open a server session for the typed relationship and move to the rules.
    /// A failed start leaves both the session and the page untouched.
    pub async fn start(&self) -> Result<(), AppError> {
        let relationship = normalize_relationship(
            &self.view.relationship_input(),
            &self.api.config().fallback_relationship,
        );
        let resp = self.api.start(&relationship).await?;
        log::info!("session {} started for '{}'", resp.session_id, relationship);
        self.state.borrow_mut().begin(resp.session_id, relationship.clone());
        self.view.set_relationship_label(&relationship);
        self.navigate(Page::Rules)
    }

    pub fn back_home(&self) -> Result<(), AppError> {
        self.navigate(Page::Home)
    }

    pub fn to_level(&self) -> Result<(), AppError> {
        self.navigate(Page::Level)
    }

    pub fn back_to_rules(&self) -> Result<(), AppError> {
        self.navigate(Page::Rules)
    }

    /// Leave the question screen for the level picker.
    pub fn back_to_level(&self) -> Result<(), AppError> {
        self.navigate(Page::Level)
    }

    pub async fn select_level(&self, level: Level) -> Result<(), AppError> {
        self.navigate(Page::Question)?;
        self.state.borrow_mut().set_level(level);
        self.load_next_question(None).await
    }

    pub async fn skip(&self) -> Result<(), AppError> {
        self.load_next_question(Some(Action::Skip)).await
    }

    pub async fn done(&self) -> Result<(), AppError> {
        self.load_next_question(Some(Action::Done)).await
    }

    /// Fetch the next card. While waiting, badge and text show the loading
    /// placeholder; on failure the placeholder stays.
    pub async fn load_next_question(&self, action: Option<Action>) -> Result<(), AppError> {
        let (req, ticket) = self.state.borrow_mut().question_request(action)?;
        let cfg = self.api.config();
        self.view.set_badge(&cfg.loading_text);
        self.view.set_question(&cfg.loading_text);

        let resp = self.api.question(&req).await?;
        if !self.state.borrow_mut().accept_question(ticket, &resp) {
            log::debug!("dropped superseded question '{}'", resp.question);
            return Ok(());
        }
        self.view.set_badge(&cfg.badge(&resp.level));
        self.view.set_question(&resp.question);
        Ok(())
    }
}
