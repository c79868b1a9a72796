//! Browser DOM side of the controller: element lookups, the `View`
//! implementation and click-handler wiring.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement};

use crate::api::Transport;
use crate::config::{API_BASE_ATTR, AppConfig};
use crate::controller::{Controller, View};
use crate::error::AppError;
use crate::page::Page;
use crate::session::Level;

/// Class toggled on the visible page container.
pub const ACTIVE_CLASS: &str = "active";

fn by_id(doc: &Document, id: &str) -> Result<Element, AppError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| AppError::MissingElement(id.to_string()))
}

/// Defaults, with `api_base` taken from `<body data-api-base>` when present.
pub fn app_config(doc: &Document) -> AppConfig {
    let config = AppConfig::default();
    match doc.body().and_then(|b| b.get_attribute(API_BASE_ATTR)) {
        Some(base) => config.with_api_base(&base),
        None => config,
    }
}

pub struct DomView {
    pages: Vec<(Page, Element)>,
    relationship: HtmlInputElement,
    relationship_label: Element,
    badge: Element,
    question: Element,
}

impl DomView {
    /// Resolve every element the controller touches; fails on the first missing id.
    pub fn new(doc: &Document) -> Result<Self, AppError> {
        let pages = Page::ALL
            .into_iter()
            .map(|p| by_id(doc, p.element_id()).map(|el| (p, el)))
            .collect::<Result<Vec<_>, _>>()?;
        let relationship = by_id(doc, "relationship")?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| AppError::MissingElement("relationship".into()))?;
        Ok(Self {
            pages,
            relationship,
            relationship_label: by_id(doc, "relationship-label")?,
            badge: by_id(doc, "badge-level")?,
            question: by_id(doc, "question-text")?,
        })
    }
}

impl View for DomView {
    fn show_page(&self, page: Page) {
        for (p, el) in &self.pages {
            let classes = el.class_list();
            let res = if *p == page {
                classes.add_1(ACTIVE_CLASS)
            } else {
                classes.remove_1(ACTIVE_CLASS)
            };
            if let Err(e) = res {
                log::warn!("toggling #{}: {:?}", el.id(), e);
            }
        }
    }

    fn relationship_input(&self) -> String {
        self.relationship.value()
    }

    fn set_relationship_label(&self, text: &str) {
        self.relationship_label.set_text_content(Some(text));
    }

    fn set_badge(&self, text: &str) {
        self.badge.set_text_content(Some(text));
    }

    fn set_question(&self, text: &str) {
        self.question.set_text_content(Some(text));
    }
}

fn report(result: Result<(), AppError>) {
    if let Err(e) = result {
        log::error!("{}", e);
    }
}

fn on_click<F: FnMut() + 'static>(el: &Element, mut handler: F) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        handler();
    }) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Attach every button of the four screens to `app`.
pub fn bind<T, V>(doc: &Document, app: Rc<Controller<T, V>>) -> Result<(), JsValue>
where
    T: Transport + 'static,
    V: View + 'static,
{
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-start")?, move || {
            let app = app.clone();
            spawn_local(async move { report(app.start().await) });
        })?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-back-home")?, move || report(app.back_home()))?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-to-level")?, move || report(app.to_level()))?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-back-rules")?, move || report(app.back_to_rules()))?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-to-level-2")?, move || report(app.back_to_level()))?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-skip")?, move || {
            let app = app.clone();
            spawn_local(async move { report(app.skip().await) });
        })?;
    }
    {
        let app = app.clone();
        on_click(&by_id(doc, "btn-done")?, move || {
            let app = app.clone();
            spawn_local(async move { report(app.done().await) });
        })?;
    }

    let wheel = doc.query_selector_all(".wheel-btn")?;
    let mut bound = 0;
    for i in 0..wheel.length() {
        let Some(el) = wheel.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let raw = el.get_attribute("data-level").unwrap_or_default();
        let level = match raw.parse::<Level>() {
            Ok(level) => level,
            Err(e) => {
                log::warn!("skipping wheel button: {}", e);
                continue;
            }
        };
        let app = app.clone();
        on_click(&el, move || {
            let app = app.clone();
            spawn_local(async move { report(app.select_level(level).await) });
        })?;
        bound += 1;
    }
    log::debug!("bound {} level buttons", bound);
    Ok(())
}
