//! Deep Card client crate.
//!
//! The page loads the wasm module and calls `start_app()`; the service worker
//! script loads the same module and calls `start_cache_worker()`. Everything
//! below the two entrypoints is plain Rust behind the `Transport` and `View`
//! traits so the game flow can be tested natively.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::window;

pub mod api;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod page;
pub mod session;
pub mod worker;

pub use api::{ApiClient, HttpReply, QuestionRequest, QuestionResponse, Transport};
pub use config::{AppConfig, CacheConfig};
pub use controller::{Controller, View};
pub use error::{ApiError, AppError};
pub use page::{Page, PageFlow};
pub use session::{Action, Level, SessionState};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(config::log_level());
}

/// Bind the four screens of the page to a fresh session.
#[wasm_bindgen]
pub fn start_app() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = dom::app_config(&doc);
    log::info!("starting deepcard client (api base '{}')", config.api_base);
    let view = dom::DomView::new(&doc)?;
    let app = Rc::new(Controller::new(ApiClient::new(fetch::FetchTransport, config), view));
    dom::bind(&doc, app)
}

/// Install the offline shell cache listeners. Call from the service worker script.
#[wasm_bindgen]
pub fn start_cache_worker() -> Result<(), JsValue> {
    worker::register(CacheConfig::default())
}
