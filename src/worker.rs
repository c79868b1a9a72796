//! Service worker that keeps the static shell available offline.
//!
//! - install: pre-cache `CacheConfig::precache` into `CacheConfig::name`; one
//!   failed asset fails the whole install.
//! - activate: delete every cache whose name is not the current one.
//! - fetch: same-origin GETs are answered from the cache, falling back to the
//!   network. Network responses are not written back.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use js_sys::{Array, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    Cache, CacheStorage, ExtendableEvent, FetchEvent, Request, ServiceWorkerGlobalScope,
};

use crate::config::CacheConfig;

/// Lifecycle of the worker as seen from inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerPhase {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerPhase {
    pub fn can_become(self, to: WorkerPhase) -> bool {
        use WorkerPhase::*;
        matches!(
            (self, to),
            (Parsed, Installing)
                | (Parsed, Activating) // already installed by a previous run of the script
                | (Installing, Installed)
                | (Installing, Redundant)
                | (Installed, Activating)
                | (Activating, Activated)
                | (Activating, Redundant)
                | (Activated, Redundant)
        )
    }
}

/// Tracks the current phase. Moves outside `WorkerPhase::can_become` are refused.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Cell<WorkerPhase>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { phase: Cell::new(WorkerPhase::Parsed) }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase.get()
    }

    /// Returns `false` and keeps the current phase when the move is invalid.
    pub fn advance(&self, to: WorkerPhase) -> bool {
        let from = self.phase.get();
        if !from.can_become(to) {
            log::warn!("refusing worker transition {:?} -> {:?}", from, to);
            return false;
        }
        log::info!("worker {:?}", to);
        self.phase.set(to);
        true
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a request goes through the cache: GETs for the worker's own origin only.
pub fn should_intercept(method: &str, request_url: &str, origin: &str) -> bool {
    if !method.eq_ignore_ascii_case("GET") {
        return false;
    }
    match (url::Url::parse(request_url), url::Url::parse(origin)) {
        (Ok(req), Ok(own)) => req.origin() == own.origin(),
        _ => false,
    }
}

/// Cache names left over from earlier deployments.
pub fn stale_caches<'a>(names: &'a [String], current: &str) -> Vec<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|n| *n != current)
        .collect()
}

/// Store every precache asset, or none of them (`Cache.addAll` semantics).
pub async fn precache(caches: CacheStorage, config: Rc<CacheConfig>) -> Result<(), JsValue> {
    let cache: Cache = JsFuture::from(caches.open(&config.name)).await?.dyn_into()?;
    let assets: Array = config.precache.iter().map(|p| JsValue::from_str(p)).collect();
    JsFuture::from(cache.add_all_with_str_sequence(&assets)).await?;
    log::info!("cached {} assets in {}", config.precache.len(), config.name);
    Ok(())
}

pub async fn drop_stale_caches(caches: CacheStorage, current: Rc<CacheConfig>) -> Result<(), JsValue> {
    let keys: Array = JsFuture::from(caches.keys()).await?.dyn_into()?;
    let names: Vec<String> = keys.iter().filter_map(|k| k.as_string()).collect();
    for name in stale_caches(&names, &current.name) {
        JsFuture::from(caches.delete(name)).await?;
        log::info!("deleted stale cache {}", name);
    }
    Ok(())
}

/// Cached response when there is one, otherwise a live fetch that is not stored.
pub async fn cache_first(
    scope: ServiceWorkerGlobalScope,
    caches: CacheStorage,
    request: Request,
) -> Result<JsValue, JsValue> {
    let hit = JsFuture::from(caches.match_with_request(&request)).await?;
    if !hit.is_undefined() {
        return Ok(hit);
    }
    log::debug!("cache miss {}", request.url());
    JsFuture::from(scope.fetch_with_request(&request)).await
}

/// Enter `start`, run `step`, then move to `done` or `Redundant`. The promise
/// rejects when `start` cannot be entered or the step fails.
fn run_step<F>(lifecycle: Rc<Lifecycle>, start: WorkerPhase, done: WorkerPhase, step: F) -> Promise
where
    F: Future<Output = Result<(), JsValue>> + 'static,
{
    if !lifecycle.advance(start) {
        let msg = format!("cannot enter {:?} from {:?}", start, lifecycle.phase());
        return Promise::reject(&JsValue::from_str(&msg));
    }
    future_to_promise(async move {
        match step.await {
            Ok(()) => {
                lifecycle.advance(done);
                Ok(JsValue::UNDEFINED)
            }
            Err(e) => {
                log::error!("{:?} failed: {:?}", start, e);
                lifecycle.advance(WorkerPhase::Redundant);
                Err(e)
            }
        }
    })
}

/// Promise handed to the install event's `waitUntil`. Missing cache storage
/// rejects it, so the install fails instead of completing with nothing cached.
pub fn install_step(
    caches: Result<CacheStorage, JsValue>,
    config: Rc<CacheConfig>,
    lifecycle: Rc<Lifecycle>,
) -> Promise {
    run_step(lifecycle, WorkerPhase::Installing, WorkerPhase::Installed, async move {
        precache(caches?, config).await
    })
}

pub fn activate_step(
    caches: Result<CacheStorage, JsValue>,
    config: Rc<CacheConfig>,
    lifecycle: Rc<Lifecycle>,
) -> Promise {
    run_step(lifecycle, WorkerPhase::Activating, WorkerPhase::Activated, async move {
        drop_stale_caches(caches?, config).await
    })
}

/// Register install, activate and fetch listeners on the worker global scope.
pub fn register(config: CacheConfig) -> Result<(), JsValue> {
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let config = Rc::new(config);
    let lifecycle = Rc::new(Lifecycle::new());

    {
        let scope_in = scope.clone();
        let config = config.clone();
        let lifecycle = lifecycle.clone();
        let closure = Closure::wrap(Box::new(move |evt: ExtendableEvent| {
            let promise = install_step(scope_in.caches(), config.clone(), lifecycle.clone());
            if let Err(e) = evt.wait_until(&promise) {
                log::error!("install waitUntil: {:?}", e);
            }
        }) as Box<dyn FnMut(_)>);
        scope.add_event_listener_with_callback("install", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let scope_in = scope.clone();
        let config = config.clone();
        let lifecycle = lifecycle.clone();
        let closure = Closure::wrap(Box::new(move |evt: ExtendableEvent| {
            let promise = activate_step(scope_in.caches(), config.clone(), lifecycle.clone());
            if let Err(e) = evt.wait_until(&promise) {
                log::error!("activate waitUntil: {:?}", e);
            }
        }) as Box<dyn FnMut(_)>);
        scope.add_event_listener_with_callback("activate", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let scope_in = scope.clone();
        let origin = scope.location().origin();
        let closure = Closure::wrap(Box::new(move |evt: FetchEvent| {
            let request = evt.request();
            if !should_intercept(&request.method(), &request.url(), &origin) {
                return;
            }
            let caches = match scope_in.caches() {
                Ok(c) => c,
                Err(_) => return,
            };
            let promise = future_to_promise(cache_first(scope_in.clone(), caches, request));
            if let Err(e) = evt.respond_with(&promise) {
                log::error!("respondWith: {:?}", e);
            }
        }) as Box<dyn FnMut(_)>);
        scope.add_event_listener_with_callback("fetch", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::debug!("cache worker listeners registered for {}", config.name);
    Ok(())
}
