// Service worker tests for the offline shell cache.
// Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use deepcard::CacheConfig;
use deepcard::worker::{
    Lifecycle, WorkerPhase, activate_step, cache_first, drop_stale_caches, install_step, precache,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Cache, CacheStorage, Request, Response, ServiceWorkerGlobalScope};

wasm_bindgen_test_configure!(run_in_service_worker);

fn scope() -> ServiceWorkerGlobalScope {
    js_sys::global().dyn_into().unwrap()
}

fn caches() -> CacheStorage {
    scope().caches().unwrap()
}

fn url(path: &str) -> String {
    format!("{}{}", scope().location().origin(), path)
}

async fn open(name: &str) -> Cache {
    JsFuture::from(caches().open(name)).await.unwrap().dyn_into().unwrap()
}

async fn has_cache(name: &str) -> bool {
    JsFuture::from(caches().has(name)).await.unwrap().as_bool().unwrap()
}

async fn cached(cache: &Cache, url: &str) -> bool {
    !JsFuture::from(cache.match_with_str(url)).await.unwrap().is_undefined()
}

async fn stored_anywhere(url: &str) -> bool {
    !JsFuture::from(caches().match_with_str(url)).await.unwrap().is_undefined()
}

async fn body(resp: JsValue) -> String {
    let resp: Response = resp.dyn_into().unwrap();
    JsFuture::from(resp.text().unwrap()).await.unwrap().as_string().unwrap()
}

fn config(name: &str, precache: &[&str]) -> Rc<CacheConfig> {
    Rc::new(CacheConfig {
        name: name.to_string(),
        precache: precache.iter().map(|s| s.to_string()).collect(),
    })
}

#[wasm_bindgen_test]
async fn precache_is_all_or_nothing() {
    let name = "deepcard-test-precache";
    let cfg = config(name, &["/", "/deepcard-missing-asset.css"]);
    assert!(precache(caches(), cfg).await.is_err());
    let cache = open(name).await;
    assert!(!cached(&cache, &url("/")).await);
    JsFuture::from(caches().delete(name)).await.unwrap();
}

#[wasm_bindgen_test]
async fn failed_install_rejects_and_marks_redundant() {
    let lifecycle = Rc::new(Lifecycle::new());
    let cfg = config("deepcard-test-install", &["/deepcard-missing-asset.css"]);
    let res = JsFuture::from(install_step(Ok(caches()), cfg, lifecycle.clone())).await;
    assert!(res.is_err());
    assert_eq!(lifecycle.phase(), WorkerPhase::Redundant);
    JsFuture::from(caches().delete("deepcard-test-install")).await.unwrap();
}

#[wasm_bindgen_test]
async fn install_without_cache_storage_rejects() {
    let lifecycle = Rc::new(Lifecycle::new());
    let cfg = config("deepcard-test-none", &["/"]);
    let res = JsFuture::from(install_step(
        Err(JsValue::from_str("no cache storage")),
        cfg,
        lifecycle.clone(),
    ))
    .await;
    assert!(res.is_err());
    assert_eq!(lifecycle.phase(), WorkerPhase::Redundant);
    assert!(!has_cache("deepcard-test-none").await);
}

#[wasm_bindgen_test]
async fn activate_deletes_every_other_cache() {
    for name in ["deepcard-test-v1", "deepcard-test-v2", "deepcard-test-v3"] {
        open(name).await;
    }
    drop_stale_caches(caches(), config("deepcard-test-v3", &[])).await.unwrap();
    assert!(!has_cache("deepcard-test-v1").await);
    assert!(!has_cache("deepcard-test-v2").await);
    assert!(has_cache("deepcard-test-v3").await);

    let lifecycle = Rc::new(Lifecycle::new());
    let res = JsFuture::from(activate_step(
        Ok(caches()),
        config("deepcard-test-v4", &[]),
        lifecycle.clone(),
    ))
    .await;
    assert!(res.is_ok());
    assert_eq!(lifecycle.phase(), WorkerPhase::Activated);
    assert!(!has_cache("deepcard-test-v3").await);
}

#[wasm_bindgen_test]
async fn cache_hit_is_served_from_cache() {
    let name = "deepcard-test-fetch";
    let cache = open(name).await;
    let hit_url = url("/deepcard-test/cached.txt");
    let stored = Response::new_with_opt_str(Some("from cache")).unwrap();
    JsFuture::from(cache.put_with_str(&hit_url, &stored)).await.unwrap();

    let request = Request::new_with_str(&hit_url).unwrap();
    let resp = cache_first(scope(), caches(), request).await.unwrap();
    assert_eq!(body(resp).await, "from cache");
    JsFuture::from(caches().delete(name)).await.unwrap();
}

#[wasm_bindgen_test]
async fn cache_miss_goes_to_network_and_is_not_stored() {
    let name = "deepcard-test-miss";
    open(name).await;
    let miss_url = url("/deepcard-test/not-cached.txt");

    let request = Request::new_with_str(&miss_url).unwrap();
    let resp = cache_first(scope(), caches(), request).await.unwrap();
    assert!(resp.dyn_into::<Response>().is_ok());
    assert!(!stored_anywhere(&miss_url).await);
    JsFuture::from(caches().delete(name)).await.unwrap();
}
