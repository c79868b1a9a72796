//! `Transport` backed by the browser's `fetch`.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::api::{HttpReply, Transport};
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

fn js_err(err: JsValue) -> ApiError {
    ApiError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl Transport for FetchTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpReply, ApiError> {
        let win = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;

        let headers = Headers::new().map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));
        let request = Request::new_with_str_and_init(url, &init).map_err(js_err)?;

        let resp: Response = JsFuture::from(win.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let text = JsFuture::from(resp.text().map_err(js_err)?).await.map_err(js_err)?;
        Ok(HttpReply {
            status: resp.status(),
            body: text.as_string().unwrap_or_default(),
        })
    }
}
