#![forbid(unsafe_code)]

use poem::http::{header, Method, StatusCode};
use poem::middleware::{CatchPanic, SetHeader};
use poem::{handler, Body, Endpoint, EndpointExt, IntoResponse, Request, Response};
use std::any::Any;
use log::{error, info, warn};

use crate::api::floating_text::FAILURE_PREFIX;
use crate::utils::server_utils::error_response;

pub mod api_info;
pub mod floating_text;
pub mod preflight;

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const FLOATING_TEXT_PATH : &str = "/api/floating-text";

const NOT_FOUND_MSG       : &str = "API接口不存在";
const NOT_IMPLEMENTED_MSG : &str = "不支持的请求方法";

// ***************************************************************************
//                                   App
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble the complete endpoint.  Every response, including errors and
 * caught panics, carries the permissive CORS origin header, and every
 * request is written to the access log.
 */
pub fn build_app() -> impl Endpoint<Output = Response> {
    with_middleware(dispatch)
}

// ---------------------------------------------------------------------------
// with_middleware:
// ---------------------------------------------------------------------------
fn with_middleware<E>(ep: E) -> impl Endpoint<Output = Response>
where
    E: Endpoint + 'static,
{
    ep.with(CatchPanic::new().with_handler(panic_response))
        .with(SetHeader::new().overriding(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .around(|ep, req| async move {
            let line = format!("\"{} {} {:?}\"", req.method(), req.uri(), req.version());
            let resp = ep.call(req).await?.into_response();
            info!("{} {}", line, resp.status().as_u16());
            poem::Result::Ok(resp)
        })
}

// ---------------------------------------------------------------------------
// panic_response:
// ---------------------------------------------------------------------------
/** A panicking request becomes a 500 carrying the panic message. */
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    let msg = FAILURE_PREFIX.to_owned() + detail.as_str();
    error!("❌ {}", msg);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
}

// ---------------------------------------------------------------------------
// dispatch:
// ---------------------------------------------------------------------------
// Route by method first; only POST looks at the path.
#[handler]
async fn dispatch(req: &Request, body: Body) -> Response {
    match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => preflight::preflight(),
        (&Method::GET, _) => api_info::get_api_info(),
        (&Method::POST, FLOATING_TEXT_PATH) => floating_text::get_floating_text(req, body).await,
        (&Method::POST, path) => {
            warn!("❌ {}: {}", NOT_FOUND_MSG, path);
            error_response(StatusCode::NOT_FOUND, NOT_FOUND_MSG.to_string())
        },
        (method, _) => {
            warn!("❌ {}: {}", NOT_IMPLEMENTED_MSG, method);
            error_response(StatusCode::NOT_IMPLEMENTED,
                           format!("{} ({})", NOT_IMPLEMENTED_MSG, method))
        },
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::server_utils::JSON_CONTENT_TYPE;
    use crate::utils::text_gen::TIPS;
    use poem::test::{TestClient, TestResponse};
    use serde_json::Value;

    async fn json_of(resp: TestResponse) -> Value {
        let bytes = resp.0.into_body().into_vec().await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    // The in-process client doesn't compute Content-Length, so set it the
    // way a real HTTP client would.
    async fn post_text(body: &'static str) -> TestResponse {
        let cli = TestClient::new(build_app());
        cli.post(FLOATING_TEXT_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len().to_string())
            .body(body)
            .send()
            .await
    }

    fn assert_text_shape(text: &str) {
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3, "text: {}", text);
        assert!(lines[1].starts_with("当前时间: "));
        assert!(TIPS.contains(&lines[2]));
    }

    #[tokio::test]
    async fn post_empty_object_returns_text() {
        let resp = post_text("{}").await;
        resp.assert_status_is_ok();
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        resp.assert_header(header::CONTENT_TYPE, JSON_CONTENT_TYPE);

        let v = json_of(resp).await;
        assert_eq!(v["success"], true);
        assert_eq!(v["message"], "文字内容获取成功");
        let text = v["text"].as_str().expect("text");
        assert!(!text.is_empty());
        assert_text_shape(text);
        assert!(v["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn post_without_body_behaves_like_empty_object() {
        let resp = post_text("").await;
        resp.assert_status_is_ok();
        let v = json_of(resp).await;
        assert_eq!(v["success"], true);
        assert_text_shape(v["text"].as_str().expect("text"));
    }

    #[tokio::test]
    async fn post_with_client_fields_is_accepted() {
        let resp = post_text(r#"{"tag":"%E5%81%A5%E5%BA%B7","devId":"a1b2","version":"1.4"}"#).await;
        resp.assert_status_is_ok();
    }

    #[tokio::test]
    async fn post_invalid_json_is_bad_request() {
        let resp = post_text("not-json").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        let v = json_of(resp).await;
        assert_eq!(v["success"], false);
        assert_eq!(v["message"], "请求数据格式错误");
    }

    #[tokio::test]
    async fn bad_content_length_is_internal_error() {
        let cli = TestClient::new(build_app());
        let resp = cli.post(FLOATING_TEXT_PATH)
            .header(header::CONTENT_LENGTH, "lots")
            .body("{}")
            .send()
            .await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let v = json_of(resp).await;
        let msg = v["message"].as_str().expect("message");
        assert!(msg.starts_with("处理请求失败: "));
        assert!(msg.contains("Content-Length"));
    }

    #[tokio::test]
    async fn query_string_does_not_affect_routing() {
        let cli = TestClient::new(build_app());
        let resp = cli.post("/api/floating-text?source=overlay").send().await;
        resp.assert_status_is_ok();
    }

    #[tokio::test]
    async fn post_unknown_path_is_not_found() {
        let cli = TestClient::new(build_app());
        let resp = cli.post("/unknown-path").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        let v = json_of(resp).await;
        assert_eq!(v["message"], NOT_FOUND_MSG);
    }

    #[tokio::test]
    async fn get_any_path_returns_api_info() {
        let cli = TestClient::new(build_app());
        for path in ["/", "/anything/else"] {
            let resp = cli.get(path).send().await;
            resp.assert_status_is_ok();
            resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
            let v = json_of(resp).await;
            assert!(v["endpoints"].get(FLOATING_TEXT_PATH).is_some());
            assert_eq!(v["version"], "1.0.0");
        }
    }

    #[tokio::test]
    async fn options_is_an_empty_preflight() {
        let cli = TestClient::new(build_app());
        let resp = cli.options("/api/floating-text").send().await;
        resp.assert_status_is_ok();
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_METHODS, preflight::ALLOW_METHODS);
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_HEADERS, preflight::ALLOW_HEADERS);
        resp.assert_text("").await;
    }

    #[tokio::test]
    async fn other_methods_are_not_implemented() {
        let cli = TestClient::new(build_app());
        let resp = cli.put(FLOATING_TEXT_PATH).send().await;
        resp.assert_status(StatusCode::NOT_IMPLEMENTED);
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    }

    #[handler]
    fn explode() -> &'static str {
        panic!("text source unavailable")
    }

    #[tokio::test]
    async fn panic_becomes_internal_error_with_detail() {
        let cli = TestClient::new(with_middleware(explode));
        let resp = cli.get("/").send().await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        resp.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        let v = json_of(resp).await;
        assert_eq!(v["success"], false);
        assert_eq!(v["message"], "处理请求失败: text source unavailable");
    }

    #[tokio::test]
    async fn post_invalid_utf8_is_internal_error() {
        let cli = TestClient::new(build_app());
        let resp = cli.post(FLOATING_TEXT_PATH)
            .header(header::CONTENT_LENGTH, "3")
            .body(vec![0xffu8, 0xfe, 0x7b])
            .send()
            .await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let v = json_of(resp).await;
        let msg = v["message"].as_str().expect("message");
        assert!(msg.starts_with("处理请求失败: "));
    }

    #[tokio::test]
    async fn server_keeps_serving_after_errors() {
        let cli = TestClient::new(build_app());
        cli.post("/unknown-path").send().await.assert_status(StatusCode::NOT_FOUND);
        cli.post(FLOATING_TEXT_PATH)
            .header(header::CONTENT_LENGTH, "3")
            .body("{{{")
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        cli.post(FLOATING_TEXT_PATH).send().await.assert_status_is_ok();
    }
}
