#![forbid(unsafe_code)]

use poem::http::{header, StatusCode};
use poem::{Body, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use log::{error, info, warn};

use crate::utils::errors::Errors;
use crate::utils::server_utils::{self, error_response, json_response, timestamp_str};
use crate::utils::text_gen::dynamic_text;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SUCCESS_MSG     : &str = "文字内容获取成功";
const BAD_REQUEST_MSG : &str = "请求数据格式错误";
pub const FAILURE_PREFIX : &str = "处理请求失败: ";

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
#[derive(Serialize, Debug)]
pub struct RespFloatingText
{
    success: bool,
    text: String,
    timestamp: String,
    message: String,
}

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_floating_text:
// ---------------------------------------------------------------------------
/** POST /api/floating-text.  The optional JSON body is only logged; any
 * well-formed body, or none at all, yields freshly generated text.
 */
pub async fn get_floating_text(http_req: &Request, body: Body) -> Response {
    match RespFloatingText::process(http_req, body).await {
        Ok(resp) => {
            info!("📤 返回文字内容: {}", resp.text);
            json_response(StatusCode::OK, &resp)
        },
        Err(e @ Errors::InvalidJsonBody(_)) => {
            warn!("❌ {}", e);
            error_response(e.http_status(), BAD_REQUEST_MSG.to_string())
        },
        Err(e) => {
            let msg = FAILURE_PREFIX.to_owned() + e.to_string().as_str();
            error!("❌ {}", msg);
            error_response(e.http_status(), msg)
        },
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespFloatingText {
    fn new(text: String) -> Self {
        Self {success: true, text, timestamp: timestamp_str(), message: SUCCESS_MSG.to_string()}
    }

    async fn process(http_req: &Request, body: Body) -> Result<Self, Errors> {
        let req_data = read_json_body(http_req, body).await?;
        server_utils::debug_request(http_req, &req_data);

        Ok(Self::new(dynamic_text()))
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// read_json_body:
// ---------------------------------------------------------------------------
/** Only Content-Length decides whether there is a body.  When it is absent or
 * zero the body is treated as an empty object without being read.
 */
async fn read_json_body(http_req: &Request, body: Body) -> Result<Value, Errors> {
    let content_length = match http_req.headers().get(header::CONTENT_LENGTH) {
        Some(v) => v.to_str()
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(|| Errors::InvalidContentLength(format!("{:?}", v)))?,
        None => 0,
    };
    if content_length == 0 {
        return Ok(Value::Object(Map::new()));
    }

    let bytes = body.into_vec().await
        .map_err(|e| Errors::ReadingBody(e.to_string()))?;
    // Undecodable bytes are a server-side failure, not a JSON syntax error.
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| Errors::InvalidBodyEncoding(e.to_string()))?;
    let req_data: Value = serde_json::from_str(text)
        .map_err(|e| Errors::InvalidJsonBody(e.to_string()))?;
    info!("📨 收到请求: {}", req_data);

    Ok(req_data)
}
