#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;
use chrono::{Local, SecondsFormat};

use poem::http::StatusCode;
use poem::{Request, Response};
use serde::Serialize;
use serde_json::Value;

use log::{debug, error, LevelFilter};

use crate::utils::errors::HttpResult;

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Unlike canonicalize, absolutize
 * does not care whether the file exists.  On any failure the original path
 * is returned unchanged.
 */
pub fn get_absolute_path(path: &str) -> String {
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    match p1.to_str() {
        Some(x) => x.to_owned(),
        None => path.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// timestamp_str:
// ---------------------------------------------------------------------------
/** Get the current local timestamp as a string in rfc3339 format with
 * microsecond precision, which looks like this: 2026-10-19T14:14:42.719849+08:00
 */
pub fn timestamp_str() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

// ---------------------------------------------------------------------------
// json_response:
// ---------------------------------------------------------------------------
/** Serialize a body into a utf-8 JSON response.  Non-ascii characters are
 * written as-is.
 */
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .content_type(JSON_CONTENT_TYPE)
            .body(bytes),
        Err(e) => {
            let msg = format!("服务器内部错误: {}", e);
            error!("{}", msg);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .content_type("text/plain; charset=utf-8")
                .body(msg)
        },
    }
}

// ---------------------------------------------------------------------------
// error_response:
// ---------------------------------------------------------------------------
pub fn error_response(status: StatusCode, msg: String) -> Response {
    json_response(status, &HttpResult::new(status, msg))
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, body: &Value) {
    // Check that debug or higher logging is in effect.
    if log::max_level() < LevelFilter::Debug {
        return;
    }

    let mut s = "\n".to_string();

    let uri = http_req.uri();
    s += format!("  URI: {:?}\n", uri).as_str();

    for v in http_req.headers().iter() {
        s += format!("  Header: {} = {:?} \n", v.0, v.1).as_str();
    }

    if let Some(q) = uri.query() {
        s += format!("  Query Parameters: {:?}\n", q).as_str();
    } else {
        s += "  * No Query Parameters\n";
    }

    s += format!("  Request body: {}", body).as_str();

    debug!("{}", s);
}
