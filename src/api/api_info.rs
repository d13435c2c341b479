#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use poem::http::StatusCode;
use poem::Response;
use serde::Serialize;

use crate::api::FLOATING_TEXT_PATH;
use crate::utils::server_utils::{json_response, timestamp_str};

// ***************************************************************************
//                                Constants
// ***************************************************************************
const API_NAME    : &str = "悬浮窗动态文字API";
const API_VERSION : &str = "1.0.0";
const FLOATING_TEXT_DESC : &str = "获取动态文字内容 (POST)";

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
#[derive(Serialize, Debug)]
struct RespApiInfo
{
    name: String,
    version: String,
    endpoints: BTreeMap<String, String>,
    timestamp: String,
}

impl RespApiInfo {
    fn new() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(FLOATING_TEXT_PATH.to_string(), FLOATING_TEXT_DESC.to_string());
        Self {
            name: API_NAME.to_string(),
            version: API_VERSION.to_string(),
            endpoints,
            timestamp: timestamp_str(),
        }
    }
}

// ***************************************************************************
//                                 Endpoint
// ***************************************************************************
/** GET on any path describes the API. */
pub fn get_api_info() -> Response {
    json_response(StatusCode::OK, &RespApiInfo::new())
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_floating_text_endpoint() {
        let v = serde_json::to_value(RespApiInfo::new()).expect("serialize");
        assert_eq!(v["name"], API_NAME);
        assert_eq!(v["version"], API_VERSION);
        assert_eq!(v["endpoints"][FLOATING_TEXT_PATH], FLOATING_TEXT_DESC);
        assert!(v["timestamp"].is_string());
    }
}
