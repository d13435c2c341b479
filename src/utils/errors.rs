#![forbid(unsafe_code)]

use poem::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("floating_text_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Invalid bind address: {}", .0)]
    InvalidBindAddr(String),

    #[error("Invalid log level: {}", .0)]
    InvalidLogLevel(String),

    /// Every candidate port in the scan window is already bound.
    #[error("无法找到可用端口 ({}-{})", .start, .end)]
    NoFreePortFound { start: u16, end: u16 },

    #[error("请求数据不是有效的JSON格式: {}", .0)]
    InvalidJsonBody(String),

    #[error("invalid Content-Length header: {}", .0)]
    InvalidContentLength(String),

    #[error("unable to read request body: {}", .0)]
    ReadingBody(String),

    #[error("request body is not valid utf-8: {}", .0)]
    InvalidBodyEncoding(String),
}

impl Errors {
    /// The HTTP status a request-level error is reported with.  Only a
    /// malformed body is the client's fault; everything else is a 500.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Errors::InvalidJsonBody(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ***************************************************************************
//                              HttpResult
// ***************************************************************************
/// JSON body of every non-2xx response.
#[derive(Serialize, Debug)]
pub struct HttpResult {
    pub success: bool,
    pub code: u16,
    pub message: String,
}

impl HttpResult {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {success: false, code: status.as_u16(), message}
    }
}
