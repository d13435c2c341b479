#![forbid(unsafe_code)]

use poem::http::{header, StatusCode};
use poem::Response;

pub const ALLOW_METHODS : &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS : &str = "Content-Type";

/** CORS preflight for any path: empty body, no content type.  The allow
 * origin header is added to every response by the app's middleware.
 */
pub fn preflight() -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .finish()
}
