#![forbid(unsafe_code)]

use std::net::{IpAddr, SocketAddr, TcpListener};
use log::debug;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Number of consecutive ports probed at startup.
pub const PORT_SCAN_WINDOW: u16 = 10;

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// find_free_port:
// ---------------------------------------------------------------------------
/** Probe up to window ports on the given address, starting at start_port and
 * moving upward, and return the first one that can be bound.  Each probe
 * socket is closed before moving on, so the caller must bind the returned
 * port itself.  The window is clamped at the top of the port range.
 */
pub fn find_free_port(ip: IpAddr, start_port: u16, window: u16) -> Result<u16, Errors> {
    let end_port = scan_end(start_port, window);
    if window == 0 {
        return Err(Errors::NoFreePortFound { start: start_port, end: end_port });
    }

    for port in start_port..=end_port {
        match TcpListener::bind(SocketAddr::new(ip, port)) {
            Ok(listener) => {
                drop(listener);
                return Ok(port);
            },
            Err(e) => debug!("Port {} unavailable: {}", port, e),
        }
    }

    Err(Errors::NoFreePortFound { start: start_port, end: end_port })
}

// ---------------------------------------------------------------------------
// scan_end:
// ---------------------------------------------------------------------------
/** Last port (inclusive) probed for a given start and window. */
pub fn scan_end(start_port: u16, window: u16) -> u16 {
    start_port.saturating_add(window.saturating_sub(1))
}
