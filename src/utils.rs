pub mod config;
pub mod errors;
pub mod port_scan;
pub mod server_utils;
pub mod text_gen;
