#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use clap::Parser;
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::str::FromStr;

use crate::utils::{errors::Errors, server_utils::get_absolute_path};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Networking.
const DEFAULT_BIND_ADDR    : &str = "0.0.0.0";
const DEFAULT_START_PORT   : u16  = 8003;

// Logging.
const DEFAULT_LOG_LEVEL    : &str = "info";
const CONSOLE_LOG_PATTERN  : &str = "[{d(%H:%M:%S)}] {l} {m}{n}";

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ServerArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, Parser)]
#[command(name = "floating_text_server", about = "Local test server for the floating overlay text.")]
pub struct ServerArgs {
    /// TOML configuration file.
    ///
    /// Values given on the command line take precedence over the file.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log4rs YAML configuration file.
    ///
    /// When omitted, log records go to the console.
    #[arg(short, long)]
    pub log_config: Option<String>,

    /// First port probed at startup; the next 9 ports are tried in order.
    #[arg(short = 'p', long)]
    pub start_port: Option<u16>,

    /// Address the listener binds to.
    #[arg(short, long)]
    pub bind_addr: Option<String>,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub bind_addr: String,
    pub start_port: u16,
    pub log_level: String,
    pub log_config: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "悬浮窗动态文字测试服务器".to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            start_port: DEFAULT_START_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_config: None,
        }
    }
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
/// Fully resolved startup parameters.
#[derive(Debug)]
pub struct RuntimeCtx {
    pub config_file: Option<String>,
    pub config: Config,
    pub bind_ip: IpAddr,
    pub log_level: LevelFilter,
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
/** Merge the command line over the optional configuration file over the
 * defaults and validate the result.
 */
pub fn init_runtime_context(args: ServerArgs) -> Result<RuntimeCtx> {
    let config_file = args.config.as_deref().map(get_absolute_path);
    let mut config = match &config_file {
        Some(path) => read_config(path)?,
        None => Config::new(),
    };

    // Command line overrides.
    if let Some(port) = args.start_port {
        config.start_port = port;
    }
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }
    if let Some(log_config) = args.log_config {
        config.log_config = Some(log_config);
    }
    config.log_config = config.log_config.as_deref().map(get_absolute_path);

    let bind_ip = IpAddr::from_str(&config.bind_addr)
        .map_err(|_| Errors::InvalidBindAddr(config.bind_addr.clone()))?;
    let log_level = LevelFilter::from_str(&config.log_level)
        .map_err(|_| Errors::InvalidLogLevel(config.log_level.clone()))?;

    Ok(RuntimeCtx {config_file, config, bind_ip, log_level})
}

// ---------------------------------------------------------------------------
// read_config:
// ---------------------------------------------------------------------------
/** Read and parse an explicitly requested configuration file.  Unlike the
 * defaults, a named file that can't be used is a startup failure.
 */
fn read_config(path: &str) -> Result<Config> {
    info!("{}", Errors::ReadingConfigFile(path.to_string()));
    let contents = fs::read_to_string(path)
        .map_err(|e| anyhow!("{}\n   {}", Errors::ReadingConfigFile(path.to_string()), e))?;
    parse_config(path, &contents)
}

fn parse_config(path: &str, contents: &str) -> Result<Config> {
    toml::from_str(contents)
        .map_err(|e| anyhow!("{}\n   {}", Errors::TOMLParseError(path.to_string()), e))
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Install the log4rs logger, from the configured YAML file if there is one
 * and otherwise as a console logger at the configured level.
 */
pub fn init_log(ctx: &RuntimeCtx) -> Result<()> {
    match &ctx.config.log_config {
        Some(file) => {
            log4rs::init_file(file, Default::default())
                .map_err(|e| anyhow!("{}\n   {}", Errors::Log4rsInitialization(file.clone()), e))?;
            info!("Log4rs initialized using: {}", file);
        },
        None => {
            log4rs::init_config(console_log_config(ctx.log_level)?)
                .map_err(|e| anyhow!("{}\n   {}", Errors::Log4rsInitialization("console".to_string()), e))?;
            info!("Log4rs initialized on the console at level {}", ctx.log_level);
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// console_log_config:
// ---------------------------------------------------------------------------
fn console_log_config(level: LevelFilter) -> Result<LogConfig> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    Ok(config)
}
