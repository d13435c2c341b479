#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use log::{error, info};
use poem::listener::TcpListener;

use crate::api::FLOATING_TEXT_PATH;
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx, ServerArgs};
use crate::utils::errors::Errors;
use crate::utils::port_scan::{find_free_port, PORT_SCAN_WINDOW};

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "FloatingTextServer"; // for poem logging

// Address the Android emulator uses to reach the host's loopback.
const EMULATOR_HOST : &str = "10.0.2.2";

const BANNER_RULE_WIDTH : usize = 50;

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize ---------------------
    println!("🌟 悬浮窗动态文字内容测试服务器");
    println!("{}", "=".repeat(BANNER_RULE_WIDTH));

    let ctx = match server_init() {
        Ok(c) => c,
        Err(e) => {
            println!("❌ 启动失败: {}", e);
            return Err(e);
        },
    };

    // Probe for a port.  Running out of candidates is fatal.
    let port = match find_free_port(ctx.bind_ip, ctx.config.start_port, PORT_SCAN_WINDOW) {
        Ok(p) => p,
        Err(e) => {
            println!("❌ {}", e);
            error!("{}", e);
            return Err(e.into());
        },
    };
    info!("Selected port {} on {}", port, ctx.bind_ip);

    print_banner(&ctx, port);

    // ------------------ Main Loop -------------------
    // Connections still open when the signal arrives are not drained.
    poem::Server::new(TcpListener::bind(SocketAddr::new(ctx.bind_ip, port)))
        .name(SERVER_NAME)
        .run_with_graceful_shutdown(api::build_app(), shutdown_signal(), Some(Duration::ZERO))
        .await?;

    info!("Server stopped");
    println!("✅ 服务器已停止");
    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Resolve parameters and configure logging before the listener exists. */
fn server_init() -> Result<RuntimeCtx> {
    let ctx = init_runtime_context(ServerArgs::parse())?;
    init_log(&ctx)?;

    info!("{}", Errors::InputParms(format!("{:#?}", ctx)));
    print_version_info();
    Ok(ctx)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("*** Running {} version {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}

// ---------------------------------------------------------------------------
// print_banner:
// ---------------------------------------------------------------------------
fn print_banner(ctx: &RuntimeCtx, port: u16) {
    let rule = "=".repeat(BANNER_RULE_WIDTH);
    println!("🚀 {}启动成功!", ctx.config.title);
    println!("🌐 服务地址: http://localhost:{}", port);
    println!("📱 Android地址: http://{}:{}", EMULATOR_HOST, port);
    println!("📡 API接口: http://{}:{}{}", EMULATOR_HOST, port, FLOATING_TEXT_PATH);
    println!("⏰ 启动时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", rule);
    println!("📝 接口说明:");
    println!("  POST {} - 获取动态文字内容", FLOATING_TEXT_PATH);
    println!("  GET  /                 - 获取API信息");
    println!("{}", rule);
    println!("💡 提示: 按 Ctrl+C 停止服务器");
    println!();
}

// ---------------------------------------------------------------------------
// shutdown_signal:
// ---------------------------------------------------------------------------
/** Resolve on Ctrl+C or, on unix, SIGTERM.  A handler that can't be
 * installed simply never fires.
 */
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            },
            Err(e) => {
                error!("Unable to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    println!("\n🛑 服务器停止中...");
    info!("Shutdown signal received");
}
