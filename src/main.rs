//! 股票分析仪表盘服务
//!
//! 获取股票日线数据，计算 50/200 日均线，拟合线性回归预测下一交易日收盘价，
//! 并在测试集上评估均方误差。页面与 JSON 接口共用同一条分析流程
//! 数据来源：Yahoo Finance

mod config;     // 配置加载
mod error;      // 错误定义
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::services::stock::{MarketDataService, YahooClient};
use crate::state::AppState;

/// 应用程序入口
///
/// 启动 HTTP 服务器，监听地址由配置决定（默认 127.0.0.1:8080）
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, config_path) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    match config_path {
        Some(path) => log::info!("从 {} 加载配置成功", path),
        None => log::info!("使用默认配置"),
    }

    let source = YahooClient::new(&config.data_source).map_err(|e| {
        log::error!("初始化数据源失败: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let state = web::Data::new(AppState {
        analysis: config.analysis.clone(),
        market: MarketDataService::new(source),
    });

    let bind_addr = config.bind_addr();
    log::info!("启动股票分析服务，监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(state.clone())
            .configure(handlers::config::<YahooClient>)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
