//! 分析接口处理器
//!
//! ## API 列表
//! - GET /analyze?exchange=us&ticker=AAPL - 完整分析报告
//! - GET /exchanges - 可选交易所
//! - GET /charts/{price|evaluation}.svg?exchange=us&ticker=AAPL - 单张图表

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};

use crate::error::AnalysisError;
use crate::models::{AnalysisReport, AnalyzeQuery, ApiResponse, Exchange, ExchangeInfo};
use crate::services::analysis_service;
use crate::services::stock::PriceSource;
use crate::state::{today, AppState};

/// 错误对应的 HTTP 状态码
pub(crate) fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::FetchFailed { .. } => StatusCode::NOT_FOUND,
        AnalysisError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Model(_) | AnalysisError::Chart(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 分析单只股票
///
/// GET /api/v1/analyze
///
/// # 参数
/// - exchange: us / nse / bse，默认 us
/// - ticker: 股票代码，默认取交易所的默认代码
pub async fn analyze_stock<S: PriceSource + 'static>(
    state: web::Data<AppState<S>>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse> {
    let ticker = query.ticker();

    match analysis_service::analyze(&state.market, &state.analysis, query.exchange(), &ticker, today()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report))),
        Err(e) => {
            let response = ApiResponse::<AnalysisReport>::error(e.to_string());
            Ok(HttpResponse::build(error_status(&e)).json(response))
        }
    }
}

/// 获取可选交易所
///
/// GET /api/v1/exchanges
pub async fn list_exchanges() -> Result<HttpResponse> {
    let exchanges: Vec<ExchangeInfo> = Exchange::ALL.into_iter().map(ExchangeInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(exchanges)))
}

/// 获取单张 SVG 图表
///
/// GET /api/v1/charts/{kind}.svg，kind 为 price 或 evaluation
pub async fn get_chart<S: PriceSource + 'static>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse> {
    let kind = path.into_inner();
    if kind != "price" && kind != "evaluation" {
        let response = ApiResponse::<()>::error(format!("未知图表类型: {}", kind));
        return Ok(HttpResponse::NotFound().json(response));
    }

    let ticker = query.ticker();
    match analysis_service::analyze(&state.market, &state.analysis, query.exchange(), &ticker, today()).await {
        Ok(report) => {
            let svg = if kind == "price" {
                report.charts.price_svg
            } else {
                report.charts.evaluation_svg
            };
            Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
        }
        Err(e) => {
            let response = ApiResponse::<()>::error(e.to_string());
            Ok(HttpResponse::build(error_status(&e)).json(response))
        }
    }
}

pub fn config<S: PriceSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/analyze", web::get().to(analyze_stock::<S>))
        .route("/exchanges", web::get().to(list_exchanges))
        .route("/charts/{kind}.svg", web::get().to(get_chart::<S>));
}
