use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;
use crate::services::stock::PriceSource;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// 已缓存的行情序列数量
    pub cached_series: usize,
}

pub async fn health_check<S: PriceSource + 'static>(state: web::Data<AppState<S>>) -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        cached_series: state.market.cached_len(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config<S: PriceSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check::<S>));
}
