//! 股票数据服务模块
//!
//! 提供日线数据的获取与缓存，数据源通过 `PriceSource` 抽象

pub mod cache;
pub mod yahoo;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::PriceSeries;

pub use cache::MarketDataService;
pub use yahoo::YahooClient;

/// 日线数据源
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// 获取 [start, end] 区间（含两端）的日线数据
    ///
    /// 数据为空时返回错误
    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}
