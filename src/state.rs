//! 应用共享状态

use chrono::{Local, NaiveDate};

use crate::config::AnalysisConfig;
use crate::services::stock::MarketDataService;

/// 所有 worker 共享同一份状态，唯一的可变部分是行情缓存
pub struct AppState<S> {
    pub analysis: AnalysisConfig,
    pub market: MarketDataService<S>,
}

/// 数据区间的结束日期（本地时间的当天，不含在区间内）
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
