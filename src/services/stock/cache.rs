//! 日线数据缓存
//!
//! 按 (symbol, start, end) 精确缓存获取成功的序列，进程生命周期内不失效

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::PriceSource;
use crate::models::PriceSeries;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
}

/// 带缓存的行情数据服务
pub struct MarketDataService<S> {
    source: S,
    cache: Mutex<HashMap<FetchKey, Arc<PriceSeries>>>,
}

impl<S: PriceSource> MarketDataService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// 获取日线数据
    ///
    /// 请求失败与空数据都返回 `None`，原因只记录日志。
    /// 网络请求期间不持有锁，并发的相同请求可能各自访问一次数据源
    pub async fn load(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<Arc<PriceSeries>> {
        let key = FetchKey {
            symbol: symbol.to_string(),
            start,
            end,
        };

        if let Some(series) = self.entries().get(&key) {
            log::debug!("命中缓存: {} {}..{}", symbol, start, end);
            return Some(series.clone());
        }

        match self.source.fetch_daily(symbol, start, end).await {
            Ok(series) if !series.is_empty() => {
                log::info!("获取 {} 日线数据 {} 条", symbol, series.len());
                let series = Arc::new(series);
                self.entries().insert(key, series.clone());
                Some(series)
            }
            Ok(_) => {
                log::warn!("{} 在 {}..{} 没有数据", symbol, start, end);
                None
            }
            Err(e) => {
                log::warn!("获取 {} 日线数据失败: {:#}", symbol, e);
                None
            }
        }
    }

    /// 已缓存的序列数量
    pub fn cached_len(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<FetchKey, Arc<PriceSeries>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
