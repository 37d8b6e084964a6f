//! 股票数据模型
//!
//! 定义日线行情序列相关的数据结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 单日 K 线
///
/// 包含单日的 OHLCV 数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 交易日（交易所当地日期）
    pub date: NaiveDate,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 成交量
    pub volume: u64,
}

/// 单只股票在 [start, end] 区间内的日线序列
///
/// 按日期升序排列，日期唯一。获取后不再修改，派生列另行存放
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    /// 实际请求的代码（含交易所后缀）
    pub symbol: String,
    /// 日线数据
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 构造序列，按日期排序并去除重复交易日
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|bar| bar.date);
        bars.dedup_by_key(|bar| bar.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 收盘价列
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// 最近 n 条数据
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}
