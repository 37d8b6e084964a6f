//! 分析相关数据模型
//!
//! 交易所、币种、派生特征行以及最终的分析报告

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::stock::PriceBar;

/// 可选交易所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Exchange {
    /// 美股，直接使用原始代码
    #[default]
    #[serde(rename = "us", alias = "US Markets")]
    UsMarkets,
    /// 印度国家证券交易所，代码后缀 .NS
    #[serde(rename = "nse", alias = "NSE (India)")]
    Nse,
    /// 孟买证券交易所，代码后缀 .BO
    #[serde(rename = "bse", alias = "BSE (India)")]
    Bse,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::UsMarkets, Exchange::Nse, Exchange::Bse];

    /// 查询参数中使用的代码
    pub fn code(self) -> &'static str {
        match self {
            Exchange::UsMarkets => "us",
            Exchange::Nse => "nse",
            Exchange::Bse => "bse",
        }
    }

    /// 页面显示名称
    pub fn label(self) -> &'static str {
        match self {
            Exchange::UsMarkets => "US Markets",
            Exchange::Nse => "NSE (India)",
            Exchange::Bse => "BSE (India)",
        }
    }

    /// 数据源代码后缀
    pub fn suffix(self) -> &'static str {
        match self {
            Exchange::UsMarkets => "",
            Exchange::Nse => ".NS",
            Exchange::Bse => ".BO",
        }
    }

    pub fn currency(self) -> Currency {
        match self {
            Exchange::UsMarkets => Currency::Usd,
            Exchange::Nse | Exchange::Bse => Currency::Inr,
        }
    }

    /// 切换交易所时输入框的默认代码
    pub fn default_ticker(self) -> &'static str {
        match self {
            Exchange::UsMarkets => "AAPL",
            Exchange::Nse | Exchange::Bse => "RELIANCE",
        }
    }
}

/// 计价币种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Inr,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    /// 格式化金额，如 `$191.23`
    pub fn format_amount(self, value: f64) -> String {
        format!("{}{:.2}", self.symbol(), value)
    }
}

/// 用户输入解析后的代码信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSymbol {
    /// 用户输入的代码（已转大写）
    pub ticker: String,
    /// 实际请求数据源的代码
    pub fetch_symbol: String,
    pub exchange: Exchange,
    pub currency: Currency,
}

/// 附加了均线与目标列的日线行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub bar: PriceBar,
    /// 50 日均线，历史不足时为空
    pub sma_50: Option<f64>,
    /// 200 日均线，历史不足时为空
    pub sma_200: Option<f64>,
    /// 下一交易日收盘价，最后一行为空
    pub next_close: Option<f64>,
}

impl DerivedRow {
    /// 特征全部有定义时返回特征向量
    pub fn features(&self) -> Option<FeatureVector> {
        Some(FeatureVector {
            close: self.bar.close,
            sma_50: self.sma_50?,
            sma_200: self.sma_200?,
        })
    }
}

/// 模型输入 (Close, SMA_50, SMA_200)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub close: f64,
    pub sma_50: f64,
    pub sma_200: f64,
}

impl FeatureVector {
    pub const NAMES: [&'static str; 3] = ["Close", "SMA_50", "SMA_200"];

    pub fn to_array(self) -> [f64; 3] {
        [self.close, self.sma_50, self.sma_200]
    }
}

/// 可用于训练/评估的完整行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub date: NaiveDate,
    pub features: FeatureVector,
    pub target: f64,
}

/// 测试集上的一个评估点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// 拟合得到的线性模型参数
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub intercept: f64,
    pub coefficients: Vec<(String, f64)>,
}

/// 各阶段的行数统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    /// 获取到的全部行
    pub total: usize,
    /// 特征和目标均有定义的行
    pub eligible: usize,
    pub train: usize,
    pub test: usize,
}

/// 渲染好的 SVG 图表
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    /// 收盘价与均线
    pub price_svg: String,
    /// 测试集实际值与预测值
    pub evaluation_svg: String,
}

/// 一次分析的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: MarketSymbol,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rows: RowCounts,
    /// 最近几条原始数据
    pub recent: Vec<PriceBar>,
    /// 下一交易日收盘价预测
    pub prediction: f64,
    pub prediction_display: String,
    /// 测试集均方误差
    pub mse: f64,
    pub mse_display: String,
    pub model: ModelSummary,
    /// 按日期排序的测试集评估点
    pub evaluation: Vec<EvaluationPoint>,
    pub charts: ChartSet,
}

/// 分析接口查询参数
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    /// 交易所代码：us, nse, bse
    pub exchange: Option<Exchange>,
    /// 股票代码，为空时使用交易所默认代码
    pub ticker: Option<String>,
}

impl AnalyzeQuery {
    pub fn exchange(&self) -> Exchange {
        self.exchange.unwrap_or_default()
    }

    pub fn ticker(&self) -> String {
        match self.ticker.as_deref().map(str::trim) {
            Some(ticker) if !ticker.is_empty() => ticker.to_uppercase(),
            _ => self.exchange().default_ticker().to_string(),
        }
    }
}

/// 交易所列表项
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub suffix: &'static str,
    pub currency: Currency,
    pub default_ticker: &'static str,
}

impl From<Exchange> for ExchangeInfo {
    fn from(exchange: Exchange) -> Self {
        Self {
            code: exchange.code(),
            label: exchange.label(),
            suffix: exchange.suffix(),
            currency: exchange.currency(),
            default_ticker: exchange.default_ticker(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_format() {
        assert_eq!(Currency::Usd.format_amount(191.234), "$191.23");
        assert_eq!(Currency::Inr.format_amount(2950.1), "₹2950.10");
    }

    /// 测试查询参数的默认代码
    #[test]
    fn test_query_default_ticker() {
        let query = AnalyzeQuery {
            exchange: Some(Exchange::Bse),
            ticker: Some("  ".to_string()),
        };
        assert_eq!(query.ticker(), "RELIANCE");

        let query = AnalyzeQuery::default();
        assert_eq!(query.exchange(), Exchange::UsMarkets);
        assert_eq!(query.ticker(), "AAPL");

        let query = AnalyzeQuery {
            exchange: None,
            ticker: Some("msft".to_string()),
        };
        assert_eq!(query.ticker(), "MSFT");
    }

    #[test]
    fn test_exchange_deserialize() {
        let exchange: Exchange = serde_json::from_str("\"nse\"").unwrap();
        assert_eq!(exchange, Exchange::Nse);
        let exchange: Exchange = serde_json::from_str("\"BSE (India)\"").unwrap();
        assert_eq!(exchange, Exchange::Bse);
    }
}
