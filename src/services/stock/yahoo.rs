//! Yahoo Finance 日线接口实现
//!
//! 对接 https://query1.finance.yahoo.com/v8/finance/chart/<symbol>

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::PriceSource;
use crate::config::DataSourceConfig;
use crate::models::{PriceBar, PriceSeries};

// ==================== 接口响应结构 ====================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance 日线数据客户端
pub struct YahooClient {
    client: Client,
    base_url: Url,
}

impl YahooClient {
    pub fn new(config: &DataSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()?;
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("数据源地址无效: {}", config.base_url))?;

        Ok(Self { client, base_url })
    }

    /// 构造请求地址，区间为 [start, end)，不含结束日当天未收盘的数据
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("数据源地址不能作为基础路径: {}", self.base_url))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &day_start_timestamp(start).to_string())
            .append_pair("period2", &day_start_timestamp(end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history")
            .append_pair("includePrePost", "false");
        Ok(url)
    }
}

impl PriceSource for YahooClient {
    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let url = self.chart_url(symbol, start, end)?;
        log::info!("📡 请求日线数据 URL: {}", url);

        let response = self.client.get(url).send().await?;

        // 无效代码时接口返回 404，但响应体仍是带 error 字段的 JSON
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() && !text.trim_start().starts_with('{') {
            return Err(anyhow!("获取历史数据失败: {}", status));
        }

        parse_chart_response(&text, symbol, start, end)
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// 解析日线接口响应
///
/// OHLC 任一字段为空的行被丢弃；时间戳按交易所时区转换为交易日
fn parse_chart_response(text: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let envelope: ChartEnvelope = serde_json::from_str(text).context("解析日线数据失败")?;

    if let Some(error) = envelope.chart.error {
        return Err(anyhow!("数据源返回错误 [{}]: {}", error.code, error.description));
    }

    let data = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| anyhow!("股票代码 {} 没有返回数据", symbol))?;

    let tz: Tz = data
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC);
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let bars: Vec<PriceBar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::<Utc>::from_timestamp(ts, 0)?
                .with_timezone(&tz)
                .date_naive();
            Some(PriceBar {
                date,
                open: value_at(&quote.open, i)?,
                high: value_at(&quote.high, i)?,
                low: value_at(&quote.low, i)?,
                close: value_at(&quote.close, i)?,
                volume: value_at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            })
        })
        .filter(|bar| bar.date >= start && bar.date < end)
        .collect();

    let series = PriceSeries::new(symbol, bars);
    if series.is_empty() {
        return Err(anyhow!("股票代码 {} 在 {} 至 {} 之间没有数据，可能无效或已退市", symbol, start, end));
    }
    Ok(series)
}
