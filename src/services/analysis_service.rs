//! 股票分析流程
//!
//! 输入解析 → 获取数据 → 计算均线 → 绘图 → 拟合 → 预测 → 评估

use chrono::NaiveDate;
use ndarray::{arr2, Array1, Array2};

use super::charts::{render_evaluation_chart, render_price_chart};
use super::indicators::{derive_rows, latest_features, training_rows, LONG_WINDOW};
use super::market::{is_valid_symbol, resolve_symbol};
use super::model::{mean_squared_error, train_test_split, LinearModel};
use super::stock::{MarketDataService, PriceSource};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisReport, ChartSet, EvaluationPoint, Exchange, FeatureVector, MarketSymbol,
    ModelSummary, PriceSeries, RowCounts, TrainingRow,
};

/// 分析一只股票，数据区间为 [settings.start_date, today)，不含当天
pub async fn analyze<S: PriceSource>(
    market: &MarketDataService<S>,
    settings: &AnalysisConfig,
    exchange: Exchange,
    ticker: &str,
    today: NaiveDate,
) -> Result<AnalysisReport, AnalysisError> {
    let symbol = resolve_symbol(exchange, ticker);
    log::info!(
        "分析 {} [{}] 区间 {}..{}",
        symbol.fetch_symbol,
        exchange.label(),
        settings.start_date,
        today
    );

    let fetch_failed = || AnalysisError::FetchFailed {
        symbol: symbol.fetch_symbol.clone(),
    };

    if !is_valid_symbol(&symbol.fetch_symbol) {
        log::warn!("代码格式无效: {:?}", symbol.fetch_symbol);
        return Err(fetch_failed());
    }

    let series = market
        .load(&symbol.fetch_symbol, settings.start_date, today)
        .await
        .ok_or_else(fetch_failed)?;

    build_report(symbol, &series, settings, today)
}

/// 基于已获取的序列计算完整报告
pub fn build_report(
    symbol: MarketSymbol,
    series: &PriceSeries,
    settings: &AnalysisConfig,
    end_date: NaiveDate,
) -> Result<AnalysisReport, AnalysisError> {
    let rows = derive_rows(series);
    let eligible = training_rows(&rows);

    let insufficient = || AnalysisError::InsufficientHistory {
        rows: series.len(),
        required: minimum_series_len(settings.test_ratio),
    };

    let split = train_test_split(eligible.len(), settings.test_ratio, settings.seed);
    if split.train.len() < MIN_TRAINING_ROWS || split.test.is_empty() {
        return Err(insufficient());
    }

    let (train_x, train_y) = design_matrix(&eligible, &split.train);
    let model = LinearModel::fit(&train_x, &train_y)?;

    // 最后一行没有目标值，不参与划分，只用于预测
    let latest = latest_features(&rows).ok_or_else(insufficient)?;
    let prediction = model.predict(&arr2(&[latest.to_array()]))?[0];

    let (test_x, test_y) = design_matrix(&eligible, &split.test);
    let actual = test_y.to_vec();
    let predicted = model.predict(&test_x)?.to_vec();
    let mse = mean_squared_error(&actual, &predicted)?;
    let test: Vec<&TrainingRow> = split.test.iter().map(|&i| &eligible[i]).collect();

    let mut evaluation: Vec<EvaluationPoint> = test
        .iter()
        .zip(&predicted)
        .map(|(row, &predicted)| EvaluationPoint {
            date: row.date,
            actual: row.target,
            predicted,
        })
        .collect();
    evaluation.sort_by_key(|point| point.date);

    let charts = ChartSet {
        price_svg: render_price_chart(&symbol.fetch_symbol, symbol.currency, &rows)
            .map_err(|e| AnalysisError::Chart(e.to_string()))?,
        evaluation_svg: render_evaluation_chart(symbol.currency, &evaluation)
            .map_err(|e| AnalysisError::Chart(e.to_string()))?,
    };

    log::info!(
        "{} 拟合完成: 训练 {} 行, 测试 {} 行, MSE {:.4}, 预测 {:.4}",
        symbol.fetch_symbol,
        split.train.len(),
        split.test.len(),
        mse,
        prediction
    );

    Ok(AnalysisReport {
        start_date: settings.start_date,
        end_date,
        rows: RowCounts {
            total: series.len(),
            eligible: eligible.len(),
            train: split.train.len(),
            test: split.test.len(),
        },
        recent: series.tail(settings.tail_rows).to_vec(),
        prediction,
        prediction_display: symbol.currency.format_amount(prediction),
        mse,
        mse_display: format!("{:.2}", mse),
        model: ModelSummary {
            intercept: model.intercept,
            coefficients: FeatureVector::NAMES
                .iter()
                .map(|name| name.to_string())
                .zip(model.coefficients.iter().copied())
                .collect(),
        },
        evaluation,
        charts,
        symbol,
    })
}

/// 拟合截距和三个系数至少需要的训练行数
const MIN_TRAINING_ROWS: usize = FeatureVector::NAMES.len() + 1;

/// 按下标取出特征矩阵和目标向量
fn design_matrix(rows: &[TrainingRow], indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let x: Vec<[f64; 3]> = indices.iter().map(|&i| rows[i].features.to_array()).collect();
    let y: Vec<f64> = indices.iter().map(|&i| rows[i].target).collect();
    (Array2::from(x), Array1::from(y))
}

/// 测试集非空且训练集足以拟合所需的最少可用行数
fn minimum_eligible_rows(test_ratio: f64) -> usize {
    (1..)
        .find(|&n| {
            let n_test = (n as f64 * test_ratio).ceil() as usize;
            n_test > 0 && n >= n_test + MIN_TRAINING_ROWS
        })
        .unwrap_or(MIN_TRAINING_ROWS + 1)
}

/// 序列至少需要的行数：长均线窗口占用 199 行，最后一行没有目标
fn minimum_series_len(test_ratio: f64) -> usize {
    LONG_WINDOW + minimum_eligible_rows(test_ratio)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Currency, PriceBar};
    use anyhow::{anyhow, Result};
    use approx::assert_relative_eq;
    use chrono::Duration;

    /// 生成带趋势和周期波动的日线序列
    pub(crate) fn synthetic_series(symbol: &str, start: NaiveDate, len: usize) -> PriceSeries {
        let bars = (0..len)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + t * 0.05 + (t / 9.0).sin() * 3.0 + (t / 23.0).cos() * 1.5;
                PriceBar {
                    date: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000 + i as u64,
                }
            })
            .collect();
        PriceSeries::new(symbol, bars)
    }

    /// 内存数据源：AAPL 覆盖完整区间，TINY.NS 只有 150 行
    pub(crate) struct StaticSource;

    impl PriceSource for StaticSource {
        async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
            match symbol {
                // 结束日期不含在内
                "AAPL" => {
                    let len = (end - start).num_days() as usize;
                    Ok(synthetic_series(symbol, start, len))
                }
                "TINY.NS" => Ok(synthetic_series(symbol, start, 150)),
                _ => Err(anyhow!("No data found, symbol may be delisted")),
            }
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// 端到端：AAPL 美股 2020-01-01 至今
    #[tokio::test]
    async fn test_end_to_end_us_ticker() {
        println!("\n========== 测试完整分析流程 ==========");
        let market = MarketDataService::new(StaticSource);
        let settings = AnalysisConfig::default();
        let today = date("2024-06-28");

        let report = analyze(&market, &settings, Exchange::UsMarkets, "aapl", today)
            .await
            .unwrap();

        println!("  预测: {}  MSE: {}", report.prediction_display, report.mse_display);
        assert_eq!(report.symbol.fetch_symbol, "AAPL");
        assert_eq!(report.symbol.currency, Currency::Usd);
        assert!(report.prediction_display.starts_with('$'));
        assert!(report.prediction_display[1..].parse::<f64>().is_ok());
        assert!(report.mse >= 0.0);
        assert_eq!(report.end_date, today);
        assert_eq!(report.recent.len(), 5);
        assert_eq!(report.recent.last().unwrap().date, date("2024-06-27"));
        assert!(report.charts.price_svg.contains("<svg"));
        assert!(report.charts.evaluation_svg.contains("<svg"));
        println!("✅ 完整分析流程测试通过！");
    }

    /// 行数统计与划分一致，测试点按日期排序
    #[test]
    fn test_report_counts_and_ordering() {
        let series = synthetic_series("AAPL", date("2020-01-01"), 400);
        let symbol = resolve_symbol(Exchange::UsMarkets, "AAPL");
        let report = build_report(symbol, &series, &AnalysisConfig::default(), date("2021-02-03")).unwrap();

        // 199 行缺 SMA_200，最后一行缺目标
        assert_eq!(report.rows.total, 400);
        assert_eq!(report.rows.eligible, 200);
        assert_eq!(report.rows.test, 40);
        assert_eq!(report.rows.train, 160);
        assert_eq!(report.evaluation.len(), 40);
        assert!(report.evaluation.windows(2).all(|w| w[0].date < w[1].date));
        // 最后一个交易日不在测试集中
        assert!(report.evaluation.iter().all(|p| p.date != series.bars[399].date));
    }

    /// MSE 等于测试点残差平方均值
    #[test]
    fn test_report_mse_matches_evaluation_points() {
        let series = synthetic_series("AAPL", date("2020-01-01"), 320);
        let symbol = resolve_symbol(Exchange::UsMarkets, "AAPL");
        let report = build_report(symbol, &series, &AnalysisConfig::default(), date("2020-11-15")).unwrap();

        let expected = report
            .evaluation
            .iter()
            .map(|p| (p.actual - p.predicted).powi(2))
            .sum::<f64>()
            / report.evaluation.len() as f64;
        assert_relative_eq!(report.mse, expected, epsilon = 1e-9);
        assert_eq!(report.mse_display, format!("{:.2}", report.mse));
    }

    /// 相同输入重复运行结果一致
    #[test]
    fn test_report_is_reproducible() {
        let series = synthetic_series("AAPL", date("2020-01-01"), 300);
        let settings = AnalysisConfig::default();
        let a = build_report(resolve_symbol(Exchange::UsMarkets, "AAPL"), &series, &settings, date("2020-10-27")).unwrap();
        let b = build_report(resolve_symbol(Exchange::UsMarkets, "AAPL"), &series, &settings, date("2020-10-27")).unwrap();

        assert_eq!(a.evaluation, b.evaluation);
        assert_eq!(a.prediction, b.prediction);
    }

    /// 不足 200 行时必须明确失败
    #[tokio::test]
    async fn test_short_series_fails_predictably() {
        let market = MarketDataService::new(StaticSource);
        let err = analyze(&market, &AnalysisConfig::default(), Exchange::Nse, "tiny", date("2024-01-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::InsufficientHistory { rows: 150, required: 205 }));
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_fetch_failure() {
        let market = MarketDataService::new(StaticSource);
        let err = analyze(&market, &AnalysisConfig::default(), Exchange::Bse, "NOPE", date("2024-01-01"))
            .await
            .unwrap_err();

        match err {
            AnalysisError::FetchFailed { symbol } => assert_eq!(symbol, "NOPE.BO"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// 非法字符不会发往数据源
    #[tokio::test]
    async fn test_invalid_ticker_rejected_before_fetch() {
        let market = MarketDataService::new(StaticSource);
        let err = analyze(&market, &AnalysisConfig::default(), Exchange::UsMarkets, "AAPL/../x", date("2024-01-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::FetchFailed { .. }));
        assert!(err.to_string().contains("check the ticker symbol"));
        assert_eq!(market.cached_len(), 0);
    }

    #[test]
    fn test_minimum_rows() {
        assert_eq!(MIN_TRAINING_ROWS, 4);
        assert_eq!(minimum_eligible_rows(0.2), 5);
        assert_eq!(minimum_series_len(0.2), 205);
    }

    /// 训练行不足以拟合时报告数据不足，而不是矩阵奇异
    #[test]
    fn test_history_boundary_lengths() {
        let settings = AnalysisConfig::default();
        for len in [201, 202, 203, 204] {
            let series = synthetic_series("AAPL", date("2020-01-01"), len);
            let err = build_report(resolve_symbol(Exchange::UsMarkets, "AAPL"), &series, &settings, date("2021-01-01"))
                .unwrap_err();
            match err {
                AnalysisError::InsufficientHistory { rows, required } => {
                    assert_eq!(rows, len);
                    assert_eq!(required, 205);
                }
                other => panic!("len {}: unexpected error {:?}", len, other),
            }
        }

        let series = synthetic_series("AAPL", date("2020-01-01"), 205);
        let report = build_report(resolve_symbol(Exchange::UsMarkets, "AAPL"), &series, &settings, date("2021-01-01"))
            .unwrap();
        assert_eq!(report.rows.eligible, 5);
        assert_eq!(report.rows.train, 4);
        assert_eq!(report.rows.test, 1);
        assert!(report.mse >= 0.0);
    }
}
