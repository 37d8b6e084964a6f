//! 特征计算
//!
//! 滑动均线、目标列平移，以及训练行筛选

use crate::models::{DerivedRow, FeatureVector, PriceSeries, TrainingRow};

/// 短期均线窗口
pub const SHORT_WINDOW: usize = 50;
/// 长期均线窗口
pub const LONG_WINDOW: usize = 200;

/// 简单移动平均（右对齐）
///
/// 第 i 项为 `values[i + 1 - window ..= i]` 的均值，前 `window - 1` 项为空
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut result = vec![None; values.len().min(window - 1)];
    result.extend(
        values
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    result
}

/// 向前平移一行：第 i 项为 `values[i + 1]`，最后一项为空
pub fn shift_forward(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .skip(1)
        .copied()
        .map(Some)
        .chain(std::iter::once(None))
        .take(values.len())
        .collect()
}

/// 为每个交易日附加均线和下一日收盘价
pub fn derive_rows(series: &PriceSeries) -> Vec<DerivedRow> {
    let closes = series.closes();
    let sma_50 = simple_moving_average(&closes, SHORT_WINDOW);
    let sma_200 = simple_moving_average(&closes, LONG_WINDOW);
    let next_close = shift_forward(&closes);

    series
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| DerivedRow {
            bar: bar.clone(),
            sma_50: sma_50[i],
            sma_200: sma_200[i],
            next_close: next_close[i],
        })
        .collect()
}

/// 筛选特征与目标均有定义的行
pub fn training_rows(rows: &[DerivedRow]) -> Vec<TrainingRow> {
    rows.iter()
        .filter_map(|row| {
            Some(TrainingRow {
                date: row.bar.date,
                features: row.features()?,
                target: row.next_close?,
            })
        })
        .collect()
}

/// 最新一行的特征，用于预测下一交易日
pub fn latest_features(rows: &[DerivedRow]) -> Option<FeatureVector> {
    rows.last().and_then(DerivedRow::features)
}
