//! SVG 图表渲染
//!
//! 横轴使用行序号，刻度标签显示对应日期

use anyhow::Result;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::ops::Range;

use crate::models::{Currency, DerivedRow, EvaluationPoint};

const CHART_SIZE: (u32, u32) = (1000, 500);

/// 收盘价与 50/200 日均线
pub fn render_price_chart(symbol: &str, currency: Currency, rows: &[DerivedRow]) -> Result<String> {
    let dates: Vec<NaiveDate> = rows.iter().map(|row| row.bar.date).collect();
    let y_range = value_range(
        rows.iter()
            .flat_map(|row| [Some(row.bar.close), row.sma_50, row.sma_200])
            .flatten(),
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} Price History", symbol), ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0..rows.len().max(1), y_range)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|idx| date_label(&dates, *idx))
            .x_desc("Date")
            .y_desc(format!("Price ({})", currency.code()))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                rows.iter().enumerate().map(|(i, row)| (i, row.bar.close)),
                &BLUE.mix(0.6),
            ))?
            .label("Closing Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .draw_series(LineSeries::new(
                rows.iter().enumerate().filter_map(|(i, row)| row.sma_50.map(|v| (i, v))),
                &GREEN,
            ))?
            .label("50-Day SMA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));

        chart
            .draw_series(LineSeries::new(
                rows.iter().enumerate().filter_map(|(i, row)| row.sma_200.map(|v| (i, v))),
                &MAGENTA,
            ))?
            .label("200-Day SMA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &MAGENTA));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(svg)
}

/// 测试集实际值与预测值，点需已按日期排序
pub fn render_evaluation_chart(currency: Currency, points: &[EvaluationPoint]) -> Result<String> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let y_range = value_range(points.iter().flat_map(|p| [p.actual, p.predicted]));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Model Predictions vs. Actual Prices (on Test Data)", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0..points.len().max(1), y_range)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|idx| date_label(&dates, *idx))
            .x_desc("Date")
            .y_desc(format!("Price ({})", currency.code()))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                points.iter().enumerate().map(|(i, p)| (i, p.actual)),
                &BLUE.mix(0.7),
            ))?
            .label("Actual Prices")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .draw_series(LineSeries::new(
                points.iter().enumerate().map(|(i, p)| (i, p.predicted)),
                &RED,
            ))?
            .label("Predicted Prices")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(svg)
}

fn date_label(dates: &[NaiveDate], idx: usize) -> String {
    dates
        .get(idx)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// 纵轴范围，上下各留 5% 空白；无数据或取值相同时给默认范围
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceBar;

    fn row(day: u32, close: f64, sma: Option<f64>) -> DerivedRow {
        DerivedRow {
            bar: PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10,
            },
            sma_50: sma,
            sma_200: None,
            next_close: None,
        }
    }

    #[test]
    fn test_price_chart_is_svg() {
        let rows = vec![row(1, 10.0, None), row(2, 11.0, Some(10.5)), row(3, 12.5, Some(11.0))];
        let svg = render_price_chart("AAPL", Currency::Usd, &rows).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("AAPL Price History"));
        assert!(svg.contains("50-Day SMA"));
        assert!(svg.contains("Price (USD)"));
    }

    #[test]
    fn test_evaluation_chart_handles_empty_input() {
        let svg = render_evaluation_chart(Currency::Inr, &[]).unwrap();
        assert!(svg.contains("Predicted Prices"));
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(std::iter::empty()), 0.0..1.0);
        assert_eq!(value_range([5.0, 5.0].into_iter()), 4.0..6.0);

        let range = value_range([10.0, 20.0, f64::NAN].into_iter());
        assert_eq!(range, 9.5..20.5);
    }
}
