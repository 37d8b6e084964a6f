//! 仪表盘页面
//!
//! - GET / - 输入表单
//! - GET /analyze?exchange=us&ticker=AAPL - 表单提交，渲染分析结果或错误提示

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Result};

use crate::error::AnalysisError;
use crate::models::{AnalysisReport, AnalyzeQuery, Exchange};
use crate::services::analysis_service;
use crate::services::stock::PriceSource;
use crate::state::{today, AppState};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; color: #262730; }
aside { width: 260px; min-height: 100vh; padding: 24px; background: #f0f2f6; box-sizing: border-box; }
main { flex: 1; padding: 24px 40px; max-width: 1100px; }
label { display: block; margin: 16px 0 6px; font-size: 14px; }
select, input { width: 100%; padding: 6px; box-sizing: border-box; }
button { margin-top: 20px; padding: 8px 14px; cursor: pointer; }
.banner { padding: 12px 16px; border-radius: 6px; margin: 16px 0; }
.success { background: #dff5e3; color: #1b5e20; }
.error { background: #fde2e1; color: #8a1c1c; }
table { border-collapse: collapse; margin-bottom: 12px; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: right; }
.metric-label { font-size: 14px; color: #555; }
.metric-value { font-size: 36px; }
.chart svg { max-width: 100%; height: auto; }
"#;

// 切换交易所时，若输入框仍是上一个默认代码则换成新的默认代码
const SCRIPT: &str = r#"
document.getElementById('exchange').addEventListener('change', function (e) {
  var ticker = document.getElementById('ticker');
  var defaults = Array.prototype.map.call(e.target.options, function (o) { return o.dataset.default; });
  if (ticker.value === '' || defaults.indexOf(ticker.value.toUpperCase()) >= 0) {
    ticker.value = e.target.selectedOptions[0].dataset.default;
  }
});
"#;

/// 输入表单
pub async fn index(query: web::Query<AnalyzeQuery>) -> Result<HttpResponse> {
    let html = render_page(query.exchange(), &query.ticker(), None);
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

/// 执行分析并渲染结果
pub async fn analyze_page<S: PriceSource + 'static>(
    state: web::Data<AppState<S>>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse> {
    let exchange = query.exchange();
    let ticker = query.ticker();
    let outcome = analysis_service::analyze(&state.market, &state.analysis, exchange, &ticker, today()).await;

    let html = render_page(exchange, &ticker, Some(&outcome));
    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html))
}

pub fn config<S: PriceSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/analyze", web::get().to(analyze_page::<S>));
}

/// 渲染完整页面
pub fn render_page(
    exchange: Exchange,
    ticker: &str,
    outcome: Option<&Result<AnalysisReport, AnalysisError>>,
) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Stock Market Analyzer</title><style>{}</style></head><body>",
        STYLE
    ));

    html.push_str(&render_sidebar(exchange, ticker));

    html.push_str("<main><h1>📈 Stock Market Analysis &amp; Prediction Engine</h1>");
    html.push_str(
        "<p>Select an exchange and enter a stock ticker to get historical data, \
         technical indicators, and a price prediction.</p>",
    );

    match outcome {
        None => {}
        Some(Ok(report)) => html.push_str(&render_report(report)),
        Some(Err(e)) => {
            html.push_str(&format!("<div class=\"banner error\">{}</div>", escape_html(&e.to_string())));
        }
    }

    html.push_str(&format!("</main><script>{}</script></body></html>", SCRIPT));
    html
}

fn render_sidebar(selected: Exchange, ticker: &str) -> String {
    let mut html = String::from("<aside><h2>User Input</h2><form method=\"get\" action=\"/analyze\">");
    html.push_str("<label for=\"exchange\">Select Exchange</label><select id=\"exchange\" name=\"exchange\">");
    for exchange in Exchange::ALL {
        html.push_str(&format!(
            "<option value=\"{}\" data-default=\"{}\"{}>{}</option>",
            exchange.code(),
            exchange.default_ticker(),
            if exchange == selected { " selected" } else { "" },
            exchange.label()
        ));
    }
    html.push_str("</select>");
    html.push_str(&format!(
        "<label for=\"ticker\">Enter Stock Ticker</label>\
         <input id=\"ticker\" name=\"ticker\" type=\"text\" value=\"{}\">\
         <button type=\"submit\">Analyze Stock</button></form></aside>",
        escape_html(ticker)
    ));
    html
}

fn render_report(report: &AnalysisReport) -> String {
    let symbol = &report.symbol;
    let currency = symbol.currency;
    let mut html = String::new();

    html.push_str(&format!(
        "<div class=\"banner success\">Data for {} loaded successfully!</div>",
        escape_html(&symbol.fetch_symbol)
    ));

    html.push_str("<h3>Recent Stock Data</h3><table><tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th><th>Volume</th></tr>");
    for bar in &report.recent {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    html.push_str("</table>");

    html.push_str(&format!(
        "<h3>Stock Price History with Moving Averages</h3><div class=\"chart\">{}</div>",
        report.charts.price_svg
    ));

    html.push_str(&format!(
        "<h3>Prediction for the Next Trading Day</h3>\
         <div class=\"metric-label\">Predicted Closing Price for {}</div>\
         <div class=\"metric-value\">{}</div>",
        escape_html(&symbol.ticker),
        escape_html(&report.prediction_display)
    ));

    html.push_str(&format!(
        "<h3>Model Performance on Historical Data</h3>\
         <p><strong>Mean Squared Error (MSE):</strong> {}</p>\
         <p>This metric shows the average squared difference between the actual and predicted \
         prices on the test data ({} of {} rows, prices in {}). Lower is better.</p>",
        report.mse_display,
        report.rows.test,
        report.rows.eligible,
        currency.code()
    ));

    html.push_str(&format!("<div class=\"chart\">{}</div>", report.charts.evaluation_svg));
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
