//! 交易所代码映射
//!
//! 将用户输入的代码与交易所组合成数据源代码，并确定计价币种

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Exchange, MarketSymbol};

/// 数据源代码允许的字符（如 BRK-B、^GSPC、M&M.NS）
const SYMBOL_PATTERN: &str = r"^[A-Z0-9.\-\^=&]{1,32}$";

/// 解析用户输入
///
/// 印度交易所追加 `.NS` / `.BO` 后缀（已带正确后缀时不重复追加），美股保持原样
pub fn resolve_symbol(exchange: Exchange, ticker: &str) -> MarketSymbol {
    let ticker = ticker.trim().to_uppercase();
    let suffix = exchange.suffix();

    let fetch_symbol = if suffix.is_empty() || ticker.ends_with(suffix) {
        ticker.clone()
    } else {
        format!("{}{}", ticker, suffix)
    };

    MarketSymbol {
        ticker,
        fetch_symbol,
        exchange,
        currency: exchange.currency(),
    }
}

/// 代码是否可以安全地发往数据源
pub fn is_valid_symbol(symbol: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(SYMBOL_PATTERN).expect("symbol pattern is a valid regex"))
        .is_match(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    /// 测试各交易所的代码映射
    #[test]
    fn test_resolve_symbol() {
        println!("\n========== 测试交易所代码映射 ==========");
        let test_cases = vec![
            (Exchange::Nse, "TCS", "TCS.NS", Currency::Inr),
            (Exchange::Bse, "TCS", "TCS.BO", Currency::Inr),
            (Exchange::UsMarkets, "TCS", "TCS", Currency::Usd),
            (Exchange::UsMarkets, "aapl", "AAPL", Currency::Usd),
        ];

        for (exchange, input, expected, currency) in &test_cases {
            let symbol = resolve_symbol(*exchange, input);
            println!("  {} [{}] -> {}", input, exchange.label(), symbol.fetch_symbol);
            assert_eq!(symbol.fetch_symbol, *expected);
            assert_eq!(symbol.currency, *currency);
        }
        println!("✅ 代码映射测试通过！");
    }

    /// 已带正确后缀时不重复追加
    #[test]
    fn test_no_double_suffix() {
        assert_eq!(resolve_symbol(Exchange::Nse, "TCS.NS").fetch_symbol, "TCS.NS");
        assert_eq!(resolve_symbol(Exchange::Bse, "tcs.bo").fetch_symbol, "TCS.BO");
        // 其他交易所的后缀不算正确后缀
        assert_eq!(resolve_symbol(Exchange::Nse, "TCS.BO").fetch_symbol, "TCS.BO.NS");
    }

    #[test]
    fn test_ticker_kept_as_entered() {
        let symbol = resolve_symbol(Exchange::Nse, " reliance ");
        assert_eq!(symbol.ticker, "RELIANCE");
        assert_eq!(symbol.fetch_symbol, "RELIANCE.NS");
        assert_eq!(symbol.exchange, Exchange::Nse);
    }

    #[test]
    fn test_is_valid_symbol() {
        for symbol in ["AAPL", "BRK-B", "^GSPC", "M&M.NS", "TCS.BO"] {
            assert!(is_valid_symbol(symbol), "{} 应该合法", symbol);
        }
        for symbol in ["", "AA PL", "AAPL/../x", "AAPL?x=1", "aapl"] {
            assert!(!is_valid_symbol(symbol), "{} 不应该合法", symbol);
        }
    }
}
