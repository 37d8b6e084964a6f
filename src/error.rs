//! 分析流程错误定义

use thiserror::Error;

use crate::services::model::ModelError;

/// 分析流程对外暴露的错误
///
/// 数据获取阶段的各种失败原因（网络、代码无效、已退市、空数据）
/// 统一归为 `FetchFailed`，具体原因只写入日志
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Could not fetch data for '{symbol}'. Please check the ticker symbol and selected exchange.")]
    FetchFailed { symbol: String },

    #[error("Not enough price history to fit the model: {rows} trading days available, at least {required} required")]
    InsufficientHistory { rows: usize, required: usize },

    #[error("Model fitting failed: {0}")]
    Model(#[from] ModelError),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}
