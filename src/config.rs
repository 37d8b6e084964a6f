//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// 日线接口地址
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 分析流程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 历史数据起始日期，结束日期固定为当天
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// 测试集比例
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// 划分训练/测试集的随机种子
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// 页面展示的最近数据条数
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub data_source: DataSourceConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 分析配置
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

// 默认值函数
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_base_url() -> String { "https://query1.finance.yahoo.com/v8/finance/chart".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}
fn default_log_level() -> String { "info".to_string() }
fn default_start_date() -> NaiveDate { NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default() }
fn default_test_ratio() -> f64 { 0.2 }
fn default_seed() -> u64 { 42 }
fn default_tail_rows() -> usize { 5 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
            tail_rows: default_tail_rows(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志系统尚未初始化，加载结果由调用方记录
    pub fn load() -> (Self, Option<String>) {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => return (config, Some(path.to_string())),
                    Err(e) => eprintln!("加载配置文件 {} 失败: {}", path, e),
                }
            }
        }

        (Self::default(), None)
    }

    /// 校验取值范围
    pub fn validate(&self) -> anyhow::Result<()> {
        let ratio = self.analysis.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            anyhow::bail!("analysis.test_ratio 必须在 (0, 1) 区间内，当前为 {}", ratio);
        }
        Ok(())
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试缺省字段使用默认值
    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "server": { "port": 9000 }, "analysis": { "seed": 7 } }"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.analysis.seed, 7);
        assert_eq!(config.analysis.test_ratio, 0.2);
        assert_eq!(config.analysis.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.data_source.timeout_secs, 30);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_start_date_parsed() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "analysis": { "start_date": "2018-06-01" } }"#).unwrap();
        assert_eq!(
            config.analysis.start_date,
            NaiveDate::from_ymd_opt(2018, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        config.analysis.test_ratio = 1.0;
        assert!(config.validate().is_err());
    }
}
