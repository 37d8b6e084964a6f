//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 统一 API 响应结构，JSON 接口与错误响应共用
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// 失败时为空
    pub data: Option<T>,
    pub message: String,
    /// RFC 3339，UTC
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// 错误响应，`message` 直接展示给调用方
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_has_no_data() {
        let value = serde_json::to_value(ApiResponse::<Vec<u32>>::error("boom".to_string())).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["data"].is_null());
        assert_eq!(value["message"], "boom");
        assert!(value["timestamp"].as_str().unwrap().ends_with("+00:00"));
    }
}
