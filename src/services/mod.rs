//! 业务逻辑服务模块
//!
//! 封装数据获取、特征计算、模型拟合与图表渲染

pub mod analysis_service; // 分析流程
pub mod charts;           // SVG 图表
pub mod indicators;       // 均线与目标列
pub mod market;           // 交易所代码映射
pub mod model;            // 线性回归
pub mod stock;            // 日线数据获取与缓存
