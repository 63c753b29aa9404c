//! # 批量处理模块
//!
//! 对扫描中的全部运行目录或温度点并行执行同一操作。
//!
//! ## 依赖关系
//! - 被 `commands/`, `sweep/` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod runner;

pub use runner::{BatchResult, BatchRunner, ProcessResult};
