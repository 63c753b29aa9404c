//! # 温度扫描模块
//!
//! 把单个运行目录的处理步骤组合成整个温度扫描。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `parsers/`, `analysis/`, `batch/`, `config.rs`
//! - 子模块: pipeline, orchestrator

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{
    rewrite_moduli, run_sweep, PointReport, PointStage, Strategy, SweepOptions, SweepReport,
};
