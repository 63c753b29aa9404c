//! # 温度扫描子命令 CLI 定义
//!
//! `collect`, `average`, `fit`, `constants`, `run` 共用一个扫描配置文件，
//! 命令行只覆盖执行相关的选项。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/` 相应模块

use crate::config::AveragingMethod;
use crate::parsers::ExistingResults;
use crate::sweep::Strategy;

use clap::Args;
use std::path::PathBuf;

/// 各扫描子命令共用的参数
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Sweep configuration file (TOML)
    #[arg(short, long, default_value = "sweep.toml")]
    pub config: PathBuf,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}

/// 估计器覆盖选项
#[derive(Args, Debug)]
pub struct EstimatorArgs {
    /// Override the averaging method of the configuration
    #[arg(long, value_enum)]
    pub method: Option<AveragingMethod>,

    /// Override the moving-average window (samples)
    #[arg(long)]
    pub window: Option<usize>,
}

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,
}

/// average 子命令参数
#[derive(Args, Debug)]
pub struct AverageArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,
}

/// fit / constants 子命令参数
#[derive(Args, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// What to do when the constants file already has rows
    #[arg(long, value_enum, default_value = "refuse")]
    pub existing: ExistingResults,
}

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub sweep: SweepArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Elastic-constant strategy
    #[arg(short, long, value_enum, default_value = "slope")]
    pub strategy: Strategy,

    /// What to do when the constants file already has rows
    #[arg(long, value_enum, default_value = "refuse")]
    pub existing: ExistingResults,

    /// Use existing data_out.txt/log.out instead of parsing log.lammps
    #[arg(long, default_value_t = false)]
    pub skip_collect: bool,
}
