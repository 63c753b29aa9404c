//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `collect`: log.lammps → data_out.txt + log.out
//! - `average`: 分阶段平均，追加到 av_res.txt
//! - `fit`: 斜率法求弹性常数
//! - `constants`: 有限差分法求弹性常数
//! - `moduli`: 由常数文件重算导出模量
//! - `plot`: 绘制常数随温度变化
//! - `run`: 全流程
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: sweep, results

pub mod results;
pub mod sweep;

use clap::{Parser, Subcommand};

/// mdelastic - 分子动力学弹性常数后处理工具
#[derive(Parser)]
#[command(name = "mdelastic")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Elastic constants of cubic crystals from LAMMPS temperature sweeps", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert log.lammps of every run into data_out.txt and log.out
    Collect(sweep::CollectArgs),

    /// Reduce every stage of every run and append the block to av_res.txt
    Average(sweep::AverageArgs),

    /// Fit C11, C12, C44 from stress-strain slopes (res_CsFit.txt)
    Fit(sweep::SolveArgs),

    /// Compute C11, C12, C44 by finite differences of averaged snapshots (res_Cs.txt)
    Constants(sweep::SolveArgs),

    /// Recompute derived moduli from an elastic-constants file
    Moduli(results::ModuliArgs),

    /// Plot C11, C12, C44 against temperature
    Plot(results::PlotArgs),

    /// Run the whole pipeline: collect, average, solve, moduli
    Run(sweep::RunArgs),
}
