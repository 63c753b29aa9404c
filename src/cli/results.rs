//! # 结果后处理子命令 CLI 定义
//!
//! - `moduli`: 由常数文件重算导出模量
//! - `plot`: 绘制 C11/C12/C44 随温度的变化
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/moduli.rs`, `commands/plot.rs`

use clap::Args;
use std::path::PathBuf;

/// moduli 子命令参数
#[derive(Args, Debug)]
pub struct ModuliArgs {
    /// Elastic-constants file (T,C11,C12,C44 per line)
    pub input: PathBuf,

    /// Directory for resB.txt, resGV.txt, ... (default: next to the input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// plot 子命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Elastic-constants file (T,C11,C12,C44 per line)
    pub input: PathBuf,

    /// Output image (.png or .svg)
    #[arg(short, long, default_value = "elastic_constants.png")]
    pub output: PathBuf,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot
    #[arg(long, default_value = "Elastic constants")]
    pub title: String,
}
