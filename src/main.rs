//! # mdelastic - 分子动力学弹性常数后处理工具
//!
//! 从 LAMMPS 温度扫描的 thermo 输出计算立方晶体的弹性常数
//! C11、C12、C44 及其导出模量（体模量、Voigt/Reuss 剪切模量、杨氏模量、泊松比）。
//!
//! ## 子命令
//! - `collect`   - log.lammps → data_out.txt + log.out
//! - `average`   - 分阶段平均（简单平均 / 滑动平均 / Student-t 拟合）
//! - `fit`       - 应力-应变斜率法
//! - `constants` - 有限差分法
//! - `moduli`    - 导出模量
//! - `plot`      - 常数随温度变化图
//! - `run`       - 全流程
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── sweep/     (温度扫描编排)
//!   │     ├── analysis/  (估计器、求解器、模量)
//!   │     ├── parsers/   (文件读写)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (扫描配置)
//!   ├── batch/      (并行执行)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod analysis;
mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod parsers;
mod sweep;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
