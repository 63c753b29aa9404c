//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `sweep/`, `parsers/`, `utils/`
//! - 子模块: collect, average, solve, moduli, plot, run

pub mod average;
pub mod collect;
pub mod moduli;
pub mod plot;
pub mod run;
pub mod solve;

use crate::batch::{BatchResult, BatchRunner};
use crate::cli::sweep::{EstimatorArgs, SweepArgs};
use crate::cli::Commands;
use crate::config::SweepConfig;
use crate::error::{ElasticError, Result};
use crate::models::Topology;
use crate::sweep::Strategy;
use crate::utils::output;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Collect(args) => collect::execute(args),
        Commands::Average(args) => average::execute(args),
        Commands::Fit(args) => solve::execute(args, Strategy::Slope),
        Commands::Constants(args) => solve::execute(args, Strategy::FiniteDifference),
        Commands::Moduli(args) => moduli::execute(args),
        Commands::Plot(args) => plot::execute(args),
        Commands::Run(args) => run::execute(args),
    }
}

/// 读取扫描配置并创建执行器
fn load_sweep(args: &SweepArgs) -> Result<(SweepConfig, BatchRunner)> {
    let config = SweepConfig::load(&args.config)?;
    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Sweep '{}': {} temperatures, {} topology, {} jobs",
        config.root.display(),
        config.temperatures.len(),
        match config.topology {
            Topology::Unsplit => "unsplit",
            Topology::Split => "split",
        },
        runner.jobs()
    ));
    Ok((config, runner))
}

/// 命令行覆盖估计器设置
fn apply_estimator_overrides(config: &mut SweepConfig, args: &EstimatorArgs) -> Result<()> {
    if let Some(method) = args.method {
        config.averaging.method = method;
    }
    if let Some(window) = args.window {
        if window == 0 {
            return Err(ElasticError::InvalidArgument(
                "--window must be at least 1".to_string(),
            ));
        }
        config.averaging.window = window;
    }
    Ok(())
}

/// 打印批量处理统计
fn print_batch_result(result: &BatchResult) {
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} of {} succeeded, {} failed",
        result.success,
        result.total(),
        result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed runs:");
        for (dir, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", dir, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }
}
