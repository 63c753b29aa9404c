//! # run 命令实现
//!
//! 全流程：collect → average → 所选求解策略 → 导出模量。
//! 每个温度点独立推进，失败的温度在汇总表中标出，其余照常完成。
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `sweep/orchestrator.rs`
//! - 使用 `commands/solve.rs` 的汇总输出

use super::solve::print_sweep_report;
use super::{apply_estimator_overrides, load_sweep};
use crate::cli::sweep::RunArgs;
use crate::error::Result;
use crate::sweep::{run_sweep, SweepOptions};
use crate::utils::output;

/// 执行 run 命令
pub fn execute(args: RunArgs) -> Result<()> {
    output::print_header("Elastic Constants Temperature Sweep");

    let (mut config, runner) = load_sweep(&args.sweep)?;
    apply_estimator_overrides(&mut config, &args.estimator)?;

    if args.skip_collect {
        output::print_skip(&format!("Using existing '{}' files", config.files.data));
    }
    output::print_info(&format!(
        "Averaging with '{}', solving with '{}'",
        config.averaging.method, args.strategy
    ));

    let options = SweepOptions {
        strategy: args.strategy,
        collect: !args.skip_collect,
        average: true,
        existing: args.existing,
    };
    let report = run_sweep(&config, &runner, &options)?;
    print_sweep_report(&report);
    Ok(())
}
