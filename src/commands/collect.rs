//! # collect 命令实现
//!
//! 把扫描中每个运行目录的 log.lammps 转换为 data_out.txt 和 log.out。
//!
//! ## 功能
//! - 按配置枚举全部运行目录（拆分拓扑时为三个子目录）
//! - 并行解析，每个任务只写自己的目录
//! - 汇总成功/失败统计
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `sweep/pipeline.rs`, `batch/`
//! - 使用 `utils/output.rs`

use super::{load_sweep, print_batch_result};
use crate::batch::ProcessResult;
use crate::cli::sweep::CollectArgs;
use crate::error::Result;
use crate::sweep::pipeline;
use crate::utils::output;

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting LAMMPS Thermo Output");

    let (config, runner) = load_sweep(&args.sweep)?;
    let runs = config.all_run_dirs();
    output::print_info(&format!(
        "Parsing '{}' in {} run directories...",
        config.files.log,
        runs.len()
    ));

    let result = runner.run(&runs, "Collecting", |(_, _, dir)| {
        let name = dir.display().to_string();
        match pipeline::collect_run(&config, dir) {
            Ok(summary) => ProcessResult::Success(format!(
                "{}: {} rows in {} stages",
                name, summary.rows, summary.stages
            )),
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    });

    print_batch_result(&result);
    Ok(())
}
