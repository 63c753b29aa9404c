//! # average 命令实现
//!
//! 对每个运行目录的每个阶段调用所选估计器，把结果块追加到 av_res.txt。
//! 无定义的格写作 `nan` 并给出警告。
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `sweep/pipeline.rs`, `batch/`
//! - 使用 `utils/output.rs`

use super::{apply_estimator_overrides, load_sweep, print_batch_result};
use crate::batch::{BatchResult, ProcessResult};
use crate::cli::sweep::AverageArgs;
use crate::error::Result;
use crate::sweep::pipeline;
use crate::utils::output;

/// 执行 average 命令
pub fn execute(args: AverageArgs) -> Result<()> {
    output::print_header("Stage Averaging");

    let (mut config, runner) = load_sweep(&args.sweep)?;
    apply_estimator_overrides(&mut config, &args.estimator)?;

    let estimator = config.averaging.estimator();
    output::print_info(&format!(
        "Estimator: {} over {} variables",
        estimator.name(),
        config.variables.len()
    ));

    let runs = config.all_run_dirs();
    let outcomes = runner.map(&runs, "Averaging", |(_, _, dir)| {
        pipeline::average_run(&config, estimator.as_ref(), dir)
    });

    let mut result = BatchResult::default();
    for ((_, _, dir), outcome) in runs.iter().zip(outcomes) {
        let name = dir.display().to_string();
        match outcome {
            Ok(failures) => {
                for f in &failures {
                    output::print_warning(&format!(
                        "{}: stage {} '{}' undefined ({})",
                        name, f.stage, f.variable, f.reason
                    ));
                }
                result.merge(ProcessResult::Success(name));
            }
            Err(e) => result.merge(ProcessResult::Failed(name, e.to_string())),
        }
    }

    print_batch_result(&result);
    Ok(())
}
