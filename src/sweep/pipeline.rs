//! # 单个运行目录的处理步骤
//!
//! 每个函数只读写给定运行目录内的文件，可在线程池中并行调用。
//! 所有路径都显式传入，不切换进程工作目录。
//!
//! ## 依赖关系
//! - 被 `sweep/orchestrator.rs`, `commands/` 使用
//! - 使用 `parsers/`, `analysis/`, `config.rs`

use crate::analysis::finite_diff::{finite_difference, snapshots};
use crate::analysis::slope::{deformation_temperature, DeformationSeries};
use crate::analysis::{reduce_stages, AxisResult, CellFailure, Estimator};
use crate::config::SweepConfig;
use crate::error::{ElasticError, Result};
use crate::models::{DeformationAxis, StageIndex, ThermoTable};
use crate::parsers;

use std::path::Path;

/// `collect` 的产出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    pub rows: usize,
    pub stages: usize,
}

fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ElasticError::DirectoryNotFound {
            path: dir.display().to_string(),
        })
    }
}

/// log.lammps → data_out.txt + log.out
pub fn collect_run(config: &SweepConfig, dir: &Path) -> Result<CollectSummary> {
    require_dir(dir)?;
    let log_path = dir.join(&config.files.log);
    if !log_path.exists() {
        return Err(ElasticError::FileNotFound {
            path: log_path.display().to_string(),
        });
    }

    let parsed = parsers::parse_log_file(&log_path, &config.thermo)?;
    parsers::write_table(&dir.join(&config.files.data), &parsed.rows)?;
    parsers::write_stages(&dir.join(&config.files.stages), &parsed.boundaries)?;

    Ok(CollectSummary {
        rows: parsed.rows.len(),
        stages: parsed.boundaries.len().saturating_sub(1),
    })
}

/// 读入数值表和阶段边界；末边界不足表长时补齐
pub fn load_run(config: &SweepConfig, dir: &Path) -> Result<(ThermoTable, StageIndex)> {
    require_dir(dir)?;
    let table = parsers::read_table(&dir.join(&config.files.data), &config.thermo)?;
    let stages = parsers::read_stages(&dir.join(&config.files.stages))?.closed_at(table.len());
    stages.check_within(table.len())?;
    Ok((table, stages))
}

/// 分阶段平均并追加到 av_res.txt，返回无定义的格
pub fn average_run(
    config: &SweepConfig,
    estimator: &dyn Estimator,
    dir: &Path,
) -> Result<Vec<CellFailure>> {
    let (table, stages) = load_run(config, dir)?;
    let (block, failures) = reduce_stages(estimator, &table, &stages, &config.variables)?;
    parsers::append_block(&dir.join(&config.files.averaged), &block)?;
    Ok(failures)
}

/// 斜率法求解一个轴
pub fn slope_axis(config: &SweepConfig, dir: &Path, axis: DeformationAxis) -> Result<AxisResult> {
    let (table, stages) = load_run(config, dir)?;
    let windows = config.windows_for(&stages)?;
    DeformationSeries::prepare(&table, &windows, axis, config.shear)?.fit()
}

/// 有限差分法求解一个轴：快照取自 av_res.txt 的最后一个块，
/// 温度取自数值表的形变窗口
pub fn difference_axis(
    config: &SweepConfig,
    dir: &Path,
    axis: DeformationAxis,
) -> Result<AxisResult> {
    require_dir(dir)?;
    let block = parsers::read_last_block(&dir.join(&config.files.averaged))?;
    let (initial, final_) = snapshots(&block, config.constants.snapshot_rows)?;

    let (table, stages) = load_run(config, dir)?;
    let windows = config.windows_for(&stages)?;
    let temperature = deformation_temperature(&table, &windows)?;

    finite_difference(&initial, &final_, temperature, axis, config.shear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SimpleMean;
    use std::fs;
    use tempfile::tempdir;

    fn config(root: &Path) -> SweepConfig {
        let mut cfg = SweepConfig::from_toml(
            r#"
root = "."
temperatures = ["300"]
thermo = ["Step", "T", "pxx", "pyy", "pxy", "lx", "ly", "xy"]
"#,
        )
        .unwrap();
        cfg.root = root.to_path_buf();
        cfg
    }

    const LOG: &str = "\
Step Temp Pxx Pyy Pxy Lx Ly Xy
0 300 0 0 0 10 10 0
1 300 0 0 0 10 10 0
Loop time of 1 on 1 procs for 1 steps with 4 atoms
Step Temp Pxx Pyy Pxy Lx Ly Xy
1 300 0 0 0 10 10 0
2 300 -500 -300 0 10.05 10 0
3 300 -1000 -600 0 10.1 10 0
Loop time of 1 on 1 procs for 2 steps with 4 atoms
";

    #[test]
    fn test_collect_average_difference() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        fs::write(dir.path().join("log.lammps"), LOG).unwrap();

        let summary = collect_run(&cfg, dir.path()).unwrap();
        assert_eq!(summary, CollectSummary { rows: 4, stages: 2 });
        assert_eq!(
            fs::read_to_string(dir.path().join("log.out")).unwrap().trim(),
            "0 2 4"
        );

        let (table, stages) = load_run(&cfg, dir.path()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(stages.stage_count(), 2);

        let failures = average_run(&cfg, &SimpleMean, dir.path()).unwrap();
        assert!(failures.is_empty());

        // 阶段均值: pxx 0 → -750, lx 10 → 10.075
        let r = difference_axis(&cfg, dir.path(), DeformationAxis::X).unwrap();
        let c11 = r.constants.c11.unwrap();
        assert!((c11 - 750.0 / 0.0075 * 1.0e-4).abs() < 1e-6);
        assert_eq!(r.temperature, 300.0);
    }

    #[test]
    fn test_difference_temperature_ignores_averaging_method() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());

        // 形变阶段温度在 300 K 附近小幅波动，其中一步尖峰到 3000 K
        let rows: Vec<Vec<f64>> = (0..200)
            .map(|i| {
                let f = if i < 100 { 0.0 } else { (i - 100) as f64 / 99.0 };
                let t = if i == 150 { 3000.0 } else { 300.0 + 0.5 * ((i % 7) as f64 - 3.0) / 3.0 };
                vec![i as f64, t, -1000.0 * f, -600.0 * f, 0.0, 10.0 * (1.0 + 0.01 * f), 10.0, 0.0]
            })
            .collect();
        parsers::write_table(&dir.path().join("data_out.txt"), &rows).unwrap();
        parsers::write_stages(&dir.path().join("log.out"), &[0, 100]).unwrap();

        average_run(&cfg, &SimpleMean, dir.path()).unwrap();
        let block = parsers::read_last_block(&dir.path().join("av_res.txt")).unwrap();
        let simple_t = block.rows[1][0].unwrap();
        assert!(simple_t > 320.0, "simple mean {}", simple_t);

        let r = difference_axis(&cfg, dir.path(), DeformationAxis::Unsplit).unwrap();
        assert!((r.temperature - 300.0).abs() < 0.5, "temperature {}", r.temperature);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path());
        assert!(matches!(
            load_run(&cfg, &dir.path().join("T_300")),
            Err(ElasticError::DirectoryNotFound { .. })
        ));
        assert!(matches!(
            collect_run(&cfg, dir.path()),
            Err(ElasticError::FileNotFound { .. })
        ));
    }
}
