//! # 温度扫描编排
//!
//! 按配置中的温度顺序推进每个温度点：
//!
//! ```text
//! Pending → Averaged → ConstantsComputed → ModuliComputed → Done
//! ```
//!
//! - 日志转换、平均和求解按运行目录并行执行，各任务只写自己的目录
//! - 单个温度在任一步失败只标记该温度，扫描继续
//! - 跨温度的结果文件由调用线程在并行阶段结束后按扫描顺序写入
//! - 结果文件不可写等全局错误直接返回
//!
//! ## 依赖关系
//! - 被 `commands/solve.rs`, `commands/run.rs` 使用
//! - 使用 `sweep/pipeline.rs`, `batch/runner.rs`, `parsers/results.rs`

use super::pipeline;
use crate::analysis::{assemble_point, derive_moduli, AxisResult, CellFailure};
use crate::batch::BatchRunner;
use crate::config::SweepConfig;
use crate::error::Result;
use crate::models::{DeformationAxis, ModuliSet, TemperaturePoint};
use crate::parsers::{self, ConstantsRow, ExistingResults};

use clap::ValueEnum;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 弹性常数求解策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Stress-strain regression over the deformation window (res_CsFit.txt)
    #[default]
    Slope,
    /// Before/after difference of averaged snapshots (res_Cs.txt)
    FiniteDifference,
}

impl Strategy {
    pub fn results_path(self, config: &SweepConfig) -> PathBuf {
        match self {
            Strategy::Slope => config.slope_results_path(),
            Strategy::FiniteDifference => config.difference_results_path(),
        }
    }

    fn solve_axis(self, config: &SweepConfig, dir: &Path, axis: DeformationAxis) -> Result<AxisResult> {
        match self {
            Strategy::Slope => pipeline::slope_axis(config, dir, axis),
            Strategy::FiniteDifference => pipeline::difference_axis(config, dir, axis),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Slope => write!(f, "slope"),
            Strategy::FiniteDifference => write!(f, "finite-difference"),
        }
    }
}

/// 温度点推进到的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointStage {
    Pending,
    Averaged,
    ConstantsComputed,
    ModuliComputed,
    Done,
}

impl std::fmt::Display for PointStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PointStage::Pending => "pending",
            PointStage::Averaged => "averaged",
            PointStage::ConstantsComputed => "constants-computed",
            PointStage::ModuliComputed => "moduli-computed",
            PointStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// 单个温度点的处理记录
#[derive(Debug, Clone)]
pub struct PointReport {
    pub label: String,
    /// 最后成功到达的阶段
    pub stage: PointStage,
    pub point: Option<TemperaturePoint>,
    pub moduli: Option<ModuliSet>,
    /// 使该温度停下的错误
    pub error: Option<String>,
    /// 各运行目录的错误与警告
    pub notes: Vec<String>,
}

impl PointReport {
    fn new(label: &str) -> Self {
        PointReport {
            label: label.to_string(),
            stage: PointStage::Pending,
            point: None,
            moduli: None,
            error: None,
            notes: Vec::new(),
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    fn fail(&mut self, error: String) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// 一次扫描的执行选项
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    pub strategy: Strategy,
    /// 先由 log.lammps 生成数值表
    pub collect: bool,
    /// 先做分阶段平均
    pub average: bool,
    pub existing: ExistingResults,
}

/// 整次扫描的结果
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub points: Vec<PointReport>,
    pub constants_path: PathBuf,
    /// 本次追加的行数
    pub rows_written: usize,
    /// 追加前保留的旧行数
    pub rows_kept: usize,
    pub moduli_files: Vec<PathBuf>,
}

impl SweepReport {
    pub fn completed(&self) -> usize {
        self.points.iter().filter(|p| p.stage == PointStage::Done).count()
    }
}

/// 执行一次完整扫描
pub fn run_sweep(
    config: &SweepConfig,
    runner: &BatchRunner,
    options: &SweepOptions,
) -> Result<SweepReport> {
    let constants_path = options.strategy.results_path(config);
    let rows_kept = parsers::prepare_constants_file(&constants_path, options.existing)?;

    let mut reports: Vec<PointReport> = config
        .temperatures
        .iter()
        .map(|label| PointReport::new(label))
        .collect();

    if options.collect {
        let outcomes = runner.map(&config.all_run_dirs(), "Collecting", |(label, axis, dir)| {
            (
                label.clone(),
                *axis,
                pipeline::collect_run(config, dir).map(|_| Vec::<CellFailure>::new()),
            )
        });
        apply_run_outcomes(&mut reports, outcomes, "collect");
    }

    if options.average {
        let estimator = config.averaging.estimator();
        let outcomes = runner.map(&config.all_run_dirs(), "Averaging", |(label, axis, dir)| {
            (
                label.clone(),
                *axis,
                pipeline::average_run(config, estimator.as_ref(), dir),
            )
        });
        apply_run_outcomes(&mut reports, outcomes, "average");
    }

    for report in reports.iter_mut().filter(|r| !r.failed()) {
        report.stage = PointStage::Averaged;
    }

    // 并行求解，结果与 reports 一一对应
    let solved = runner.map(&reports, "Solving", |report| {
        if report.failed() {
            return None;
        }
        Some(solve_point(config, options.strategy, &report.label))
    });

    for (report, outcome) in reports.iter_mut().zip(solved) {
        let Some((point, notes)) = outcome else {
            continue;
        };
        report.notes.extend(notes);
        match point {
            Ok(point) => {
                report.point = Some(point);
                report.stage = PointStage::ConstantsComputed;
            }
            Err(e) => report.fail(e.to_string()),
        }
    }

    // 单线程按扫描顺序写入
    let rows: Vec<ConstantsRow> = reports
        .iter()
        .filter_map(|r| r.point.as_ref())
        .map(ConstantsRow::from)
        .collect();
    parsers::append_constants(&constants_path, &rows)?;

    for report in reports.iter_mut() {
        if let Some(point) = &report.point {
            report.moduli = Some(derive_moduli(&point.constants));
            report.stage = PointStage::ModuliComputed;
        }
    }

    let moduli_dir = constants_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.root.clone());
    let moduli_files = rewrite_moduli(&constants_path, &moduli_dir)?;

    for report in reports.iter_mut().filter(|r| r.stage == PointStage::ModuliComputed) {
        report.stage = PointStage::Done;
    }

    Ok(SweepReport {
        points: reports,
        constants_path,
        rows_written: rows.len(),
        rows_kept,
        moduli_files,
    })
}

/// 由完整的常数文件重写全部模量文件
pub fn rewrite_moduli(constants_path: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let rows: Vec<(f64, ModuliSet)> = parsers::read_constants(constants_path)?
        .iter()
        .map(|row| (row.temperature, derive_moduli(&row.constants)))
        .collect();
    parsers::write_moduli(dir, &rows)
}

/// 求解一个温度：逐个运行目录求轴结果再合并
fn solve_point(
    config: &SweepConfig,
    strategy: Strategy,
    label: &str,
) -> (Result<TemperaturePoint>, Vec<String>) {
    let mut notes = Vec::new();
    let mut results: Vec<(DeformationAxis, Option<AxisResult>)> = Vec::new();

    for (axis, dir) in config.run_dirs(label) {
        match strategy.solve_axis(config, &dir, axis) {
            Ok(r) => results.push((axis, Some(r))),
            // 未拆分时唯一的运行失败直接作为该温度的错误
            Err(e) if axis == DeformationAxis::Unsplit => return (Err(e), notes),
            Err(e) => {
                notes.push(format!("{}: {}", axis, e));
                results.push((axis, None));
            }
        }
    }

    (assemble_point(label, &results), notes)
}

/// 把按运行目录的结果归到温度上
fn apply_run_outcomes(
    reports: &mut [PointReport],
    outcomes: Vec<(String, DeformationAxis, Result<Vec<CellFailure>>)>,
    step: &str,
) {
    let index: HashMap<String, usize> = reports
        .iter()
        .enumerate()
        .map(|(i, r)| (r.label.clone(), i))
        .collect();

    for (label, axis, outcome) in outcomes {
        let Some(&i) = index.get(&label) else {
            continue;
        };
        let report = &mut reports[i];
        match outcome {
            Ok(failures) => report.notes.extend(failures.iter().map(|f| {
                format!(
                    "{}: stage {} '{}' undefined ({})",
                    axis, f.stage, f.variable, f.reason
                )
            })),
            Err(e) => report.fail(format!("{} failed for {}: {}", step, axis, e)),
        }
    }
}
