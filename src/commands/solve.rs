//! # fit / constants 命令实现
//!
//! 对整个温度扫描求弹性常数，追加到常数文件并重写导出模量文件，
//! 最后以表格汇总每个温度点的状态。
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `sweep/orchestrator.rs`
//! - 使用 `utils/output.rs`, `tabled`

use super::load_sweep;
use crate::cli::sweep::SolveArgs;
use crate::error::Result;
use crate::models::format_value;
use crate::sweep::{run_sweep, PointReport, Strategy, SweepOptions, SweepReport};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 汇总表中的一行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "T (K)")]
    temperature: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "C11 (GPa)")]
    c11: String,
    #[tabled(rename = "C12 (GPa)")]
    c12: String,
    #[tabled(rename = "C44 (GPa)")]
    c44: String,
    #[tabled(rename = "B (GPa)")]
    bulk: String,
}

impl From<&PointReport> for SummaryRow {
    fn from(report: &PointReport) -> Self {
        let constants = report.point.as_ref().map(|p| p.constants).unwrap_or_default();
        SummaryRow {
            label: report
                .point
                .as_ref()
                .map_or(&report.label, |p| &p.label)
                .clone(),
            temperature: report
                .point
                .as_ref()
                .map(|p| format!("{:.2}", p.temperature))
                .unwrap_or_else(|| "-".to_string()),
            stage: if report.failed() {
                format!("failed after {}", report.stage)
            } else {
                report.stage.to_string()
            },
            c11: short(constants.c11),
            c12: short(constants.c12),
            c44: short(constants.c44),
            bulk: short(report.moduli.and_then(|m| m.bulk)),
        }
    }
}

fn short(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.3}", v),
        other => format_value(other),
    }
}

/// 执行 fit / constants 命令
pub fn execute(args: SolveArgs, strategy: Strategy) -> Result<()> {
    output::print_header(match strategy {
        Strategy::Slope => "Elastic Constants: Stress-Strain Slopes",
        Strategy::FiniteDifference => "Elastic Constants: Finite Differences",
    });

    let (config, runner) = load_sweep(&args.sweep)?;
    let options = SweepOptions {
        strategy,
        collect: false,
        average: false,
        existing: args.existing,
    };
    let report = run_sweep(&config, &runner, &options)?;
    print_sweep_report(&report);
    Ok(())
}

/// 打印扫描汇总
pub fn print_sweep_report(report: &SweepReport) {
    for point in &report.points {
        for note in &point.notes {
            output::print_warning(&format!("T_{} {}", point.label, note));
        }
        if let Some(err) = &point.error {
            output::print_error(&format!("T_{}: {}", point.label, err));
        }
    }

    let rows: Vec<SummaryRow> = report.points.iter().map(SummaryRow::from).collect();
    output::print_header("Temperature Sweep Summary");
    println!("{}", Table::new(&rows));

    output::print_separator();
    if report.rows_kept > 0 {
        output::print_info(&format!(
            "Kept {} existing rows in '{}'",
            report.rows_kept,
            report.constants_path.display()
        ));
    }
    output::print_success(&format!(
        "Appended {} rows to '{}'",
        report.rows_written,
        report.constants_path.display()
    ));
    output::print_success(&format!(
        "Rewrote {} derived-moduli files",
        report.moduli_files.len()
    ));

    let failed = report.points.len() - report.completed();
    if failed > 0 {
        output::print_warning(&format!(
            "{} of {} temperatures did not complete",
            failed,
            report.points.len()
        ));
    } else {
        output::print_done(&format!("All {} temperatures completed", report.points.len()));
    }
}
