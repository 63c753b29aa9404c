//! # 分析模块
//!
//! 由时间序列到弹性常数与导出模量的全部数值计算。
//!
//! ## 依赖关系
//! - 被 `sweep/` 使用
//! - 使用 `models/`
//! - 子模块: estimators, student_t, regression, slope, finite_diff, moduli

pub mod estimators;
pub mod finite_diff;
pub mod moduli;
pub mod regression;
pub mod slope;
pub mod student_t;

use crate::error::{ElasticError, Result};
use crate::models::{DeformationAxis, ElasticConstantSet, TemperaturePoint};

pub use estimators::{
    reduce_stages, AveragedBlock, CellFailure, DistributionFit, Estimator, MovingAverage,
    SimpleMean,
};
pub use moduli::derive_moduli;

/// bar → GPa
pub const BAR_TO_GPA: f64 = 1.0e-4;

/// 单个运行（或拆分子运行）的求解结果
#[derive(Debug, Clone, PartialEq)]
pub struct AxisResult {
    pub axis: DeformationAxis,
    pub temperature: f64,
    /// 仅该轴负责的常数有值
    pub constants: ElasticConstantSet,
}

/// 把一个温度的全部轴结果合成 `TemperaturePoint`
///
/// 未拆分时只有一个结果；拆分时必须 x、y、剪切三轴齐全，
/// 温度取自 x 子运行。
pub fn assemble_point(label: &str, results: &[(DeformationAxis, Option<AxisResult>)]) -> Result<TemperaturePoint> {
    let missing: Vec<String> = results
        .iter()
        .filter(|(_, r)| r.is_none())
        .map(|(axis, _)| axis.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ElasticError::IncompleteAxisSet {
            temperature: label.to_string(),
            missing,
        });
    }

    let found: Vec<&AxisResult> = results.iter().filter_map(|(_, r)| r.as_ref()).collect();
    let lead = found
        .iter()
        .find(|r| matches!(r.axis, DeformationAxis::Unsplit | DeformationAxis::X))
        .or_else(|| found.first())
        .ok_or_else(|| ElasticError::IncompleteAxisSet {
            temperature: label.to_string(),
            missing: vec!["x".to_string()],
        })?;

    let mut constants = ElasticConstantSet::default();
    for r in &found {
        match r.axis {
            DeformationAxis::Unsplit => constants = r.constants,
            DeformationAxis::X => constants.c11 = r.constants.c11,
            DeformationAxis::Y => constants.c12 = r.constants.c12,
            DeformationAxis::Shear(_) => constants.c44 = r.constants.c44,
        }
    }

    Ok(TemperaturePoint {
        label: label.to_string(),
        temperature: lead.temperature,
        constants,
    })
}
