//! # 应力-应变斜率拟合
//!
//! 在形变窗口内对 (应变, -应力) 做线性回归，斜率乘以 bar → GPa 换算因子
//! 即为弹性常数。
//!
//! - 轴向应变 `ε = (l - l₀) / l₀`，`l₀` 为制备窗口内盒长的 Student-t 位置参数
//! - 剪切应变 `γ = (t - t₀) / L₀`，`t` 为倾斜量，`L₀` 为垂直方向参考盒长；
//!   拟合前取 `γ / 2`
//! - 记录温度为形变窗口内温度的 Student-t 位置参数
//!
//! 流程分两步：`DeformationSeries::prepare` 完成参考量与温度的归约，
//! `DeformationSeries::fit` 完成回归。
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `analysis/regression.rs`, `analysis/student_t.rs`

use super::regression::linear_fit;
use super::student_t::fit_student_t;
use super::{AxisResult, BAR_TO_GPA};
use crate::error::{ElasticError, Result};
use crate::models::{DeformationAxis, ElasticConstantSet, ShearPair, ThermoTable, ThermoVar, Windows};

/// 一条应力-应变序列
#[derive(Debug, Clone)]
struct StrainSeries {
    strain: Vec<f64>,
    neg_stress: Vec<f64>,
}

/// 已归约、待回归的形变窗口
#[derive(Debug, Clone)]
pub struct DeformationSeries {
    pub axis: DeformationAxis,
    /// 形变窗口内测得温度
    pub temperature: f64,
    c11: Option<StrainSeries>,
    c12: Option<StrainSeries>,
    c44: Option<StrainSeries>,
}

impl DeformationSeries {
    /// 计算参考盒长、温度与应变序列
    pub fn prepare(
        table: &ThermoTable,
        windows: &Windows,
        axis: DeformationAxis,
        shear: ShearPair,
    ) -> Result<Self> {
        let temperature = deformation_temperature(table, windows)?;

        let reduce = Reducer { table, windows };
        let mut series = DeformationSeries {
            axis,
            temperature,
            c11: None,
            c12: None,
            c44: None,
        };

        match axis {
            DeformationAxis::Unsplit => {
                let ex = reduce.axial_strain(ThermoVar::Lx)?;
                series.c11 = Some(reduce.series(ex.clone(), ThermoVar::Pxx, 1.0)?);
                series.c12 = Some(reduce.series(ex, ThermoVar::Pyy, 1.0)?);
                let gamma = reduce.shear_strain(shear)?;
                series.c44 = Some(reduce.series(gamma, shear.stress(), 0.5)?);
            }
            DeformationAxis::X => {
                let ex = reduce.axial_strain(ThermoVar::Lx)?;
                series.c11 = Some(reduce.series(ex, ThermoVar::Pxx, 1.0)?);
            }
            DeformationAxis::Y => {
                let ey = reduce.axial_strain(ThermoVar::Ly)?;
                series.c12 = Some(reduce.series(ey, ThermoVar::Pxx, 1.0)?);
            }
            DeformationAxis::Shear(pair) => {
                let gamma = reduce.shear_strain(pair)?;
                series.c44 = Some(reduce.series(gamma, pair.stress(), 0.5)?);
            }
        }

        Ok(series)
    }

    /// 回归得到该轴负责的常数；退化回归给出无定义值
    pub fn fit(&self) -> Result<AxisResult> {
        Ok(AxisResult {
            axis: self.axis,
            temperature: self.temperature,
            constants: ElasticConstantSet {
                c11: fit_constant(self.c11.as_ref())?,
                c12: fit_constant(self.c12.as_ref())?,
                c44: fit_constant(self.c44.as_ref())?,
            },
        })
    }
}

/// 形变窗口内温度的 Student-t 位置参数，两种求解策略都以它作为记录温度
pub fn deformation_temperature(table: &ThermoTable, windows: &Windows) -> Result<f64> {
    windows.check_within(table.len())?;
    Ok(fit_student_t(&table.column(ThermoVar::Temp)?[windows.deformation.clone()])?.loc)
}

struct Reducer<'a> {
    table: &'a ThermoTable,
    windows: &'a Windows,
}

impl Reducer<'_> {
    fn reference(&self, var: ThermoVar) -> Result<f64> {
        let prep = &self.table.column(var)?[self.windows.preparation.clone()];
        Ok(fit_student_t(prep)?.loc)
    }

    fn deformation(&self, var: ThermoVar) -> Result<&[f64]> {
        Ok(&self.table.column(var)?[self.windows.deformation.clone()])
    }

    fn axial_strain(&self, length: ThermoVar) -> Result<Vec<f64>> {
        let l0 = self.reference(length)?;
        if l0 == 0.0 {
            return Err(ElasticError::DegenerateFit(format!(
                "reference {} is zero",
                length
            )));
        }
        Ok(self.deformation(length)?.iter().map(|l| (l - l0) / l0).collect())
    }

    fn shear_strain(&self, pair: ShearPair) -> Result<Vec<f64>> {
        let t0 = self.reference(pair.tilt())?;
        let len0 = self.reference(pair.length())?;
        if len0 == 0.0 {
            return Err(ElasticError::DegenerateFit(format!(
                "reference {} is zero",
                pair.length()
            )));
        }
        Ok(self.deformation(pair.tilt())?.iter().map(|t| (t - t0) / len0).collect())
    }

    fn series(&self, strain: Vec<f64>, stress: ThermoVar, factor: f64) -> Result<StrainSeries> {
        Ok(StrainSeries {
            strain: strain.into_iter().map(|e| factor * e).collect(),
            neg_stress: self.deformation(stress)?.iter().map(|p| -p).collect(),
        })
    }
}

fn fit_constant(series: Option<&StrainSeries>) -> Result<Option<f64>> {
    let Some(s) = series else {
        return Ok(None);
    };
    match linear_fit(&s.strain, &s.neg_stress) {
        Ok(fit) => Ok(Some(fit.slope * BAR_TO_GPA)),
        Err(ElasticError::DegenerateFit(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
