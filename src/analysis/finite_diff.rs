//! # 有限差分弹性常数
//!
//! 由形变前后两个已平均的快照计算 `C = -(Δp) / ε × 1e-4`：
//!
//! | 常数 | 未拆分          | 拆分子运行            |
//! |------|-----------------|-----------------------|
//! | C11  | pxx / ε(lx)     | x: pxx / ε(lx)        |
//! | C12  | pyy / ε(lx)     | y: pxx / ε(ly)        |
//! | C44  | p<剪切> / γ     | 剪切: p<剪切> / γ     |
//!
//! 其中 `ε(l) = (l - l₀) / l₀`，`γ = (t - t₀) / L₀`（倾斜量相对参考盒长）。
//! 记录温度由调用方给出（形变窗口内温度的 Student-t 位置参数），
//! 与快照所用的平均方法无关。
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `analysis/estimators.rs` 的 `AveragedBlock`

use super::estimators::AveragedBlock;
use super::{AxisResult, BAR_TO_GPA};
use crate::error::{ElasticError, Result};
use crate::models::{DeformationAxis, ElasticConstantSet, ShearPair, ThermoVar};

/// 一行已平均的变量值
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Vec<(ThermoVar, Option<f64>)>,
}

impl Snapshot {
    pub fn new(values: Vec<(ThermoVar, Option<f64>)>) -> Self {
        Snapshot { values }
    }

    /// 取变量值；平均块中没有该变量为错误，值无定义返回 `None`
    pub fn get(&self, var: ThermoVar) -> Result<Option<f64>> {
        self.values
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, value)| *value)
            .ok_or_else(|| ElasticError::MissingAveragedVariable {
                variable: var.to_string(),
            })
    }
}

/// 从平均块中取首末快照：倒数第 `snapshot_rows` 行与最后一行
pub fn snapshots(block: &AveragedBlock, snapshot_rows: usize) -> Result<(Snapshot, Snapshot)> {
    let rows = block.rows.len();
    if snapshot_rows < 2 || rows < snapshot_rows {
        return Err(ElasticError::InsufficientData {
            what: "before/after snapshots".to_string(),
            needed: snapshot_rows.max(2),
            got: rows,
        });
    }
    let pick = |row: &Vec<Option<f64>>| {
        Snapshot::new(block.variables.iter().copied().zip(row.iter().copied()).collect())
    };
    Ok((pick(&block.rows[rows - snapshot_rows]), pick(&block.rows[rows - 1])))
}

/// 计算一个运行（或子运行）负责的常数
pub fn finite_difference(
    initial: &Snapshot,
    final_: &Snapshot,
    temperature: f64,
    axis: DeformationAxis,
    shear: ShearPair,
) -> Result<AxisResult> {
    let diff = Diff { initial, final_ };
    let mut constants = ElasticConstantSet::default();

    match axis {
        DeformationAxis::Unsplit => {
            let ex = diff.axial_strain(ThermoVar::Lx)?;
            constants.c11 = diff.constant(ThermoVar::Pxx, ex)?;
            constants.c12 = diff.constant(ThermoVar::Pyy, ex)?;
            constants.c44 = diff.constant(shear.stress(), diff.shear_strain(shear)?)?;
        }
        DeformationAxis::X => {
            constants.c11 = diff.constant(ThermoVar::Pxx, diff.axial_strain(ThermoVar::Lx)?)?;
        }
        DeformationAxis::Y => {
            constants.c12 = diff.constant(ThermoVar::Pxx, diff.axial_strain(ThermoVar::Ly)?)?;
        }
        DeformationAxis::Shear(pair) => {
            constants.c44 = diff.constant(pair.stress(), diff.shear_strain(pair)?)?;
        }
    }

    Ok(AxisResult {
        axis,
        temperature,
        constants,
    })
}

struct Diff<'a> {
    initial: &'a Snapshot,
    final_: &'a Snapshot,
}

impl Diff<'_> {
    fn pair(&self, var: ThermoVar) -> Result<Option<(f64, f64)>> {
        Ok(self.initial.get(var)?.zip(self.final_.get(var)?))
    }

    fn axial_strain(&self, length: ThermoVar) -> Result<Option<f64>> {
        Ok(self
            .pair(length)?
            .and_then(|(l0, l)| (l0 != 0.0).then(|| (l - l0) / l0)))
    }

    fn shear_strain(&self, pair: ShearPair) -> Result<Option<f64>> {
        let tilt = self.pair(pair.tilt())?;
        let len0 = self.initial.get(pair.length())?;
        Ok(tilt
            .zip(len0)
            .and_then(|((t0, t), l0)| (l0 != 0.0).then(|| (t - t0) / l0)))
    }

    fn constant(&self, stress: ThermoVar, strain: Option<f64>) -> Result<Option<f64>> {
        let p = self.pair(stress)?;
        Ok(p.zip(strain).and_then(|((p0, p), e)| {
            let c = -(p - p0) / e * BAR_TO_GPA;
            c.is_finite().then_some(c)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(values: &[(ThermoVar, f64)]) -> Snapshot {
        Snapshot::new(values.iter().map(|&(v, x)| (v, Some(x))).collect())
    }

    #[test]
    fn test_unsplit_constants() {
        let initial = snap(&[
            (ThermoVar::Temp, 299.0),
            (ThermoVar::Pxx, 10.0),
            (ThermoVar::Pyy, 5.0),
            (ThermoVar::Pyz, 0.0),
            (ThermoVar::Lx, 20.0),
            (ThermoVar::Lz, 20.0),
            (ThermoVar::Yz, 0.0),
        ]);
        let final_ = snap(&[
            (ThermoVar::Temp, 301.0),
            (ThermoVar::Pxx, -2490.0),
            (ThermoVar::Pyy, -1495.0),
            (ThermoVar::Pyz, -1200.0),
            (ThermoVar::Lx, 20.2),
            (ThermoVar::Lz, 20.0),
            (ThermoVar::Yz, 0.2),
        ]);
        let r = finite_difference(&initial, &final_, 301.0, DeformationAxis::Unsplit, ShearPair::Yz)
            .unwrap();
        assert_eq!(r.temperature, 301.0);
        assert!((r.constants.c11.unwrap() - 25.0).abs() < 1e-9);
        assert!((r.constants.c12.unwrap() - 15.0).abs() < 1e-9);
        assert!((r.constants.c44.unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_y_pairs_pxx_with_ly() {
        let initial = snap(&[(ThermoVar::Temp, 300.0), (ThermoVar::Pxx, 0.0), (ThermoVar::Ly, 10.0)]);
        let final_ = snap(&[(ThermoVar::Temp, 300.0), (ThermoVar::Pxx, -1500.0), (ThermoVar::Ly, 10.1)]);
        let r = finite_difference(&initial, &final_, 300.0, DeformationAxis::Y, ShearPair::Yz).unwrap();
        assert!((r.constants.c12.unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(r.constants.c11, None);
        assert_eq!(r.constants.c44, None);
    }

    #[test]
    fn test_zero_strain_is_undefined() {
        let s = snap(&[(ThermoVar::Temp, 300.0), (ThermoVar::Pxx, 1.0), (ThermoVar::Lx, 10.0)]);
        let r = finite_difference(&s, &s, 300.0, DeformationAxis::X, ShearPair::Yz).unwrap();
        assert_eq!(r.constants.c11, None);
    }

    #[test]
    fn test_missing_averaged_variable() {
        let s = snap(&[(ThermoVar::Temp, 300.0), (ThermoVar::Lx, 10.0)]);
        assert!(matches!(
            finite_difference(&s, &s, 300.0, DeformationAxis::X, ShearPair::Yz),
            Err(ElasticError::MissingAveragedVariable { variable }) if variable == "pxx"
        ));
    }

    #[test]
    fn test_snapshot_selection() {
        let block = AveragedBlock {
            variables: vec![ThermoVar::Temp],
            rows: vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]],
        };
        let (a, b) = snapshots(&block, 2).unwrap();
        assert_eq!(a.get(ThermoVar::Temp).unwrap(), Some(2.0));
        assert_eq!(b.get(ThermoVar::Temp).unwrap(), Some(3.0));
        let (a, _) = snapshots(&block, 3).unwrap();
        assert_eq!(a.get(ThermoVar::Temp).unwrap(), Some(1.0));
        assert!(snapshots(&block, 4).is_err());
    }
}
