//! # 弹性常数数据模型
//!
//! 形变拓扑、剪切配对、弹性常数集合与导出模量集合。
//! 数值单位均为 GPa；`None` 表示该值因退化（零分母）而无定义。
//!
//! ## 依赖关系
//! - 被 `analysis/`, `parsers/results.rs`, `sweep/` 使用
//! - 使用 `models/thermo.rs`

use super::thermo::ThermoVar;
use serde::{Deserialize, Serialize};

/// 运行拓扑：一次运行包含全部形变，或按轴拆成三个子运行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Unsplit,
    Split,
}

/// 剪切应力/倾斜量配对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShearPair {
    #[default]
    Xy,
    Yz,
}

impl ShearPair {
    /// 剪切应力列
    pub fn stress(self) -> ThermoVar {
        match self {
            ShearPair::Xy => ThermoVar::Pxy,
            ShearPair::Yz => ThermoVar::Pyz,
        }
    }

    /// 倾斜量列
    pub fn tilt(self) -> ThermoVar {
        match self {
            ShearPair::Xy => ThermoVar::Xy,
            ShearPair::Yz => ThermoVar::Yz,
        }
    }

    /// 倾斜方向的参考长度列
    pub fn length(self) -> ThermoVar {
        match self {
            ShearPair::Xy => ThermoVar::Ly,
            ShearPair::Yz => ThermoVar::Lz,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShearPair::Xy => "xy",
            ShearPair::Yz => "yz",
        }
    }
}

/// 一个子运行驱动的应变分量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeformationAxis {
    Unsplit,
    X,
    Y,
    Shear(ShearPair),
}

impl DeformationAxis {
    /// 拆分拓扑下的三个轴，按 {x, y, shear} 顺序
    pub fn split_axes(shear: ShearPair) -> [DeformationAxis; 3] {
        [
            DeformationAxis::X,
            DeformationAxis::Y,
            DeformationAxis::Shear(shear),
        ]
    }

    /// 子目录名；未拆分时为 `None`
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            DeformationAxis::Unsplit => None,
            DeformationAxis::X => Some("x"),
            DeformationAxis::Y => Some("y"),
            DeformationAxis::Shear(pair) => Some(pair.name()),
        }
    }
}

impl std::fmt::Display for DeformationAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subdir().unwrap_or("unsplit"))
    }
}

/// (C11, C12, C44)，GPa
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElasticConstantSet {
    pub c11: Option<f64>,
    pub c12: Option<f64>,
    pub c44: Option<f64>,
}

impl ElasticConstantSet {
    #[cfg(test)]
    pub fn new(c11: f64, c12: f64, c44: f64) -> Self {
        ElasticConstantSet {
            c11: Some(c11),
            c12: Some(c12),
            c44: Some(c44),
        }
    }
}

/// 导出模量，GPa（泊松比无量纲）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModuliSet {
    pub bulk: Option<f64>,
    pub shear_voigt: Option<f64>,
    pub shear_reuss: Option<f64>,
    pub young_voigt: Option<f64>,
    pub young_reuss: Option<f64>,
    pub poisson_voigt: Option<f64>,
    pub poisson_reuss: Option<f64>,
}

/// 一个温度点的最终结果
#[derive(Debug, Clone, PartialEq)]
pub struct TemperaturePoint {
    /// 运行目录使用的名义温度
    pub label: String,
    /// 形变窗口内测得的温度
    pub temperature: f64,
    pub constants: ElasticConstantSet,
}

/// 把可能无定义的值格式化为结果文件字段
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => "nan".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_pair_columns() {
        assert_eq!(ShearPair::Xy.stress(), ThermoVar::Pxy);
        assert_eq!(ShearPair::Xy.length(), ThermoVar::Ly);
        assert_eq!(ShearPair::Yz.tilt(), ThermoVar::Yz);
        assert_eq!(ShearPair::Yz.length(), ThermoVar::Lz);
    }

    #[test]
    fn test_split_axes_order() {
        let names: Vec<_> = DeformationAxis::split_axes(ShearPair::Yz)
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(names, vec!["x", "y", "yz"]);
        assert_eq!(DeformationAxis::Unsplit.subdir(), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "nan");
        assert_eq!(format_value(Some(f64::INFINITY)), "nan");
        assert_eq!(format_value(Some(10.0)), "10");
        assert_eq!(format_value(Some(-0.25)), "-0.25");
    }
}
