//! # 热力学时间序列数据模型
//!
//! `ThermoVar` 是 LAMMPS thermo 输出量的强类型标识，`ThermoTable` 以列存储
//! 一次模拟运行的逐步采样。所有列长度相同，构造时即校验，后续按变量取列
//! 时若缺列则返回 `MissingColumn` 错误。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/`, `sweep/` 使用
//! - 使用 `error.rs`

use crate::error::{ElasticError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// thermo 输出变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ThermoVar {
    Step,
    Temp,
    Press,
    KinEng,
    PotEng,
    Pxx,
    Pyy,
    Pzz,
    Pxy,
    Pxz,
    Pyz,
    Lx,
    Ly,
    Lz,
    Xy,
    Xz,
    Yz,
}

impl ThermoVar {
    /// 结果文件中使用的短名称
    pub fn name(self) -> &'static str {
        match self {
            ThermoVar::Step => "Step",
            ThermoVar::Temp => "T",
            ThermoVar::Press => "p",
            ThermoVar::KinEng => "ke",
            ThermoVar::PotEng => "pe",
            ThermoVar::Pxx => "pxx",
            ThermoVar::Pyy => "pyy",
            ThermoVar::Pzz => "pzz",
            ThermoVar::Pxy => "pxy",
            ThermoVar::Pxz => "pxz",
            ThermoVar::Pyz => "pyz",
            ThermoVar::Lx => "lx",
            ThermoVar::Ly => "ly",
            ThermoVar::Lz => "lz",
            ThermoVar::Xy => "xy",
            ThermoVar::Xz => "xz",
            ThermoVar::Yz => "yz",
        }
    }
}

impl std::fmt::Display for ThermoVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ThermoVar {
    type Err = ElasticError;

    /// 同时接受短名称和 LAMMPS thermo 表头关键字（大小写不敏感）
    fn from_str(s: &str) -> Result<Self> {
        let var = match s.trim().to_lowercase().as_str() {
            "step" => ThermoVar::Step,
            "t" | "temp" => ThermoVar::Temp,
            "p" | "press" => ThermoVar::Press,
            "ke" | "kineng" => ThermoVar::KinEng,
            "pe" | "poteng" => ThermoVar::PotEng,
            "pxx" => ThermoVar::Pxx,
            "pyy" => ThermoVar::Pyy,
            "pzz" => ThermoVar::Pzz,
            "pxy" => ThermoVar::Pxy,
            "pxz" => ThermoVar::Pxz,
            "pyz" => ThermoVar::Pyz,
            "lx" => ThermoVar::Lx,
            "ly" => ThermoVar::Ly,
            "lz" => ThermoVar::Lz,
            "xy" => ThermoVar::Xy,
            "xz" => ThermoVar::Xz,
            "yz" => ThermoVar::Yz,
            _ => return Err(ElasticError::UnknownVariable(s.to_string())),
        };
        Ok(var)
    }
}

impl TryFrom<String> for ThermoVar {
    type Error = ElasticError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ThermoVar> for String {
    fn from(var: ThermoVar) -> Self {
        var.name().to_string()
    }
}

/// 一次模拟运行的列式时间序列
#[derive(Debug, Clone, Default)]
pub struct ThermoTable {
    columns: BTreeMap<ThermoVar, Vec<f64>>,
    len: usize,
}

impl ThermoTable {
    /// 按 schema 从行数据构造
    pub fn from_rows(schema: &[ThermoVar], rows: &[Vec<f64>]) -> Result<Self> {
        let mut columns: BTreeMap<ThermoVar, Vec<f64>> = schema
            .iter()
            .map(|&v| (v, Vec::with_capacity(rows.len())))
            .collect();

        if columns.len() != schema.len() {
            return Err(ElasticError::InvalidArgument(
                "thermo schema lists a variable more than once".to_string(),
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(ElasticError::InvalidArgument(format!(
                    "row {} has {} values, schema has {} columns",
                    i + 1,
                    row.len(),
                    schema.len()
                )));
            }
            for (var, value) in schema.iter().zip(row) {
                if let Some(col) = columns.get_mut(var) {
                    col.push(*value);
                }
            }
        }

        Ok(ThermoTable {
            columns,
            len: rows.len(),
        })
    }

    /// 从列构造，所有列长度必须一致
    pub fn from_columns(columns: Vec<(ThermoVar, Vec<f64>)>) -> Result<Self> {
        let len = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut map = BTreeMap::new();
        for (var, col) in columns {
            if col.len() != len {
                return Err(ElasticError::InvalidArgument(format!(
                    "column '{}' has {} samples, expected {}",
                    var,
                    col.len(),
                    len
                )));
            }
            map.insert(var, col);
        }
        Ok(ThermoTable { columns: map, len })
    }

    /// 采样步数 `nd`
    pub fn len(&self) -> usize {
        self.len
    }

    /// 取一列
    pub fn column(&self, var: ThermoVar) -> Result<&[f64]> {
        self.columns
            .get(&var)
            .map(|c| c.as_slice())
            .ok_or_else(|| ElasticError::MissingColumn {
                variable: var.to_string(),
            })
    }

    /// 校验所有必需变量都存在
    pub fn require(&self, vars: &[ThermoVar]) -> Result<()> {
        for &var in vars {
            self.column(var)?;
        }
        Ok(())
    }
}
