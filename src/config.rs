//! # 温度扫描配置
//!
//! 从 TOML 文件读取一次温度扫描的全部参数。
//!
//! ## 示例
//! ```toml
//! root = "RES_2015-05-28"
//! temperatures = ["0.5", "323.15", "373.15"]
//! topology = "unsplit"          # 或 "split"
//! shear = "xy"                  # 或 "yz"
//! thermo = ["Step", "T", "p", "ke", "pe", "pxx", "pyy", "pzz",
//!           "pxy", "pxz", "pyz", "lx", "ly", "lz", "xy", "xz", "yz"]
//! variables = ["T", "pxx", "pyy", "pxy", "lx", "ly", "xy"]
//!
//! [averaging]
//! method = "distribution"       # simple | moving | distribution
//! window = 2000
//!
//! [windows]                     # 可选，缺省时由阶段边界推出
//! preparation = [2, 200000]
//! deformation = [200000, 400000]
//!
//! [constants]
//! snapshot_rows = 2
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/`, `sweep/` 使用
//! - 使用 `serde` + `toml`

use crate::analysis::{DistributionFit, Estimator, MovingAverage, SimpleMean};
use crate::error::{ElasticError, Result};
use crate::models::{DeformationAxis, ShearPair, StageIndex, ThermoVar, Topology, Windows};

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 分阶段平均方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AveragingMethod {
    /// Arithmetic mean of every stage
    Simple,
    /// Mean of the moving average (valid positions only)
    Moving,
    /// Location of a Student-t maximum-likelihood fit
    #[default]
    Distribution,
}

impl std::fmt::Display for AveragingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AveragingMethod::Simple => write!(f, "simple"),
            AveragingMethod::Moving => write!(f, "moving"),
            AveragingMethod::Distribution => write!(f, "distribution"),
        }
    }
}

/// `[averaging]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AveragingConfig {
    pub method: AveragingMethod,
    pub window: usize,
}

impl Default for AveragingConfig {
    fn default() -> Self {
        AveragingConfig {
            method: AveragingMethod::default(),
            window: 2000,
        }
    }
}

impl AveragingConfig {
    pub fn estimator(&self) -> Box<dyn Estimator> {
        match self.method {
            AveragingMethod::Simple => Box::new(SimpleMean),
            AveragingMethod::Moving => Box::new(MovingAverage {
                window: self.window,
            }),
            AveragingMethod::Distribution => Box::new(DistributionFit),
        }
    }
}

/// `[windows]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsConfig {
    pub preparation: Option<[usize; 2]>,
    pub deformation: Option<[usize; 2]>,
}

/// `[constants]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstantsConfig {
    pub snapshot_rows: usize,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        ConstantsConfig { snapshot_rows: 2 }
    }
}

/// `[files]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileNames {
    pub log: String,
    pub data: String,
    pub stages: String,
    pub averaged: String,
    pub slope_results: String,
    pub difference_results: String,
}

impl Default for FileNames {
    fn default() -> Self {
        FileNames {
            log: "log.lammps".to_string(),
            data: "data_out.txt".to_string(),
            stages: "log.out".to_string(),
            averaged: "av_res.txt".to_string(),
            slope_results: "res_CsFit.txt".to_string(),
            difference_results: "res_Cs.txt".to_string(),
        }
    }
}

fn default_variables() -> Vec<ThermoVar> {
    vec![
        ThermoVar::Temp,
        ThermoVar::Pxx,
        ThermoVar::Pyy,
        ThermoVar::Pxy,
        ThermoVar::Lx,
        ThermoVar::Ly,
        ThermoVar::Xy,
    ]
}

/// 一次温度扫描
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    pub root: PathBuf,
    pub temperatures: Vec<String>,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub shear: ShearPair,
    pub thermo: Vec<ThermoVar>,
    #[serde(default = "default_variables")]
    pub variables: Vec<ThermoVar>,
    #[serde(default)]
    pub averaging: AveragingConfig,
    #[serde(default)]
    pub windows: WindowsConfig,
    #[serde(default)]
    pub constants: ConstantsConfig,
    #[serde(default)]
    pub files: FileNames,
}

impl SweepConfig {
    /// 读取并校验配置；相对 `root` 以配置文件所在目录为基准
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
        let mut config = Self::from_toml(&content).map_err(|e| match e {
            ElasticError::ConfigError { reason, .. } => ElasticError::ConfigError {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    /// 从 TOML 文本解析
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SweepConfig = toml::from_str(content).map_err(|e| ElasticError::ConfigError {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| ElasticError::ConfigError {
            path: "<inline>".to_string(),
            reason,
        };

        if self.temperatures.is_empty() {
            return Err(fail("'temperatures' is empty".to_string()));
        }
        if self.thermo.is_empty() {
            return Err(fail("'thermo' schema is empty".to_string()));
        }
        if let Some(var) = self.variables.iter().find(|v| !self.thermo.contains(v)) {
            return Err(fail(format!(
                "averaged variable '{}' is not part of the thermo schema",
                var
            )));
        }
        let missing = self.missing_difference_variables();
        if !missing.is_empty() {
            return Err(fail(format!(
                "'variables' lacks {} needed for finite differences (shear = \"{}\")",
                missing.join(", "),
                self.shear.name()
            )));
        }
        if self.averaging.method == AveragingMethod::Moving && self.averaging.window == 0 {
            return Err(fail("moving-average window must be at least 1".to_string()));
        }
        if self.windows.preparation.is_some() != self.windows.deformation.is_some() {
            return Err(fail(
                "[windows] needs both 'preparation' and 'deformation'".to_string(),
            ));
        }
        Ok(())
    }

    /// 有限差分法要求 av_res.txt 含有、但 `variables` 中缺少的变量
    fn missing_difference_variables(&self) -> Vec<String> {
        let needed = [
            ThermoVar::Temp,
            ThermoVar::Pxx,
            ThermoVar::Pyy,
            ThermoVar::Lx,
            ThermoVar::Ly,
            self.shear.stress(),
            self.shear.tilt(),
            self.shear.length(),
        ];
        let mut missing: Vec<String> = Vec::new();
        for var in needed {
            let name = var.to_string();
            if !self.variables.contains(&var) && !missing.contains(&name) {
                missing.push(name);
            }
        }
        missing
    }

    /// 某温度的运行目录
    pub fn temperature_dir(&self, label: &str) -> PathBuf {
        self.root.join(format!("T_{}", label))
    }

    /// 某温度需要处理的全部运行目录，按 {x, y, 剪切} 顺序
    pub fn run_dirs(&self, label: &str) -> Vec<(DeformationAxis, PathBuf)> {
        let base = self.temperature_dir(label);
        match self.topology {
            Topology::Unsplit => vec![(DeformationAxis::Unsplit, base)],
            Topology::Split => DeformationAxis::split_axes(self.shear)
                .into_iter()
                .map(|axis| {
                    let dir = match axis.subdir() {
                        Some(sub) => base.join(sub),
                        None => base.clone(),
                    };
                    (axis, dir)
                })
                .collect(),
        }
    }

    /// 整个扫描的全部运行目录
    pub fn all_run_dirs(&self) -> Vec<(String, DeformationAxis, PathBuf)> {
        self.temperatures
            .iter()
            .flat_map(|label| {
                self.run_dirs(label)
                    .into_iter()
                    .map(move |(axis, dir)| (label.clone(), axis, dir))
            })
            .collect()
    }

    /// 制备/形变窗口：显式配置优先，否则由阶段边界推出
    pub fn windows_for(&self, stages: &StageIndex) -> Result<Windows> {
        match (self.windows.preparation, self.windows.deformation) {
            (Some([p0, p1]), Some([d0, d1])) => Ok(Windows {
                preparation: p0..p1,
                deformation: d0..d1,
            }),
            _ => Windows::from_stages(stages),
        }
    }

    /// 斜率法结果文件
    pub fn slope_results_path(&self) -> PathBuf {
        self.root.join(&self.files.slope_results)
    }

    /// 有限差分法结果文件
    pub fn difference_results_path(&self) -> PathBuf {
        self.root.join(&self.files.difference_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
root = "RES"
temperatures = ["0.5", "323.15"]
thermo = ["Step", "T", "pxx", "pyy", "pxy", "lx", "ly", "xy"]
"#;

    #[test]
    fn test_defaults() {
        let cfg = SweepConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.topology, Topology::Unsplit);
        assert_eq!(cfg.averaging.method, AveragingMethod::Distribution);
        assert_eq!(cfg.averaging.window, 2000);
        assert_eq!(cfg.constants.snapshot_rows, 2);
        assert_eq!(cfg.files.averaged, "av_res.txt");
        assert_eq!(cfg.variables.len(), 7);
        assert_eq!(cfg.temperature_dir("0.5"), PathBuf::from("RES/T_0.5"));
    }

    #[test]
    fn test_split_run_dirs() {
        let toml = format!("{}\ntopology = \"split\"\n", MINIMAL);
        let cfg = SweepConfig::from_toml(&toml).unwrap();
        let dirs = cfg.run_dirs("300");
        let names: Vec<_> = dirs.iter().map(|(_, d)| d.clone()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("RES/T_300/x"),
                PathBuf::from("RES/T_300/y"),
                PathBuf::from("RES/T_300/xy"),
            ]
        );
        assert_eq!(cfg.all_run_dirs().len(), 6);
    }

    #[test]
    fn test_full_parameter_block() {
        let toml = r#"
root = "RES_2015-05-28"
temperatures = ["0.5", "323.15", "373.15"]
thermo = ["Step", "T", "p", "ke", "pe", "pxx", "pyy", "pzz",
          "pxy", "pxz", "pyz", "lx", "ly", "lz", "xy", "xz", "yz"]
variables = ["T", "pxx", "pyy", "pxy", "lx", "ly", "xy"]

[averaging]
method = "moving"
window = 2000

[windows]
preparation = [2, 200000]
deformation = [200000, 400000]
"#;
        let cfg = SweepConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.shear, ShearPair::Xy);
        assert_eq!(cfg.shear.stress(), ThermoVar::Pxy);
        assert_eq!(cfg.thermo.len(), 17);
        assert_eq!(cfg.averaging.method, AveragingMethod::Moving);
    }

    #[test]
    fn test_rejects_variables_without_shear_pair() {
        let toml = format!(
            "{}\nshear = \"yz\"\n",
            MINIMAL.replace("\"xy\"]", "\"xy\", \"pyz\", \"lz\", \"yz\"]")
        );
        match SweepConfig::from_toml(&toml) {
            Err(ElasticError::ConfigError { reason, .. }) => {
                assert!(reason.contains("pyz, yz, lz"), "{}", reason);
            }
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_variable() {
        let toml = MINIMAL.replace("\"xy\"]", "\"volume\"]");
        assert!(SweepConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn test_rejects_variable_outside_schema() {
        let toml = format!("{}\nvariables = [\"T\", \"lz\"]\n", MINIMAL);
        assert!(matches!(
            SweepConfig::from_toml(&toml),
            Err(ElasticError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_explicit_windows() {
        let toml = format!(
            "{}\n[windows]\npreparation = [2, 200]\ndeformation = [200, 400]\n",
            MINIMAL
        );
        let cfg = SweepConfig::from_toml(&toml).unwrap();
        let stages = StageIndex::new(vec![0, 10]).unwrap();
        let w = cfg.windows_for(&stages).unwrap();
        assert_eq!(w.preparation, 2..200);
        assert_eq!(w.deformation, 200..400);
    }
}
