//! # 结果文件
//!
//! ## 弹性常数（res_CsFit.txt / res_Cs.txt）
//! 无表头的 CSV，每个温度一行 `T,C11,C12,C44`，单位 GPa，无定义值写作 `nan`。
//! 按扫描顺序逐行追加，已有内容按 `ExistingResults` 策略处理。
//!
//! ## 导出模量（resB.txt, resGV.txt, ...）
//! 每个模量一个文件，每行 `T,value`。每次都由完整的常数文件整体重写，
//! 因此与常数文件始终一一对应。
//!
//! ## 依赖关系
//! - 被 `sweep/`, `commands/moduli.rs`, `commands/plot.rs` 使用
//! - 使用 `csv` 库

use crate::error::{ElasticError, Result};
use crate::models::{format_value, ElasticConstantSet, ModuliSet, TemperaturePoint};

use clap::ValueEnum;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// 结果文件已有内容时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExistingResults {
    /// Stop if the result file already has rows
    #[default]
    Refuse,
    /// Keep old rows and append new ones
    Append,
    /// Truncate the result file first
    Overwrite,
}

/// 常数文件中的一行
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantsRow {
    pub temperature: f64,
    pub constants: ElasticConstantSet,
}

impl From<&TemperaturePoint> for ConstantsRow {
    fn from(point: &TemperaturePoint) -> Self {
        ConstantsRow {
            temperature: point.temperature,
            constants: point.constants,
        }
    }
}

/// 导出模量文件名及取值
pub const MODULI_FILES: [(&str, fn(&ModuliSet) -> Option<f64>); 7] = [
    ("resB.txt", |m: &ModuliSet| m.bulk),
    ("resGV.txt", |m: &ModuliSet| m.shear_voigt),
    ("resGR.txt", |m: &ModuliSet| m.shear_reuss),
    ("resEV.txt", |m: &ModuliSet| m.young_voigt),
    ("resER.txt", |m: &ModuliSet| m.young_reuss),
    ("resnuV.txt", |m: &ModuliSet| m.poisson_voigt),
    ("resnuR.txt", |m: &ModuliSet| m.poisson_reuss),
];

/// 统计已有的数据行，文件不存在时为 0
pub fn count_rows(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
    Ok(content.lines().filter(|l| !l.trim().is_empty()).count())
}

/// 按策略处理已有的常数文件，返回保留下来的行数
pub fn prepare_constants_file(path: &Path, policy: ExistingResults) -> Result<usize> {
    let rows = count_rows(path)?;
    if rows == 0 {
        return Ok(0);
    }
    match policy {
        ExistingResults::Refuse => Err(ElasticError::ResultsExist {
            path: path.display().to_string(),
            rows,
        }),
        ExistingResults::Append => Ok(rows),
        ExistingResults::Overwrite => {
            fs::write(path, "").map_err(|e| ElasticError::write(path, e))?;
            Ok(0)
        }
    }
}

/// 追加常数行
pub fn append_constants(path: &Path, rows: &[ConstantsRow]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ElasticError::write(path, e))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    for row in rows {
        wtr.write_record(&[
            row.temperature.to_string(),
            format_value(row.constants.c11),
            format_value(row.constants.c12),
            format_value(row.constants.c44),
        ])?;
    }

    wtr.flush().map_err(|e| ElasticError::write(path, e))
}

/// 读取常数文件
pub fn read_constants(path: &Path) -> Result<Vec<ConstantsRow>> {
    if !path.exists() {
        return Err(ElasticError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let fail = |line: usize, reason: String| ElasticError::ParseError {
        format: "elastic constants".to_string(),
        path: path.display().to_string(),
        reason: format!("row {}: {}", line, reason),
    };

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != 4 {
            return Err(fail(i + 1, format!("expected 4 fields, got {}", record.len())));
        }
        let values = record
            .iter()
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| fail(i + 1, e.to_string()))?;
        let defined = |v: f64| v.is_finite().then_some(v);
        rows.push(ConstantsRow {
            temperature: values[0],
            constants: ElasticConstantSet {
                c11: defined(values[1]),
                c12: defined(values[2]),
                c44: defined(values[3]),
            },
        });
    }
    Ok(rows)
}

/// 整体重写七个模量文件
pub fn write_moduli(dir: &Path, rows: &[(f64, ModuliSet)]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(MODULI_FILES.len());
    for (name, pick) in MODULI_FILES {
        let path = dir.join(name);
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        for (t, moduli) in rows {
            wtr.write_record(&[t.to_string(), format_value(pick(moduli))])?;
        }
        wtr.flush().map_err(|e| ElasticError::write(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(t: f64, c: ElasticConstantSet) -> ConstantsRow {
        ConstantsRow {
            temperature: t,
            constants: c,
        }
    }

    #[test]
    fn test_constants_append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res_CsFit.txt");
        append_constants(&path, &[row(300.5, ElasticConstantSet::new(250.0, 150.0, 120.0))])
            .unwrap();
        append_constants(
            &path,
            &[row(
                400.0,
                ElasticConstantSet {
                    c11: Some(240.0),
                    c12: Some(148.0),
                    c44: None,
                },
            )],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "300.5,250,150,120\n400,240,148,nan\n");

        let rows = read_constants(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].constants.c44, None);
        assert_eq!(rows[0].constants.c11, Some(250.0));
    }

    #[test]
    fn test_existing_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res_Cs.txt");
        assert_eq!(prepare_constants_file(&path, ExistingResults::Refuse).unwrap(), 0);

        append_constants(&path, &[row(300.0, ElasticConstantSet::new(1.0, 2.0, 3.0))]).unwrap();
        assert!(matches!(
            prepare_constants_file(&path, ExistingResults::Refuse),
            Err(ElasticError::ResultsExist { rows: 1, .. })
        ));
        assert_eq!(prepare_constants_file(&path, ExistingResults::Append).unwrap(), 1);
        assert_eq!(prepare_constants_file(&path, ExistingResults::Overwrite).unwrap(), 0);
        assert_eq!(count_rows(&path).unwrap(), 0);
    }

    #[test]
    fn test_moduli_files_rewritten() {
        let dir = tempdir().unwrap();
        let m = ModuliSet {
            bulk: Some(150.0),
            shear_reuss: None,
            ..Default::default()
        };
        write_moduli(dir.path(), &[(300.0, m), (400.0, m)]).unwrap();
        let written = write_moduli(dir.path(), &[(300.0, m)]).unwrap();
        assert_eq!(written.len(), 7);

        let b = fs::read_to_string(dir.path().join("resB.txt")).unwrap();
        assert_eq!(b, "300,150\n");
        let gr = fs::read_to_string(dir.path().join("resGR.txt")).unwrap();
        assert_eq!(gr, "300,nan\n");
    }

    #[test]
    fn test_malformed_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res_Cs.txt");
        fs::write(&path, "300,1,2\n").unwrap();
        assert!(read_constants(&path).is_err());
    }
}
