//! # 数据表与阶段边界文件
//!
//! - `data_out.txt`: 空白分隔的纯数字表，每行一个采样步，列顺序即 thermo schema
//! - `log.out`: 一行空白分隔的累计边界 `0 n1 n1+n2 ...`
//!
//! 两者由 `collect` 从 log.lammps 生成，也可由外部脚本提供。
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `models/thermo.rs`, `models/stage.rs`

use crate::error::{ElasticError, Result};
use crate::models::{StageIndex, ThermoTable, ThermoVar};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 读取数值表
pub fn read_table(path: &Path, schema: &[ThermoVar]) -> Result<ThermoTable> {
    if !path.exists() {
        return Err(ElasticError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
    let fail = |reason: String| ElasticError::ParseError {
        format: "data table".to_string(),
        path: path.display().to_string(),
        reason,
    };

    let mut rows = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row: Vec<f64> = line
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| fail(format!("line {}: {}", line_no + 1, e)))?;
        if row.len() != schema.len() {
            return Err(fail(format!(
                "line {} has {} columns, thermo schema has {}",
                line_no + 1,
                row.len(),
                schema.len()
            )));
        }
        rows.push(row);
    }

    ThermoTable::from_rows(schema, &rows)
}

/// 写出数值表
pub fn write_table(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    let file = File::create(path).map_err(|e| ElasticError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(writer, "{}", line.join(" ")).map_err(|e| ElasticError::write(path, e))?;
    }
    writer.flush().map_err(|e| ElasticError::write(path, e))
}

/// 读取阶段边界
pub fn read_stages(path: &Path) -> Result<StageIndex> {
    if !path.exists() {
        return Err(ElasticError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
    let boundaries = content
        .split_whitespace()
        .map(|t| {
            // 外部脚本可能写成 200000.0
            t.parse::<usize>().or_else(|_| {
                t.parse::<f64>()
                    .ok()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as usize)
                    .ok_or_else(|| ElasticError::ParseError {
                        format: "stage boundaries".to_string(),
                        path: path.display().to_string(),
                        reason: format!("'{}' is not a row index", t),
                    })
            })
        })
        .collect::<Result<Vec<_>>>()?;

    StageIndex::new(boundaries)
}

/// 写出阶段边界
pub fn write_stages(path: &Path, boundaries: &[usize]) -> Result<()> {
    let line: Vec<String> = boundaries.iter().map(|b| b.to_string()).collect();
    fs::write(path, format!("{}\n", line.join(" "))).map_err(|e| ElasticError::write(path, e))
}
