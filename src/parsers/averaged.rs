//! # av_res.txt 读写
//!
//! 每次平均追加一个块：一行变量名表头，随后每个阶段一行数值。
//! 无定义的格写作 `nan`。读取时只取最后一个块，重复平均不会覆盖旧结果。
//!
//! ```text
//! T   pxx   pyy   pxy   lx   ly   xy
//! 299.98 1.25 0.87 0.02 35.24 35.24 0
//! 300.11 -1052.4 -633.1 0.05 35.59 35.24 0
//! ```
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `analysis/estimators.rs` 的 `AveragedBlock`

use crate::analysis::AveragedBlock;
use crate::error::{ElasticError, Result};
use crate::models::{format_value, ThermoVar};

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// 追加一个平均块
pub fn append_block(path: &Path, block: &AveragedBlock) -> Result<()> {
    let mut text = String::new();
    let header: Vec<&str> = block.variables.iter().map(|v| v.name()).collect();
    text.push_str(&header.join("   "));
    text.push('\n');
    for row in &block.rows {
        let values: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
        text.push_str(&values.join(" "));
        text.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ElasticError::write(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| ElasticError::write(path, e))
}

/// 读取最后一个平均块
pub fn read_last_block(path: &Path) -> Result<AveragedBlock> {
    if !path.exists() {
        return Err(ElasticError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
    parse_last_block(&content).map_err(|reason| ElasticError::ParseError {
        format: "averaged results".to_string(),
        path: path.display().to_string(),
        reason,
    })
}

fn parse_last_block(content: &str) -> std::result::Result<AveragedBlock, String> {
    let mut current: Option<AveragedBlock> = None;

    for (line_no, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            continue;
        };

        if first.parse::<f64>().is_err() {
            let variables = tokens
                .iter()
                .map(|t| t.parse::<ThermoVar>())
                .collect::<Result<Vec<_>>>()
                .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
            current = Some(AveragedBlock {
                variables,
                rows: Vec::new(),
            });
            continue;
        }

        let block = current
            .as_mut()
            .ok_or_else(|| format!("line {}: values before any header", line_no + 1))?;
        let row = tokens
            .iter()
            .map(|t| t.parse::<f64>().map(|v| v.is_finite().then_some(v)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
        if row.len() != block.variables.len() {
            return Err(format!(
                "line {} has {} values, header has {}",
                line_no + 1,
                row.len(),
                block.variables.len()
            ));
        }
        block.rows.push(row);
    }

    current.ok_or_else(|| "no averaged block found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn block(rows: Vec<Vec<Option<f64>>>) -> AveragedBlock {
        AveragedBlock {
            variables: vec![ThermoVar::Temp, ThermoVar::Pxx],
            rows,
        }
    }

    #[test]
    fn test_last_block_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("av_res.txt");
        append_block(&path, &block(vec![vec![Some(1.0), Some(2.0)]])).unwrap();
        append_block(
            &path,
            &block(vec![vec![Some(300.0), None], vec![Some(301.0), Some(-5.5)]]),
        )
        .unwrap();

        let last = read_last_block(&path).unwrap();
        assert_eq!(last.variables, vec![ThermoVar::Temp, ThermoVar::Pxx]);
        assert_eq!(
            last.rows,
            vec![vec![Some(300.0), None], vec![Some(301.0), Some(-5.5)]]
        );

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().filter(|l| l.starts_with('T')).count(), 2);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        assert!(parse_last_block("T pxx\n1 2 3\n").is_err());
        assert!(parse_last_block("1 2\n").is_err());
        assert!(parse_last_block("").is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_last_block(&dir.path().join("av_res.txt")),
            Err(ElasticError::FileNotFound { .. })
        ));
    }
}
