//! # LAMMPS log.lammps 解析器
//!
//! 从 LAMMPS 日志中提取 thermo 输出，得到逐步数值表和阶段边界。
//!
//! ## log.lammps 格式说明
//! ```text
//! Step Temp Press Pxx Pyy ... Lx Ly Lz Xy Xz Yz
//!        0          300    1.02 ...
//!      100    299.81234    0.98 ...
//! Loop time of 12.3 on 20 procs for 200000 steps with 2048 atoms
//! ...
//! Step Temp Press ...                      <- 下一个 run，首行重复上一 run 的末步
//! ```
//!
//! 每个 `run` 命令产生一个 thermo 块，块之间即阶段边界。
//! 表头关键字按 `ThermoVar` 别名识别（大小写不敏感），未知关键字忽略。
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `models/thermo.rs`

use crate::error::{ElasticError, Result};
use crate::models::ThermoVar;
use std::fs;
use std::path::Path;

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    /// 按 schema 顺序排列的逐步数值
    pub rows: Vec<Vec<f64>>,
    /// 累计行数边界 `0, n1, n1+n2, ...`
    pub boundaries: Vec<usize>,
}

/// 解析 log.lammps 文件
pub fn parse_log_file(path: &Path, schema: &[ThermoVar]) -> Result<ParsedLog> {
    let content = fs::read_to_string(path).map_err(|e| ElasticError::read(path, e))?;
    parse_log_content(&content, schema).map_err(|e| match e {
        ElasticError::Other(reason) => ElasticError::ParseError {
            format: "LAMMPS log".to_string(),
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从字符串内容解析
pub fn parse_log_content(content: &str, schema: &[ThermoVar]) -> Result<ParsedLog> {
    let mut parsed = ParsedLog {
        rows: Vec::new(),
        boundaries: vec![0],
    };

    let mut lines = content.lines().peekable();
    let mut blocks = 0;

    while let Some(line) = lines.next() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() != Some(&"Step") {
            continue;
        }

        blocks += 1;
        let layout = BlockLayout::from_header(&tokens, schema)?;
        let mut first_row = true;

        while let Some(next) = lines.peek() {
            let trimmed = next.trim();
            if trimmed.starts_with("WARNING") {
                lines.next();
                continue;
            }
            let Some(values) = parse_numeric_row(trimmed, layout.width) else {
                break;
            };
            lines.next();

            // 新 run 的首行重复上一 run 的末步
            if first_row {
                first_row = false;
                if let (Some(step_col), Some(last)) = (layout.step, parsed.rows.last()) {
                    if let Some(prev_step) = layout.step_in_schema.and_then(|i| last.get(i)) {
                        if values[step_col] == *prev_step {
                            continue;
                        }
                    }
                }
            }

            parsed.rows.push(layout.select(&values));
        }

        if parsed.rows.len() > *parsed.boundaries.last().unwrap_or(&0) {
            parsed.boundaries.push(parsed.rows.len());
        }
    }

    if blocks == 0 {
        return Err(ElasticError::Other(
            "no thermo block (header starting with 'Step') found".to_string(),
        ));
    }

    Ok(parsed)
}

/// 一个 thermo 块的列布局
struct BlockLayout {
    width: usize,
    /// schema 中每个变量在该块中的列号
    columns: Vec<usize>,
    step: Option<usize>,
    step_in_schema: Option<usize>,
}

impl BlockLayout {
    fn from_header(tokens: &[&str], schema: &[ThermoVar]) -> Result<Self> {
        let header: Vec<Option<ThermoVar>> = tokens.iter().map(|t| t.parse().ok()).collect();

        let columns = schema
            .iter()
            .map(|var| {
                header
                    .iter()
                    .position(|h| *h == Some(*var))
                    .ok_or_else(|| ElasticError::MissingColumn {
                        variable: var.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BlockLayout {
            width: tokens.len(),
            columns,
            step: header.iter().position(|h| *h == Some(ThermoVar::Step)),
            step_in_schema: schema.iter().position(|v| *v == ThermoVar::Step),
        })
    }

    fn select(&self, values: &[f64]) -> Vec<f64> {
        self.columns.iter().map(|&c| values[c]).collect()
    }
}

/// 解析恰好 `width` 个数字的行
fn parse_numeric_row(line: &str, width: usize) -> Option<Vec<f64>> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<_>>()?;
    (values.len() == width).then_some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = r#"LAMMPS (29 Oct 2020)
units metal
Setting up Verlet run ...
Step Temp E_pair Press Pxx Lx
       0          300   -4.45    1.0   2.0   28.1448
     100    301.5       -4.44    1.5   2.5   28.1450
     200    299.5       -4.45    0.5   1.5   28.1449
Loop time of 1.5 on 4 procs for 200 steps with 2048 atoms

fix 3 all deform 1 x erate 0.0001
Step Temp E_pair Press Pxx Lx
     200    299.5       -4.45    0.5   1.5   28.1449
WARNING: Dihedral problem
     300    300.2       -4.40  -10.0 -20.0   28.1500
     400    300.8       -4.35  -20.0 -40.0   28.1550
Loop time of 1.5 on 4 procs for 200 steps with 2048 atoms
Total wall time: 0:00:03
"#;

    #[test]
    fn test_parse_two_runs() {
        let schema = [ThermoVar::Step, ThermoVar::Temp, ThermoVar::Pxx, ThermoVar::Lx];
        let parsed = parse_log_content(LOG, &schema).unwrap();
        assert_eq!(parsed.rows.len(), 5);
        assert_eq!(parsed.boundaries, vec![0, 3, 5]);
        assert_eq!(parsed.rows[3], vec![300.0, 300.2, -20.0, 28.15]);
    }

    #[test]
    fn test_schema_reorders_columns() {
        let schema = [ThermoVar::Lx, ThermoVar::Step];
        let parsed = parse_log_content(LOG, &schema).unwrap();
        assert_eq!(parsed.rows[0], vec![28.1448, 0.0]);
        // 无 Step 列时不做去重
        let parsed = parse_log_content(LOG, &[ThermoVar::Lx]).unwrap();
        assert_eq!(parsed.rows.len(), 6);
        assert_eq!(parsed.boundaries, vec![0, 3, 6]);
    }

    #[test]
    fn test_missing_schema_column() {
        let schema = [ThermoVar::Step, ThermoVar::Pyz];
        assert!(matches!(
            parse_log_content(LOG, &schema),
            Err(ElasticError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_truncated_run() {
        let log = "Step Temp\n 0 300\n 10 301\n 20 3";
        let parsed = parse_log_content(log, &[ThermoVar::Step, ThermoVar::Temp]).unwrap();
        assert_eq!(parsed.rows.len(), 3);
        assert_eq!(parsed.boundaries, vec![0, 3]);
    }

    #[test]
    fn test_no_thermo() {
        assert!(parse_log_content("LAMMPS\nERROR: bad\n", &[ThermoVar::Temp]).is_err());
    }
}
