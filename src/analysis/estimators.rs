//! # 分阶段平均估计器
//!
//! 把一列采样在每个阶段内归约为一个代表值。三种可互换的估计器：
//! - `SimpleMean`: 算术平均（补偿求和）
//! - `MovingAverage`: 均匀核卷积（仅保留完全重叠的位置）后的平均
//! - `DistributionFit`: Student-t 极大似然拟合的位置参数
//!
//! `reduce_stages` 对 (阶段 × 变量) 逐格调用估计器，得到 `AveragedBlock`，
//! 行对应阶段、列对应变量。单格失败（如窗口大于阶段长度）只使该格无定义。
//!
//! ## 依赖关系
//! - 被 `sweep/pipeline.rs` 使用
//! - 使用 `analysis/student_t.rs`, `models/`

use super::student_t::fit_student_t;
use crate::error::{ElasticError, Result};
use crate::models::{StageIndex, ThermoTable, ThermoVar};

/// 一段采样的归约方式
pub trait Estimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn estimate(&self, samples: &[f64]) -> Result<f64>;
}

/// 算术平均
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMean;

impl Estimator for SimpleMean {
    fn name(&self) -> &'static str {
        "simple mean"
    }

    fn estimate(&self, samples: &[f64]) -> Result<f64> {
        let first = *samples.first().ok_or_else(|| empty_stage(self.name()))?;
        // 以首个样本为偏移，常数阶段精确返回该常数
        let dev = compensated_sum(samples.iter().map(|x| x - first));
        Ok(first + dev / samples.len() as f64)
    }
}

/// 滑动平均后再取平均
#[derive(Debug, Clone, Copy)]
pub struct MovingAverage {
    pub window: usize,
}

impl Estimator for MovingAverage {
    fn name(&self) -> &'static str {
        "moving average"
    }

    fn estimate(&self, samples: &[f64]) -> Result<f64> {
        let n = samples.len();
        let w = self.window;
        if w == 0 {
            return Err(ElasticError::InvalidArgument(
                "moving-average window must be at least 1".to_string(),
            ));
        }
        if w > n {
            return Err(ElasticError::InsufficientData {
                what: format!("moving average with window {}", w),
                needed: w,
                got: n,
            });
        }

        // 有效卷积共 m 个输出，样本 i 被 min(i+1, n-i, w, m) 个窗口覆盖
        let m = n - w + 1;
        let first = samples[0];
        let weighted = compensated_sum(samples.iter().enumerate().map(|(i, x)| {
            let cover = (i + 1).min(n - i).min(w).min(m);
            cover as f64 * (x - first)
        }));
        Ok(first + weighted / (w * m) as f64)
    }
}

/// Student-t 分布拟合的位置参数
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionFit;

impl Estimator for DistributionFit {
    fn name(&self) -> &'static str {
        "Student-t location"
    }

    fn estimate(&self, samples: &[f64]) -> Result<f64> {
        Ok(fit_student_t(samples)?.loc)
    }
}

/// 分阶段归约结果
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedBlock {
    pub variables: Vec<ThermoVar>,
    /// rows[stage][variable]，`None` 表示该格无定义
    pub rows: Vec<Vec<Option<f64>>>,
}

/// 归约中单格失败的记录
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    pub stage: usize,
    pub variable: ThermoVar,
    pub reason: String,
}

/// 对每个阶段、每个变量调用估计器
pub fn reduce_stages(
    estimator: &dyn Estimator,
    table: &ThermoTable,
    stages: &StageIndex,
    variables: &[ThermoVar],
) -> Result<(AveragedBlock, Vec<CellFailure>)> {
    table.require(variables)?;
    stages.check_within(table.len())?;

    let columns: Vec<&[f64]> = variables
        .iter()
        .map(|&v| table.column(v))
        .collect::<Result<_>>()?;

    let mut rows = Vec::with_capacity(stages.stage_count());
    let mut failures = Vec::new();

    for (k, range) in stages.stages().enumerate() {
        let mut row = Vec::with_capacity(variables.len());
        for (var, col) in variables.iter().zip(&columns) {
            match estimator.estimate(&col[range.clone()]) {
                Ok(v) => row.push(Some(v)),
                Err(e @ ElasticError::InsufficientData { .. })
                | Err(e @ ElasticError::DegenerateFit(_)) => {
                    failures.push(CellFailure {
                        stage: k,
                        variable: *var,
                        reason: e.to_string(),
                    });
                    row.push(None);
                }
                Err(e) => return Err(e),
            }
        }
        rows.push(row);
    }

    Ok((
        AveragedBlock {
            variables: variables.to_vec(),
            rows,
        },
        failures,
    ))
}

fn empty_stage(name: &str) -> ElasticError {
    ElasticError::InsufficientData {
        what: name.to_string(),
        needed: 1,
        got: 0,
    }
}

/// Neumaier 补偿求和
pub fn compensated_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut comp = 0.0_f64;
    for v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            comp += (sum - t) + v;
        } else {
            comp += (v - t) + sum;
        }
        sum = t;
    }
    sum + comp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> (ThermoTable, StageIndex) {
        let n = 300;
        let temp: Vec<f64> = (0..n).map(|i| 300.0 + ((i * 7) % 11) as f64 - 5.0).collect();
        let pxx: Vec<f64> = (0..n).map(|i| if i < 100 { 0.1 } else { -(i as f64) }).collect();
        let table = ThermoTable::from_columns(vec![(ThermoVar::Temp, temp), (ThermoVar::Pxx, pxx)])
            .unwrap();
        let stages = StageIndex::new(vec![0, 100, 180, 300]).unwrap();
        (table, stages)
    }

    #[test]
    fn test_one_row_per_stage() {
        let (table, stages) = sample_table();
        let vars = [ThermoVar::Temp, ThermoVar::Pxx];
        let estimators: [&dyn Estimator; 3] =
            [&SimpleMean, &MovingAverage { window: 20 }, &DistributionFit];
        for est in estimators {
            let (block, failures) = reduce_stages(est, &table, &stages, &vars).unwrap();
            assert_eq!(block.rows.len(), stages.stage_count());
            assert!(block.rows.iter().all(|r| r.len() == vars.len()));
            assert!(failures.is_empty());
        }
    }

    #[test]
    fn test_constant_stage_exact() {
        let (table, stages) = sample_table();
        let (block, _) = reduce_stages(&SimpleMean, &table, &stages, &[ThermoVar::Pxx]).unwrap();
        assert_eq!(block.rows[0][0], Some(0.1));
        assert_eq!(SimpleMean.estimate(&[0.1; 3]).unwrap(), 0.1);
    }

    #[test]
    fn test_simple_mean_stage_bounds() {
        let (table, stages) = sample_table();
        let (block, _) = reduce_stages(&SimpleMean, &table, &stages, &[ThermoVar::Pxx]).unwrap();
        // 行 100..180 为 -100..-179
        let expected = -(100.0 + 179.0) / 2.0;
        assert!((block.rows[1][0].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_window_one_matches_mean() {
        let (table, stages) = sample_table();
        let vars = [ThermoVar::Temp, ThermoVar::Pxx];
        let (simple, _) = reduce_stages(&SimpleMean, &table, &stages, &vars).unwrap();
        let (moving, _) =
            reduce_stages(&MovingAverage { window: 1 }, &table, &stages, &vars).unwrap();
        for (a, b) in simple.rows.iter().flatten().zip(moving.rows.iter().flatten()) {
            assert!((a.unwrap() - b.unwrap()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_moving_average_truncates_edges() {
        // 窗口 2 的有效卷积为 [0, 0, 1.5]
        let est = MovingAverage { window: 2 };
        assert!((est.estimate(&[0.0, 0.0, 0.0, 3.0]).unwrap() - 0.5).abs() < 1e-12);
        assert!((SimpleMean.estimate(&[0.0, 0.0, 0.0, 3.0]).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_too_wide() {
        let est = MovingAverage { window: 5 };
        assert!(matches!(
            est.estimate(&[1.0, 2.0, 3.0]),
            Err(ElasticError::InsufficientData { needed: 5, got: 3, .. })
        ));

        let (table, stages) = sample_table();
        let (block, failures) =
            reduce_stages(&MovingAverage { window: 100 }, &table, &stages, &[ThermoVar::Temp])
                .unwrap();
        // 只有 80 行的第二阶段失败
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, 1);
        assert!(block.rows[0][0].is_some());
        assert!(block.rows[1][0].is_none());
        assert!(block.rows[2][0].is_some());
    }

    #[test]
    fn test_missing_variable_fails_whole_call() {
        let (table, stages) = sample_table();
        assert!(matches!(
            reduce_stages(&SimpleMean, &table, &stages, &[ThermoVar::Lx]),
            Err(ElasticError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_compensated_sum() {
        let values = std::iter::once(1.0e16).chain(std::iter::repeat(1.0).take(100));
        assert_eq!(compensated_sum(values), 1.0e16 + 100.0);
    }
}
