//! # 模拟阶段划分
//!
//! `StageIndex` 是单调递增的行号边界序列（首项隐含为 0），把一次运行的
//! 逐步采样划分为若干阶段（如制备、形变）。第 k 个阶段覆盖行
//! `[b_k, b_{k+1})`，即 1-based 步位置 `(b_k, b_{k+1}]`。
//!
//! ## 依赖关系
//! - 被 `parsers/table.rs`, `analysis/`, `sweep/` 使用

use crate::error::{ElasticError, Result};
use std::ops::Range;

/// 阶段边界
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageIndex {
    boundaries: Vec<usize>,
}

impl StageIndex {
    /// 由边界构造；若首项不为 0 则补 0
    pub fn new(mut boundaries: Vec<usize>) -> Result<Self> {
        if boundaries.first() != Some(&0) {
            boundaries.insert(0, 0);
        }
        if boundaries.len() < 2 {
            return Err(ElasticError::InvalidStages(
                "at least one stage boundary besides 0 is required".to_string(),
            ));
        }
        if let Some(w) = boundaries.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ElasticError::InvalidStages(format!(
                "boundaries must increase strictly ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(StageIndex { boundaries })
    }

    /// 若最后一个边界小于 `len`，补上 `len` 作为末阶段终点
    pub fn closed_at(mut self, len: usize) -> Self {
        if self.boundaries.last().is_some_and(|&b| b < len) {
            self.boundaries.push(len);
        }
        self
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// 阶段数 `nl - 1`
    pub fn stage_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// 第 k 个阶段的行范围
    pub fn stage(&self, k: usize) -> Option<Range<usize>> {
        if k + 1 < self.boundaries.len() {
            Some(self.boundaries[k]..self.boundaries[k + 1])
        } else {
            None
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.boundaries.windows(2).map(|w| w[0]..w[1])
    }

    /// 校验边界不超过表长
    pub fn check_within(&self, len: usize) -> Result<()> {
        match self.boundaries.last() {
            Some(&last) if last > len => Err(ElasticError::InvalidStages(format!(
                "last boundary {} exceeds table length {}",
                last, len
            ))),
            _ => Ok(()),
        }
    }
}

/// 制备与形变两个行窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Windows {
    pub preparation: Range<usize>,
    pub deformation: Range<usize>,
}

impl Windows {
    /// 默认：制备为第 0 阶段，形变为最后一个阶段
    pub fn from_stages(stages: &StageIndex) -> Result<Self> {
        let count = stages.stage_count();
        if count < 2 {
            return Err(ElasticError::InvalidStages(format!(
                "need a preparation and a deformation stage, found {} stage(s)",
                count
            )));
        }
        Ok(Windows {
            preparation: stages.stage(0).unwrap_or(0..0),
            deformation: stages.stage(count - 1).unwrap_or(0..0),
        })
    }

    /// 检查窗口落在表内且非空
    pub fn check_within(&self, len: usize) -> Result<()> {
        for (name, w) in [("preparation", &self.preparation), ("deformation", &self.deformation)] {
            if w.start >= w.end || w.end > len {
                return Err(ElasticError::InvalidStages(format!(
                    "{} window {}..{} is empty or outside 0..{}",
                    name, w.start, w.end, len
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_zero() {
        let idx = StageIndex::new(vec![500, 1000]).unwrap();
        assert_eq!(idx.boundaries(), &[0, 500, 1000]);
        assert_eq!(idx.stage_count(), 2);
        assert_eq!(idx.stage(1), Some(500..1000));
        assert_eq!(idx.stage(2), None);
    }

    #[test]
    fn test_closed_at_appends_end() {
        let idx = StageIndex::new(vec![0, 500]).unwrap().closed_at(1000);
        assert_eq!(idx.stages().collect::<Vec<_>>(), vec![0..500, 500..1000]);
        let same = StageIndex::new(vec![0, 1000]).unwrap().closed_at(1000);
        assert_eq!(same.stage_count(), 1);
    }

    #[test]
    fn test_rejects_non_monotonic() {
        assert!(StageIndex::new(vec![0, 10, 10]).is_err());
        assert!(StageIndex::new(vec![0]).is_err());
        assert!(StageIndex::new(vec![]).is_err());
    }

    #[test]
    fn test_default_windows() {
        let idx = StageIndex::new(vec![0, 100, 200, 400]).unwrap();
        let w = Windows::from_stages(&idx).unwrap();
        assert_eq!(w.preparation, 0..100);
        assert_eq!(w.deformation, 200..400);
        assert!(Windows::from_stages(&StageIndex::new(vec![0, 5]).unwrap()).is_err());
    }
}
