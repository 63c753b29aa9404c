//! # 批量执行器
//!
//! 在 rayon 线程池上并行处理一组运行目录或温度点。
//!
//! ## 功能
//! - `map`: 保序并行映射，结果顺序与输入一致
//! - `run`: 每项返回 `ProcessResult`，汇总为 `BatchResult`
//! - 进度条显示
//!
//! ## 依赖关系
//! - 被 `commands/`, `sweep/` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;

/// 单项处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 处理失败
    Failed(String, String), // (项目名, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Failed(item, err) => {
                self.failed += 1;
                self.failures.push((item, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 保序并行映射
    pub fn map<T, R, F>(&self, items: &[T], message: &str, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);

        let work = || {
            items
                .par_iter()
                .map(|item| {
                    let result = f(item);
                    pb.inc(1);
                    result
                })
                .collect::<Vec<R>>()
        };

        // 线程池建不起来时退回全局池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(_) => work(),
        };

        pb.finish_and_clear();
        results
    }

    /// 并行处理并汇总
    pub fn run<T, F>(&self, items: &[T], message: &str, processor: F) -> BatchResult
    where
        T: Sync,
        F: Fn(&T) -> ProcessResult + Sync + Send,
    {
        let mut batch_result = BatchResult::default();
        for result in self.map(items, message, processor) {
            batch_result.merge(result);
        }
        batch_result
    }
}
