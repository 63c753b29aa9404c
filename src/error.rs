//! # 统一错误处理模块
//!
//! 定义 mdelastic 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - 单个温度点内的错误（缺列、数据不足、轴向结果不全）由 sweep 编排层捕获，
//!   该温度被标记为失败，扫描继续
//! - 全局错误（结果文件不可写、配置无效）直接终止运行
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// mdelastic 统一错误类型
#[derive(Error, Debug)]
pub enum ElasticError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unknown thermo variable: '{0}'")]
    UnknownVariable(String),

    // ─────────────────────────────────────────────────────────────
    // 数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("Required column '{variable}' is missing from the thermo table")]
    MissingColumn { variable: String },

    #[error("Variable '{variable}' is not in the averaged block; add it to 'variables' and rerun average")]
    MissingAveragedVariable { variable: String },

    #[error("Invalid stage boundaries: {0}")]
    InvalidStages(String),

    #[error("Not enough data for {what}: need {needed}, got {got}")]
    InsufficientData {
        what: String,
        needed: usize,
        got: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 数值错误
    // ─────────────────────────────────────────────────────────────
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),

    // ─────────────────────────────────────────────────────────────
    // 温度扫描错误
    // ─────────────────────────────────────────────────────────────
    #[error("Temperature {temperature} is incomplete, missing axes: {}", missing.join(", "))]
    IncompleteAxisSet {
        temperature: String,
        missing: Vec<String>,
    },

    #[error("Result file '{path}' already holds {rows} rows (use --existing append|overwrite)")]
    ResultsExist { path: String, rows: usize },

    // ─────────────────────────────────────────────────────────────
    // 参数与配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid sweep configuration '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl ElasticError {
    /// 构造读文件错误
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        ElasticError::FileReadError {
            path: path.display().to_string(),
            source,
        }
    }

    /// 构造写文件错误
    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        ElasticError::FileWriteError {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ElasticError>;
