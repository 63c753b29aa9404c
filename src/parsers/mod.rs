//! # 解析器模块
//!
//! LAMMPS 日志、数值表、阶段边界以及各类结果文件的读写。
//!
//! ## 依赖关系
//! - 被 `sweep/`, `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: lammps_log, table, averaged, results

pub mod averaged;
pub mod lammps_log;
pub mod results;
pub mod table;

pub use averaged::{append_block, read_last_block};
pub use lammps_log::parse_log_file;
pub use results::{
    append_constants, count_rows, prepare_constants_file, read_constants, write_moduli,
    ConstantsRow, ExistingResults,
};
pub use table::{read_stages, read_table, write_stages, write_table};
