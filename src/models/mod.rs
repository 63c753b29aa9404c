//! # 数据模型模块
//!
//! 定义热力学时间序列、阶段划分与弹性常数结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/`, `sweep/`, `commands/` 使用
//! - 子模块: thermo, stage, elastic

pub mod elastic;
pub mod stage;
pub mod thermo;

pub use elastic::{
    format_value, DeformationAxis, ElasticConstantSet, ModuliSet, ShearPair, TemperaturePoint,
    Topology,
};
pub use stage::{StageIndex, Windows};
pub use thermo::{ThermoTable, ThermoVar};
