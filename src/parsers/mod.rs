//! # 解析器模块
//!
//! 解析能带求解器的文本输出。
//!
//! ## 依赖关系
//! - 被 `volume/`, `nodal/`, `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: agr, dos

pub mod agr;
pub mod dos;
