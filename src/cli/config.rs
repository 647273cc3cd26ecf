//! # config 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/config.rs`

use clap::Args;

/// config 子命令参数
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the resolved configuration to the --config path
    #[arg(long, default_value_t = false)]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
