//! # nlscan - WIEN2k 节线搜索工具
//!
//! 将能带扫描、简并点提取与细网格求解统一成单一可执行文件。
//!
//! ## 子命令
//! - `klist`    - 高对称路径 → `.klist_band`
//! - `map`      - 粗网格扫描
//! - `assemble` - 扫描结果拼接为能量体
//! - `nodal`    - 节线细化
//!   - `coarse` / `klist` / `solve` / `fine` / `run`
//! - `pipeline` - map → assemble → nodal run
//! - `export`   - Igor 文本波形导出 (waves, voxel, dos)
//! - `config`   - 查看或生成配置文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── kpath/    (路径采样与 klist 写出)
//!   │     ├── solver/   (外部求解器会话)
//!   │     ├── volume/   (能量体、简并提取、对称化)
//!   │     ├── nodal/    (粗扫描与细化流水线)
//!   │     ├── export/   (npy / itx / csv)
//!   │     ├── parsers/  (agr / dos 解析)
//!   │     └── models/   (数据模型与配置)
//!   ├── batch/      (可取消的顺序循环)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod export;
mod kpath;
mod models;
mod nodal;
mod parsers;
mod solver;
mod utils;
mod volume;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command, &cli.config) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
