//! # config 命令实现
//!
//! 打印当前生效的配置；`--init` 时写出 TOML 模板。
//!
//! ## 依赖关系
//! - 使用 `cli/config.rs` 定义的参数
//! - 使用 `models/config.rs`

use crate::cli::config::ConfigArgs;
use crate::error::{NlscanError, Result};
use crate::models::NlscanConfig;
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 执行 config 命令
pub fn execute(args: ConfigArgs, config: &NlscanConfig, config_path: &Path) -> Result<()> {
    output::print_header("Configuration");
    if config_path.exists() {
        output::print_info(&format!("Loaded from {}", config_path.display()));
    } else {
        output::print_info(&format!(
            "{} not found, using defaults",
            config_path.display()
        ));
    }
    println!("{}", config);

    if !args.init {
        return Ok(());
    }

    if config_path.exists() && !args.force {
        output::print_skip(&format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        ));
        return Ok(());
    }

    let text = config.to_toml_string()?;
    fs::write(config_path, text).map_err(|e| NlscanError::FileWriteError {
        path: config_path.display().to_string(),
        source: e,
    })?;
    output::print_saved(config_path);
    Ok(())
}
