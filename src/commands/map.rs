//! # map 命令实现
//!
//! 粗网格扫描，可选在完成后拼接能量体。
//!
//! ## 依赖关系
//! - 使用 `cli/map.rs` 定义的参数
//! - 使用 `nodal/scan.rs`, `solver/`, `commands/assemble.rs`

use super::assemble::{assemble_to, map_shape};
use crate::batch::RunSummary;
use crate::cli::map::MapArgs;
use crate::error::Result;
use crate::models::{MapConfig, NlscanConfig};
use crate::nodal::{scan::coarse_scan, NodalLayout};
use crate::solver::{check_output_spin, SolverSession};
use crate::utils::output;
use crate::volume::MeshNaming;

/// 执行 map 命令
pub fn execute(args: MapArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Coarse band scan");

    let mut map = config.map.clone();
    if let Some(nx) = args.nx {
        map.nx = nx;
    }
    if let Some(ny) = args.ny {
        map.ny = ny;
    }
    if let Some(nz) = args.nz {
        map.nz = nz;
    }
    if let Some(d) = args.density {
        map.density = d;
    }

    let summary = run_scan(config, &map)?;
    let stopped = super::report_run("Scan", &summary);

    if args.assemble && !stopped {
        assemble_map(config, &map)?;
    }
    Ok(())
}

/// 以会话求解器执行扫描
pub(crate) fn run_scan(config: &NlscanConfig, map: &MapConfig) -> Result<RunSummary> {
    let layout = NodalLayout::from_config(config);
    output::print_info(&format!(
        "Mesh nx={} ny={} nz={} density={} -> {}",
        map.nx,
        map.ny,
        map.nz,
        if map.density > 0.0 { map.density.to_string() } else { "auto".to_string() },
        layout.map_root.display()
    ));

    let mut solver = SolverSession::new(config.session.clone());
    check_output_spin(&solver, "map.spin", &map.spin)?;
    coarse_scan(&layout, map, &mut solver, super::stop_marker(config))
}

/// 按扫描配置拼接能量体
pub(crate) fn assemble_map(config: &NlscanConfig, map: &MapConfig) -> Result<()> {
    let layout = NodalLayout::from_config(config);
    let naming = MeshNaming::new(crate::volume::assembler::DEFAULT_TEMPLATE, &map.spin);
    assemble_to(
        &layout.map_data_dir(),
        map_shape(map),
        &naming,
        config.nodal.max_band_index,
        &layout.volume_path(),
    )?;
    Ok(())
}
