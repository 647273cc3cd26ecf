//! # assemble 命令实现
//!
//! 拼接扫描结果为能量体并保存为 .npy。
//!
//! ## 依赖关系
//! - 使用 `cli/assemble.rs` 定义的参数
//! - 使用 `volume/assembler.rs`, `export/npy.rs`

use crate::cli::assemble::AssembleArgs;
use crate::error::Result;
use crate::export::save_array;
use crate::models::{EnergyVolume, MapConfig, NlscanConfig};
use crate::nodal::{ensure_dir, NodalLayout};
use crate::utils::output;
use crate::volume::{assemble_volume, MeshNaming, MeshShape};

use std::path::Path;

/// 执行 assemble 命令
pub fn execute(args: AssembleArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Assembling energy volume");

    let layout = NodalLayout::from_config(config);
    let dir = args.dir.unwrap_or_else(|| layout.map_data_dir());
    let default_shape = map_shape(&config.map);
    let shape = MeshShape {
        ny: args.ny.unwrap_or(default_shape.ny),
        nz: args.nz.or(default_shape.nz),
    };
    let naming = MeshNaming::new(
        &args.template,
        args.spin.as_deref().unwrap_or(&config.map.spin),
    );
    let out = args.output.unwrap_or_else(|| layout.volume_path());

    assemble_to(&dir, shape, &naming, config.nodal.max_band_index, &out)?;
    Ok(())
}

/// 扫描配置对应的文件网格
pub fn map_shape(map: &MapConfig) -> MeshShape {
    if map.is_3d() {
        MeshShape::volume(map.ny + 1, map.nz + 1)
    } else {
        MeshShape::plane(map.ny + 1)
    }
}

/// 拼接并保存
pub fn assemble_to(
    dir: &Path,
    shape: MeshShape,
    naming: &MeshNaming,
    max_band: usize,
    out: &Path,
) -> Result<EnergyVolume> {
    output::print_info(&format!(
        "Reading {} files from {}",
        shape.len(),
        dir.display()
    ));

    let assembled = assemble_volume(dir, shape, naming, max_band)?;
    if !assembled.failed.is_empty() {
        output::print_warning(&format!(
            "{} of {} files filled with NaN",
            assembled.failed.len(),
            shape.len()
        ));
    }

    if let Some(parent) = out.parent() {
        ensure_dir(parent)?;
    }
    save_array(out, assembled.volume.data())?;
    output::print_success(&format!(
        "Saved {}-D volume {:?} (band, kx, ...) to {}",
        assembled.volume.k_dims(),
        assembled.volume.data().shape(),
        out.display()
    ));

    Ok(assembled.volume)
}
