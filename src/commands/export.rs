//! # export 命令实现
//!
//! ## 功能
//! - waves: 能量体镜像展开，窗口内每条能带一个 .itx
//! - voxel: 每个自旋一个能量分箱占据体 `bands_{spin}spin.itx`
//! - dos: 每个前缀一个 `{head}_dos.itx`
//!
//! ## 依赖关系
//! - 使用 `cli/export.rs` 定义的参数
//! - 使用 `volume/unfold.rs`, `volume/voxel.rs`, `export/`

use super::nodal::load_volume;
use crate::cli::export::{DosArgs, ExportArgs, ExportCommands, VoxelArgs, WavesArgs};
use crate::error::Result;
use crate::export::dos::{dos_groups, dos_waves};
use crate::export::{save_waves, ItxWave};
use crate::models::NlscanConfig;
use crate::nodal::{ensure_dir, NodalLayout};
use crate::utils::output;
use crate::volume::unfold::band_waves;
use crate::volume::voxel::{voxel_volume, EnergyScale};
use crate::volume::MeshNaming;

/// 执行 export 命令
pub fn execute(args: ExportArgs, config: &NlscanConfig) -> Result<()> {
    match args.command {
        ExportCommands::Waves(a) => export_waves(a, config),
        ExportCommands::Voxel(a) => export_voxel(a, config),
        ExportCommands::Dos(a) => export_dos(a),
    }
}

fn export_waves(args: WavesArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Exporting band waves");

    let layout = NodalLayout::from_config(config);
    let input = args.input.unwrap_or_else(|| layout.volume_path());
    let out_dir = args.output.unwrap_or_else(|| layout.map_root.join("waves"));
    ensure_dir(&out_dir)?;

    let volume = load_volume(&input)?;
    let waves = band_waves(&volume, &args.name, args.e_start, args.e_end)?;
    if waves.is_empty() {
        output::print_warning(&format!(
            "No band intersects [{}, {}] eV",
            args.e_start, args.e_end
        ));
        return Ok(());
    }

    for wave in &waves {
        let path = out_dir.join(format!("{}.itx", wave.name()));
        wave.save(&path)?;
        output::print_saved(&path);
    }
    output::print_done(&format!("{} waves written", waves.len()));
    Ok(())
}

fn export_voxel(args: VoxelArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Exporting occupancy volumes");

    let layout = NodalLayout::from_config(config);
    let dir = args.dir.unwrap_or_else(|| layout.map_data_dir());
    let out_dir = args.output.unwrap_or_else(|| layout.map_root.clone());
    let ny = args.ny.unwrap_or(config.map.ny + 1);
    ensure_dir(&out_dir)?;

    let scale = EnergyScale::new(args.e_start, args.e_end, args.e_step)?;
    output::print_info(&format!(
        "{} energy bins from {} eV, step {} eV",
        scale.size, scale.offset, scale.delta
    ));

    for spin in &args.spins {
        let naming = MeshNaming::new(&args.template, spin);
        let vol = voxel_volume(&dir, ny, &naming, &scale, config.nodal.max_band_index)?;
        let mut wave = ItxWave::new(&format!("{}spin", spin), vol.into_dyn())?;
        wave.set_dimscale(0, scale.offset, scale.delta, "eV")?;

        let path = out_dir.join(format!("bands_{}spin.itx", spin));
        wave.save(&path)?;
        output::print_saved(&path);
    }
    Ok(())
}

fn export_dos(args: DosArgs) -> Result<()> {
    output::print_header("Exporting DOS waves");

    for dir in &args.dirs {
        let groups = dos_groups(dir)?;
        if groups.is_empty() {
            output::print_skip(&format!("No .dos files in {}", dir.display()));
            continue;
        }
        for (head, files) in &groups {
            let waves = dos_waves(head, files)?;
            let path = dir.join(format!("{}_dos.itx", head));
            save_waves(&path, &waves)?;
            output::print_success(&format!(
                "{} ({} files, {} waves)",
                path.display(),
                files.len(),
                waves.len()
            ));
        }
    }
    Ok(())
}
