//! 测试用的假求解器：按解析公式给出能带，不调用外部程序。

use crate::error::Result;
use crate::kpath::read_klist;
use crate::models::BandTrace;
use crate::parsers::agr::to_agr_string;
use crate::solver::BandSolver;

use ndarray::Array2;
use std::fs;
use std::path::{Path, PathBuf};

/// 三条能带：`E0 = kx - 1`，`E1 = E0 + |kx - ky|`，`E2 = E1 + 1`
pub struct FakeSolver {
    pub case_dir: PathBuf,
    pub calls: Vec<String>,
}

impl FakeSolver {
    pub fn new(case_dir: &Path) -> Self {
        fs::create_dir_all(case_dir).unwrap();
        FakeSolver {
            case_dir: case_dir.to_path_buf(),
            calls: Vec::new(),
        }
    }
}

pub fn fake_bands(k: &[[f64; 3]]) -> BandTrace {
    let energy = Array2::from_shape_fn((3, k.len()), |(b, i)| {
        let [kx, ky, _] = k[i];
        let e0 = kx - 1.0;
        let e1 = e0 + (kx - ky).abs();
        match b {
            0 => e0,
            1 => e1,
            _ => e1 + 1.0,
        }
    });
    BandTrace {
        weight: Array2::zeros(energy.raw_dim()),
        energy,
    }
}

impl BandSolver for FakeSolver {
    fn klist_path(&self) -> PathBuf {
        self.case_dir.join("case.klist_band")
    }

    fn run_band(&mut self, out_dir: &Path, name: &str) -> Result<()> {
        let points = read_klist(&self.klist_path())?;
        let k: Vec<[f64; 3]> = points.iter().map(|p| p.fractional()).collect();
        fs::create_dir_all(out_dir).unwrap();
        fs::write(
            out_dir.join(format!("{}up.bands.agr", name)),
            to_agr_string(&fake_bands(&k)),
        )
        .unwrap();
        self.calls.push(name.to_string());
        Ok(())
    }

    fn output_spins(&self) -> Vec<String> {
        vec!["up".to_string()]
    }
}
