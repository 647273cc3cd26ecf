//! # 配置记录
//!
//! 显式枚举的配置结构，从 TOML 文件加载，缺省字段取默认值。
//! `Display` 实现逐项列出全部字段，用于 `config` 子命令与运行前核对。
//!
//! ## 配置文件示例
//! ```text
//! [session]
//! case = "Co2MnGa"
//! case_dir = "/home/user/WIEN2k/Co2MnGa"
//! spins = ["up"]
//!
//! [nodal]
//! density = 5000
//! fine_cutoff = 0.001
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 被 `solver/session.rs` 使用

use crate::error::{NlscanError, Result};
use crate::parsers::agr::DEFAULT_MAX_BAND;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlscanConfig {
    pub session: SessionConfig,
    pub map: MapConfig,
    pub nodal: NodalConfig,
}

/// 求解器会话配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 会话 (case) 名称，文件名前缀
    pub case: String,
    /// case 目录，所有外部命令在此目录下执行
    pub case_dir: PathBuf,
    /// 模板文件目录 (case.insp 等)
    pub template_dir: PathBuf,
    /// 求解器驱动程序
    pub program: String,
    /// 自旋极化计算
    pub spin_polarized: bool,
    /// 参与计算的自旋分量
    pub spins: Vec<String>,
    /// 自旋轨道耦合
    pub spin_orbit: bool,
    /// +U 修正
    pub orbital_u: bool,
    /// 输出分波权重
    pub qtl: bool,
    /// qtl 模式下的 [原子序号, 轨道序号] 列表
    pub qtl_list: Vec<[u32; 2]>,
    /// 并行 (>1 时附加 -p)
    pub parallel: u32,
    /// 取消标记文件名（位于 case 目录）
    pub stop_marker: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            case: "case".to_string(),
            case_dir: PathBuf::from("."),
            template_dir: PathBuf::from("/usr/local/WIEN2k/SRC_templates"),
            program: "x_lapw".to_string(),
            spin_polarized: true,
            spins: vec!["up".to_string(), "dn".to_string()],
            spin_orbit: false,
            orbital_u: false,
            qtl: false,
            qtl_list: vec![[1, 0]],
            parallel: 1,
            stop_marker: "stop.txt".to_string(),
        }
    }
}

/// 粗网格扫描配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// kx 方向分段数（每条路径 nx + 1 个采样点）
    pub nx: usize,
    /// ky 方向分段数
    pub ny: usize,
    /// kz 方向分段数，0 表示二维 (kx-ky) 扫描
    pub nz: usize,
    /// 路径量化密度，0 表示按最小坐标增量自动推导
    pub density: f64,
    /// 扫描输出目录（相对 case 目录）
    pub output_dir: String,
    /// 体数据使用的自旋后缀
    pub spin: String,
}

impl MapConfig {
    /// 是否为三维全布里渊区扫描
    pub fn is_3d(&self) -> bool {
        self.nz > 0
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            nx: 100,
            ny: 100,
            nz: 100,
            density: 0.0,
            output_dir: "mapall".to_string(),
            spin: "up".to_string(),
        }
    }
}

/// 闭区间整数步进范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRange {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl WindowRange {
    pub fn new(start: i64, end: i64, step: i64) -> Self {
        WindowRange { start, end, step }
    }

    /// 依次产生 start, start+step, ... 直到 end（含）
    pub fn values(&self) -> Vec<i64> {
        if self.step <= 0 {
            return vec![self.start];
        }
        (self.start..=self.end).step_by(self.step as usize).collect()
    }
}

impl fmt::Display for WindowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} step {}", self.start, self.end, self.step)
    }
}

/// 节线细化配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodalConfig {
    /// 粗筛能隙阈值 (eV)
    pub coarse_cutoff: f64,
    /// 细筛能隙阈值 (eV)
    pub fine_cutoff: f64,
    /// 细网格密度（每个倒格矢分段数）
    pub density: i64,
    /// 每个 .klist_band 文件的最大 k 点数
    pub max_per_file: usize,
    /// 保留 kx+ky+kz <= bound_factor * density 的点
    pub bound_factor: f64,
    /// 解析 .agr 时的能带号上限（含）
    pub max_band_index: usize,
    /// 细网格结果使用的自旋后缀
    pub spin: String,
    /// 节线输出根目录（相对 case 目录）
    pub output_dir: String,
    /// 候选点周围的细网格偏移窗口（单位 1/density）
    pub window_x: WindowRange,
    pub window_y: WindowRange,
    pub window_z: WindowRange,
}

impl Default for NodalConfig {
    fn default() -> Self {
        NodalConfig {
            coarse_cutoff: 0.015,
            fine_cutoff: 0.001,
            density: 5000,
            max_per_file: 900,
            bound_factor: 1.5,
            max_band_index: DEFAULT_MAX_BAND,
            spin: "up".to_string(),
            output_dir: "NLs".to_string(),
            window_x: WindowRange::new(-30, 30, 1),
            window_y: WindowRange::new(-25, 25, 5),
            window_z: WindowRange::new(-25, 25, 5),
        }
    }
}

impl NlscanConfig {
    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| NlscanError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NlscanError::ConfigError {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// 文件存在则加载，否则使用默认配置
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| NlscanError::Other(e.to_string()))
    }
}

impl fmt::Display for NlscanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.session;
        writeln!(f, "[session]")?;
        writeln!(f, "  case           : {}", s.case)?;
        writeln!(f, "  case_dir       : {}", s.case_dir.display())?;
        writeln!(f, "  template_dir   : {}", s.template_dir.display())?;
        writeln!(f, "  program        : {}", s.program)?;
        writeln!(f, "  spin_polarized : {}", s.spin_polarized)?;
        writeln!(f, "  spins          : {}", s.spins.join(", "))?;
        writeln!(f, "  spin_orbit     : {}", s.spin_orbit)?;
        writeln!(f, "  orbital_u      : {}", s.orbital_u)?;
        writeln!(f, "  qtl            : {}", s.qtl)?;
        writeln!(f, "  qtl_list       : {:?}", s.qtl_list)?;
        writeln!(f, "  parallel       : {}", s.parallel)?;
        writeln!(f, "  stop_marker    : {}", s.stop_marker)?;

        let m = &self.map;
        writeln!(f, "[map]")?;
        writeln!(f, "  nx             : {}", m.nx)?;
        writeln!(f, "  ny             : {}", m.ny)?;
        if m.nz > 0 {
            writeln!(f, "  nz             : {}", m.nz)?;
        } else {
            writeln!(f, "  nz             : 0 (2D)")?;
        }
        if m.density > 0.0 {
            writeln!(f, "  density        : {}", m.density)?;
        } else {
            writeln!(f, "  density        : auto")?;
        }
        writeln!(f, "  output_dir     : {}", m.output_dir)?;
        writeln!(f, "  spin           : {}", m.spin)?;

        let n = &self.nodal;
        writeln!(f, "[nodal]")?;
        writeln!(f, "  coarse_cutoff  : {}", n.coarse_cutoff)?;
        writeln!(f, "  fine_cutoff    : {}", n.fine_cutoff)?;
        writeln!(f, "  density        : {}", n.density)?;
        writeln!(f, "  max_per_file   : {}", n.max_per_file)?;
        writeln!(f, "  window_x       : {}", n.window_x)?;
        writeln!(f, "  window_y       : {}", n.window_y)?;
        writeln!(f, "  window_z       : {}", n.window_z)?;
        writeln!(f, "  bound_factor   : {}", n.bound_factor)?;
        writeln!(f, "  max_band_index : {}", n.max_band_index)?;
        writeln!(f, "  spin           : {}", n.spin)?;
        write!(f, "  output_dir     : {}", n.output_dir)
    }
}
