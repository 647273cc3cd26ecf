//! # 镜像展开与逐能带波形导出
//!
//! 扫描只覆盖 0..1 的 k 区间，导出前把每个 k 轴镜像展开为 -1..1：
//! `concat(flip(a), a[1..])`，长度 `n` 变为 `2n - 1`。
//! 仅导出与能量窗口相交的能带（忽略 NaN 的最小/最大值）。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `export/wave.rs`

use crate::error::{NlscanError, Result};
use crate::export::wave::ItxWave;
use crate::models::EnergyVolume;

use ndarray::{concatenate, ArrayD, ArrayViewD, Axis, Slice};

/// 倒空间单位
pub const K_UNIT: &str = "2pi/a";

/// 沿 `axis` 镜像展开
pub fn mirror_unfold(a: ArrayViewD<'_, f64>, axis: Axis) -> Result<ArrayD<f64>> {
    if a.len_of(axis) <= 1 {
        return Ok(a.to_owned());
    }
    let mut flipped = a.to_owned();
    flipped.invert_axis(axis);
    let tail = a.slice_axis(axis, Slice::from(1..));
    concatenate(axis, &[flipped.view(), tail]).map_err(|e| {
        NlscanError::Other(format!("cannot unfold axis {}: {}", axis.index(), e))
    })
}

/// 忽略 NaN 的 (min, max)；全为 NaN 时返回 `None`
pub fn nan_min_max(a: ArrayViewD<'_, f64>) -> Option<(f64, f64)> {
    a.iter().filter(|v| !v.is_nan()).fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// 为每条与 `[e_start, e_end]` 相交的能带生成展开后的波形
pub fn band_waves(volume: &EnergyVolume, name: &str, e_start: f64, e_end: f64) -> Result<Vec<ItxWave>> {
    let mut waves = Vec::new();

    for b in 0..volume.num_bands() {
        let band = volume.band(b);
        let Some((lo, hi)) = nan_min_max(band.view()) else {
            continue;
        };
        if hi < e_start || lo > e_end {
            continue;
        }

        let mut data = band.to_owned();
        for ax in 0..data.ndim() {
            data = mirror_unfold(data.view(), Axis(ax))?;
        }

        let wave_shape = data.shape().to_vec();
        let mut wave = ItxWave::new(&format!("{}_Band{}", name, b + 1), data)?;
        for (ax, &n) in wave_shape.iter().enumerate() {
            let delta = if n > 1 { 2.0 / (n - 1) as f64 } else { 0.0 };
            wave.set_dimscale(ax, -1.0, delta, K_UNIT)?;
        }
        waves.push(wave);
    }

    Ok(waves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s, Array3};

    #[test]
    fn test_mirror_unfold_1d() {
        let a = array![0.0, 1.0, 2.0].into_dyn();
        let out = mirror_unfold(a.view(), Axis(0)).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![2.0, 1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_mirror_unfold_2d_axis1() {
        let a = array![[0.0, 1.0], [2.0, 3.0]].into_dyn();
        let out = mirror_unfold(a.view(), Axis(1)).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.slice(s![0, ..]).to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(out.slice(s![1, ..]).to_vec(), vec![3.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mirror_unfold_leaves_source_untouched() {
        let a = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]].into_dyn();
        let out = mirror_unfold(a.view(), Axis(0)).unwrap();
        assert_eq!(out.shape(), &[3, 3]);
        assert_eq!(out.slice(s![0, ..]).to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(out.slice(s![2, ..]).to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(a[[0, 0]], 0.0);

        let single = array![[7.0, 8.0]].into_dyn();
        assert_eq!(mirror_unfold(single.view(), Axis(0)).unwrap(), single);
    }

    #[test]
    fn test_nan_min_max() {
        let a = array![f64::NAN, 2.0, -1.0].into_dyn();
        assert_eq!(nan_min_max(a.view()), Some((-1.0, 2.0)));
        let all_nan = array![f64::NAN].into_dyn();
        assert_eq!(nan_min_max(all_nan.view()), None);
    }

    #[test]
    fn test_band_waves_window() {
        // 三条能带：-5, 0, NaN
        let mut data = Array3::zeros((3, 3, 2));
        data.slice_mut(s![0, .., ..]).fill(-5.0);
        data.slice_mut(s![2, .., ..]).fill(f64::NAN);
        data[[1, 2, 1]] = f64::NAN;
        let vol = EnergyVolume::new(data.into_dyn()).unwrap();

        let waves = band_waves(&vol, "bands", -1.0, 1.0).unwrap();
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].name(), "bands_Band2");

        let mut buf = Vec::new();
        waves[0].write_block(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("N=(5,3)"));
        assert!(text.contains("SetScale/P x -1,0.5,\"2pi/a\""));
        assert!(text.contains("SetScale/P y -1,1,\"2pi/a\""));
    }
}
