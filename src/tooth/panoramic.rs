// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/tooth/panoramic.rs - 全景片最近中心定位
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use tracing::debug;

use super::{
  Arch, LocateError, Notation, Region, SLOT_COUNT, TOOTH_TABLE, ToothLocator, ToothSpan,
  bbox_center, check_dimensions,
};

/// 基于牙位表的定位器
///
/// 检测框纵向中心先决定牙弓，再在该牙弓的 16 个槽中按横向中心距离
/// 取最近者；距离相等时序号小的槽胜出。
#[derive(Debug, Clone)]
pub struct PanoramicLocator {
  width: u32,
  height: u32,
  notation: Notation,
  table: &'static [ToothSpan; SLOT_COUNT],
}

impl PanoramicLocator {
  pub fn new(width: u32, height: u32, notation: Notation) -> Result<Self, LocateError> {
    check_dimensions(width, height)?;
    debug!("创建全景牙位定位器: {}x{}, 记法 {}", width, height, notation);
    Ok(Self {
      width,
      height,
      notation,
      table: &TOOTH_TABLE,
    })
  }

  fn nearest_slot(&self, cx_pct: f32, arch: Arch) -> usize {
    let mut best_slot = 0;
    let mut best_diff = f32::INFINITY;
    for (slot, span) in self.table.iter().enumerate() {
      if Arch::of_slot(slot) != arch {
        continue;
      }
      let diff = (span.center() - cx_pct).abs();
      if diff < best_diff {
        best_slot = slot;
        best_diff = diff;
      }
    }
    best_slot
  }
}

impl ToothLocator for PanoramicLocator {
  fn image_size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn notation(&self) -> Notation {
    self.notation
  }

  fn locate_slot(&self, bbox: &[f32; 4]) -> (usize, Region) {
    let (w, h) = (self.width as f32, self.height as f32);
    let (cx, cy) = bbox_center(bbox);

    let arch = Arch::of_center(cy, h);
    let slot = self.nearest_slot(cx / w, arch);
    let span = self.table[slot];

    let mesial = cx < span.center() * w;
    let occlusal = arch.is_occlusal(cy, h * arch.occlusal_ratio());
    let region = Region::from_parts(mesial, occlusal);

    debug!(
      "检测框中心 ({:.1}, {:.1}) -> 槽位 {} ({}), 区域 {}",
      cx,
      cy,
      slot,
      arch.name(),
      region
    );
    (slot, region)
  }
}
