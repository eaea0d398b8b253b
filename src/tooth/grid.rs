// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/tooth/grid.rs - 2x16 网格定位
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
  ARCH_SLOTS, Arch, LocateError, Notation, Region, ToothLocator, bbox_center, check_dimensions,
};

const GRID_ROWS: f32 = 2.0;

/// 把图像等分为上下两行、每行 16 列的粗略定位器
#[derive(Debug, Clone)]
pub struct GridLocator {
  width: u32,
  height: u32,
  notation: Notation,
}

impl GridLocator {
  pub fn new(width: u32, height: u32, notation: Notation) -> Result<Self, LocateError> {
    check_dimensions(width, height)?;
    debug!("创建网格牙位定位器: {}x{}, 记法 {}", width, height, notation);
    Ok(Self {
      width,
      height,
      notation,
    })
  }

  fn cell_size(&self) -> (f32, f32) {
    (
      self.width as f32 / ARCH_SLOTS as f32,
      self.height as f32 / GRID_ROWS,
    )
  }
}

impl ToothLocator for GridLocator {
  fn image_size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn notation(&self) -> Notation {
    self.notation
  }

  fn locate_slot(&self, bbox: &[f32; 4]) -> (usize, Region) {
    let (cell_w, cell_h) = self.cell_size();
    let (cx, cy) = bbox_center(bbox);

    let col = (cx / cell_w).floor().clamp(0.0, (ARCH_SLOTS - 1) as f32) as usize;
    let row = if cy < cell_h { 0 } else { 1 };
    let slot = row * ARCH_SLOTS + col;
    let arch = Arch::of_slot(slot);

    // 区域以所在网格单元为参考
    let cell_x = col as f32 * cell_w;
    let cell_y = row as f32 * cell_h;
    let mesial = cx < cell_x + cell_w / 2.0;
    let line = cell_y + cell_h * arch.occlusal_ratio();
    let region = Region::from_parts(mesial, arch.is_occlusal(cy, line));

    debug!(
      "检测框中心 ({:.1}, {:.1}) -> 网格 ({}, {}), 区域 {}",
      cx, cy, row, col, region
    );
    (slot, region)
  }
}
