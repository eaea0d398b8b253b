// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/tooth/table.rs - 全景片牙位表
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

use super::{ARCH_SLOTS, SLOT_COUNT};

/// 牙位在图像宽度上的横向范围（比例坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToothSpan {
  pub x_start: f32,
  pub x_end: f32,
}

impl ToothSpan {
  const fn new(x_start: f32, x_end: f32) -> Self {
    Self { x_start, x_end }
  }

  pub const fn center(&self) -> f32 {
    (self.x_start + self.x_end) / 2.0
  }

  pub const fn width(&self) -> f32 {
    self.x_end - self.x_start
  }
}

// 单个牙弓从左到右：磨牙较宽，切牙较窄，左右对称
const ARCH_LAYOUT: [ToothSpan; ARCH_SLOTS] = [
  ToothSpan::new(0.035, 0.105), // 第三磨牙
  ToothSpan::new(0.105, 0.175), // 第二磨牙
  ToothSpan::new(0.175, 0.245), // 第一磨牙
  ToothSpan::new(0.245, 0.300), // 第二前磨牙
  ToothSpan::new(0.300, 0.355), // 第一前磨牙
  ToothSpan::new(0.355, 0.405), // 尖牙
  ToothSpan::new(0.405, 0.450), // 侧切牙
  ToothSpan::new(0.450, 0.500), // 中切牙
  ToothSpan::new(0.500, 0.550), // 中切牙
  ToothSpan::new(0.550, 0.595), // 侧切牙
  ToothSpan::new(0.595, 0.645), // 尖牙
  ToothSpan::new(0.645, 0.700), // 第一前磨牙
  ToothSpan::new(0.700, 0.755), // 第二前磨牙
  ToothSpan::new(0.755, 0.825), // 第一磨牙
  ToothSpan::new(0.825, 0.895), // 第二磨牙
  ToothSpan::new(0.895, 0.965), // 第三磨牙
];

const fn build_table() -> [ToothSpan; SLOT_COUNT] {
  let mut table = [ToothSpan::new(0.0, 0.0); SLOT_COUNT];
  let mut slot = 0;
  while slot < SLOT_COUNT {
    table[slot] = ARCH_LAYOUT[slot % ARCH_SLOTS];
    slot += 1;
  }
  table
}

/// 32 个牙位槽的横向范围，上下颌共用同一排布
pub const TOOTH_TABLE: [ToothSpan; SLOT_COUNT] = build_table();
