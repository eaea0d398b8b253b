// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/tooth.rs - 牙位定位
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

//! 把检测框映射到牙位编号和牙面区域。
//!
//! 32 个牙位槽：0..16 为上颌（从左到右），16..32 为下颌（从左到右）。
//! 槽位序号与对外的牙位编号之间的换算由 [`Notation`] 决定。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod grid;
mod panoramic;
mod table;

pub use self::grid::GridLocator;
pub use self::panoramic::PanoramicLocator;
pub use self::table::{TOOTH_TABLE, ToothSpan};

/// 牙位槽总数
pub const SLOT_COUNT: usize = 32;
/// 单个牙弓的牙位槽数
pub const ARCH_SLOTS: usize = 16;

/// 上下颌分界（占图像高度的比例）
const ARCH_SPLIT_RATIO: f32 = 0.5;
const UPPER_OCCLUSAL_RATIO: f32 = 0.33;
const LOWER_OCCLUSAL_RATIO: f32 = 0.66;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocateError {
  #[error("图像尺寸无效: {width}x{height}")]
  ZeroDimension { width: u32, height: u32 },
  #[error("边界框包含非有限坐标: {0:?}")]
  NonFinite([f32; 4]),
  #[error("边界框退化或坐标颠倒: {0:?}")]
  Degenerate([f32; 4]),
  #[error("边界框 {bbox:?} 完全位于 {width}x{height} 图像之外")]
  OutsideImage {
    bbox: [f32; 4],
    width: u32,
    height: u32,
  },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
  #[error("未知的牙位记法: {0}（可选: universal, fdi）")]
  UnknownNotation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
  #[error("未知的牙位布局: {0}（可选: panoramic, grid）")]
  UnknownLayout(String),
}

/// 牙位记法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
  /// 通用记法，1-32
  #[default]
  Universal,
  /// FDI 两位数记法，象限 + 序号
  Fdi,
}

impl Notation {
  /// 槽位序号转为对外的牙位编号
  pub fn tooth_id(&self, slot: usize) -> u8 {
    debug_assert!(slot < SLOT_COUNT, "牙位槽越界: {}", slot);
    match self {
      Notation::Universal => (slot + 1) as u8,
      Notation::Fdi => {
        let quadrant = slot / 8 + 1;
        let position = slot % 8 + 1;
        (quadrant * 10 + position) as u8
      }
    }
  }

  /// 牙位编号反查槽位序号，编号无效时返回 `None`
  pub fn slot_of(&self, tooth_id: u8) -> Option<usize> {
    match self {
      Notation::Universal => match tooth_id {
        1..=32 => Some(tooth_id as usize - 1),
        _ => None,
      },
      Notation::Fdi => {
        let quadrant = (tooth_id / 10) as usize;
        let position = (tooth_id % 10) as usize;
        if (1..=4).contains(&quadrant) && (1..=8).contains(&position) {
          Some((quadrant - 1) * 8 + position - 1)
        } else {
          None
        }
      }
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Notation::Universal => "universal",
      Notation::Fdi => "fdi",
    }
  }
}

impl fmt::Display for Notation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Notation {
  type Err = NotationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "universal" => Ok(Notation::Universal),
      "fdi" => Ok(Notation::Fdi),
      _ => Err(NotationError::UnknownNotation(s.to_string())),
    }
  }
}

/// 牙弓
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
  Upper,
  Lower,
}

impl Arch {
  pub fn of_slot(slot: usize) -> Self {
    if slot < ARCH_SLOTS {
      Arch::Upper
    } else {
      Arch::Lower
    }
  }

  /// 按检测框纵向中心判断所在牙弓
  pub fn of_center(cy: f32, height: f32) -> Self {
    if cy < height * ARCH_SPLIT_RATIO {
      Arch::Upper
    } else {
      Arch::Lower
    }
  }

  /// 咬合面参考线位置（占参考区域高度的比例）
  pub fn occlusal_ratio(&self) -> f32 {
    match self {
      Arch::Upper => UPPER_OCCLUSAL_RATIO,
      Arch::Lower => LOWER_OCCLUSAL_RATIO,
    }
  }

  /// 上颌在参考线之上为咬合侧，下颌在参考线之下为咬合侧
  pub fn is_occlusal(&self, cy: f32, line: f32) -> bool {
    match self {
      Arch::Upper => cy < line,
      Arch::Lower => cy > line,
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Arch::Upper => "upper",
      Arch::Lower => "lower",
    }
  }
}

/// 牙面区域：近中/远中 × 咬合面/颊舌面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
  #[serde(rename = "MO")]
  MesialOcclusal,
  #[serde(rename = "DO")]
  DistalOcclusal,
  #[serde(rename = "MB")]
  MesialBuccal,
  #[serde(rename = "DB")]
  DistalBuccal,
}

impl Region {
  pub const ALL: [Region; 4] = [
    Region::MesialOcclusal,
    Region::DistalOcclusal,
    Region::MesialBuccal,
    Region::DistalBuccal,
  ];

  pub fn from_parts(mesial: bool, occlusal: bool) -> Self {
    match (mesial, occlusal) {
      (true, true) => Region::MesialOcclusal,
      (false, true) => Region::DistalOcclusal,
      (true, false) => Region::MesialBuccal,
      (false, false) => Region::DistalBuccal,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Region::MesialOcclusal => "MO",
      Region::DistalOcclusal => "DO",
      Region::MesialBuccal => "MB",
      Region::DistalBuccal => "DB",
    }
  }

  pub fn is_mesial(&self) -> bool {
    matches!(self, Region::MesialOcclusal | Region::MesialBuccal)
  }

  pub fn is_occlusal(&self) -> bool {
    matches!(self, Region::MesialOcclusal | Region::DistalOcclusal)
  }

  /// 区域对应的牙面名称，例如 "mesial-occlusal"
  pub fn surface_name(&self) -> &'static str {
    match self {
      Region::MesialOcclusal => "mesial-occlusal",
      Region::DistalOcclusal => "distal-occlusal",
      Region::MesialBuccal => "mesial-buccal",
      Region::DistalBuccal => "distal-buccal",
    }
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// 一次定位的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToothPosition {
  pub slot: usize,
  pub tooth_id: u8,
  pub region: Region,
}

impl ToothPosition {
  pub fn arch(&self) -> Arch {
    Arch::of_slot(self.slot)
  }
}

pub trait ToothLocator {
  /// 构建时的图像尺寸 (W, H)
  fn image_size(&self) -> (u32, u32);

  fn notation(&self) -> Notation;

  /// 对已校验的检测框给出 (槽位, 区域)
  fn locate_slot(&self, bbox: &[f32; 4]) -> (usize, Region);

  /// bbox 为像素坐标 [x_min, y_min, x_max, y_max]
  fn locate(&self, bbox: &[f32; 4]) -> Result<ToothPosition, LocateError> {
    let (width, height) = self.image_size();
    validate_bbox(bbox, width, height)?;
    let (slot, region) = self.locate_slot(bbox);
    Ok(ToothPosition {
      slot,
      tooth_id: self.notation().tooth_id(slot),
      region,
    })
  }
}

impl<L: ToothLocator + ?Sized> ToothLocator for Box<L> {
  fn image_size(&self) -> (u32, u32) {
    (**self).image_size()
  }

  fn notation(&self) -> Notation {
    (**self).notation()
  }

  fn locate_slot(&self, bbox: &[f32; 4]) -> (usize, Region) {
    (**self).locate_slot(bbox)
  }
}

/// 构建基于全景片牙位表的定位器
pub fn build_locator(
  width: u32,
  height: u32,
  notation: Notation,
) -> Result<PanoramicLocator, LocateError> {
  PanoramicLocator::new(width, height, notation)
}

/// 牙位布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
  /// 按解剖位置的牙位表做最近中心搜索
  #[default]
  Panoramic,
  /// 2x16 等分网格
  Grid,
}

impl Layout {
  pub fn build(
    &self,
    width: u32,
    height: u32,
    notation: Notation,
  ) -> Result<Box<dyn ToothLocator>, LocateError> {
    Ok(match self {
      Layout::Panoramic => Box::new(PanoramicLocator::new(width, height, notation)?),
      Layout::Grid => Box::new(GridLocator::new(width, height, notation)?),
    })
  }
}

impl FromStr for Layout {
  type Err = LayoutError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "panoramic" => Ok(Layout::Panoramic),
      "grid" => Ok(Layout::Grid),
      _ => Err(LayoutError::UnknownLayout(s.to_string())),
    }
  }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), LocateError> {
  if width == 0 || height == 0 {
    return Err(LocateError::ZeroDimension { width, height });
  }
  Ok(())
}

pub(crate) fn bbox_center(bbox: &[f32; 4]) -> (f32, f32) {
  ((bbox[0] + bbox[2]) / 2.0, (bbox[1] + bbox[3]) / 2.0)
}

/// 拒绝非有限、退化、颠倒以及完全落在图像外的检测框。
/// 部分越界的检测框允许通过。
pub fn validate_bbox(bbox: &[f32; 4], width: u32, height: u32) -> Result<(), LocateError> {
  if bbox.iter().any(|v| !v.is_finite()) {
    return Err(LocateError::NonFinite(*bbox));
  }

  let [x_min, y_min, x_max, y_max] = *bbox;
  if x_min >= x_max || y_min >= y_max {
    return Err(LocateError::Degenerate(*bbox));
  }

  let (w, h) = (width as f32, height as f32);
  if x_max <= 0.0 || y_max <= 0.0 || x_min >= w || y_min >= h {
    return Err(LocateError::OutsideImage {
      bbox: *bbox,
      width,
      height,
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn universal_ids_run_from_one_to_thirty_two() {
    assert_eq!(Notation::Universal.tooth_id(0), 1);
    assert_eq!(Notation::Universal.tooth_id(15), 16);
    assert_eq!(Notation::Universal.tooth_id(31), 32);
  }

  #[test]
  fn fdi_ids_follow_quadrant_scheme() {
    assert_eq!(Notation::Fdi.tooth_id(0), 11);
    assert_eq!(Notation::Fdi.tooth_id(7), 18);
    assert_eq!(Notation::Fdi.tooth_id(8), 21);
    assert_eq!(Notation::Fdi.tooth_id(15), 28);
    assert_eq!(Notation::Fdi.tooth_id(16), 31);
    assert_eq!(Notation::Fdi.tooth_id(23), 38);
    assert_eq!(Notation::Fdi.tooth_id(24), 41);
    assert_eq!(Notation::Fdi.tooth_id(31), 48);
  }

  #[test]
  fn slot_of_inverts_tooth_id() {
    for notation in [Notation::Universal, Notation::Fdi] {
      for slot in 0..SLOT_COUNT {
        let id = notation.tooth_id(slot);
        assert_eq!(notation.slot_of(id), Some(slot), "{notation} slot {slot}");
      }
    }
    assert_eq!(Notation::Universal.slot_of(0), None);
    assert_eq!(Notation::Universal.slot_of(33), None);
    assert_eq!(Notation::Fdi.slot_of(19), None);
    assert_eq!(Notation::Fdi.slot_of(51), None);
    assert_eq!(Notation::Fdi.slot_of(10), None);
  }

  #[test]
  fn notation_parsing_is_case_insensitive_and_strict() {
    assert_eq!("universal".parse::<Notation>(), Ok(Notation::Universal));
    assert_eq!(" FDI ".parse::<Notation>(), Ok(Notation::Fdi));
    assert_eq!(
      "palmer".parse::<Notation>(),
      Err(NotationError::UnknownNotation("palmer".to_string()))
    );
  }

  #[test]
  fn layout_parsing() {
    assert_eq!("grid".parse::<Layout>(), Ok(Layout::Grid));
    assert_eq!("Panoramic".parse::<Layout>(), Ok(Layout::Panoramic));
    assert!("radial".parse::<Layout>().is_err());
  }

  #[test]
  fn region_codes_and_parts() {
    assert_eq!(Region::from_parts(true, true).code(), "MO");
    assert_eq!(Region::from_parts(false, true).code(), "DO");
    assert_eq!(Region::from_parts(true, false).code(), "MB");
    assert_eq!(Region::from_parts(false, false).code(), "DB");
    for region in Region::ALL {
      assert_eq!(Region::from_parts(region.is_mesial(), region.is_occlusal()), region);
    }
    assert_eq!(
      serde_json::to_string(&Region::DistalBuccal).unwrap(),
      "\"DB\""
    );
  }

  #[test]
  fn validation_rejects_bad_boxes() {
    assert!(validate_bbox(&[10.0, 10.0, 20.0, 20.0], 100, 100).is_ok());
    assert!(validate_bbox(&[-5.0, -5.0, 5.0, 5.0], 100, 100).is_ok());
    assert_eq!(
      validate_bbox(&[20.0, 10.0, 10.0, 20.0], 100, 100),
      Err(LocateError::Degenerate([20.0, 10.0, 10.0, 20.0]))
    );
    assert!(matches!(
      validate_bbox(&[10.0, 10.0, 10.0, 20.0], 100, 100),
      Err(LocateError::Degenerate(_))
    ));
    assert!(matches!(
      validate_bbox(&[f32::NAN, 10.0, 20.0, 20.0], 100, 100),
      Err(LocateError::NonFinite(_))
    ));
    assert!(matches!(
      validate_bbox(&[120.0, 10.0, 130.0, 20.0], 100, 100),
      Err(LocateError::OutsideImage { .. })
    ));
    assert!(matches!(
      validate_bbox(&[10.0, -30.0, 20.0, 0.0], 100, 100),
      Err(LocateError::OutsideImage { .. })
    ));
  }

  #[test]
  fn zero_sized_image_is_a_configuration_error() {
    assert_eq!(
      build_locator(0, 500, Notation::Universal).err(),
      Some(LocateError::ZeroDimension {
        width: 0,
        height: 500
      })
    );
    assert!(Layout::Grid.build(640, 0, Notation::Fdi).is_err());
  }
}
