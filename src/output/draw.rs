// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/output/draw.rs - 龋齿发现可视化
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

use std::sync::OnceLock;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};
use tracing::{debug, info, warn};

use crate::lesion::Finding;

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_OFFSET: i32 = 3; // 标签相对检测框左上角的偏移
const BOX_THICKNESS: i32 = 3;
const BOX_COLOR: [u8; 3] = [255, 0, 0]; // 红色
const BITMAP_SCALE: i32 = 2;
const BITMAP_ADVANCE: i32 = 4; // 字形宽 3 + 间隔 1

/// 环境变量指定的字体优先
pub const LABEL_FONT_ENV: &str = "YAZHEN_LABEL_FONT";

const FONT_CANDIDATES: &[&str] = &[
  "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/TTF/DejaVuSans.ttf",
  "/usr/share/fonts/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
  "/System/Library/Fonts/Supplemental/Arial.ttf",
  "/Library/Fonts/Arial.ttf",
  "C:\\Windows\\Fonts\\arial.ttf",
];

static LABEL_FONT: OnceLock<LabelFont> = OnceLock::new();

#[derive(Clone)]
pub enum LabelFont {
  TrueType(FontArc),
  /// 内置 3x5 点阵字形，找不到任何字体文件时使用
  Bitmap,
}

impl LabelFont {
  /// 依次尝试环境变量与候选路径，全部失败时退回点阵字形
  pub fn load() -> Self {
    let mut candidates: Vec<String> = std::env::var(LABEL_FONT_ENV).into_iter().collect();
    candidates.extend(FONT_CANDIDATES.iter().map(|path| path.to_string()));

    for path in &candidates {
      let Ok(data) = std::fs::read(path) else {
        debug!("字体不可用: {}", path);
        continue;
      };
      match FontArc::try_from_vec(data) {
        Ok(font) => {
          info!("使用标签字体: {}", path);
          return LabelFont::TrueType(font);
        }
        Err(e) => warn!("字体文件无效: {}, 错误: {}", path, e),
      }
    }

    warn!("未找到可用字体，使用内置点阵字形");
    LabelFont::Bitmap
  }

  /// 进程内只加载一次
  pub fn shared() -> Self {
    LABEL_FONT.get_or_init(LabelFont::load).clone()
  }
}

pub struct Draw {
  font_size: f32,
  box_thickness: i32,
  label_offset: i32,
  box_color: [u8; 3],
  font: LabelFont,
}

impl Default for Draw {
  fn default() -> Self {
    Self::with_font(LabelFont::shared())
  }
}

impl Draw {
  pub fn with_font(font: LabelFont) -> Self {
    Self {
      font_size: LABEL_FONT_SIZE,
      box_thickness: BOX_THICKNESS,
      label_offset: LABEL_OFFSET,
      box_color: BOX_COLOR,
      font,
    }
  }

  pub fn box_color(&self) -> Rgb<u8> {
    Rgb(self.box_color)
  }

  // 裁剪到图像范围内，完全退化时返回 None
  fn clip_to_image(image: &RgbImage, bbox: &[i32; 4]) -> Option<[i32; 4]> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
      return None;
    }
    let x_max_limit = i32::try_from(w - 1).unwrap_or(i32::MAX);
    let y_max_limit = i32::try_from(h - 1).unwrap_or(i32::MAX);
    let [x_min, y_min, x_max, y_max] = *bbox;
    let clipped = [
      x_min.clamp(0, x_max_limit),
      y_min.clamp(0, y_max_limit),
      x_max.clamp(0, x_max_limit),
      y_max.clamp(0, y_max_limit),
    ];
    if clipped[0] >= clipped[2] || clipped[1] >= clipped[3] {
      debug!("检测框 {:?} 裁剪后为空，跳过绘制", bbox);
      return None;
    }
    Some(clipped)
  }

  // 检测框为像素坐标 [x_min, y_min, x_max, y_max]，向内加粗
  fn draw_outline(&self, image: &mut RgbImage, bbox: &[i32; 4]) {
    let Some([x_min, y_min, x_max, y_max]) = Self::clip_to_image(image, bbox) else {
      return;
    };
    for t in 0..self.box_thickness {
      let width = x_max - x_min - 2 * t;
      let height = y_max - y_min - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, self.box_color());
    }
  }

  fn draw_label(&self, image: &mut RgbImage, x: i32, y: i32, label: &str) {
    match &self.font {
      LabelFont::TrueType(font) => {
        let scale = PxScale::from(self.font_size);
        draw_text_mut(image, self.box_color(), x, y, scale, font, label);
      }
      LabelFont::Bitmap => draw_bitmap_text(image, self.box_color(), x, y, label),
    }
  }

  /// `score` 为检测器给出的原始置信度，标签按两位小数显示
  pub fn draw_finding(&self, image: &mut RgbImage, finding: &Finding, score: f64) {
    let Some(clipped) = Self::clip_to_image(image, &finding.bbox) else {
      return;
    };
    self.draw_outline(image, &clipped);
    self.draw_label(
      image,
      clipped[0] + self.label_offset,
      clipped[1] + self.label_offset,
      &finding.label(score),
    );
  }
}

pub trait DrawFindingsOnImage {
  fn draw_findings_on_image(&self, image: &mut RgbImage, findings: &[Finding], scores: &[f64]);
}

impl DrawFindingsOnImage for Draw {
  fn draw_findings_on_image(&self, image: &mut RgbImage, findings: &[Finding], scores: &[f64]) {
    for (finding, score) in findings.iter().zip(scores) {
      self.draw_finding(image, finding, *score);
    }
  }
}

/// 每行 3 位，高位在左
fn bitmap_glyph(c: char) -> Option<[u8; 5]> {
  let rows = match c {
    '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
    '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
    '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
    '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
    '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
    '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
    '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
    '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
    '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
    '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
    'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
    'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
    'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
    'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
    '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
    ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
    '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
    ' ' => [0b000; 5],
    _ => return None,
  };
  Some(rows)
}

fn draw_bitmap_text(image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
  let cell = BITMAP_SCALE as u32;
  let mut pen_x = x;
  for c in text.chars() {
    if let Some(rows) = bitmap_glyph(c.to_ascii_uppercase()) {
      for (row, bits) in rows.iter().enumerate() {
        for col in 0..3 {
          if bits & (0b100 >> col) == 0 {
            continue;
          }
          let px = pen_x + col * BITMAP_SCALE;
          let py = y + row as i32 * BITMAP_SCALE;
          draw_filled_rect_mut(image, Rect::at(px, py).of_size(cell, cell), color);
        }
      }
    }
    pen_x += BITMAP_ADVANCE * BITMAP_SCALE;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tooth::Region;

  fn finding(bbox: [i32; 4]) -> Finding {
    Finding {
      tooth_id: 8,
      region: Region::MesialOcclusal,
      confidence: 0.857,
      bbox,
      kind: "caries".to_string(),
    }
  }

  #[test]
  fn outline_is_three_pixels_thick() {
    let draw = Draw::with_font(LabelFont::Bitmap);
    let mut image = RgbImage::new(100, 100);
    draw.draw_outline(&mut image, &[10, 10, 60, 60]);
    let red = Rgb(BOX_COLOR);
    for t in 0..3 {
      assert_eq!(*image.get_pixel(10 + t, 40), red);
    }
    assert_eq!(*image.get_pixel(13, 40), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(35, 35), Rgb([0, 0, 0]));
  }

  #[test]
  fn boxes_crossing_the_border_do_not_panic() {
    let draw = Draw::with_font(LabelFont::Bitmap);
    let mut image = RgbImage::new(50, 50);
    draw.draw_finding(&mut image, &finding([-20, -20, 80, 80]), 0.9);
    draw.draw_finding(&mut image, &finding([45, 45, 46, 46]), 0.9);
  }

  #[test]
  fn far_out_box_is_clipped_to_the_image() {
    let draw = Draw::with_font(LabelFont::Bitmap);
    let mut image = RgbImage::new(1000, 500);
    draw.draw_finding(&mut image, &finding([i32::MIN, 10, 100, 60]), 0.9);
    let red = Rgb(BOX_COLOR);
    assert_eq!(*image.get_pixel(0, 30), red);
    assert_eq!(*image.get_pixel(99, 30), red);
    assert_eq!(*image.get_pixel(50, 10), red);

    let mut image = RgbImage::new(100, 100);
    draw.draw_finding(&mut image, &finding([-50, -50, i32::MAX, i32::MAX]), 0.9);
    assert_eq!(*image.get_pixel(50, 98), red);
    assert_eq!(*image.get_pixel(98, 50), red);
  }

  #[test]
  fn box_entirely_clipped_away_draws_nothing() {
    let draw = Draw::with_font(LabelFont::Bitmap);
    let mut image = RgbImage::new(40, 40);
    draw.draw_finding(&mut image, &finding([i32::MIN, 5, -10, 30]), 0.9);
    assert!(image.pixels().all(|p| p.0 == [0, 0, 0]));
  }

  #[test]
  fn bitmap_label_marks_pixels_near_the_corner() {
    let draw = Draw::with_font(LabelFont::Bitmap);
    let mut image = RgbImage::new(200, 100);
    draw.draw_findings_on_image(&mut image, &[finding([20, 20, 190, 90])], &[0.857]);
    // "8" 的首行在 (23, 23) 起始
    assert_eq!(*image.get_pixel(23, 23), Rgb(BOX_COLOR));
  }

  #[test]
  fn every_label_character_has_a_glyph() {
    for c in "0123456789 MODB().".chars() {
      assert!(bitmap_glyph(c).is_some(), "{c}");
    }
  }
}
