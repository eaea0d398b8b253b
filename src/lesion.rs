// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/lesion.rs - 病灶归属与格式化
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

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  model::Detection,
  output::draw::{Draw, DrawFindingsOnImage},
  tooth::{LocateError, Region, ToothLocator},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LesionError {
  #[error("第 {index} 个检测框定位失败: {source}")]
  Locate {
    index: usize,
    #[source]
    source: LocateError,
  },
}

/// 归属到牙位后的单条龋齿发现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
  pub tooth_id: u8,
  pub region: Region,
  #[serde(rename = "conf")]
  pub confidence: f64,
  pub bbox: [i32; 4],
  #[serde(rename = "cls")]
  pub kind: String,
}

impl Finding {
  /// 标注用标签，`score` 取检测器的原始置信度
  pub fn label(&self, score: f64) -> String {
    format!("{} {} ({:.2})", self.tooth_id, self.region, score)
  }
}

// 吸收十进制小数转二进制的表示误差，使 0.0145 这类恰好居中的值向远离零的方向舍入
const CONFIDENCE_TIE_EPSILON: f64 = 1e-9;

/// 置信度保留三位小数，居中值远离零舍入
pub fn round_confidence(score: f64) -> f64 {
  let scaled = score * 1000.0;
  (scaled + CONFIDENCE_TIE_EPSILON.copysign(scaled)).round() / 1000.0
}

/// 像素坐标向零截断
pub fn truncate_bbox(bbox: &[f32; 4]) -> [i32; 4] {
  (*bbox).map(|v| v as i32)
}

#[derive(Default)]
pub struct LesionFormatter {
  draw: Draw,
}

impl LesionFormatter {
  pub fn new(draw: Draw) -> Self {
    Self { draw }
  }

  /// 逐个检测框定位牙位，生成与输入同序的发现列表，并在图像副本上标注。
  /// 原图不会被修改。
  pub fn format<L: ToothLocator + ?Sized>(
    &self,
    image: &RgbImage,
    detections: &[Detection],
    locator: &L,
  ) -> Result<(Vec<Finding>, RgbImage), LesionError> {
    let findings = detections
      .iter()
      .enumerate()
      .map(|(index, detection)| {
        let position = locator
          .locate(&detection.bbox)
          .map_err(|source| LesionError::Locate { index, source })?;
        let finding = Finding {
          tooth_id: position.tooth_id,
          region: position.region,
          confidence: round_confidence(detection.score),
          bbox: truncate_bbox(&detection.bbox),
          kind: detection.kind.clone(),
        };
        debug!("发现: {:?}", finding);
        Ok(finding)
      })
      .collect::<Result<Vec<_>, LesionError>>()?;

    let mut annotated = image.clone();
    let scores: Vec<f64> = detections.iter().map(|d| d.score).collect();
    self.draw.draw_findings_on_image(&mut annotated, &findings, &scores);

    info!("共 {} 处龋齿完成牙位归属", findings.len());
    Ok((findings, annotated))
  }
}

/// 使用默认绘制参数的便捷入口
pub fn format_findings<L: ToothLocator + ?Sized>(
  image: &RgbImage,
  detections: &[Detection],
  locator: &L,
) -> Result<(Vec<Finding>, RgbImage), LesionError> {
  LesionFormatter::default().format(image, detections, locator)
}
