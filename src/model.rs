// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/model.rs - 龋齿检测器
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
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

/// 目前唯一的检测类别
pub const CARIES_LABEL: &str = "caries";

pub trait Detector {
  type Error;

  fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]，像素坐标
  #[serde(rename = "conf")]
  pub score: f64,
  #[serde(rename = "cls", default = "caries_label")]
  pub kind: String,
}

fn caries_label() -> String {
  CARIES_LABEL.to_string()
}

impl Detection {
  pub fn caries(bbox: [f32; 4], score: f64) -> Self {
    Self {
      bbox,
      score,
      kind: caries_label(),
    }
  }
}

mod mock;
pub use self::mock::{MockDetector, MockDetectorError};

mod replay;
pub use self::replay::{ReplayDetector, ReplayDetectorError};

#[cfg(feature = "model_yolo26")]
mod yolo26;
#[cfg(feature = "model_yolo26")]
pub use self::yolo26::{Yolo26, Yolo26Builder, Yolo26Error};

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("模拟检测器错误: {0}")]
  MockDetectorError(#[from] MockDetectorError),
  #[error("回放检测器错误: {0}")]
  ReplayDetectorError(#[from] ReplayDetectorError),
  #[cfg(feature = "model_yolo26")]
  #[error("YOLO26 模型错误: {0}")]
  Yolo26Error(#[from] Yolo26Error),
  #[error("不支持的检测器方案: {0}")]
  SchemeMismatch(String),
}

/// 按 URL 方案选择的检测器
pub enum DetectorWrapper {
  Mock(MockDetector),
  Replay(ReplayDetector),
  #[cfg(feature = "model_yolo26")]
  Yolo26(Yolo26),
}

impl FromUrl for DetectorWrapper {
  type Error = DetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      MockDetector::SCHEME => Ok(DetectorWrapper::Mock(MockDetector::from_url(url)?)),
      ReplayDetector::SCHEME => Ok(DetectorWrapper::Replay(ReplayDetector::from_url(url)?)),
      #[cfg(feature = "model_yolo26")]
      Yolo26Builder::SCHEME => {
        let model = Yolo26Builder::from_url(url)?.build()?;
        Ok(DetectorWrapper::Yolo26(model))
      }
      other => Err(DetectorError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Detector for DetectorWrapper {
  type Error = DetectorError;

  fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
    match self {
      DetectorWrapper::Mock(detector) => detector.detect(image).map_err(DetectorError::from),
      DetectorWrapper::Replay(detector) => detector.detect(image).map_err(DetectorError::from),
      #[cfg(feature = "model_yolo26")]
      DetectorWrapper::Yolo26(detector) => detector.detect(image).map_err(DetectorError::from),
    }
  }
}
