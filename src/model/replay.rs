// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/model/replay.rs - 回放检测器
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

use std::path::Path;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{Detection, Detector},
  url_file_path,
};

#[derive(Error, Debug)]
pub enum ReplayDetectorError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("检测结果解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 每次调用都返回同一组检测结果
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
  detections: Vec<Detection>,
}

impl FromUrlWithScheme for ReplayDetector {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayDetector {
  type Error = ReplayDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayDetectorError::SchemeMismatch(
        url.scheme().to_string(),
      ));
    }

    Self::from_path(url_file_path(url))
  }
}

impl ReplayDetector {
  pub fn new(detections: Vec<Detection>) -> Self {
    Self { detections }
  }

  /// 读取 JSON 数组，元素形如 `{"bbox": [x1, y1, x2, y2], "conf": 0.9, "cls": "caries"}`
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayDetectorError> {
    let path = path.as_ref();
    info!("加载回放检测结果: {}", path.display());
    let data = std::fs::read_to_string(path)?;
    Self::from_json_str(&data)
  }

  pub fn from_json_str(data: &str) -> Result<Self, ReplayDetectorError> {
    let detections: Vec<Detection> = serde_json::from_str(data)?;
    debug!("回放检测结果数量: {}", detections.len());
    Ok(Self::new(detections))
  }

  pub fn detections(&self) -> &[Detection] {
    &self.detections
  }
}

impl Detector for ReplayDetector {
  type Error = ReplayDetectorError;

  fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
    Ok(self.detections.clone())
  }
}
