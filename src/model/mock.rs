// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/model/mock.rs - 模拟检测器
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

use std::cell::RefCell;

use image::RgbImage;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{Detection, Detector},
  tooth::{Arch, SLOT_COUNT, TOOTH_TABLE},
};

const MOCK_DEFAULT_MAX_LESIONS: usize = 3;
const MOCK_BOX_HEIGHT: f32 = 0.12;
// 检测框顶边的取值范围（占图像高度的比例）
const MOCK_UPPER_TOP: (f32, f32) = (0.04, 0.30);
const MOCK_LOWER_TOP: (f32, f32) = (0.56, 0.84);
const MOCK_JITTER: f32 = 0.1; // 相对牙位宽度
const MOCK_SCORE_RANGE: (f64, f64) = (0.70, 0.95);

#[derive(Error, Debug)]
pub enum MockDetectorError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("参数 {key} 的取值无效: {value}")]
  InvalidParameter { key: String, value: String },
}

/// 在随机选出的牙位上生成 0..=max 个龋齿框。
/// 给定种子时输出序列可复现。
pub struct MockDetector {
  rng: RefCell<StdRng>,
  max_lesions: usize,
}

impl FromUrlWithScheme for MockDetector {
  const SCHEME: &'static str = "mock";
}

impl FromUrl for MockDetector {
  type Error = MockDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(MockDetectorError::SchemeMismatch(url.scheme().to_string()));
    }

    let mut seed = None;
    let mut max_lesions = MOCK_DEFAULT_MAX_LESIONS;
    for (key, value) in url.query_pairs() {
      let invalid = || MockDetectorError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
      };
      match &*key {
        "seed" => seed = Some(value.parse::<u64>().map_err(|_| invalid())?),
        "max" => max_lesions = value.parse::<usize>().map_err(|_| invalid())?,
        _ => debug!("忽略未知参数: {}={}", key, value),
      }
    }

    let detector = match seed {
      Some(seed) => MockDetector::new(seed),
      None => MockDetector::from_entropy(),
    };
    Ok(detector.with_max_lesions(max_lesions))
  }
}

impl MockDetector {
  pub fn new(seed: u64) -> Self {
    info!("创建模拟检测器，种子: {}", seed);
    Self {
      rng: RefCell::new(StdRng::seed_from_u64(seed)),
      max_lesions: MOCK_DEFAULT_MAX_LESIONS,
    }
  }

  pub fn from_entropy() -> Self {
    info!("创建模拟检测器，随机种子");
    Self {
      rng: RefCell::new(StdRng::from_entropy()),
      max_lesions: MOCK_DEFAULT_MAX_LESIONS,
    }
  }

  pub fn with_max_lesions(mut self, max_lesions: usize) -> Self {
    self.max_lesions = max_lesions.min(SLOT_COUNT);
    self
  }

  pub fn max_lesions(&self) -> usize {
    self.max_lesions
  }
}

impl Detector for MockDetector {
  type Error = MockDetectorError;

  fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, Self::Error> {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let mut rng = self.rng.borrow_mut();

    let count = rng.gen_range(0..=self.max_lesions);
    let slots = index::sample(&mut *rng, SLOT_COUNT, count);

    let mut detections = Vec::with_capacity(count);
    for slot in slots.iter() {
      let span = TOOTH_TABLE[slot];
      let jitter = MOCK_JITTER * span.width() * w;
      let (top_min, top_max) = match Arch::of_slot(slot) {
        Arch::Upper => MOCK_UPPER_TOP,
        Arch::Lower => MOCK_LOWER_TOP,
      };

      let x_min = (span.x_start * w + rng.gen_range(-jitter..=jitter)).max(0.0);
      let x_max = (span.x_end * w + rng.gen_range(-jitter..=jitter)).min(w);
      let y_min = rng.gen_range(top_min..=top_max) * h;
      let y_max = (y_min + MOCK_BOX_HEIGHT * h).min(h);

      let score = rng.gen_range(MOCK_SCORE_RANGE.0..=MOCK_SCORE_RANGE.1);
      let score = (score * 100.0).round() / 100.0;

      detections.push(Detection::caries([x_min, y_min, x_max, y_max], score));
    }

    debug!("模拟检测结果: {:?}", detections);
    Ok(detections)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_seed_gives_same_sequence() {
    let image = RgbImage::new(1000, 500);
    let a = MockDetector::new(42);
    let b = MockDetector::new(42);
    for _ in 0..5 {
      assert_eq!(a.detect(&image).unwrap(), b.detect(&image).unwrap());
    }
  }

  #[test]
  fn boxes_stay_inside_image_and_score_range() {
    let image = RgbImage::new(800, 400);
    let detector = MockDetector::new(3).with_max_lesions(6);
    for _ in 0..50 {
      let detections = detector.detect(&image).unwrap();
      assert!(detections.len() <= 6);
      for detection in detections {
        let [x_min, y_min, x_max, y_max] = detection.bbox;
        assert!(0.0 <= x_min && x_min < x_max && x_max <= 800.0);
        assert!(0.0 <= y_min && y_min < y_max && y_max <= 400.0);
        assert!((0.70..=0.95).contains(&detection.score));
        assert_eq!(detection.kind, "caries");
      }
    }
  }

  #[test]
  fn zero_max_never_detects() {
    let image = RgbImage::new(100, 100);
    let detector = MockDetector::new(1).with_max_lesions(0);
    assert!(detector.detect(&image).unwrap().is_empty());
  }

  #[test]
  fn url_parameters_are_parsed() {
    let detector = MockDetector::from_url(&Url::parse("mock:?seed=9&max=5").unwrap()).unwrap();
    assert_eq!(detector.max_lesions(), 5);

    let err = MockDetector::from_url(&Url::parse("mock:?seed=abc").unwrap()).err();
    assert!(matches!(
      err,
      Some(MockDetectorError::InvalidParameter { ref key, .. }) if key == "seed"
    ));

    let err = MockDetector::from_url(&Url::parse("replay:///tmp/a.json").unwrap()).err();
    assert!(matches!(err, Some(MockDetectorError::SchemeMismatch(_))));
  }
}
