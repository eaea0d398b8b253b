// 该文件是 Yazhen （牙诊） 项目的一部分。
// tests/pipeline.rs - 端到端流程测试
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

use std::{cell::RefCell, convert::Infallible};

use image::{Rgb, RgbImage};
use url::Url;

use yazhen::{
  Detection, Finding, FromUrl, Layout, Notation, Region, ToothLocator, build_locator,
  format_findings,
  input::ImageFileInput,
  model::{DetectorWrapper, MockDetector, ReplayDetector},
  output::{OutputWrapper, Render},
  report::Report,
  task::{OneShotTask, Task},
};

#[derive(Default)]
struct Capture {
  rendered: RefCell<Option<(RgbImage, Vec<Finding>)>>,
}

impl Render<RgbImage, [Finding]> for &Capture {
  type Error = Infallible;

  fn render_result(&self, frame: &RgbImage, result: &[Finding]) -> Result<(), Self::Error> {
    *self.rendered.borrow_mut() = Some((frame.clone(), result.to_vec()));
    Ok(())
  }
}

fn xray(width: u32, height: u32) -> RgbImage {
  RgbImage::from_pixel(width, height, Rgb([40, 40, 40]))
}

#[test]
fn top_center_box_lands_on_central_incisor() {
  let locator = build_locator(1000, 500, Notation::Universal).unwrap();
  let position = locator.locate(&[480.0, 30.0, 520.0, 70.0]).unwrap();
  assert!(position.slot == 7 || position.slot == 8);
  assert!(position.tooth_id == 8 || position.tooth_id == 9);
  assert!(position.region.is_occlusal());
}

#[test]
fn fdi_and_universal_agree_on_slot() {
  let universal = build_locator(1000, 500, Notation::Universal).unwrap();
  let fdi = build_locator(1000, 500, Notation::Fdi).unwrap();
  let bbox = [40.0, 20.0, 90.0, 80.0];
  let a = universal.locate(&bbox).unwrap();
  let b = fdi.locate(&bbox).unwrap();
  assert_eq!(a.slot, 0);
  assert_eq!(a.slot, b.slot);
  assert_eq!(a.region, b.region);
  assert_eq!((a.tooth_id, b.tooth_id), (1, 11));
}

#[test]
fn replay_pipeline_keeps_order_and_annotates_copy() {
  let detections = vec![
    Detection::caries([700.0, 60.0, 760.0, 120.0], 0.912_4),
    Detection::caries([150.0, 380.0, 220.0, 450.0], 0.7),
    Detection::caries([480.0, 30.0, 520.0, 70.0], 0.655_8),
  ];
  let capture = Capture::default();
  let findings = OneShotTask::default()
    .run_task(
      ImageFileInput::from(xray(1000, 500)),
      ReplayDetector::new(detections.clone()),
      &capture,
    )
    .unwrap();

  assert_eq!(findings.len(), detections.len());
  let locator = build_locator(1000, 500, Notation::Universal).unwrap();
  for (finding, detection) in findings.iter().zip(&detections) {
    let position = locator.locate(&detection.bbox).unwrap();
    assert_eq!(finding.tooth_id, position.tooth_id);
    assert_eq!(finding.region, position.region);
    assert_eq!(finding.bbox, detection.bbox.map(|v| v as i32));
  }
  assert_eq!(findings[0].confidence, 0.912);
  assert_eq!(findings[2].confidence, 0.656);

  let rendered = capture.rendered.borrow();
  let (annotated, rendered_findings) = rendered.as_ref().unwrap();
  assert_eq!(rendered_findings, &findings);
  assert_eq!(annotated.dimensions(), (1000, 500));
  assert_ne!(annotated, &xray(1000, 500));
}

#[test]
fn empty_detection_list_returns_plain_copy() {
  let image = xray(320, 160);
  let locator = build_locator(320, 160, Notation::Fdi).unwrap();
  let (findings, annotated) = format_findings(&image, &[], &locator).unwrap();
  assert!(findings.is_empty());
  assert_eq!(annotated, image);
}

#[test]
fn seeded_mock_pipeline_is_reproducible() {
  let run = |seed: u64| {
    let capture = Capture::default();
    OneShotTask::default()
      .with_notation(Notation::Fdi)
      .run_task(
        ImageFileInput::from(xray(1200, 600)),
        MockDetector::new(seed).with_max_lesions(4),
        &capture,
      )
      .unwrap()
  };
  let first = run(2026);
  assert_eq!(first, run(2026));
  for finding in &first {
    assert!(Notation::Fdi.slot_of(finding.tooth_id).is_some());
    assert!(Region::ALL.contains(&finding.region));
  }
}

#[test]
fn grid_layout_through_task() {
  let detections = vec![Detection::caries([310.0, 10.0, 330.0, 50.0], 0.8)];
  let capture = Capture::default();
  let findings = OneShotTask::default()
    .with_layout(Layout::Grid)
    .run_task(
      ImageFileInput::from(xray(1600, 800)),
      ReplayDetector::new(detections),
      &capture,
    )
    .unwrap();
  assert_eq!(findings[0].tooth_id, 4);
  assert_eq!(findings[0].region, Region::MesialOcclusal);
}

#[test]
fn invalid_box_fails_the_task() {
  let detections = vec![Detection::caries([50.0, 50.0, 10.0, 90.0], 0.8)];
  let capture = Capture::default();
  let result = OneShotTask::default().run_task(
    ImageFileInput::from(xray(100, 100)),
    ReplayDetector::new(detections),
    &capture,
  );
  assert!(result.is_err());
  assert!(capture.rendered.borrow().is_none());
}

#[test]
fn url_configured_pipeline_writes_annotated_image() {
  let dir = tempfile::tempdir().unwrap();
  let input_path = dir.path().join("xray.png");
  let dets_path = dir.path().join("dets.json");
  let output_path = dir.path().join("out").join("annotated.png");

  xray(640, 320).save(&input_path).unwrap();
  std::fs::write(
    &dets_path,
    r#"[{"bbox": [100, 40, 150, 90], "conf": 0.93, "cls": "caries"},
        {"bbox": [400, 250, 460, 300], "conf": 0.71, "cls": "caries"}]"#,
  )
  .unwrap();

  let url = |scheme: &str, path: &std::path::Path| {
    Url::parse(&format!("{}://{}", scheme, path.display())).unwrap()
  };
  let input = ImageFileInput::from_url(&url("image", &input_path)).unwrap();
  let detector = DetectorWrapper::from_url(&url("replay", &dets_path)).unwrap();
  let output = OutputWrapper::from_url(&url("image", &output_path)).unwrap();

  let findings = OneShotTask::default()
    .run_task(input, detector, output)
    .unwrap();
  assert_eq!(findings.len(), 2);
  assert!(findings[0].tooth_id <= 16);
  assert!(findings[1].tooth_id > 16);

  let saved = image::open(&output_path).unwrap().to_rgb8();
  assert_eq!(saved.dimensions(), (640, 320));

  let report = Report::new(&findings, Notation::Universal).to_string();
  assert!(report.contains("Suspected lesions: 2"));
}
