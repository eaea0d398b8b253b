// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/task.rs - 分析任务
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
use tracing::info;

use crate::{
  lesion::{Finding, LesionFormatter},
  model::Detector,
  output::Render,
  tooth::{Layout, Notation},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 取第一张图像：检测、牙位归属、标注、输出
#[derive(Default)]
pub struct OneShotTask {
  layout: Layout,
  notation: Notation,
  formatter: LesionFormatter,
}

impl OneShotTask {
  pub fn with_layout(mut self, layout: Layout) -> Self {
    self.layout = layout;
    self
  }

  pub fn with_notation(mut self, notation: Notation) -> Self {
    self.notation = notation;
    self
  }

  pub fn with_formatter(mut self, formatter: LesionFormatter) -> Self {
    self.formatter = formatter;
    self
  }
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = RgbImage>,
  M: Detector<Error = ME>,
  O: Render<RgbImage, [Finding], Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = Vec<Finding>;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let image = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;
    let (width, height) = image.dimensions();
    info!("输入图像获取成功: {}x{}，开始检测...", width, height);

    let now = std::time::Instant::now();
    let detections = model.detect(&image)?;
    info!(
      "检测完成，{} 个候选框，耗时: {:.2?}",
      detections.len(),
      now.elapsed()
    );

    let locator = self.layout.build(width, height, self.notation)?;
    let (findings, annotated) = self.formatter.format(&image, &detections, &locator)?;

    output.render_result(&annotated, findings.as_slice())?;
    info!("渲染完成，总耗时: {:.2?}", now.elapsed());

    Ok(findings)
  }
}
