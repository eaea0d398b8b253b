// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use yazhen::{
  FromUrl,
  input::ImageFileInput,
  model::DetectorWrapper,
  output::{OutputWrapper, StdoutOutput},
  report::Report,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  // 标准输出留给 JSON 与报告
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = args::Args::parse();

  info!("检测器: {}", args.detector);
  info!("输入来源: {}", args.input);
  info!("输出: {}", args.output);
  info!("牙位记法: {}, 布局: {:?}", args.notation, args.layout);

  let input = ImageFileInput::from_url(&args.input)?;
  let detector = DetectorWrapper::from_url(&args.detector)?;
  let output = OutputWrapper::from_url(&args.output)?;
  let echo_findings = !output.prints_findings();

  let findings = OneShotTask::default()
    .with_layout(args.layout)
    .with_notation(args.notation)
    .run_task(input, detector, output)?;

  info!("处理完成，共 {} 处疑似龋齿", findings.len());

  // 输出阶段不是 stdout 时，发现列表仍以 JSON 打印
  if echo_findings {
    StdoutOutput::new(false).write_findings(&mut std::io::stdout().lock(), &findings)?;
  }

  if args.report {
    println!("{}", Report::new(&findings, args.notation));
  }

  Ok(())
}
