// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;
use yazhen::{Layout, Notation};

/// Yazhen 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测器
  /// 支持方案:
  /// - 模拟: mock:?seed=42&max=3
  /// - 回放: replay:///path/to/detections.json
  /// - 模型: yolo26:///path/to/model.rknn?conf=0.5（需启用 model_yolo26）
  #[arg(long, default_value = "mock:", value_name = "DETECTOR")]
  pub detector: Url,

  /// 输入 X 光图像，例如 image:///path/to/xray.png
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出
  /// 支持方案:
  /// - 标注图像: image:///path/to/annotated.png
  /// - JSON 发现列表: stdout: 或 stdout:?pretty
  /// 非 stdout 输出时，发现列表仍以单行 JSON 打印到标准输出
  #[arg(long, default_value = "stdout:", value_name = "OUTPUT")]
  pub output: Url,

  /// 牙位记法 (universal, fdi)
  #[arg(long, default_value = "universal", value_name = "NOTATION")]
  pub notation: Notation,

  /// 牙位布局 (panoramic, grid)
  #[arg(long, default_value = "panoramic", value_name = "LAYOUT")]
  pub layout: Layout,

  /// 在标准输出打印文字报告
  #[arg(long)]
  pub report: bool,
}
