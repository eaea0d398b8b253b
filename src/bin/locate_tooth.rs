// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/bin/locate_tooth.rs - 单个检测框的牙位查询
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

use anyhow::Result;
use clap::Parser;
use tracing::info;

use yazhen::{Layout, Notation, ToothLocator};

/// 查询检测框对应的牙位与牙面区域
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 图像宽度（像素）
  #[arg(long, value_name = "PIXELS")]
  pub width: u32,
  /// 图像高度（像素）
  #[arg(long, value_name = "PIXELS")]
  pub height: u32,
  /// 牙位记法 (universal, fdi)
  #[arg(long, default_value = "universal", value_name = "NOTATION")]
  pub notation: Notation,
  /// 牙位布局 (panoramic, grid)
  #[arg(long, default_value = "panoramic", value_name = "LAYOUT")]
  pub layout: Layout,
  /// 检测框像素坐标
  #[arg(
    num_args = 4,
    value_names = ["X1", "Y1", "X2", "Y2"],
    allow_negative_numbers = true,
    required = true
  )]
  pub bbox: Vec<f32>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let bbox: [f32; 4] = args
    .bbox
    .as_slice()
    .try_into()
    .map_err(|_| anyhow::anyhow!("检测框需要 4 个坐标，实际 {} 个", args.bbox.len()))?;

  let locator = args.layout.build(args.width, args.height, args.notation)?;
  let position = locator.locate(&bbox)?;

  info!(
    "槽位 {} ({}), 记法 {}",
    position.slot,
    position.arch().name(),
    args.notation
  );
  println!("{} {}", position.tooth_id, position.region);

  Ok(())
}
