// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/output/stdout.rs - 发现列表输出到标准输出
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

use std::io::Write;

use image::RgbImage;
use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, lesion::Finding, output::Render};

#[derive(Error, Debug)]
pub enum StdoutOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 以 JSON 打印发现列表，不保存图像。`stdout:?pretty` 输出缩进格式。
pub struct StdoutOutput {
  pretty: bool,
}

impl FromUrlWithScheme for StdoutOutput {
  const SCHEME: &'static str = "stdout";
}

impl FromUrl for StdoutOutput {
  type Error = StdoutOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(StdoutOutputError::SchemeMismatch(url.scheme().to_string()));
    }
    let pretty = url.query_pairs().any(|(k, _)| k == "pretty");
    Ok(StdoutOutput { pretty })
  }
}

impl StdoutOutput {
  pub fn new(pretty: bool) -> Self {
    Self { pretty }
  }

  pub fn write_findings<W: Write>(
    &self,
    writer: &mut W,
    findings: &[Finding],
  ) -> Result<(), StdoutOutputError> {
    if self.pretty {
      serde_json::to_writer_pretty(&mut *writer, findings)?;
    } else {
      serde_json::to_writer(&mut *writer, findings)?;
    }
    writeln!(writer)?;
    Ok(())
  }
}

impl Render<RgbImage, [Finding]> for StdoutOutput {
  type Error = StdoutOutputError;

  fn render_result(&self, _frame: &RgbImage, result: &[Finding]) -> Result<(), Self::Error> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    self.write_findings(&mut lock, result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tooth::Region;

  #[test]
  fn writes_one_json_line() {
    let output = StdoutOutput::from_url(&Url::parse("stdout:").unwrap()).unwrap();
    let findings = vec![Finding {
      tooth_id: 3,
      region: Region::DistalBuccal,
      confidence: 0.7,
      bbox: [0, 0, 5, 5],
      kind: "caries".to_string(),
    }];
    let mut buffer = Vec::new();
    output.write_findings(&mut buffer, &findings).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(
      text,
      "[{\"tooth_id\":3,\"region\":\"DB\",\"conf\":0.7,\"bbox\":[0,0,5,5],\"cls\":\"caries\"}]\n"
    );
  }

  #[test]
  fn pretty_output_is_indented() {
    let mut buffer = Vec::new();
    StdoutOutput::new(true).write_findings(&mut buffer, &[]).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");

    let findings = vec![Finding {
      tooth_id: 30,
      region: Region::MesialBuccal,
      confidence: 0.9,
      bbox: [1, 2, 3, 4],
      kind: "caries".to_string(),
    }];
    let mut buffer = Vec::new();
    StdoutOutput::new(true).write_findings(&mut buffer, &findings).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.starts_with("[\n  {\n"));
    assert!(text.ends_with("]\n"));
  }
}
