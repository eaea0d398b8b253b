// 该文件是 Yazhen （牙诊） 项目的一部分。
// src/report.rs - 诊断报告
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

use std::fmt;

use crate::{
  lesion::Finding,
  tooth::{Arch, Notation},
};

const NO_FINDINGS_MESSAGE: &str =
  "Great news! No cavities were detected in your X-ray. Your teeth look healthy!";

/// 面向医生的文字报告
pub struct Report<'a> {
  findings: &'a [Finding],
  notation: Notation,
}

impl<'a> Report<'a> {
  pub fn new(findings: &'a [Finding], notation: Notation) -> Self {
    Self { findings, notation }
  }

  /// 面向患者的简短说明
  pub fn patient_message(&self) -> String {
    if self.findings.is_empty() {
      return NO_FINDINGS_MESSAGE.to_string();
    }

    let teeth = self
      .findings
      .iter()
      .map(|f| f.tooth_id.to_string())
      .collect::<Vec<_>>()
      .join(", ");
    let regions = self
      .findings
      .iter()
      .map(|f| f.region.code())
      .collect::<Vec<_>>()
      .join(", ");
    format!("We found suspected cavities on teeth {teeth} with surfaces {regions}.")
  }

  /// (上颌, 下颌) 发现数量
  pub fn arch_counts(&self) -> (usize, usize) {
    self
      .findings
      .iter()
      .filter_map(|f| self.notation.slot_of(f.tooth_id))
      .fold((0, 0), |(upper, lower), slot| match Arch::of_slot(slot) {
        Arch::Upper => (upper + 1, lower),
        Arch::Lower => (upper, lower + 1),
      })
  }

  fn counterpart(&self, tooth_id: u8) -> Option<(Notation, u8)> {
    let other = match self.notation {
      Notation::Universal => Notation::Fdi,
      Notation::Fdi => Notation::Universal,
    };
    let slot = self.notation.slot_of(tooth_id)?;
    Some((other, other.tooth_id(slot)))
  }
}

impl fmt::Display for Report<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Dental X-ray caries report")?;
    writeln!(f, "Notation: {}", self.notation)?;
    writeln!(f, "Suspected lesions: {}", self.findings.len())?;

    for (index, finding) in self.findings.iter().enumerate() {
      write!(f, "  {}. Tooth {}", index + 1, finding.tooth_id)?;
      if let Some((other, id)) = self.counterpart(finding.tooth_id) {
        write!(f, " ({} {})", other, id)?;
      }
      writeln!(
        f,
        ": {} surface, confidence {:.1}%",
        finding.region.surface_name(),
        finding.confidence * 100.0
      )?;
    }

    if !self.findings.is_empty() {
      let (upper, lower) = self.arch_counts();
      writeln!(f, "Upper arch: {upper}, lower arch: {lower}")?;
    }
    write!(f, "{}", self.patient_message())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tooth::Region;

  fn finding(tooth_id: u8, region: Region, confidence: f64) -> Finding {
    Finding {
      tooth_id,
      region,
      confidence,
      bbox: [0, 0, 10, 10],
      kind: "caries".to_string(),
    }
  }

  #[test]
  fn empty_report_is_reassuring() {
    let report = Report::new(&[], Notation::Universal);
    assert_eq!(report.patient_message(), NO_FINDINGS_MESSAGE);
    assert!(report.to_string().contains("Suspected lesions: 0"));
  }

  #[test]
  fn lists_teeth_and_surfaces() {
    let findings = vec![
      finding(14, Region::MesialOcclusal, 0.85),
      finding(19, Region::DistalOcclusal, 0.72),
    ];
    let report = Report::new(&findings, Notation::Universal);
    assert_eq!(
      report.patient_message(),
      "We found suspected cavities on teeth 14, 19 with surfaces MO, DO."
    );
    assert_eq!(report.arch_counts(), (1, 1));

    let text = report.to_string();
    assert!(text.contains("1. Tooth 14 (fdi 26): mesial-occlusal surface, confidence 85.0%"));
    assert!(text.contains("2. Tooth 19 (fdi 33): distal-occlusal surface, confidence 72.0%"));
  }

  #[test]
  fn fdi_report_shows_universal_counterpart() {
    let findings = vec![finding(21, Region::MesialBuccal, 0.6)];
    let text = Report::new(&findings, Notation::Fdi).to_string();
    assert!(text.contains("Tooth 21 (universal 9)"));
  }
}
