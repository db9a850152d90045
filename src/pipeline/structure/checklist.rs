//! Section checklists per language and audience.
//!
//! Each marker is an alternation of headings that count as the section
//! being present. Only ja and zh have tables; other languages are checked
//! against ja.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Audience, Language};

/// One required section and the pattern that detects it.
pub struct SectionMarker {
    pub pattern: &'static str,
    re: Regex,
}

impl SectionMarker {
    fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            re: Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
        }
    }

    pub fn is_present(&self, text: &str) -> bool {
        self.re.is_match(text)
    }
}

fn markers(patterns: &[&'static str]) -> Vec<SectionMarker> {
    patterns.iter().map(|p| SectionMarker::new(p)).collect()
}

static PATIENT_JA: LazyLock<Vec<SectionMarker>> = LazyLock::new(|| {
    markers(&[
        "要約|まとめ",
        "今すぐ|今日",
        "1週間|七日|プラン",
        "家庭血圧|家庭測定|記録",
        "受診の目安|外来",
        "緊急受診|救急|119",
        "医師へ伝える|質問",
        "出典|参考文献",
    ])
});

static PATIENT_ZH: LazyLock<Vec<SectionMarker>> = LazyLock::new(|| {
    markers(&[
        "摘要|要点",
        "今天|立刻|现在",
        "一周|7天|计划",
        "家庭|自测|监测|记录",
        "就诊|门诊",
        "紧急|急诊|呼救",
        "向医生|问题",
        "参考|参考文献|出典",
    ])
});

static DOCTOR_JA: LazyLock<Vec<SectionMarker>> = LazyLock::new(|| {
    markers(&[
        "要約|機序|病因",
        "生活|ライフスタイル",
        "薬物|薬物療法",
        "特定集団|併存症",
        "目標|ターゲット",
        "モニタ|監視|監測",
        "新規治療|新興療法|技術",
        "出典|参考文献",
    ])
});

static DOCTOR_ZH: LazyLock<Vec<SectionMarker>> = LazyLock::new(|| {
    markers(&[
        "病因",
        "生活方式",
        "药物",
        "特殊人群",
        "目标",
        "监测",
        "新兴疗法",
        "参考文献",
    ])
});

/// Ordered checklist for a language and audience.
pub fn checklist(lang: Language, audience: Audience) -> &'static [SectionMarker] {
    match (lang.checklist_language(), audience) {
        (Language::Zh, Audience::Patient) => &PATIENT_ZH,
        (Language::Zh, Audience::Doctor) => &DOCTOR_ZH,
        (_, Audience::Patient) => &PATIENT_JA,
        (_, Audience::Doctor) => &DOCTOR_JA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_checklist_has_eight_sections() {
        for lang in [Language::Ja, Language::Zh] {
            for audience in [Audience::Doctor, Audience::Patient] {
                assert_eq!(checklist(lang, audience).len(), 8);
            }
        }
    }

    #[test]
    fn other_languages_use_japanese_tables() {
        let ko = checklist(Language::Ko, Audience::Patient);
        let ja = checklist(Language::Ja, Audience::Patient);
        assert_eq!(ko[0].pattern, ja[0].pattern);
        let en = checklist(Language::En, Audience::Doctor);
        assert_eq!(en[0].pattern, "要約|機序|病因");
    }

    #[test]
    fn markers_are_case_insensitive() {
        let marker = SectionMarker::new("hba1c");
        assert!(marker.is_present("HbA1c target"));
    }
}
