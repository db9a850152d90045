//! System prompt registry: auto system prompts by language and topic,
//! and the fixed directives stacked in front of every conversation.

use crate::models::{Audience, Language};
use crate::pipeline::structure::Topic;

// ═══════════════════════════════════════════════════════════
// Auto system prompt
// ═══════════════════════════════════════════════════════════

const SYSTEM_BASE_JA: &str = "\
あなたは臨床ガイドラインに基づき日本語のみで回答する医療アシスタントです。 \
出力構成: 1) 要約 2) 推奨事項（具体的数値を含む箇条書き） 3) 注意・禁忌 4) 受診目安 5) 参照。 \
要件: 真偽一貫性、曖昧な点は『不確実』と明記。参照は質問に直接関連する一次資料（ガイドライン、学会声明、政府・公的機関、系統的レビュー）に限定。 \
参照表記: 各項目にタイトル（可能なら日本語、原題も併記）とURLを含め、本文の [n] と対応付ける。";

const SYSTEM_BASE_ZH: &str = "\
你是一名依据临床指南进行解答的医疗助手，仅用中文输出。 \
输出结构：1) 要点总结 2) 建议（含具体数值的要点） 3) 注意与禁忌 4) 就诊指征 5) 参考文献。 \
要求：保证事实一致；不确定处明确标注为不确定。参考文献仅限与问题直接相关的一次资料（指南、学会声明、政府/公立机构、系统综述）。 \
参考标注：每个要点至少对应一个编号 [n]，并给出标题（如可则中文并附原题）与URL。";

/// System prompt generated when the user has not set one.
pub fn auto_system_prompt(lang: Language, query: &str) -> String {
    let topic = Topic::detect(query);
    if lang == Language::Zh {
        match topic {
            Some(Topic::Hypertension) => format!(
                "{SYSTEM_BASE_ZH} 对象：高血压。引用以 优先使用日本高血压学会指南、WHO资料以及权威政府网站。"
            ),
            Some(Topic::Diabetes) => format!(
                "{SYSTEM_BASE_ZH} 对象：糖尿病/血糖管理。引用以 优先使用日本糖尿病学会指南、国家/WHO资料。"
            ),
            _ => SYSTEM_BASE_ZH.to_string(),
        }
    } else {
        match topic {
            Some(Topic::Hypertension) => format!(
                "{SYSTEM_BASE_JA} 対象: 高血圧。引用は 日本高血圧学会(JSH)ガイドライン2019、JSH一般向け情報、WHO高血圧ファクトシートを優先。"
            ),
            Some(Topic::Diabetes) => format!(
                "{SYSTEM_BASE_JA} 対象: 糖尿病/血糖管理。引用は 日本糖尿病学会(JDS)ガイドライン・診療指針、厚労省、WHO糖尿病ファクトシートを優先。"
            ),
            _ => SYSTEM_BASE_JA.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Fixed directives
// ═══════════════════════════════════════════════════════════

const FORMAT_JA: &str = "すべての回答は日本語のみで出力してください。以下の構成で簡潔かつ正確に提示してください: 1) 要約、2) 推奨事項（箇条書き）、3) 注意点・禁忌、4) 受診目安、5) 出典。出典は質問内容に直接関連し、可能なら日本語のガイドラインや公的機関の資料を優先し、各項目に最低2件の参照を付し、タイトル（原題併記）とURLを含め、番号付き [n] で本文と対応させてください。";

const FORMAT_ZH: &str = "仅用中文输出，并按 1) 要点总结 2) 建议（要点式，含具体数值） 3) 注意与禁忌 4) 就诊指征 5) 参考文献 的结构；参考需与问题直接相关，尽可能使用中文可读的指南或公立机构资料。各部分至少提供2条一次资料，并给出标题（附原题）与URL，用编号 [n] 与正文对应。";

const QUALITY_JA: &str = "\
あなたは医学顧問かつ臨床研究アシスタントです。最新の国際ガイドラインとシステマティックレビューに基づき、根拠に裏付けられた回答を作成します。 \
疾患や健康管理に関する質問には次の要件で出力してください： \
1) 構造化回答：病因/機序の要約、生活習慣介入、薬物療法、特定集団や併存症への対応、目標値とモニタリング、新規治療/技術、参考文献。 \
2) 最新の臨床エビデンス（2023–2025）を優先し、ESC/ESH・ACC/AHA・JNC・WHOのガイドライン、近3年のシステマティックレビュー/メタ解析（PubMed/ScienceDirect収載）、質の高い誌（Ann Med、Eur J Prev Cardiol、JAMA、NEJMなど）を引用。 \
3) 語調は明瞭・専門的・客観的で、主観的助言や診療の代替を避ける。 \
4) 医師が同僚や患者に説明する体裁で、条理的・根拠提示・非広告的にまとめる。 \
5) 結語で個別性への配慮と最新ガイドライン参照・受診の推奨を明記。 \
6) 可能なら DOI を付した引用形式を示す。";

const QUALITY_ZH: &str = "\
你是一名医学顾问和临床研究助理，擅长根据最新的国际医学指南和系统综述提供循证医学回答。 \
当用户提出某种疾病或健康管理相关的问题时，请按以下要求输出： \
1) 全面而结构化地回答：病因/机制简述、生活方式干预、药物治疗、特殊人群或合并症、目标值与监测方式、新兴疗法或技术、参考文献。 \
2) 基于最新临床证据（2023–2025），优先引用：ESC/ESH、ACC/AHA、JNC、WHO 等指南；PubMed 或 ScienceDirect 收录的近三年系统综述/Meta；高质量期刊（Ann Med、Eur J Prev Cardiol、JAMA、NEJM 等）。 \
3) 语气清晰、专业、客观，避免主观建议或替代临床诊疗。 \
4) 以医生对同行或患者的解释方式表达，条理清晰、循证、非广告化。 \
5) 在结尾提醒：治疗方案应结合个体情况，并建议查阅最新指南或咨询医生。 \
6) 若可能，提供带 DOI 的引用格式。";

const PATIENT_TONE_JA: &str = "専門用語を避け、平易な表現で要点を説明し、薬剤の細かい指示は控え、生活習慣と受診目安を強調してください。";

const PATIENT_TONE_ZH: &str = "请用通俗易懂、非术语的方式解释重点，避免复杂药物细节，突出生活方式与就诊指征。";

const PATIENT_STRUCTURE_JA: &str = "\
患者向けモード: 出力は『すぐ役立つ行動計画』として作成する。 \
構成: 0) 一文要約、1) 今すぐできること（今日）、2) 1週間プラン（チェックリスト）、3) 家庭での測定・記録方法（時間帯・回数・しきい値）、4) 受診の目安（通常外来）、5) 緊急受診のサイン（119/救急コールの基準）、6) 医師へ伝えること・質問テンプレート、7) 出典。 \
表現は中学生にも分かる平易さで、数値や具体例を付す。薬の開始・中止の指示は行わず、注意喚起に留める。個人差や既往症への配慮を明記する。";

const PATIENT_STRUCTURE_ZH: &str = "\
患者模式：把输出写成‘立刻可执行的行动计划’。 \
结构：0) 一句话摘要，1) 今天立刻可做，2) 一周计划（清单），3) 家庭测量与记录方法（时间段/次数/阈值），4) 普通门诊就诊指征，5) 紧急就医信号（急救呼叫的标准），6) 告知医生与提问模板，7) 参考文献。 \
语言通俗、提供具体数值与例子；不下药物启动/停用指令，仅给风险提示，并声明需个体化。";

const CITATION_POLICY_JA: &str = "引用は質の高い一次資料（ガイドライン、学会声明、系統的レビュー、政府・公的機関）を優先し、質問に直接関連しない一般ページは避けてください。各項目に最低2件の参照を付してください。";

const CITATION_POLICY_ZH: &str = "参考文献必须为高质量一次资料（指南、学会声明、系统综述、政府/公立机构）。禁止不相关的一般网页。每部分至少2条引用。";

/// Everything placed before the conversation history, in order: the
/// custom system prompt, format directive, quality prompt, patient tone
/// and structure (patient mode), and citation policy (when shown).
pub fn directive_stack(
    custom_system: &str,
    lang: Language,
    audience: Audience,
    show_citations: bool,
) -> Vec<String> {
    let zh = lang == Language::Zh;
    let pick = |ja: &str, zh_text: &str| if zh { zh_text.to_string() } else { ja.to_string() };

    let mut stack = Vec::new();
    if !custom_system.trim().is_empty() {
        stack.push(custom_system.to_string());
    }
    stack.push(pick(FORMAT_JA, FORMAT_ZH));
    stack.push(pick(QUALITY_JA, QUALITY_ZH));
    if audience == Audience::Patient {
        stack.push(pick(PATIENT_TONE_JA, PATIENT_TONE_ZH));
        stack.push(pick(PATIENT_STRUCTURE_JA, PATIENT_STRUCTURE_ZH));
    }
    if show_citations {
        stack.push(pick(CITATION_POLICY_JA, CITATION_POLICY_ZH));
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_prompt_follows_topic() {
        let htn = auto_system_prompt(Language::Ja, "高血圧の薬は？");
        assert!(htn.starts_with(SYSTEM_BASE_JA));
        assert!(htn.contains("日本高血圧学会(JSH)"));

        let dm = auto_system_prompt(Language::Zh, "血糖怎么控制");
        assert!(dm.contains("对象：糖尿病"));

        assert_eq!(auto_system_prompt(Language::Ja, "頭痛"), SYSTEM_BASE_JA);
    }

    #[test]
    fn non_chinese_languages_get_japanese_prompts() {
        assert_eq!(auto_system_prompt(Language::En, "headache"), SYSTEM_BASE_JA);
        assert_eq!(auto_system_prompt(Language::Ko, "두통"), SYSTEM_BASE_JA);
    }

    #[test]
    fn doctor_stack_without_citations() {
        let stack = directive_stack("", Language::Ja, Audience::Doctor, false);
        assert_eq!(stack, vec![FORMAT_JA.to_string(), QUALITY_JA.to_string()]);
    }

    #[test]
    fn patient_stack_in_order() {
        let stack = directive_stack("custom", Language::Zh, Audience::Patient, true);
        assert_eq!(
            stack,
            vec![
                "custom".to_string(),
                FORMAT_ZH.to_string(),
                QUALITY_ZH.to_string(),
                PATIENT_TONE_ZH.to_string(),
                PATIENT_STRUCTURE_ZH.to_string(),
                CITATION_POLICY_ZH.to_string(),
            ]
        );
    }

    #[test]
    fn blank_custom_prompt_skipped() {
        let stack = directive_stack("   ", Language::Ja, Audience::Doctor, true);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack[0], FORMAT_JA);
    }
}
