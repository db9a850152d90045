//! Deterministic structured answers used when upstream output is
//! unavailable or too unstructured to show.
//!
//! A document is a summary line, the audience's section headings each
//! followed by topic bullets, and a numbered source list. Headings come
//! from one table per (language, audience) so every composed document
//! passes its own checklist.

use std::sync::LazyLock;

use regex::Regex;

use super::validator::{missing_sections, needs_structural_fallback};
use crate::models::{Audience, Language};

/// Clinical topic a fallback is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Hypertension,
    Diabetes,
    General,
}

static HYPERTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)高血圧|血圧|降圧|高血压|血压").expect("valid regex")
});
static DIABETES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)糖尿病|血糖|HbA1c").expect("valid regex"));
static STROKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"脳出血|脳卒中|麻痺|脑出血|脑卒中|偏瘫").expect("valid regex"));

impl Topic {
    pub fn detect(text: &str) -> Option<Self> {
        if HYPERTENSION_RE.is_match(text) {
            Some(Self::Hypertension)
        } else if DIABETES_RE.is_match(text) {
            Some(Self::Diabetes)
        } else {
            None
        }
    }

    fn sources(self) -> &'static [&'static str] {
        match self {
            Self::Hypertension => &[
                "https://www.jpnsh.jp/general/",
                "https://www.jpnsh.jp/data/jsh2019.pdf",
                "https://www.who.int/news-room/fact-sheets/detail/hypertension",
            ],
            Self::Diabetes => &[
                "https://www.jds.or.jp/modules/publication/index.php?content_id=3",
                "https://www.who.int/news-room/fact-sheets/detail/diabetes",
            ],
            Self::General => &["https://www.mhlw.go.jp/", "https://www.who.int/"],
        }
    }
}

// ═══════════════════════════════════════════
// Layouts
// ═══════════════════════════════════════════

struct Layout {
    summary: &'static str,
    headings: &'static [&'static str],
    sources: &'static str,
}

const PATIENT_JA: Layout = Layout {
    summary: "要約",
    headings: &[
        "今すぐ今日",
        "1週間プラン",
        "家庭での測定・記録",
        "受診の目安（通常外来）",
        "緊急受診のサイン",
        "医師へ伝える・質問",
    ],
    sources: "出典",
};

const PATIENT_ZH: Layout = Layout {
    summary: "摘要",
    headings: &[
        "今天立刻可做",
        "一周计划",
        "家庭测量与记录",
        "门诊就诊指征",
        "紧急就医信号",
        "向医生说明的问题",
    ],
    sources: "参考文献",
};

const DOCTOR_JA: Layout = Layout {
    summary: "要約",
    headings: &[
        "病因・機序",
        "生活習慣の修正",
        "薬物療法",
        "特定集団・併存症",
        "目標値",
        "モニタリング",
        "新規治療・技術",
    ],
    sources: "出典",
};

const DOCTOR_ZH: Layout = Layout {
    summary: "要点总结",
    headings: &[
        "病因与机制",
        "生活方式干预",
        "药物治疗",
        "特殊人群与合并症",
        "目标值",
        "监测",
        "新兴疗法与技术",
    ],
    sources: "参考文献",
};

fn layout(lang: Language, audience: Audience) -> &'static Layout {
    match (lang.checklist_language(), audience) {
        (Language::Zh, Audience::Patient) => &PATIENT_ZH,
        (Language::Zh, Audience::Doctor) => &DOCTOR_ZH,
        (_, Audience::Patient) => &PATIENT_JA,
        (_, Audience::Doctor) => &DOCTOR_JA,
    }
}

// ═══════════════════════════════════════════
// Bodies
// ═══════════════════════════════════════════

/// Summary sentence plus one bullet list per layout heading.
struct Body {
    summary: &'static str,
    sections: &'static [&'static [&'static str]],
}

const HYPERTENSION_PATIENT_JA: Body = Body {
    summary: "高血圧の管理を今日から始めるための行動計画。",
    sections: &[
        &[
            "減塩開始（1日5g目安）。加工食品を避け、調味料は控えめ",
            "家庭血圧を朝晩で測定。測定前1分安静、腕帯は上腕、同じ腕で",
            "服薬は自己判断で増減しない。飲み忘れ防止の仕組みを作る",
            "有酸素運動の準備（散歩10–20分）",
        ],
        &[
            "食事記録を付け、塩分の多い食品を把握して置き換え",
            "週150分の有酸素運動を分割（例: 20–30分×5回）",
            "体重・飲酒量・喫煙の状況を記録し、減量や禁煙を計画",
            "就寝前のストレッチと睡眠の見直し",
        ],
        &[
            "朝起床後1時間以内と就寝前に測定。各2回、間隔1分で平均",
            "家庭血圧の目安は135/85未満。超える日が続く時は記録を持参",
            "塩分・運動・睡眠と一緒にメモ（因子と血圧の関係が分かる）",
        ],
        &[
            "家庭血圧が1–2週間平均で135/85以上",
            "頭痛・動悸・息切れ・むくみなどの症状が持続",
            "服薬の副作用が疑われる（めまい、咳、むくみなど）",
        ],
        &[
            "片側の脱力・しびれ、ろれつが回らない、急な視力低下、激しい頭痛",
            "胸痛・呼吸困難・意識障害。迷ったら119へ",
        ],
        &[
            "家庭血圧の記録、服薬リスト、症状の有無、塩分・運動・睡眠の状況",
            "目標値の調整（既往や腎機能に合わせた厳格度）について相談",
        ],
    ],
};

const HYPERTENSION_STROKE_PATIENT_JA: Body = Body {
    summary: "高血圧の管理を強化し、再発予防と日常の安全を両立する。",
    sections: &[
        &[
            "減塩開始（1日5g目安）。加工食品を避け、調味料は控えめ",
            "家庭血圧を朝晩で測定。測定前1分安静、腕帯は上腕、同じ腕で",
            "服薬は自己判断で増減しない。飲み忘れ防止の仕組みを作る",
            "片麻痺のある側の転倒予防。歩行補助具・手すりを確認",
        ],
        &[
            "食事記録を付け、塩分の多い食品を把握して置き換え",
            "週150分の有酸素運動を分割（例: 20–30分×5回）",
            "体重・飲酒量・喫煙の状況を記録し、減量や禁煙を計画",
            "リハビリの継続内容を見直し、疲労や痛みの自己管理を加える",
        ],
        &[
            "朝起床後1時間以内と就寝前に測定。各2回、間隔1分で平均",
            "家庭血圧の目安は135/85未満。超える日が続く時は記録を持参",
            "塩分・運動・睡眠と一緒にメモ（因子と血圧の関係が分かる）",
        ],
        &[
            "家庭血圧が1–2週間平均で135/85以上",
            "頭痛・動悸・息切れ・むくみなどの症状が持続",
            "服薬の副作用が疑われる（めまい、咳、むくみなど）",
        ],
        &[
            "片側の脱力・しびれ、ろれつが回らない、急な視力低下、激しい頭痛",
            "胸痛・呼吸困難・意識障害。迷ったら119へ",
        ],
        &[
            "家庭血圧の記録、服薬リスト、症状の有無、リハビリの状況",
            "再発予防のための目標値と抗血栓薬との関係について相談",
        ],
    ],
};

const DIABETES_PATIENT_JA: Body = Body {
    summary: "血糖管理を今日から始めるための行動計画。",
    sections: &[
        &[
            "甘い飲料を水やお茶に置き換える",
            "主食の量を決め、野菜から先に食べる",
            "薬やインスリンは自己判断で増減しない",
            "食後に10–15分歩く",
        ],
        &[
            "食事記録を付け、炭水化物の量と時間を把握",
            "週150分の有酸素運動を分割（例: 30分×5回）",
            "体重を週2回測り、5–10%減量の目標を設定",
        ],
        &[
            "自己血糖測定を行う場合は空腹時と食後2時間を記録",
            "低血糖（ふるえ、冷や汗、動悸）の有無も記録",
            "足の傷や変色を毎日確認",
        ],
        &[
            "空腹時血糖が130mg/dLを超える日が続く",
            "のどの渇き・多尿・体重減少が続く",
            "足の傷が治りにくい",
        ],
        &[
            "意識がもうろうとする、けいれん、強い脱水",
            "低血糖で自力で糖分をとれない時。迷ったら119へ",
        ],
        &[
            "血糖・体重の記録、服薬リスト、低血糖の有無",
            "HbA1cの個別目標と合併症検査の予定について相談",
        ],
    ],
};

const GENERAL_PATIENT_JA: Body = Body {
    summary: "体調管理を今日から始めるための行動計画。",
    sections: &[
        &[
            "気になる症状と始まった時期をメモする",
            "処方薬は自己判断で中止・変更しない",
            "水分・睡眠・食事のリズムを整える",
        ],
        &[
            "毎日の体調・体温・体重を同じ時間に記録",
            "週150分を目安に無理のない運動を分割して行う",
            "禁煙・節酒の計画を立てる",
        ],
        &[
            "症状の強さを0–10で記録し、変化を把握",
            "血圧計・体温計があれば朝晩に測定して記録",
        ],
        &[
            "症状が1–2週間続く、または悪化する",
            "日常生活に支障が出る",
        ],
        &["胸痛、呼吸困難、意識障害、片側の脱力やしびれ。迷ったら119へ"],
        &[
            "症状の経過、服薬リスト、既往症、記録したデータ",
            "検査や治療の選択肢とその目的について質問",
        ],
    ],
};

const HYPERTENSION_PATIENT_ZH: Body = Body {
    summary: "从今天开始把血压管理做到位，兼顾安全与可持续。",
    sections: &[
        &[
            "减盐（≤5g/日），减少加工食品",
            "早晚测量家庭血压（上臂袖带，静坐1分钟后测）",
            "不自行加减药，建立提醒机制",
        ],
        &[
            "记录饮食，替换高盐食物；累计150分钟中等强度运动",
            "体重/饮酒/吸烟记录并设定目标",
        ],
        &["早晚各测2次取均值；目标135/85以下"],
        &["1–2周平均≥135/85或症状持续"],
        &["单侧无力/言语不清/视力骤降/剧烈头痛；胸痛/呼吸困难/意识障碍，立即呼叫急救"],
        &["家庭血压记录、用药清单、症状、饮食运动睡眠状况"],
    ],
};

const DIABETES_PATIENT_ZH: Body = Body {
    summary: "从今天开始控制血糖，循序渐进、安全可持续。",
    sections: &[
        &[
            "用水或茶代替含糖饮料",
            "固定主食份量，先吃蔬菜",
            "不自行调整降糖药或胰岛素",
        ],
        &[
            "记录饮食中碳水化合物的量与时间",
            "每周累计150分钟中等强度运动",
            "每周称重2次，设定减重5–10%的目标",
        ],
        &[
            "自测血糖时记录空腹与餐后2小时数值",
            "记录低血糖症状（手抖、出冷汗、心慌）",
        ],
        &["空腹血糖持续高于130mg/dL，或口渴、多尿、体重下降"],
        &["意识模糊、抽搐、严重脱水，或低血糖无法自行进食，立即呼叫急救"],
        &["血糖与体重记录、用药清单、低血糖情况；询问个体化HbA1c目标"],
    ],
};

const GENERAL_PATIENT_ZH: Body = Body {
    summary: "从今天开始做好健康管理，出现警示信号及时就医。",
    sections: &[
        &[
            "记录不适症状及开始时间",
            "不自行停用或更改处方药",
        ],
        &[
            "每天同一时间记录身体状况、体温、体重",
            "每周累计约150分钟适度运动",
        ],
        &["症状按0–10分记录，观察变化"],
        &["症状持续1–2周或加重，影响日常生活"],
        &["胸痛、呼吸困难、意识障碍、单侧无力或麻木，立即呼叫急救"],
        &["症状经过、用药清单、既往病史、自测记录"],
    ],
};

const HYPERTENSION_DOCTOR_JA: Body = Body {
    summary: "高血圧の管理は生活習慣修正と降圧薬による段階的治療を基本とし、心血管リスクに応じて目標値を設定する。",
    sections: &[
        &[
            "大半は本態性高血圧。食塩感受性、交感神経活性、RAA系亢進、血管硬化が関与",
            "若年発症や治療抵抗性では原発性アルドステロン症など二次性高血圧を検索",
        ],
        &["減塩6g/日未満、DASH食、適正体重、節酒、禁煙、週150分の有酸素運動"],
        &[
            "第一選択はACE阻害薬/ARB、Ca拮抗薬、サイアザイド系利尿薬",
            "単剤で不十分なら併用。配合剤でアドヒアランスを改善",
        ],
        &[
            "糖尿病・蛋白尿を伴うCKDではACE阻害薬/ARBを優先",
            "高齢者は起立性低血圧と転倒に注意。妊娠時はACE阻害薬/ARBを避ける",
        ],
        &["75歳未満の成人は診察室130/80mmHg未満、家庭125/75mmHg未満を目安に個別化"],
        &[
            "家庭血圧を重視し、朝晩の測定値で評価",
            "電解質・腎機能を開始後と定期的に確認",
        ],
        &["腎デナベーション、治療用アプリなどデジタル治療の位置づけを検討"],
    ],
};

const DIABETES_DOCTOR_JA: Body = Body {
    summary: "2型糖尿病は個別化したHbA1c目標のもと、生活習慣介入と臓器保護を考慮した薬物選択で管理する。",
    sections: &[
        &["インスリン抵抗性とインスリン分泌不全が病因。肥満、運動不足、遺伝因子が関与"],
        &[
            "医学的栄養療法、週150分以上の中等度運動、5–10%の減量",
            "禁煙と睡眠の改善",
        ],
        &[
            "メトホルミンを基本に、心血管・腎リスクに応じてSGLT2阻害薬やGLP-1受容体作動薬を選択",
            "低血糖リスクの高い薬剤は高齢者で慎重に使用",
        ],
        &[
            "CKD・心不全の併存症ではSGLT2阻害薬を考慮",
            "高齢者は低血糖回避を優先し目標を緩和",
        ],
        &["HbA1c 7.0%未満を基本に、低血糖リスクや年齢で個別に設定"],
        &[
            "HbA1cを3か月ごとにモニタリング",
            "尿中アルブミン、eGFR、眼底、足病変を定期評価",
        ],
        &["持続血糖測定(CGM)、週1回製剤、GIP/GLP-1受容体作動薬などの新規治療"],
    ],
};

const GENERAL_DOCTOR_JA: Body = Body {
    summary: "慢性疾患の管理は病態評価、生活習慣介入、根拠に基づく薬物療法、定期的な再評価を基本とする。",
    sections: &[
        &["病因・機序を評価し、二次的要因や可逆的要因を除外"],
        &["食事、運動、睡眠、禁煙、節酒の介入を優先"],
        &["ガイドライン推奨の薬物療法を選択し、相互作用と副作用を確認"],
        &["高齢者、妊婦、腎機能低下などの特定集団では用量と目標を調整"],
        &["患者と共有した目標値を設定し、治療計画に反映"],
        &["症状と検査値を定期的にモニタリングし、治療効果を再評価"],
        &["新規治療や遠隔診療などの技術は適応とエビデンスを確認して導入"],
    ],
};

const HYPERTENSION_DOCTOR_ZH: Body = Body {
    summary: "高血压管理以生活方式干预和阶梯式降压治疗为基础，并按心血管风险设定目标值。",
    sections: &[
        &[
            "原发性高血压占多数，与盐敏感性、交感神经激活、RAAS亢进及血管硬化相关",
            "年轻起病或难治性高血压应筛查原发性醛固酮增多症等继发性病因",
        ],
        &["限盐（<6g/日）、DASH饮食、控制体重、限酒、戒烟、每周150分钟有氧运动"],
        &[
            "首选ACEI/ARB、钙通道阻滞剂、噻嗪类利尿剂",
            "单药不达标时联合用药，单片复方制剂提高依从性",
        ],
        &[
            "合并糖尿病或蛋白尿性CKD时优先ACEI/ARB",
            "老年人注意体位性低血压；妊娠期避免ACEI/ARB",
        ],
        &["多数成人诊室血压目标<130/80mmHg，家庭血压<125/75mmHg，需个体化"],
        &["重视家庭血压监测，定期复查电解质与肾功能"],
        &["肾去神经术及数字疗法等新兴疗法的适用人群仍在评估"],
    ],
};

const DIABETES_DOCTOR_ZH: Body = Body {
    summary: "2型糖尿病应在个体化HbA1c目标下，结合生活方式干预与器官保护选择药物。",
    sections: &[
        &["病因为胰岛素抵抗与胰岛素分泌不足，肥满、缺乏运动与遗传因素参与"],
        &["医学营养治疗、每周≥150分钟中等强度运动、减重5–10%"],
        &[
            "以二甲双胍为基础，按心血管及肾脏风险选择SGLT2抑制剂或GLP-1受体激动剂",
            "老年人慎用低血糖风险高的药物",
        ],
        &["特殊人群：合并CKD或心衰时考虑SGLT2抑制剂；老年人放宽目标以避免低血糖"],
        &["HbA1c目标一般<7.0%，按低血糖风险和年龄个体化"],
        &["每3个月监测HbA1c，定期评估尿白蛋白、eGFR、眼底与足部"],
        &["持续葡萄糖监测、周制剂及GIP/GLP-1双受体激动剂等新兴疗法"],
    ],
};

const GENERAL_DOCTOR_ZH: Body = Body {
    summary: "慢性病管理以病情评估、生活方式干预、循证药物治疗和定期复评为基础。",
    sections: &[
        &["评估病因与机制，排除继发或可逆因素"],
        &["优先进行饮食、运动、睡眠、戒烟限酒等生活方式干预"],
        &["选择指南推荐的药物治疗，关注相互作用与不良反应"],
        &["老年人、孕妇、肾功能不全等特殊人群需调整剂量与目标"],
        &["与患者共同设定目标值并纳入治疗计划"],
        &["定期监测症状与检查指标，评估疗效"],
        &["新兴疗法与远程医疗需核实适应证与证据后采用"],
    ],
};

fn body(topic: Topic, lang: Language, audience: Audience, query: &str) -> &'static Body {
    let zh = lang.checklist_language() == Language::Zh;
    match (topic, audience, zh) {
        (Topic::Hypertension, Audience::Patient, false) if STROKE_RE.is_match(query) => {
            &HYPERTENSION_STROKE_PATIENT_JA
        }
        (Topic::Hypertension, Audience::Patient, false) => &HYPERTENSION_PATIENT_JA,
        (Topic::Hypertension, Audience::Patient, true) => &HYPERTENSION_PATIENT_ZH,
        (Topic::Hypertension, Audience::Doctor, false) => &HYPERTENSION_DOCTOR_JA,
        (Topic::Hypertension, Audience::Doctor, true) => &HYPERTENSION_DOCTOR_ZH,
        (Topic::Diabetes, Audience::Patient, false) => &DIABETES_PATIENT_JA,
        (Topic::Diabetes, Audience::Patient, true) => &DIABETES_PATIENT_ZH,
        (Topic::Diabetes, Audience::Doctor, false) => &DIABETES_DOCTOR_JA,
        (Topic::Diabetes, Audience::Doctor, true) => &DIABETES_DOCTOR_ZH,
        (Topic::General, Audience::Patient, false) => &GENERAL_PATIENT_JA,
        (Topic::General, Audience::Patient, true) => &GENERAL_PATIENT_ZH,
        (Topic::General, Audience::Doctor, false) => &GENERAL_DOCTOR_JA,
        (Topic::General, Audience::Doctor, true) => &GENERAL_DOCTOR_ZH,
    }
}

// ═══════════════════════════════════════════
// Composition
// ═══════════════════════════════════════════

fn render(layout: &Layout, body: &Body, sources: &[&str]) -> String {
    let mut lines = vec![format!("{}: {}", layout.summary, body.summary)];
    for (heading, bullets) in layout.headings.iter().zip(body.sections) {
        lines.push(format!("{heading}:"));
        lines.extend(bullets.iter().map(|b| format!("- {b}")));
    }
    lines.push(format!("{}:", layout.sources));
    lines.extend(
        sources
            .iter()
            .enumerate()
            .map(|(i, url)| format!("[{}] {url}", i + 1)),
    );
    lines.join("\n")
}

/// Compose the structured document for a topic.
pub fn compose_for_topic(topic: Topic, query: &str, lang: Language, audience: Audience) -> String {
    render(
        layout(lang, audience),
        body(topic, lang, audience, query),
        topic.sources(),
    )
}

/// Compose a structured answer from the query alone. Same inputs always
/// give the same document.
pub fn compose_fallback(query: &str, lang: Language, audience: Audience) -> String {
    let topic = Topic::detect(query).unwrap_or(Topic::General);
    compose_for_topic(topic, query, lang, audience)
}

/// Replace an under-structured patient answer with the structured plan.
///
/// Doctor answers pass through. The topic is taken from the query, then
/// from the answer itself.
pub fn ensure_for_audience(text: &str, query: &str, lang: Language, audience: Audience) -> String {
    if audience != Audience::Patient {
        return text.to_string();
    }
    let missing = missing_sections(text, lang, audience);
    if !needs_structural_fallback(&missing) {
        return text.to_string();
    }
    let topic = Topic::detect(query)
        .or_else(|| Topic::detect(text))
        .unwrap_or(Topic::General);
    tracing::debug!(missing = missing.len(), topic = ?topic, "Using structured patient plan");
    compose_for_topic(topic, query, lang, audience)
}
