//! Pattern tables used by fingerprint extraction
//!
//! Every table covers English and Chinese variants. The tables are compiled once and
//! never modified, so extraction stays a pure function of its input text.

use lazy_static::lazy_static;
use regex::Regex;

use super::types::EventType;

// Order is priority: the first event type with any matching pattern wins.
const EVENT_PATTERN_TABLE: &[(EventType, &[&str])] = &[
    (
        EventType::RegulatoryInvestigation,
        &[
            r"(?i)\b(?:investigat\w*|probe[ds]?|probing|inquiry|inquiries|raid(?:ed)?)\b",
            r"\b(?:ICAC|SFC|CSRC|SEC|FCA|HKMA)\b",
            r"调查|調查|立案|稽查|廉政公署|廉署|证监会|證監會",
        ],
    ),
    (
        EventType::CriminalCharge,
        &[
            r"(?i)\b(?:charged|charges|arrest(?:ed|s)?|indict(?:ed|ment)?|convicted|conviction|sentenced|jailed|imprison(?:ed|ment)|prosecut\w*|pleaded guilty)\b",
            r"逮捕|拘捕|被捕|起诉|起訴|检控|檢控|判刑|判处|判處|入狱|入獄|刑事|拘留",
        ],
    ),
    (
        EventType::LegalProceedings,
        &[
            r"(?i)\b(?:lawsuit|sued|suing|litigation|court|tribunal|writ|judgment|judgement|arbitration|winding[- ]up petition)\b",
            r"诉讼|訴訟|法院|判决|判決|仲裁|清盘|清盤",
        ],
    ),
    (
        EventType::AdministrativePenalty,
        &[
            r"(?i)\b(?:fined|fines?|penalt(?:y|ies)|sanction(?:ed|s)?|reprimand(?:ed)?|censure[ds]?|disciplinary|banned|disqualified|suspended)\b",
            r"罚款|罰款|处罚|處罰|谴责|譴責|警告|禁止|取消资格",
        ],
    ),
    (
        EventType::FinancialMisconduct,
        &[
            r"(?i)\b(?:fraud\w*|embezzl\w*|money laundering|laundered|insider (?:dealing|trading)|brib\w*|corrupt\w*|misappropriat\w*|market manipulation|ponzi)\b",
            r"欺诈|欺詐|诈骗|詐騙|贪污|貪污|洗钱|洗錢|内幕交易|內幕交易|受贿|受賄|行贿|行賄|挪用|操纵市场|操縱市場",
        ],
    ),
    (
        EventType::TrafficViolation,
        &[
            r"(?i)\b(?:drunk[- ]driving|drink[- ]driving|dangerous driving|speeding|traffic|DUI|careless driving)\b",
            r"醉驾|醉駕|酒驾|酒駕|超速|交通违章|交通違例|危险驾驶|危險駕駛",
        ],
    ),
];

const ENTITY_PATTERN_TABLE: &[&str] = &[
    r"\b(?:ICAC|SFC|SEC|CSRC|HKEX|HKMA|FCA|DOJ|FBI|CBIRC|MAS)\b",
    r"(?i)\b(?:Independent Commission Against Corruption|Securities and Futures Commission|Securities and Exchange Commission|China Securities Regulatory Commission|Hong Kong Monetary Authority|Financial Conduct Authority|Department of Justice|Stock Exchange of Hong Kong|Hong Kong Police|Commercial Crime Bureau)\b",
    r"(?i)\b(?:High Court|District Court|Court of Appeal|Court of Final Appeal|Supreme Court|Magistrates'? Court|Market Misconduct Tribunal)\b",
    r"廉政公署|廉署|证监会|證監會|证券及期货事务监察委员会|證券及期貨事務監察委員會|港交所|联交所|聯交所|金管局|高等法院|区域法院|區域法院|终审法院|終審法院|最高人民法院|中级人民法院|中級人民法院|公安局|检察院|檢察院|警务处|警務處",
];

const KEYWORD_VOCABULARY: &[&str] = &[
    "fraud",
    "bribery",
    "bribe",
    "corruption",
    "money laundering",
    "investigation",
    "probe",
    "arrest",
    "charged",
    "convicted",
    "sentenced",
    "fined",
    "penalty",
    "sanction",
    "lawsuit",
    "misconduct",
    "embezzlement",
    "insider dealing",
    "insider trading",
    "disqualified",
    "suspended",
    "manipulation",
    "欺诈",
    "诈骗",
    "贿赂",
    "腐败",
    "洗钱",
    "调查",
    "逮捕",
    "起诉",
    "判刑",
    "罚款",
    "处罚",
    "违规",
    "内幕交易",
    "贪污",
    "受贿",
];

const COMPANY_PATTERN_TABLE: &[&str] = &[
    r"\b(?:[A-Z][\w&'.-]*\s+){1,5}(?:(?:Limited|Ltd|Inc|Corporation|Corp|Holdings|Group|Company|LLC|PLC|plc|GmbH|Bank)\b|Co\.)",
    r"\p{Han}{2,12}(?:股份有限公司|有限公司|集团|集團|控股|银行|銀行)",
];

// Longer titles first so alternation prefers the most specific one.
const TITLE_PATTERN_TABLE: &[&str] = &[
    r"(?i)\b(?:chief executive officer|chief financial officer|chief operating officer|non-executive director|independent director|executive director|managing director|vice chairman|vice president|general manager|company secretary|co-founder|chairwoman|chairperson|chairman|president|founder|director|partner|CEO|CFO|COO|CTO)\b",
    r"副董事长|副董事長|董事长|董事長|首席执行官|首席執行官|首席财务官|首席財務官|行政总裁|行政總裁|财务总监|財務總監|执行董事|執行董事|独立董事|獨立董事|非执行董事|非執行董事|总经理|總經理|总裁|總裁|董事|主席|创始人|創始人|合伙人|合夥人",
];

const LOCATION_VOCABULARY: &[&str] = &[
    "hong kong",
    "kowloon",
    "new territories",
    "shenzhen",
    "shanghai",
    "beijing",
    "guangzhou",
    "macau",
    "macao",
    "singapore",
    "taiwan",
    "london",
    "new york",
    "香港",
    "九龙",
    "九龍",
    "深圳",
    "上海",
    "北京",
    "广州",
    "廣州",
    "澳门",
    "澳門",
    "新加坡",
    "台湾",
    "台灣",
];

const FEMALE_CUES: &[&str] = &[
    r"(?i)\b(?:she|her|hers|herself|wife|mother|daughter|sister|girlfriend|woman|businesswoman|mrs|ms|madam)\b",
    r"她|妻子|母亲|母親|女儿|女兒|女士|女友|太太|女商人",
];

const MALE_CUES: &[&str] = &[
    r"(?i)\b(?:he|him|his|himself|husband|father|son|brother|boyfriend|businessman|mr)\b",
    // 其他 means "other" and 他们 means "they", neither is a male pronoun
    r"(?:^|[^其])他(?:[^们們]|$)|丈夫|父亲|父親|儿子|兒子|先生|男友|男子",
];

const VICTIM_CUES: &[&str] = &[
    r"(?i)\b(?:killed by|murdered by|slain by|victims?|was (?:attacked|assaulted|stabbed|shot|strangled) by|former (?:partner|boyfriend|girlfriend|husband|wife|lover)|ex-(?:partner|boyfriend|girlfriend|husband|wife))\b",
    r"受害人|受害者|被害人|遇害|被杀|被殺|被.{0,6}杀害|被.{0,6}殺害|前男友|前女友|前夫",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "was", "were", "has", "had", "have", "that", "this", "from",
    "into", "are", "but", "not", "his", "her", "its", "they", "them", "been", "which", "who",
    "said", "after", "over", "also", "their", "will", "would", "about", "than", "more", "any",
    "one", "two", "out", "she", "him", "all", "can", "could", "did", "does", "our", "you",
    "between", "while", "when", "where", "what", "such", "other", "these", "those", "there",
    "being", "upon", "against", "during", "including", "according", "reported", "report",
];

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

lazy_static! {
    pub static ref EVENT_PATTERNS: Vec<(EventType, Vec<Regex>)> = EVENT_PATTERN_TABLE
        .iter()
        .map(|(event_type, patterns)| (*event_type, compile_all(patterns)))
        .collect();
    pub static ref ENTITY_PATTERNS: Vec<Regex> = compile_all(ENTITY_PATTERN_TABLE);
    pub static ref COMPANY_PATTERNS: Vec<Regex> = compile_all(COMPANY_PATTERN_TABLE);
    pub static ref TITLE_PATTERNS: Vec<Regex> = compile_all(TITLE_PATTERN_TABLE);
    pub static ref FEMALE_PATTERNS: Vec<Regex> = compile_all(FEMALE_CUES);
    pub static ref MALE_PATTERNS: Vec<Regex> = compile_all(MALE_CUES);
    pub static ref VICTIM_PATTERNS: Vec<Regex> = compile_all(VICTIM_CUES);
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").expect("digit pattern");
    pub static ref ENGLISH_WORD: Regex = Regex::new(r"[a-z]{3,}").expect("word pattern");
    pub static ref HAN_RUN: Regex = Regex::new(r"\p{Han}{2,}").expect("han pattern");
}

pub fn keyword_vocabulary() -> &'static [&'static str] {
    KEYWORD_VOCABULARY
}

pub fn location_vocabulary() -> &'static [&'static str] {
    LOCATION_VOCABULARY
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}
