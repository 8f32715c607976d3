#![forbid(unsafe_code)]

//! Problem bank.
//!
//! Problems ship as compact records in `data/problems.json` and are hydrated
//! once into display-ready [`Problem`]s: the title prefixes the judge id, the
//! topic splits into knowledge points, and the description and key-insight
//! texts are filled from templates.
//!
//! Ids are not unique in the bank (a few problems appear in two tiers);
//! [`ProblemCatalog::find`] returns the first match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

const EMBEDDED_PROBLEMS: &str = include_str!("../data/problems.json");

/// Base URL of the online judge the problem ids refer to.
pub const JUDGE_URL: &str = "https://www.luogu.com.cn/problem/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
    T3,
    T4,
}

impl Tier {
    pub const ALL: [Self; 4] = [Self::T1, Self::T2, Self::T3, Self::T4];

    pub fn label(self) -> &'static str {
        match self {
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::T3 => "T3",
            Self::T4 => "T4",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashError::invalid(format!("unknown tier '{s}' (expected T1-T4)")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlgorithmTag {
    Simulation,
    Greedy,
    Search,
    #[serde(rename = "DP")]
    Dp,
    Graph,
    Math,
    DataStructure,
    String,
}

impl AlgorithmTag {
    pub const ALL: [Self; 8] = [
        Self::Simulation,
        Self::Greedy,
        Self::Search,
        Self::Dp,
        Self::Graph,
        Self::Math,
        Self::DataStructure,
        Self::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Simulation => "Simulation",
            Self::Greedy => "Greedy",
            Self::Search => "Search",
            Self::Dp => "DP",
            Self::Graph => "Graph",
            Self::Math => "Math",
            Self::DataStructure => "DataStructure",
            Self::String => "String",
        }
    }

    /// Chinese display label.
    pub fn label_cn(self) -> &'static str {
        match self {
            Self::Simulation => "模拟",
            Self::Greedy => "贪心",
            Self::Search => "搜索",
            Self::Dp => "动态规划",
            Self::Graph => "图论",
            Self::Math => "数学",
            Self::DataStructure => "数据结构",
            Self::String => "字符串",
        }
    }
}

impl fmt::Display for AlgorithmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmTag {
    type Err = DashError;

    /// Accepts the English name (any case) or the Chinese label.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(s) || tag.label_cn() == s)
            .ok_or_else(|| DashError::invalid(format!("unknown tag '{s}'")))
    }
}

/// Online-judge difficulty colour band, from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeBand {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Unrated,
}

impl JudgeBand {
    /// Classify a judge label such as `普及/提高-`.
    pub fn classify(label: &str) -> Self {
        const BANDS: [(&str, JudgeBand); 6] = [
            ("入门", JudgeBand::Red),
            ("普及-", JudgeBand::Orange),
            ("普及/提高-", JudgeBand::Yellow),
            ("普及+/提高", JudgeBand::Green),
            ("提高+/省选-", JudgeBand::Blue),
            ("省选/NOI-", JudgeBand::Purple),
        ];
        BANDS
            .into_iter()
            .find(|(needle, _)| label.contains(needle))
            .map_or(Self::Unrated, |(_, band)| band)
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#FE4C61",
            Self::Orange => "#F39C11",
            Self::Yellow => "#FFC116",
            Self::Green => "#52C41A",
            Self::Blue => "#3498DB",
            Self::Purple => "#9D3DCF",
            Self::Unrated => "#94A3B8",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CompactProblem {
    id: String,
    name: String,
    tier: Tier,
    tags: Vec<AlgorithmTag>,
    topic: String,
    visualizer: String,
    judge: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub id: String,
    /// `"<id> <name>"`.
    pub title: String,
    pub description: String,
    pub tier: Tier,
    pub tags: Vec<AlgorithmTag>,
    pub knowledge_points: Vec<String>,
    pub key_insights: String,
    /// Scenario key; unknown keys fall back in the scenario catalog.
    pub visualizer: String,
    /// Judge difficulty label.
    pub judge_label: String,
}

impl Problem {
    pub fn judge_band(&self) -> JudgeBand {
        JudgeBand::classify(&self.judge_label)
    }

    pub fn judge_url(&self) -> String {
        format!("{JUDGE_URL}{}", self.id)
    }

    pub fn has_tag(&self, tag: AlgorithmTag) -> bool {
        self.tags.contains(&tag)
    }
}

impl From<CompactProblem> for Problem {
    fn from(raw: CompactProblem) -> Self {
        let tag_names: Vec<&str> = raw.tags.iter().map(|tag| tag.name()).collect();
        let primary = tag_names.first().copied().unwrap_or("");
        let topic = &raw.topic;
        let description = format!(
            "(Full description available on Luogu)\n\nTopic: {topic}\nAlgorithm: {}\n\nSource: Luogu {}",
            tag_names.join(", "),
            raw.id
        );
        let key_insights = format!(
            "1. 状态定义/核心思路：\n本题考查{topic}。核心在于识别题目属于{primary}模型。\n\n\
             2. 关键步骤：\n- 分析数据范围。\n- 设计{topic}算法。\n- 注意边界条件。\n\n\
             3. 注意：\n请参考洛谷题解区获取详细的状态转移方程或贪心证明。"
        );
        Self {
            title: format!("{} {}", raw.id, raw.name),
            knowledge_points: topic.split('/').map(str::to_owned).collect(),
            description,
            key_insights,
            id: raw.id,
            tier: raw.tier,
            tags: raw.tags,
            visualizer: raw.visualizer,
            judge_label: raw.judge,
        }
    }
}

/// Tier and tag filter. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemFilter {
    pub tier: Option<Tier>,
    pub tag: Option<AlgorithmTag>,
}

impl ProblemFilter {
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn tag(mut self, tag: AlgorithmTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn matches(&self, problem: &Problem) -> bool {
        self.tier.is_none_or(|tier| problem.tier == tier)
            && self.tag.is_none_or(|tag| problem.has_tag(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount<T> {
    pub tag: T,
    pub count: usize,
}

/// Count occurrences, most frequent first. Ties keep first-seen order.
pub fn tag_frequency<T, I>(tags: I) -> Vec<TagCount<T>>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<TagCount<T>> = Vec::new();
    for tag in tags {
        match counts.iter_mut().find(|entry| entry.tag == tag) {
            Some(entry) => entry.count += 1,
            None => counts.push(TagCount { tag, count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[derive(Debug, Clone)]
pub struct ProblemCatalog {
    problems: Vec<Problem>,
}

impl ProblemCatalog {
    /// The problem bank compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_PROBLEMS)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: Vec<CompactProblem> = serde_json::from_str(s)?;
        let problems: Vec<Problem> = raw.into_iter().map(Problem::from).collect();
        tracing::debug!(count = problems.len(), "problem catalog hydrated");
        Ok(Self { problems })
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn find(&self, id: &str) -> Result<&Problem> {
        self.problems
            .iter()
            .find(|problem| problem.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| DashError::UnknownProblem { id: id.to_owned() })
    }

    pub fn filter(&self, filter: ProblemFilter) -> impl Iterator<Item = &Problem> + '_ {
        self.problems
            .iter()
            .filter(move |problem| filter.matches(problem))
    }

    pub fn in_tier(&self, tier: Tier) -> impl Iterator<Item = &Problem> + '_ {
        self.filter(ProblemFilter::default().tier(tier))
    }

    /// The `n` most common algorithm tags across the bank.
    pub fn top_tags(&self, n: usize) -> Vec<TagCount<AlgorithmTag>> {
        let mut counts = tag_frequency(self.problems.iter().flat_map(|p| p.tags.iter().copied()));
        counts.truncate(n);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": "P1090", "name": "合并果子", "tier": "T1", "tags": ["Greedy"], "topic": "哈夫曼树/优先队列", "visualizer": "greedy", "judge": "普及/提高-"},
        {"id": "P1048", "name": "采药", "tier": "T2", "tags": ["DP"], "topic": "01背包", "visualizer": "knapsack", "judge": "普及-"},
        {"id": "P3379", "name": "LCA", "tier": "T2", "tags": ["Graph", "DataStructure"], "topic": "倍增", "visualizer": "tree", "judge": "普及+/提高"}
    ]"#;

    fn sample() -> ProblemCatalog {
        ProblemCatalog::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn embedded_bank_loads() {
        let catalog = ProblemCatalog::embedded().unwrap();
        assert!(catalog.len() > 200);
        for tier in Tier::ALL {
            assert!(catalog.in_tier(tier).count() > 0, "{tier}");
        }
    }

    #[test]
    fn hydration_fills_templates() {
        let catalog = sample();
        let p = catalog.find("P1090").unwrap();
        assert_eq!(p.title, "P1090 合并果子");
        assert_eq!(p.knowledge_points, ["哈夫曼树", "优先队列"]);
        assert!(p.description.contains("Algorithm: Greedy"));
        assert!(p.description.ends_with("Source: Luogu P1090"));
        assert!(p.key_insights.contains("本题考查哈夫曼树/优先队列"));
        assert!(p.key_insights.contains("属于Greedy模型"));
        assert_eq!(p.judge_url(), "https://www.luogu.com.cn/problem/P1090");
    }

    #[test]
    fn find_unknown_is_an_error() {
        let err = sample().find("P0000").unwrap_err();
        assert!(matches!(err, DashError::UnknownProblem { ref id } if id == "P0000"));
    }

    #[test]
    fn filter_combines_tier_and_tag() {
        let catalog = sample();
        assert_eq!(catalog.filter(ProblemFilter::default()).count(), 3);
        assert_eq!(catalog.filter(ProblemFilter::default().tier(Tier::T2)).count(), 2);
        let both = ProblemFilter::default().tier(Tier::T2).tag(AlgorithmTag::Graph);
        let ids: Vec<_> = catalog.filter(both).map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["P3379"]);
        assert_eq!(
            catalog
                .filter(ProblemFilter::default().tier(Tier::T1).tag(AlgorithmTag::Dp))
                .count(),
            0
        );
    }

    #[test]
    fn tag_frequency_sorts_descending_and_keeps_ties_stable() {
        let counts = tag_frequency(["b", "a", "b", "c", "a", "b"]);
        let flat: Vec<_> = counts.iter().map(|c| (c.tag, c.count)).collect();
        assert_eq!(flat, [("b", 3), ("a", 2), ("c", 1)]);

        let ties = tag_frequency(["x", "y"]);
        assert_eq!(ties[0].tag, "x");
    }

    #[test]
    fn top_tags_truncates() {
        let top = sample().top_tags(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].tag, AlgorithmTag::Greedy);
    }

    #[test]
    fn judge_bands() {
        assert_eq!(JudgeBand::classify("入门"), JudgeBand::Red);
        assert_eq!(JudgeBand::classify("普及-"), JudgeBand::Orange);
        assert_eq!(JudgeBand::classify("普及/提高-"), JudgeBand::Yellow);
        assert_eq!(JudgeBand::classify("普及+/提高"), JudgeBand::Green);
        assert_eq!(JudgeBand::classify("提高+/省选-"), JudgeBand::Blue);
        assert_eq!(JudgeBand::classify("省选/NOI-"), JudgeBand::Purple);
        assert_eq!(JudgeBand::classify("暂无评定"), JudgeBand::Unrated);
    }

    #[test]
    fn parse_tier_and_tag() {
        assert_eq!("t3".parse::<Tier>().unwrap(), Tier::T3);
        assert!("T5".parse::<Tier>().is_err());
        assert_eq!("dp".parse::<AlgorithmTag>().unwrap(), AlgorithmTag::Dp);
        assert_eq!("图论".parse::<AlgorithmTag>().unwrap(), AlgorithmTag::Graph);
        assert!("Flow".parse::<AlgorithmTag>().is_err());
    }
}
