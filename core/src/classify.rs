//! Content sniffing for agent trace lines.
//!
//! The trace stream carries no structured tags, so lines are categorized by
//! the markers the agent prints. Rules live in [`CLASSIFICATION_RULES`] and are
//! evaluated top to bottom; the first match wins.

use serde::Serialize;
use strum_macros::Display;
use strum_macros::IntoStaticStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LineCategory {
    Performance,
    Thinking,
    Action,
    Finish,
    Separator,
    Plain,
}

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any of the substrings is present.
    Contains(&'static [&'static str]),
    /// A rule made of `=` or `-`.
    Rule,
}

impl Matcher {
    fn matches(&self, content: &str) -> bool {
        match self {
            Matcher::Contains(markers) => markers.iter().any(|marker| content.contains(marker)),
            Matcher::Rule => is_rule_line(content),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub category: LineCategory,
    pub matcher: Matcher,
}

/// Ordered rule table. Performance sits first so that timing lines such as
/// `思考完成延迟: 1.2s` are not mistaken for reasoning output.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        category: LineCategory::Performance,
        matcher: Matcher::Contains(&[
            "⏱",
            "性能指标",
            "TTFT",
            "延迟",
            "耗时",
            "推理时间",
            "Latency",
            "latency",
            "Elapsed",
            "elapsed",
            "Inference time",
        ]),
    },
    ClassificationRule {
        category: LineCategory::Thinking,
        matcher: Matcher::Contains(&["💭", "🤔", "思考过程", "思考中", "Thinking"]),
    },
    ClassificationRule {
        category: LineCategory::Action,
        matcher: Matcher::Contains(&["🎯", "⚡", "执行动作", "Action:"]),
    },
    ClassificationRule {
        category: LineCategory::Finish,
        matcher: Matcher::Contains(&["✅", "🎉", "任务完成", "Task completed", "finish("]),
    },
    ClassificationRule {
        category: LineCategory::Separator,
        matcher: Matcher::Rule,
    },
];

/// Categorize a (possibly still growing) line. Total: anything unmatched is
/// [`LineCategory::Plain`].
pub fn classify(content: &str) -> LineCategory {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matcher.matches(content))
        .map_or(LineCategory::Plain, |rule| rule.category)
}

fn is_rule_line(content: &str) -> bool {
    if !content.contains("====") && !content.contains("----") {
        return false;
    }
    let mut visible = 0usize;
    let mut rule_chars = 0usize;
    for ch in content.chars().filter(|ch| !ch.is_whitespace()) {
        visible += 1;
        if ch == '=' || ch == '-' {
            rule_chars += 1;
        }
    }
    rule_chars * 2 >= visible
}
