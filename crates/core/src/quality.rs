//! Heuristic scoring of extracted text.
//!
//! Every extraction attempt is scored before it is accepted as an article
//! body. The score starts at [`BASE_SCORE`] and is adjusted for length,
//! paragraph structure, lexical diversity and navigation vocabulary.

use std::collections::HashSet;

use serde::Serialize;

use crate::parse::char_len;

/// Minimum score for text to count as a genuine article.
pub const ACCEPT_THRESHOLD: u8 = 30;

/// Starting score before adjustments.
pub const BASE_SCORE: i32 = 50;

const SHORT_CONTENT_CHARS: usize = 100;
const LONG_CONTENT_CHARS: usize = 500;
const FEW_PARAGRAPHS: usize = 3;
const MANY_PARAGRAPHS: usize = 5;
const MIN_TOKEN_CHARS: usize = 3;
const LOW_DIVERSITY: f64 = 0.3;
const HIGH_DIVERSITY: f64 = 0.5;
const MAX_NAV_TERMS: usize = 3;

/// Vocabulary typical of menus and pagination rather than article prose.
pub const NAVIGATION_TERMS: &[&str] = &["首页", "菜单", "登录", "注册", "搜索", "分类", "标签", "上一页", "下一页"];

/// Score and explanation for one piece of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityScore {
    /// Score clamped to 0..=100.
    pub score: u8,
    /// Triggered negative conditions joined with `; `, empty when none.
    pub reason: String,
}

impl QualityScore {
    /// Whether the score reaches [`ACCEPT_THRESHOLD`].
    pub fn is_acceptable(&self) -> bool {
        self.score >= ACCEPT_THRESHOLD
    }
}

/// Score extracted text.
///
/// Length is counted in characters. Paragraphs are blank-line separated
/// blocks. Lexical diversity only considers whitespace tokens longer than
/// three characters and is skipped when there are none, which is common for
/// CJK prose.
///
/// # Example
///
/// ```rust
/// use gleaner_core::quality::score_content;
///
/// let score = score_content("首页 菜单 登录 注册 搜索");
/// assert!(!score.is_acceptable());
/// assert!(score.reason.contains("navigation"));
/// ```
pub fn score_content(text: &str) -> QualityScore {
    let mut score = BASE_SCORE;
    let mut reasons: Vec<&str> = Vec::new();

    let length = char_len(text);
    if length < SHORT_CONTENT_CHARS {
        score -= 30;
        reasons.push("content too short");
    } else if length > LONG_CONTENT_CHARS {
        score += 20;
    }

    let paragraphs = paragraph_count(text);
    if paragraphs < FEW_PARAGRAPHS {
        score -= 10;
        reasons.push("too few paragraphs");
    } else if paragraphs > MANY_PARAGRAPHS {
        score += 10;
    }

    if let Some(ratio) = lexical_diversity(text) {
        if ratio < LOW_DIVERSITY {
            score -= 20;
            reasons.push("low lexical diversity");
        } else if ratio > HIGH_DIVERSITY {
            score += 10;
        }
    }

    if navigation_term_count(text) > MAX_NAV_TERMS {
        score -= 15;
        reasons.push("too many navigation terms");
    }

    QualityScore { score: score.clamp(0, 100) as u8, reason: reasons.join("; ") }
}

/// Number of non-empty blank-line separated blocks.
pub fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

/// Ratio of distinct to total tokens among whitespace tokens longer than
/// three characters, or `None` when there are no such tokens.
pub fn lexical_diversity(text: &str) -> Option<f64> {
    let tokens: Vec<&str> = text.split_whitespace().filter(|t| char_len(t) > MIN_TOKEN_CHARS).collect();
    if tokens.is_empty() {
        return None;
    }

    let distinct: HashSet<&str> = tokens.iter().copied().collect();
    Some(distinct.len() as f64 / tokens.len() as f64)
}

/// Number of distinct [`NAVIGATION_TERMS`] present in the text.
pub fn navigation_term_count(text: &str) -> usize {
    NAVIGATION_TERMS.iter().filter(|term| text.contains(*term)).count()
}
