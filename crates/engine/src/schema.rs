use std::fmt;

use serde::Serialize;

use crate::error::GradeError;

/// Logical role a question-bank column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Identifier,
    Answer,
    Score,
    Content,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Answer => write!(f, "answer"),
            Self::Score => write!(f, "score"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// Resolved role → column-name mapping for one question bank.
///
/// Built once per bank, immutable afterward. `content` is the only optional
/// role.
#[derive(Debug, Clone, Serialize)]
pub struct RoleMap {
    pub identifier: String,
    pub answer: String,
    pub score: String,
    pub content: Option<String>,
}

/// Keyword rule set driving column classification.
///
/// Classification lower-cases and trims a header, then tests substring
/// membership against each role's keywords in a fixed role order. The rule
/// set is a value so callers can swap in locale- or site-specific keywords
/// without touching the grading engine.
#[derive(Debug, Clone)]
pub struct RoleRules {
    pub identifier_keywords: Vec<String>,
    pub answer_keywords: Vec<String>,
    pub score_keywords: Vec<String>,
    pub content_keywords: Vec<String>,
    pub name_keywords: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            identifier_keywords: to_strings(&["题号", "question", "q_id", "no."]),
            answer_keywords: to_strings(&["答案", "answer", "ans", "key"]),
            score_keywords: to_strings(&["分值", "分数", "得分", "score", "points"]),
            content_keywords: to_strings(&["内容", "题目", "content"]),
            name_keywords: to_strings(&["姓名", "name", "student"]),
            exclude_patterns: to_strings(&["总分", "合计", "得分", "统计", "nan"]),
        }
    }
}

impl RoleRules {
    /// Classify one column header. Roles are tested in declaration order;
    /// the first keyword hit decides.
    pub fn classify(&self, column: &str) -> Option<Role> {
        let folded = column.trim().to_lowercase();
        let sets = [
            (Role::Identifier, &self.identifier_keywords),
            (Role::Answer, &self.answer_keywords),
            (Role::Score, &self.score_keywords),
            (Role::Content, &self.content_keywords),
        ];
        for (role, keywords) in sets {
            if keywords.iter().any(|kw| folded.contains(kw.as_str())) {
                return Some(role);
            }
        }
        None
    }

    /// Index of the student-name column: first header containing a name
    /// keyword, else the left-most column.
    pub fn name_column(&self, columns: &[String]) -> usize {
        columns
            .iter()
            .position(|c| {
                let folded = c.trim().to_lowercase();
                self.name_keywords.iter().any(|kw| folded.contains(kw.as_str()))
            })
            .unwrap_or(0)
    }

    /// Summary/total rows masquerade as questions in real banks; an
    /// identifier matching any exclude pattern is not a question.
    pub fn is_excluded_id(&self, id_text: &str) -> bool {
        let folded = id_text.trim().to_lowercase();
        folded.is_empty()
            || self
                .exclude_patterns
                .iter()
                .any(|p| folded.contains(p.as_str()))
    }
}

/// Infer the RoleMap from bank headers with an arbitrary classifier.
///
/// First matching column wins per role; later columns matching an already
/// resolved role are ignored. Fails when any of {identifier, answer, score}
/// stays unresolved, naming every missing role.
pub fn infer_roles_with(
    columns: &[String],
    classify: impl Fn(&str) -> Option<Role>,
) -> Result<RoleMap, GradeError> {
    let mut identifier: Option<&String> = None;
    let mut answer: Option<&String> = None;
    let mut score: Option<&String> = None;
    let mut content: Option<&String> = None;

    for col in columns {
        let slot = match classify(col) {
            Some(Role::Identifier) => &mut identifier,
            Some(Role::Answer) => &mut answer,
            Some(Role::Score) => &mut score,
            Some(Role::Content) => &mut content,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(col);
        }
    }

    let mut missing = Vec::new();
    if identifier.is_none() {
        missing.push(Role::Identifier.to_string());
    }
    if answer.is_none() {
        missing.push(Role::Answer.to_string());
    }
    if score.is_none() {
        missing.push(Role::Score.to_string());
    }
    if !missing.is_empty() {
        return Err(GradeError::SchemaInference { missing });
    }

    Ok(RoleMap {
        identifier: identifier.unwrap().clone(),
        answer: answer.unwrap().clone(),
        score: score.unwrap().clone(),
        content: content.cloned(),
    })
}

/// Infer the RoleMap using a keyword rule set.
pub fn infer_roles(columns: &[String], rules: &RoleRules) -> Result<RoleMap, GradeError> {
    infer_roles_with(columns, |col| rules.classify(col))
}
