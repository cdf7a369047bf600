use std::collections::HashMap;

/// Maximal run of ASCII digits in an identifier, in order of appearance.
/// "Q12" → "12", "第3题" → "3", "extra" → "".
pub fn digit_key(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Resolves a question identifier to a student-sheet column.
///
/// Two tiers, built once per grading run: exact header match takes
/// precedence; otherwise the identifier's digit string is looked up in a
/// digits → column map where the first column encountered per digit string
/// wins. Banks and scanned sheets are routinely authored with mismatched
/// prefixes ("Q1" vs "QQ1" vs "1"), which the digit tier absorbs.
pub struct AnswerLocator {
    exact: HashMap<String, usize>,
    by_digits: HashMap<String, usize>,
}

impl AnswerLocator {
    pub fn new(columns: &[String]) -> Self {
        let mut exact = HashMap::new();
        let mut by_digits = HashMap::new();
        for (idx, col) in columns.iter().enumerate() {
            exact.entry(col.clone()).or_insert(idx);
            let key = digit_key(col);
            if !key.is_empty() {
                by_digits.entry(key).or_insert(idx);
            }
        }
        Self { exact, by_digits }
    }

    /// Column index holding this question's answers, or None when the
    /// student sheet has no matching column (the answer is then missing and
    /// the question counts as wrong).
    pub fn locate(&self, question_id: &str) -> Option<usize> {
        if let Some(&idx) = self.exact.get(question_id) {
            return Some(idx);
        }
        let key = digit_key(question_id);
        if key.is_empty() {
            return None;
        }
        self.by_digits.get(&key).copied()
    }
}

/// Question ids that collapse to the same digit string reconcile against the
/// same student column. Tolerated, but callers must surface the ambiguity.
pub fn digit_collisions(question_ids: &[String]) -> Vec<(String, Vec<String>)> {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for id in question_ids {
        let key = digit_key(id);
        if !key.is_empty() {
            groups.entry(key).or_default().push(id.clone());
        }
    }
    let mut collisions: Vec<(String, Vec<String>)> = groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    collisions.sort_by(|a, b| a.0.cmp(&b.0));
    collisions
}
