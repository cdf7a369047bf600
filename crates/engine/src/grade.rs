use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::GradeError;
use crate::normalize::normalize;
use crate::reconcile::{digit_collisions, AnswerLocator};
use crate::schema::{infer_roles, RoleMap, RoleRules};
use crate::table::Table;

// ---------------------------------------------------------------------------
// Answer key
// ---------------------------------------------------------------------------

/// One valid question from the bank, answer pre-normalized.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: String,
    pub answer_norm: String,
    pub points: f64,
    pub content: Option<String>,
    #[serde(skip)]
    pub bank_row: usize,
}

/// Role map plus the derived answer key for one question bank.
#[derive(Debug, Clone, Serialize)]
pub struct BankReport {
    pub role_map: RoleMap,
    pub questions: Vec<Question>,
    pub paper_total: f64,
    pub warnings: Vec<String>,
}

/// Infer roles and derive the answer key from a question bank table.
///
/// Rows with an empty identifier, or whose identifier matches an exclude
/// pattern, are summary rows and dropped. Duplicate identifiers keep the
/// last occurrence, preserving the first occurrence's position.
pub fn ingest_bank(bank: &Table, rules: &RoleRules) -> Result<BankReport, GradeError> {
    let role_map = infer_roles(&bank.columns, rules)?;
    let mut warnings = Vec::new();

    let mut questions: Vec<Question> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in 0..bank.row_count() {
        let id = bank.cell_by_name(row, &role_map.identifier).to_display();
        let id = id.trim().to_string();
        if rules.is_excluded_id(&id) {
            continue;
        }

        let answer_norm = normalize(bank.cell_by_name(row, &role_map.answer));
        let points = bank
            .cell_by_name(row, &role_map.score)
            .as_number()
            .unwrap_or(0.0);
        let content = role_map.content.as_deref().map(|col| {
            bank.cell_by_name(row, col).to_display()
        });

        let question = Question { id: id.clone(), answer_norm, points, content, bank_row: row };
        match index.get(&id) {
            Some(&at) => {
                warnings.push(format!(
                    "duplicate question id '{id}' in bank, keeping the last occurrence"
                ));
                questions[at] = question;
            }
            None => {
                index.insert(id, questions.len());
                questions.push(question);
            }
        }
    }

    if questions.is_empty() {
        return Err(GradeError::EmptyInput { side: "question bank".into() });
    }

    let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
    for (key, colliding) in digit_collisions(&ids) {
        warnings.push(format!(
            "question ids {} share digit key '{key}' and reconcile to the same sheet column",
            colliding.join(", ")
        ));
    }

    let paper_total = questions.iter().map(|q| q.points).sum();

    Ok(BankReport { role_map, questions, paper_total, warnings })
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StudentResult {
    pub name: String,
    pub score: f64,
    /// Missed question ids, in bank order.
    pub wrong_questions: Vec<String>,
}

/// Per-question miss count across the class, joined with bank metadata.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionStat {
    pub id: String,
    pub points: f64,
    pub missed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub students: usize,
    pub questions: usize,
    pub paper_total: f64,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
}

/// One complete grading pass: inputs digested, every student scored.
///
/// Immutable once built; the result store shares it behind an `Arc` so a
/// commit can never expose a half-written run.
#[derive(Debug, Serialize)]
pub struct GradeRun {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub role_map: RoleMap,
    pub questions: Vec<Question>,
    pub results: BTreeMap<String, StudentResult>,
    pub question_stats: Vec<QuestionStat>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub bank: Table,
}

impl GradeRun {
    pub fn lookup(&self, name: &str) -> Option<&StudentResult> {
        self.results.get(name)
    }

    /// Bank rows for one student's missed questions, in bank order.
    pub fn missed_question_rows(&self, name: &str) -> Option<Table> {
        let result = self.results.get(name)?;
        let mut out = Table::new(self.bank.columns.clone());
        for q in &self.questions {
            if result.wrong_questions.iter().any(|w| w == &q.id) {
                if let Some(row) = self.bank.rows.get(q.bank_row) {
                    out.push_row(row.clone());
                }
            }
        }
        Some(out)
    }

    /// (name, score) pairs sorted by score descending, ties by name.
    pub fn class_summary(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .results
            .values()
            .map(|r| (r.name.clone(), r.score))
            .collect();
        pairs.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        pairs
    }
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Grade a student sheet against a question bank.
///
/// Per student, every question in the answer key lands in exactly one of
/// {scored, missed}: the student's cell is resolved via exact-then-digit
/// column matching, both sides are normalized, and equality decides.
/// A question with no resolvable column counts as missed.
pub fn grade(bank: &Table, sheet: &Table, rules: &RoleRules) -> Result<GradeRun, GradeError> {
    let bank_report = ingest_bank(bank, rules)?;
    let mut warnings = bank_report.warnings;

    let name_col = rules.name_column(&sheet.columns);
    let locator = AnswerLocator::new(&sheet.columns);

    let mut results: BTreeMap<String, StudentResult> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in 0..sheet.row_count() {
        let name = sheet.cell(row, name_col).to_display();
        let name = name.trim().to_string();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            skipped += 1;
            continue;
        }

        let mut score = 0.0;
        let mut wrong = Vec::new();
        for q in &bank_report.questions {
            let answered = locator
                .locate(&q.id)
                .map(|col| normalize(sheet.cell(row, col)));
            match answered {
                Some(given) if given == q.answer_norm => score += q.points,
                _ => wrong.push(q.id.clone()),
            }
        }

        if results.contains_key(&name) {
            warnings.push(format!(
                "duplicate student name '{name}' in sheet, keeping the last row"
            ));
        }
        results.insert(name.clone(), StudentResult { name, score, wrong_questions: wrong });
    }

    if results.is_empty() {
        return Err(GradeError::EmptyInput { side: "student sheet".into() });
    }
    if skipped > 0 {
        warnings.push(format!("skipped {skipped} student row(s) with an empty or nan name"));
    }

    // Miss counts come from the final results map, so duplicate-name
    // overwrites cannot leave stale counts behind.
    let question_stats: Vec<QuestionStat> = bank_report
        .questions
        .iter()
        .map(|q| QuestionStat {
            id: q.id.clone(),
            points: q.points,
            missed: results
                .values()
                .filter(|r| r.wrong_questions.iter().any(|w| w == &q.id))
                .count(),
            content: q.content.clone(),
        })
        .collect();

    let scores: Vec<f64> = results.values().map(|r| r.score).collect();
    let summary = RunSummary {
        students: results.len(),
        questions: bank_report.questions.len(),
        paper_total: bank_report.paper_total,
        average_score: scores.iter().sum::<f64>() / scores.len() as f64,
        highest_score: scores.iter().cloned().fold(f64::MIN, f64::max),
        lowest_score: scores.iter().cloned().fold(f64::MAX, f64::min),
    };

    Ok(GradeRun {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        role_map: bank_report.role_map,
        questions: bank_report.questions,
        results,
        question_stats,
        warnings,
        bank: bank.clone(),
    })
}
