//! Command implementations for `mgrid`.
//!
//! Each command loads its inputs through `markgrid-io`, runs the engine, and
//! routes queries through a `ResultStore` commit, so one invocation exercises
//! the same snapshot path a long-lived host would.

use std::path::Path;

use markgrid_engine::grade::ingest_bank;
use markgrid_engine::{grade, GradeConfig, ResultStore, RoleRules, Scalar, Table};

use crate::exit_codes::EXIT_GRADE_CONFIG;
use crate::CliError;

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn load_rules(config: Option<&Path>) -> Result<RoleRules, CliError> {
    let Some(path) = config else {
        return Ok(RoleRules::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_GRADE_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    Ok(GradeConfig::from_toml(&text)?.rules())
}

fn load_input(path: &Path, side: &str) -> Result<Table, CliError> {
    markgrid_io::load_table(path)
        .map_err(|e| CliError::parse(format!("cannot load {side} {}: {e}", path.display())))
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

/// Scores print like cell values, so whole numbers carry no ".0" artifact.
fn score_text(score: f64) -> String {
    Scalar::Number(score).to_display()
}

fn print_table(table: &Table) {
    println!("{}", table.columns.join("\t"));
    for row in 0..table.row_count() {
        let line: Vec<String> = (0..table.columns.len())
            .map(|col| table.cell(row, col).to_display())
            .collect();
        println!("{}", line.join("\t"));
    }
}

// ---------------------------------------------------------------------------
// grade
// ---------------------------------------------------------------------------

pub fn run_grade(
    bank: &Path,
    sheet: &Path,
    config: Option<&Path>,
    json: bool,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let rules = load_rules(config)?;
    let bank_table = load_input(bank, "bank")?;
    let sheet_table = load_input(sheet, "sheet")?;

    let run = grade(&bank_table, &sheet_table, &rules)?;
    print_warnings(&run.warnings);

    let json_str = serde_json::to_string_pretty(&run)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &run.summary;
    eprintln!(
        "{} students, {} questions, paper total {}: average {:.1}, highest {}, lowest {}",
        s.students,
        s.questions,
        score_text(s.paper_total),
        s.average_score,
        score_text(s.highest_score),
        score_text(s.lowest_score),
    );

    let mut missed: Vec<_> = run.question_stats.iter().filter(|q| q.missed > 0).collect();
    missed.sort_by(|a, b| b.missed.cmp(&a.missed).then_with(|| a.id.cmp(&b.id)));
    if !missed.is_empty() {
        let line = missed
            .iter()
            .take(3)
            .map(|q| format!("{} ({})", q.id, q.missed))
            .collect::<Vec<_>>()
            .join(", ");
        eprintln!("most missed: {line}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

pub fn run_inspect(bank: &Path, config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let rules = load_rules(config)?;
    let bank_table = load_input(bank, "bank")?;

    let report = ingest_bank(&bank_table, &rules)?;
    print_warnings(&report.warnings);

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    let map = &report.role_map;
    println!("identifier:  {}", map.identifier);
    println!("answer:      {}", map.answer);
    println!("score:       {}", map.score);
    match &map.content {
        Some(col) => println!("content:     {col}"),
        None => println!("content:     (none)"),
    }
    println!("questions:   {}", report.questions.len());
    println!("paper total: {}", score_text(report.paper_total));
    Ok(())
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

pub fn run_errors(
    bank: &Path,
    sheet: &Path,
    student: Option<&str>,
    all: bool,
    out: Option<&Path>,
    out_dir: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    if all && student.is_some() {
        return Err(CliError::usage("--all cannot be combined with a student name"));
    }
    if all && out_dir.is_none() {
        return Err(CliError::usage("--all requires --out-dir"));
    }
    if !all && student.is_none() {
        return Err(CliError::usage("pass a student name, or --all with --out-dir"));
    }

    let rules = load_rules(config)?;
    let bank_table = load_input(bank, "bank")?;
    let sheet_table = load_input(sheet, "sheet")?;

    let store = ResultStore::new();
    let run = store.commit(grade(&bank_table, &sheet_table, &rules)?);
    print_warnings(&run.warnings);

    if let Some(name) = student {
        let rows = store.missed_question_rows(name)?;
        if rows.row_count() == 0 {
            eprintln!("{name}: no missed questions");
            return Ok(());
        }
        match out {
            Some(path) => {
                markgrid_io::write_table(&rows, path).map_err(CliError::io)?;
                eprintln!("wrote {}", path.display());
            }
            None => print_table(&rows),
        }
        return Ok(());
    }

    let dir = out_dir.unwrap();
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", dir.display())))?;

    let mut written = 0usize;
    for name in run.results.keys() {
        let rows = store.missed_question_rows(name)?;
        if rows.row_count() == 0 {
            continue;
        }
        let file_name = format!("{}_errors.xlsx", name.replace(['/', '\\'], "_"));
        let path = dir.join(file_name);
        markgrid_io::write_table(&rows, &path).map_err(CliError::io)?;
        written += 1;
    }
    eprintln!("wrote {written} error book(s) to {}", dir.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

pub fn run_summary(
    bank: &Path,
    sheet: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let rules = load_rules(config)?;
    let bank_table = load_input(bank, "bank")?;
    let sheet_table = load_input(sheet, "sheet")?;

    let store = ResultStore::new();
    let run = store.commit(grade(&bank_table, &sheet_table, &rules)?);
    print_warnings(&run.warnings);

    let pairs = store.class_summary()?;
    let score_header = format!("score (/{})", score_text(run.summary.paper_total));
    let mut table = Table::new(vec!["name".to_string(), score_header]);
    for (name, score) in &pairs {
        table.push_row(vec![Scalar::Text(name.clone()), Scalar::Number(*score)]);
    }

    match output {
        Some(path) => {
            markgrid_io::write_table(&table, path).map_err(CliError::io)?;
            eprintln!("wrote {}", path.display());
        }
        None => print_table(&table),
    }

    eprintln!(
        "{} students, paper total {}",
        pairs.len(),
        score_text(run.summary.paper_total)
    );
    Ok(())
}
