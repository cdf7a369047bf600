//! `markgrid-engine` — Exam grading and identifier reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns graded results.
//! No CLI or IO dependencies.

pub mod config;
pub mod error;
pub mod grade;
pub mod normalize;
pub mod reconcile;
pub mod schema;
pub mod store;
pub mod table;

pub use config::GradeConfig;
pub use error::GradeError;
pub use grade::{grade, GradeRun, StudentResult};
pub use schema::{infer_roles, Role, RoleMap, RoleRules};
pub use store::ResultStore;
pub use table::{Scalar, Table};
