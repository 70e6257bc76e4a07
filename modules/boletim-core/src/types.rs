use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Raw inbound parameters, keyed by name (`studentName`, `motherName`, `year`, `birthDate`).
pub type QueryParams = HashMap<String, String>;

// --- Request side ---

/// A validated request for one student's boletim. Only built by
/// [`crate::validate_request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub student_name: String,
    pub mother_name: String,
    /// `dd/mm/yyyy`, passed through to the portal untouched.
    pub birth_date: String,
    pub year: i32,
}

/// A portal session bound to one search. Single-use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Relative URL the portal redirects the browser to after the search.
    pub action_url: String,
    pub session_id: String,
}

// --- Report side ---

/// Identity block of the boletim. Fields the portal doesn't show stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInformation {
    pub school: String,
    pub name: String,
    pub course: String,
    pub class: String,
    pub city: String,
    pub birth_date: String,
    pub grade: String,
    pub shift: String,
    pub state: String,
    pub academic_year: String,
}

/// Final standing for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalResult {
    /// Aprovado.
    #[serde(rename = "APV")]
    Approved,
    /// Reprovado por nota.
    #[serde(rename = "RPV")]
    FailedByGrade,
    /// Reprovado por falta.
    #[serde(rename = "RPF")]
    FailedByAbsence,
}

impl FinalResult {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "APV" => Some(Self::Approved),
            "RPV" => Some(Self::FailedByGrade),
            "RPF" => Some(Self::FailedByAbsence),
            _ => None,
        }
    }
}

/// One curricular subject row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    pub subject: Option<String>,
    /// Bimester (1..=4) to grade. A bimester whose cell could not be read as a
    /// number maps to `None`; a bimester whose cell never appeared is absent.
    pub grades: BTreeMap<u8, Option<f64>>,
    pub annual_grade_average: Option<f64>,
    pub absences: Option<f64>,
    /// Annual attendance, in percent.
    pub annual_frequence: Option<f64>,
    pub final_result: Option<FinalResult>,
}

impl GradeRow {
    pub fn bimester(&self, index: u8) -> Option<f64> {
        self.grades.get(&index).copied().flatten()
    }
}

/// The assembled boletim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub information: ReportInformation,
    /// In the order the portal lists the subjects.
    pub grades: Vec<GradeRow>,
}
