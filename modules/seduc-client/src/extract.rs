//! Decoding of the portal's result page.
//!
//! The page holds several `table.table` elements. The one whose first header
//! reads `Escola:` is the identity block, decoded by walking `th`/`td` pairs.
//! Every other table is read as the curricular table, decoded positionally;
//! when there are several, the last one on the page wins.

use std::sync::LazyLock;

use boletim_core::{
    BoletimError, FinalResult, GradeRow, Report, ReportInformation, Result,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::PortalConfig;
use crate::transport::PortalTransport;

static TABLES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.table").unwrap());
static BODY_ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody > tr").unwrap());
static FIRST_HEADER_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody > tr > th > strong").unwrap());

static RE_LABEL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" - ([0-9]*)").unwrap());
static RE_LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").unwrap());

const INFORMATION_TABLE_LABEL: &str = "Escola:";

/// Download the result page with the session cookie and decode it.
pub async fn fetch_report(
    transport: &dyn PortalTransport,
    config: &PortalConfig,
    result_path: &str,
    session_id: &str,
) -> Result<Report> {
    let resp = transport
        .get_with_session(&config.url(result_path), session_id)
        .await?;

    if !resp.is_ok() {
        return Err(BoletimError::Unknown(format!(
            "Boletim page fetch failed: {}",
            resp.reason()
        )));
    }

    parse_report(&resp.body)
}

/// Decode a result page into a [`Report`].
pub fn parse_report(html: &str) -> Result<Report> {
    let document = Html::parse_document(html);
    let mut report = Report::default();

    for table in document.select(&TABLES) {
        if is_information_table(&table) {
            report.information = decode_information(&table)?;
        } else {
            let rows = decode_grades(&table);
            debug!(rows = rows.len(), "Decoded curricular table");
            report.grades = rows;
        }
    }

    Ok(report)
}

fn is_information_table(table: &ElementRef) -> bool {
    table
        .select(&FIRST_HEADER_LABEL)
        .next()
        .is_some_and(|label| text_of(&label).trim() == INFORMATION_TABLE_LABEL)
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect()
}

// ---------------------------------------------------------------------------
// Identity table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum InformationField {
    School,
    Name,
    BirthDate,
    Course,
    Grade,
    Class,
    Shift,
    City,
    State,
    AcademicYear,
}

impl InformationField {
    fn slot(self, info: &mut ReportInformation) -> &mut String {
        match self {
            Self::School => &mut info.school,
            Self::Name => &mut info.name,
            Self::BirthDate => &mut info.birth_date,
            Self::Course => &mut info.course,
            Self::Grade => &mut info.grade,
            Self::Class => &mut info.class,
            Self::Shift => &mut info.shift,
            Self::City => &mut info.city,
            Self::State => &mut info.state,
            Self::AcademicYear => &mut info.academic_year,
        }
    }
}

const INFORMATION_LABELS: &[(&str, InformationField)] = &[
    ("Escola", InformationField::School),
    ("Aluno(a)", InformationField::Name),
    ("Data de Nascimento", InformationField::BirthDate),
    ("Curso", InformationField::Course),
    ("Série", InformationField::Grade),
    ("Turma", InformationField::Class),
    ("Turno", InformationField::Shift),
    ("Cidade", InformationField::City),
    ("Estado", InformationField::State),
    ("Ano Letivo", InformationField::AcademicYear),
];

/// `"Escola - 1234:"` → `"Escola"`.
fn normalize_label(raw: &str) -> String {
    let without_colons = raw.replace(':', "");
    RE_LABEL_SUFFIX
        .replace_all(&without_colons, "")
        .trim()
        .to_string()
}

fn information_field(label: &str) -> Option<InformationField> {
    INFORMATION_LABELS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, field)| *field)
}

/// Walk each row's `th`/`td` children as label/value pairs.
///
/// Two headers in a row, or a value with no header before it, is malformed.
/// Labels outside the known set are consumed without setting anything.
pub fn decode_information(table: &ElementRef) -> Result<ReportInformation> {
    let mut info = ReportInformation::default();

    for row in table.select(&BODY_ROWS) {
        let mut expecting_value = false;
        let mut pending: Option<InformationField> = None;

        for cell in row.children().filter_map(ElementRef::wrap) {
            match cell.value().name() {
                "th" => {
                    if expecting_value {
                        return Err(BoletimError::MalformedTable);
                    }
                    expecting_value = true;

                    let label = normalize_label(&text_of(&cell));
                    pending = information_field(&label);
                    if pending.is_none() {
                        debug!(label = %label, "Ignoring unknown identity label");
                    }
                }
                "td" => {
                    if !expecting_value {
                        return Err(BoletimError::MalformedTable);
                    }
                    expecting_value = false;

                    if let Some(field) = pending.take() {
                        *field.slot(&mut info) = text_of(&cell).trim().to_string();
                    }
                }
                _ => {}
            }
        }
    }

    Ok(info)
}

// ---------------------------------------------------------------------------
// Curricular table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum GradeColumn {
    Subject,
    Bimester(u8),
    AnnualAverage,
    Absences,
    AnnualFrequence,
    FinalResult,
}

const GRADE_COLUMNS: [GradeColumn; 9] = [
    GradeColumn::Subject,
    GradeColumn::Bimester(1),
    GradeColumn::Bimester(2),
    GradeColumn::Bimester(3),
    GradeColumn::Bimester(4),
    GradeColumn::AnnualAverage,
    GradeColumn::Absences,
    GradeColumn::AnnualFrequence,
    GradeColumn::FinalResult,
];

/// Header and footer cells the portal mixes into the curricular table body.
const CAPTION_CELLS: &[&str] = &["Componentes Curriculares", "1ª Av", "Frequência Anual(%):"];

const FINAL_RESULT_CAPTION: &str = "Resultado Final Matrícula Regular";

fn is_caption(text: &str) -> bool {
    let text = text.trim();
    CAPTION_CELLS.contains(&text) || text.starts_with(FINAL_RESULT_CAPTION)
}

impl GradeColumn {
    fn fill(self, row: &mut GradeRow, text: &str) {
        match self {
            Self::Subject => row.subject = Some(text.trim().to_string()),
            Self::Bimester(index) => {
                row.grades.insert(index, parse_decimal(text));
            }
            Self::AnnualAverage => row.annual_grade_average = parse_decimal(text),
            Self::Absences => row.absences = parse_decimal(text),
            Self::AnnualFrequence => row.annual_frequence = parse_decimal(text),
            Self::FinalResult => row.final_result = parse_final_result(text),
        }
    }
}

/// Read a Brazilian-format number (`"7,5"`), taking the longest numeric prefix.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replacen(',', ".", 1);
    RE_LEADING_FLOAT
        .find(&normalized)
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_final_result(text: &str) -> Option<FinalResult> {
    let code = text.trim();
    if code.is_empty() || code == "-" {
        return None;
    }

    let result = FinalResult::from_code(code);
    if result.is_none() {
        warn!(code, "Unrecognized final result code");
    }
    result
}

/// Decode subject rows positionally, in table order.
///
/// A row holding any caption cell is dropped whole. Short rows keep what they
/// have; cells past the ninth are ignored.
pub fn decode_grades(table: &ElementRef) -> Vec<GradeRow> {
    let mut rows = Vec::new();

    for tr in table.select(&BODY_ROWS) {
        let mut row = GradeRow::default();
        let mut column = 0usize;
        let mut skip = false;

        for cell in tr.children().filter_map(ElementRef::wrap) {
            let text = text_of(&cell);
            if is_caption(&text) {
                skip = true;
                break;
            }

            if let Some(slot) = GRADE_COLUMNS.get(column) {
                slot.fill(&mut row, &text);
            }
            column += 1;
        }

        if !skip && column > 0 {
            rows.push(row);
        }
    }

    rows
}
