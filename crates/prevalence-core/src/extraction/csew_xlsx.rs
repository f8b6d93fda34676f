use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use rust_decimal::Decimal;

use crate::error::PrevalenceError;
use crate::table::schema::{DrugDef, OptionDef, QuestionDef, RateTableDef};
use crate::table::validate_table;

/// Decimal places kept from the workbook.
const RATE_DECIMALS: u32 = 4;

const DEMOGRAPHICS_SHEET: &str = "3.01";
const HOUSEHOLD_SHEET: &str = "3.02";

/// Row of sheet 3.01 holding the all-adults figures.
const BASELINE_ROW: u32 = 8;
const BASELINE_MARKER: &str = "All people aged 16-59";

/// Drug columns (0-indexed, C..H) with their legal classification.
const DRUG_COLUMNS: &[(u32, &str, &str)] = &[
    (2, "Powder cocaine", "Class A"),
    (3, "Ecstasy", "Class A"),
    (4, "Hallucinogens", "Class A"),
    (5, "Amphetamines", "Class B"),
    (6, "Cannabis", "Class B"),
    (7, "Ketamine", "Class B"),
];

/// Where one question's answers live in the workbook.
struct QuestionLayout {
    id: &'static str,
    prompt: &'static str,
    sheet: &'static str,
    /// 1-indexed spreadsheet rows.
    rows: &'static [u32],
    /// Display label and the workbook labels accepted for it.
    options: &'static [(&'static str, &'static [&'static str])],
}

const LAYOUT: &[QuestionLayout] = &[
    QuestionLayout {
        id: "age",
        prompt: "How old are you?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[9, 10, 11, 12, 13, 14, 15],
        options: &[
            ("16–19", &["16–19", "16-19"]),
            ("20–24", &["20–24", "20-24"]),
            ("25–29", &["25–29", "25-29"]),
            ("30–34", &["30–34", "30-34"]),
            ("35–44", &["35–44", "35-44"]),
            ("45–54", &["45–54", "45-54"]),
            ("55–59", &["55–59", "55-59"]),
        ],
    },
    QuestionLayout {
        id: "sex",
        prompt: "What is your sex?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[18, 21],
        options: &[
            ("Male", &["All men aged 16-59 years"]),
            ("Female", &["All women aged 16-59 years"]),
        ],
    },
    QuestionLayout {
        id: "ethnicity",
        prompt: "What is your ethnic group?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[24, 25, 26, 27, 28],
        options: &[
            ("White", &["White"]),
            ("Mixed / Multiple", &["Mixed/Multiple"]),
            ("Asian / Asian British", &["Asian/Asian British"]),
            (
                "Black / Black British",
                &["Black/African/Caribbean/Black British"],
            ),
            ("Other ethnic group", &["Other ethnic group"]),
        ],
    },
    QuestionLayout {
        id: "marital",
        prompt: "What is your relationship status?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[31, 32, 33, 34, 35],
        options: &[
            ("Married / civil partnership", &["Married/civil partnered"]),
            ("Cohabiting", &["Cohabiting"]),
            ("Single", &["Single"]),
            ("Separated", &["Separated"]),
            ("Divorced", &["Divorced/legally dissolved partnership"]),
        ],
    },
    QuestionLayout {
        id: "employment",
        prompt: "What is your employment status?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[37, 38, 39, 40, 42],
        options: &[
            ("Employed", &["In employment"]),
            ("Unemployed", &["Unemployed"]),
            ("Student", &["Economically inactive: Student"]),
            (
                "Long-term sick / disabled",
                &["Economically inactive: Long-term/temporarily sick/"],
            ),
            ("Other economically inactive", &["Economically inactive"]),
        ],
    },
    QuestionLayout {
        id: "qualification",
        prompt: "What is your highest qualification?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[51, 52, 53, 55],
        options: &[
            ("Degree or diploma", &["Degree or diploma"]),
            ("A-levels / apprenticeship", &["Apprenticeship or A/AS level"]),
            ("GCSEs / O-levels", &["O level/GCSE"]),
            ("No qualifications", &["None"]),
        ],
    },
    QuestionLayout {
        id: "religion",
        prompt: "What is your religion?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[58, 59, 63],
        options: &[
            ("No religion", &["No religion"]),
            ("Christian", &["Christian"]),
            ("Muslim", &["Muslim"]),
        ],
    },
    QuestionLayout {
        id: "nightclub",
        prompt: "How many times did you visit a nightclub in the past month?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[72, 73, 74],
        options: &[
            ("None", &["None"]),
            ("1 to 3 visits", &["1 to 3 visits"]),
            ("4 or more visits", &["4 or more visits"]),
        ],
    },
    QuestionLayout {
        id: "pub",
        prompt: "How many evening visits to a pub or bar did you make in the past month?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[75, 76, 77, 78],
        options: &[
            ("None", &["None"]),
            ("1 to 3 visits", &["1 to 3 visits"]),
            ("4 to 8 visits", &["4 - 8 times", "4 - 8 visits"]),
            ("9 or more visits", &["9 or more visits"]),
        ],
    },
    QuestionLayout {
        id: "alcohol",
        prompt: "How often do you drink alcohol?",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[79, 80, 81, 82],
        options: &[
            (
                "Less than once a month (inc. non-drinkers)",
                &["Less than once a month (inc. non-drinkers)"],
            ),
            (
                "Less than once a week",
                &["Less than a day a week in the last month"],
            ),
            ("1–2 days a week", &["1-2 days a week in the last month"]),
            (
                "3 or more days a week",
                &["3 or more days a week in the last month"],
            ),
        ],
    },
    QuestionLayout {
        id: "satisfaction",
        prompt: "How satisfied are you with your life? (0 = not at all, 10 = completely)",
        sheet: DEMOGRAPHICS_SHEET,
        rows: &[89, 90, 91, 92],
        options: &[
            ("Low (0–4)", &["Low"]),
            ("Medium (5–6)", &["Medium"]),
            ("High (7–8)", &["High"]),
            ("Very high (9–10)", &["Very high", "Very High"]),
        ],
    },
    QuestionLayout {
        id: "income",
        prompt: "What is your total household income?",
        sheet: HOUSEHOLD_SHEET,
        rows: &[12, 13, 14, 15, 16, 17],
        options: &[
            ("Under £10,400", &["Less than £10,400"]),
            ("£10,400 – £20,799", &["£10,400 to less than £20,800"]),
            ("£20,800 – £31,199", &["£20,800 to less than £31,200"]),
            ("£31,200 – £41,599", &["£31,200 to less than £41,600"]),
            ("£41,600 – £51,999", &["£41,600 to less than £52,000"]),
            ("£52,000 or more", &["£52,000 or more"]),
        ],
    },
    QuestionLayout {
        id: "region",
        prompt: "Where do you live?",
        sheet: HOUSEHOLD_SHEET,
        rows: &[46, 47, 48, 49, 50, 51, 52, 53, 54, 55],
        options: &[
            ("North East", &["North East"]),
            ("North West", &["North West"]),
            ("Yorkshire and the Humber", &["Yorkshire and the Humber"]),
            ("East Midlands", &["East Midlands"]),
            ("West Midlands", &["West Midlands"]),
            ("East of England", &["East"]),
            ("London", &["London"]),
            ("South East", &["South East"]),
            ("South West", &["South West"]),
            ("Wales", &["Wales"]),
        ],
    },
];

/// A rate table read from the workbook, plus anything worth flagging.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub table: RateTableDef,
    pub warnings: Vec<String>,
}

/// Parse the ONS "Drug misuse appendix tables" workbook into a rate table.
///
/// Reads sheets 3.01 and 3.02 at fixed rows. Suppressed or non-numeric
/// cells become 0, which the engine later floors.
pub fn extract_csew_xlsx(bytes: &[u8]) -> Result<ExtractedTable, PrevalenceError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| PrevalenceError::Extraction(format!("failed to open xlsx: {e}")))?;

    let mut sheets = HashMap::new();
    for name in [DEMOGRAPHICS_SHEET, HOUSEHOLD_SHEET] {
        let range = workbook.worksheet_range(name).map_err(|e| {
            PrevalenceError::Extraction(format!("sheet '{name}' not found: {e}"))
        })?;
        sheets.insert(name, range);
    }

    extract_from_sheets(&sheets)
}

/// Build the rate table from already-loaded sheets, keyed by sheet name.
pub fn extract_from_sheets(
    sheets: &HashMap<&str, Range<Data>>,
) -> Result<ExtractedTable, PrevalenceError> {
    let demographics = sheet(sheets, DEMOGRAPHICS_SHEET)?;

    let (baseline_label, baseline_rates) = read_row(demographics, BASELINE_ROW);
    if !baseline_label.starts_with(BASELINE_MARKER) {
        return Err(PrevalenceError::Extraction(format!(
            "not a CSEW drug misuse workbook (row {BASELINE_ROW} of sheet {DEMOGRAPHICS_SHEET} is '{baseline_label}')"
        )));
    }

    let drugs = DRUG_COLUMNS
        .iter()
        .map(|&(_, name, class)| DrugDef {
            name: name.to_string(),
            classification: class.to_string(),
            baseline: baseline_rates.get(name).copied().unwrap_or_default(),
        })
        .collect();

    let mut warnings = Vec::new();
    let mut questions = Vec::with_capacity(LAYOUT.len());

    for layout in LAYOUT {
        let range = sheet(sheets, layout.sheet)?;
        let by_label: HashMap<String, BTreeMap<String, Decimal>> = layout
            .rows
            .iter()
            .map(|&row| read_row(range, row))
            .collect();

        let options = layout
            .options
            .iter()
            .map(|&(display, accepted)| {
                let rates = accepted
                    .iter()
                    .find_map(|label| by_label.get(&normalize_label(label)))
                    .cloned()
                    .unwrap_or_else(|| {
                        warnings.push(format!(
                            "{}: no row labelled '{}' in sheet {}, using 0 for every drug",
                            layout.id, accepted[0], layout.sheet
                        ));
                        zero_rates()
                    });
                OptionDef {
                    label: display.to_string(),
                    rates,
                }
            })
            .collect();

        questions.push(QuestionDef {
            id: layout.id.to_string(),
            prompt: layout.prompt.to_string(),
            options,
        });
    }

    let table = RateTableDef {
        name: "Crime Survey for England and Wales: drug misuse".into(),
        description: Some(
            "Last year drug use among adults aged 16 to 59, from ONS appendix tables 3.01 and 3.02"
                .into(),
        ),
        version: "extracted".into(),
        drugs,
        questions,
    };
    validate_table(&table)?;

    for w in &warnings {
        tracing::warn!("{w}");
    }

    Ok(ExtractedTable { table, warnings })
}

fn sheet<'a>(
    sheets: &'a HashMap<&str, Range<Data>>,
    name: &str,
) -> Result<&'a Range<Data>, PrevalenceError> {
    sheets
        .get(name)
        .ok_or_else(|| PrevalenceError::Extraction(format!("sheet '{name}' not found")))
}

/// Read the label (column B, else column A) and drug rates of a 1-indexed row.
fn read_row(range: &Range<Data>, row: u32) -> (String, BTreeMap<String, Decimal>) {
    let idx = row - 1;
    let label = range
        .get_value((idx, 1))
        .and_then(cell_as_string)
        .or_else(|| range.get_value((idx, 0)).and_then(cell_as_string))
        .unwrap_or_default();

    let rates = DRUG_COLUMNS
        .iter()
        .map(|&(col, name, _)| {
            let rate = cell_as_f64(range.get_value((idx, col)))
                .map(f64_to_decimal)
                .unwrap_or_default()
                .round_dp(RATE_DECIMALS);
            (name.to_string(), rate)
        })
        .collect();

    (normalize_label(&label), rates)
}

fn zero_rates() -> BTreeMap<String, Decimal> {
    DRUG_COLUMNS
        .iter()
        .map(|&(_, name, _)| (name.to_string(), Decimal::ZERO))
        .collect()
}

/// Trim and collapse runs of whitespace; the workbook pads some labels.
fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

fn cell_as_f64(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

/// Convert f64 to Decimal via its shortest display form, so 0.0035 stays 0.0035.
fn f64_to_decimal(f: f64) -> Decimal {
    format!("{f}")
        .parse::<Decimal>()
        .unwrap_or_else(|_| Decimal::try_from(f).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Sheets with every layout row filled: label in column B and a rate of
    /// `row / 10` for each drug, so each option is easy to recognise.
    fn workbook() -> HashMap<&'static str, Range<Data>> {
        let mut demographics: Range<Data> = Range::new((0, 0), (120, 7));
        let mut household: Range<Data> = Range::new((0, 0), (120, 7));

        set_row(
            &mut demographics,
            BASELINE_ROW,
            "All people aged 16-59 years",
            Data::Float(9.4),
        );

        for layout in LAYOUT {
            let range = if layout.sheet == DEMOGRAPHICS_SHEET {
                &mut demographics
            } else {
                &mut household
            };
            for (&row, &(_, accepted)) in layout.rows.iter().zip(layout.options) {
                set_row(range, row, accepted[0], Data::Float(row as f64 / 10.0));
            }
        }

        HashMap::from([(DEMOGRAPHICS_SHEET, demographics), (HOUSEHOLD_SHEET, household)])
    }

    fn set_row(range: &mut Range<Data>, row: u32, label: &str, value: Data) {
        range.set_value((row - 1, 1), Data::String(format!("  {label} ")));
        for &(col, _, _) in DRUG_COLUMNS {
            range.set_value((row - 1, col), value.clone());
        }
    }

    #[test]
    fn f64_to_decimal_preserves_precision() {
        assert_eq!(f64_to_decimal(0.0035), dec!(0.0035));
        assert_eq!(f64_to_decimal(68.0), dec!(68));
        assert_eq!(f64_to_decimal(1.23), dec!(1.23));
    }

    #[test]
    fn normalize_label_collapses_whitespace() {
        assert_eq!(normalize_label("  North  East "), "North East");
        assert_eq!(normalize_label("White "), "White");
    }

    #[test]
    fn extracts_all_questions_and_baseline() {
        let extracted = extract_from_sheets(&workbook()).unwrap();
        let table = &extracted.table;

        assert!(extracted.warnings.is_empty(), "{:?}", extracted.warnings);
        assert_eq!(table.drugs.len(), 6);
        assert_eq!(table.drugs[0].name, "Powder cocaine");
        assert_eq!(table.drugs[0].baseline, dec!(9.4));
        assert_eq!(table.questions.len(), 13);

        let region = table.questions.iter().find(|q| q.id == "region").unwrap();
        let london = region.options.iter().find(|o| o.label == "London").unwrap();
        // London is row 52 of sheet 3.02
        assert_eq!(london.rates["Cannabis"], dec!(5.2));
    }

    #[test]
    fn label_falls_back_to_column_a() {
        let mut sheets = workbook();
        let demographics = sheets.get_mut(DEMOGRAPHICS_SHEET).unwrap();
        // Muslim is row 63
        demographics.set_value((62, 1), Data::Empty);
        demographics.set_value((62, 0), Data::String("Muslim".into()));

        let extracted = extract_from_sheets(&sheets).unwrap();
        let religion = extracted
            .table
            .questions
            .iter()
            .find(|q| q.id == "religion")
            .unwrap();
        assert_eq!(religion.options[2].rates["Ketamine"], dec!(6.3));
    }

    #[test]
    fn suppressed_cells_become_zero() {
        let mut sheets = workbook();
        let demographics = sheets.get_mut(DEMOGRAPHICS_SHEET).unwrap();
        demographics.set_value((62, 7), Data::String("[c]".into()));

        let extracted = extract_from_sheets(&sheets).unwrap();
        let religion = extracted
            .table
            .questions
            .iter()
            .find(|q| q.id == "religion")
            .unwrap();
        assert_eq!(religion.options[2].rates["Ketamine"], Decimal::ZERO);
        assert_eq!(religion.options[2].rates["Cannabis"], dec!(6.3));
    }

    #[test]
    fn missing_row_warns_and_zero_fills() {
        let mut sheets = workbook();
        let demographics = sheets.get_mut(DEMOGRAPHICS_SHEET).unwrap();
        // Pub "4 - 8 times" is row 77
        demographics.set_value((76, 1), Data::String("Four to eight".into()));

        let extracted = extract_from_sheets(&sheets).unwrap();
        assert_eq!(extracted.warnings.len(), 1);
        assert!(extracted.warnings[0].starts_with("pub:"));
        let pub_q = extracted
            .table
            .questions
            .iter()
            .find(|q| q.id == "pub")
            .unwrap();
        assert!(pub_q.options[2].rates.values().all(|r| r.is_zero()));
    }

    #[test]
    fn alternative_label_is_accepted() {
        let mut sheets = workbook();
        let demographics = sheets.get_mut(DEMOGRAPHICS_SHEET).unwrap();
        demographics.set_value((76, 1), Data::String("4 - 8 visits".into()));

        let extracted = extract_from_sheets(&sheets).unwrap();
        assert!(extracted.warnings.is_empty());
    }

    #[test]
    fn wrong_workbook_rejected() {
        let mut sheets = workbook();
        let demographics = sheets.get_mut(DEMOGRAPHICS_SHEET).unwrap();
        demographics.set_value((7, 1), Data::String("Table of contents".into()));

        assert!(matches!(
            extract_from_sheets(&sheets),
            Err(PrevalenceError::Extraction(_))
        ));
    }

    #[test]
    fn missing_sheet_rejected() {
        let mut sheets = workbook();
        sheets.remove(HOUSEHOLD_SHEET);
        assert!(extract_from_sheets(&sheets).is_err());
    }
}
