//! CSV import for bulk record loading
//!
//! Columns are matched by header name (case-insensitive), so column order
//! does not matter and unknown columns are ignored. Blank cells become
//! missing values. A malformed date or number fails the import with the
//! offending line number.
//!
//! Expected headers per kind:
//! - acts: `date,act_type,practitioner,cost` (+ optional `patient_id`)
//! - consumables: `date,item,quantity,unit_cost,total_cost` (+ optional `patient_id`)
//! - stays: `start_date,end_date,daily_rate,pathology` (+ optional `patient_id`)
//! - personnel: `name,role,service,cost_per_day` (+ optional `email`, `phone`)

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NewConsumable, NewMedicalAct, NewPersonnel, NewStay, RecordKind};

/// Records parsed from one CSV file
#[derive(Debug, Clone)]
pub enum ParsedRecords {
    MedicalActs(Vec<NewMedicalAct>),
    Consumables(Vec<NewConsumable>),
    Stays(Vec<NewStay>),
    Personnel(Vec<NewPersonnel>),
}

impl ParsedRecords {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::MedicalActs(_) => RecordKind::MedicalActs,
            Self::Consumables(_) => RecordKind::Consumables,
            Self::Stays(_) => RecordKind::Stays,
            Self::Personnel(_) => RecordKind::Personnel,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::MedicalActs(v) => v.len(),
            Self::Consumables(v) => v.len(),
            Self::Stays(v) => v.len(),
            Self::Personnel(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A CSV row with header-based cell lookup
struct Row<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Row<'a> {
    fn cell(&self, name: &str) -> Option<&'a str> {
        let index = self
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn text(&self, name: &str) -> Option<String> {
        self.cell(name).map(str::to_string)
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        self.cell(name)
            .map(|value| {
                parse_date(value).ok_or_else(|| {
                    Error::Import(format!(
                        "line {}: unable to parse {} '{}'",
                        self.line, name, value
                    ))
                })
            })
            .transpose()
    }

    fn amount(&self, name: &str) -> Result<Option<f64>> {
        self.cell(name)
            .map(|value| {
                parse_amount(value).ok_or_else(|| {
                    Error::Import(format!(
                        "line {}: unable to parse {} '{}'",
                        self.line, name, value
                    ))
                })
            })
            .transpose()
    }

    fn integer(&self, name: &str) -> Result<Option<i64>> {
        self.cell(name)
            .map(|value| {
                value.parse::<i64>().map_err(|_| {
                    Error::Import(format!(
                        "line {}: unable to parse {} '{}'",
                        self.line, name, value
                    ))
                })
            })
            .transpose()
    }
}

/// Parse a CSV file of the given record kind
pub fn parse_records<R: Read>(reader: R, kind: RecordKind) -> Result<ParsedRecords> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut parsed = match kind {
        RecordKind::MedicalActs => ParsedRecords::MedicalActs(Vec::new()),
        RecordKind::Consumables => ParsedRecords::Consumables(Vec::new()),
        RecordKind::Stays => ParsedRecords::Stays(Vec::new()),
        RecordKind::Personnel => ParsedRecords::Personnel(Vec::new()),
    };

    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row = Row {
            headers: &headers,
            record: &record,
            line: record.position().map(|p| p.line()).unwrap_or(0),
        };

        match &mut parsed {
            ParsedRecords::MedicalActs(acts) => acts.push(NewMedicalAct {
                patient_id: row.integer("patient_id")?,
                act_type: row.text("act_type").unwrap_or_default(),
                date: row.date("date")?,
                practitioner: row.text("practitioner"),
                cost: row.amount("cost")?,
            }),
            ParsedRecords::Consumables(consumables) => consumables.push(NewConsumable {
                patient_id: row.integer("patient_id")?,
                item: row.text("item").unwrap_or_default(),
                quantity: row.integer("quantity")?,
                unit_cost: row.amount("unit_cost")?,
                date: row.date("date")?,
                total_cost: row.amount("total_cost")?,
            }),
            ParsedRecords::Stays(stays) => {
                let stay = NewStay {
                    patient_id: row.integer("patient_id")?,
                    start_date: row.date("start_date")?,
                    end_date: row.date("end_date")?,
                    daily_rate: row.amount("daily_rate")?,
                    pathology: row.text("pathology"),
                };
                stay.validate()
                    .map_err(|e| Error::Import(format!("line {}: {}", row.line, e)))?;
                stays.push(stay)
            }
            ParsedRecords::Personnel(personnel) => {
                let name = row.text("name").ok_or_else(|| {
                    Error::Import(format!("line {}: missing name", row.line))
                })?;
                personnel.push(NewPersonnel {
                    name,
                    role: row.text("role"),
                    service: row.text("service"),
                    cost_per_day: row.amount("cost_per_day")?,
                    email: row.text("email"),
                    phone: row.text("phone"),
                })
            }
        }
    }

    debug!(kind = %kind, count = parsed.len(), "Parsed CSV records");
    Ok(parsed)
}

/// Parse a date in ISO or day-first European format
fn parse_date(s: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// Parse an amount, tolerating currency symbols and a decimal comma
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().replace(['€', '$', ' ', '\u{a0}'], "");
    let cleaned = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), date(2024, 1, 15));
        assert_eq!(parse_date("15/01/2024"), date(2024, 1, 15));
        assert_eq!(parse_date("2024/15/01"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("12,50"), Some(12.5));
        assert_eq!(parse_amount("€ 80"), Some(80.0));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_acts() {
        let csv = "date,act_type,practitioner,cost\n\
                   2025-03-01,Consultation,Dr. Martin,60\n\
                   2025-03-02,MRI,,420.5\n";

        let parsed = parse_records(csv.as_bytes(), RecordKind::MedicalActs).unwrap();
        let ParsedRecords::MedicalActs(acts) = parsed else {
            panic!("expected medical acts");
        };
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].practitioner.as_deref(), Some("Dr. Martin"));
        assert_eq!(acts[1].practitioner, None);
        assert_eq!(acts[1].cost, Some(420.5));
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let csv = "start_date,end_date,daily_rate,pathology\n2025-03-01,,350,\n";
        let parsed = parse_records(csv.as_bytes(), RecordKind::Stays).unwrap();
        let ParsedRecords::Stays(stays) = parsed else {
            panic!("expected stays");
        };
        assert_eq!(stays[0].start_date, date(2025, 3, 1));
        assert_eq!(stays[0].end_date, None);
        assert_eq!(stays[0].pathology, None);
    }

    #[test]
    fn test_column_order_is_free() {
        let csv = "total_cost,item,date\n12.5,Gauze,2025-02-01\n";
        let parsed = parse_records(csv.as_bytes(), RecordKind::Consumables).unwrap();
        let ParsedRecords::Consumables(items) = parsed else {
            panic!("expected consumables");
        };
        assert_eq!(items[0].item, "Gauze");
        assert_eq!(items[0].total_cost, Some(12.5));
        assert_eq!(items[0].quantity, None);
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let csv = "date,act_type,cost\n2025-03-01,X-ray,80\n2025-03-02,X-ray,eighty\n";
        let err = parse_records(csv.as_bytes(), RecordKind::MedicalActs).unwrap_err();
        match err {
            Error::Import(msg) => {
                assert!(msg.contains("line 3"), "{}", msg);
                assert!(msg.contains("cost"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_inverted_stay_reports_line() {
        let csv = "start_date,end_date,daily_rate\n2025-03-10,2025-03-12,400\n2025-03-14,2025-03-10,400\n";
        match parse_records(csv.as_bytes(), RecordKind::Stays).unwrap_err() {
            Error::Import(msg) => assert!(msg.starts_with("line 3:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_personnel_requires_name() {
        let csv = "name,role,service,cost_per_day\n,Nurse,ICU,210\n";
        assert!(matches!(
            parse_records(csv.as_bytes(), RecordKind::Personnel),
            Err(Error::Import(_))
        ));
    }
}
