use std::collections::{BTreeMap, HashMap};

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, SecondsFormat,
    TimeZone, Utc,
};
use serde_json::{Map, Value};

/// Anything a submitted form's named values can be read from.
pub trait FormFields {
    fn value(&self, name: &str) -> Option<&str>;
}

impl FormFields for HashMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FormFields for BTreeMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// `application/x-www-form-urlencoded` style pairs; the first occurrence wins.
impl FormFields for [(String, String)] {
    fn value(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

impl FormFields for Vec<(String, String)> {
    fn value(&self, name: &str) -> Option<&str> {
        self.as_slice().value(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// An enumerated value; left out when blank so the server default applies.
    Choice,
    DateTime,
    Integer,
    Bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FormField {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FormField {
    FormField { name, kind }
}

/// The named fields one entity's form carries.
#[derive(Debug, Clone, Copy)]
pub struct FormSpec {
    pub id_field: &'static str,
    pub fields: &'static [FormField],
}

pub const TASK_FORM: FormSpec = FormSpec {
    id_field: "task_id",
    fields: &[
        field("title", FieldKind::Text),
        field("description", FieldKind::Text),
        field("start_time", FieldKind::DateTime),
        field("end_time", FieldKind::DateTime),
        field("priority", FieldKind::Choice),
        field("status", FieldKind::Choice),
    ],
};

pub const USER_FORM: FormSpec = FormSpec {
    id_field: "user_id",
    fields: &[
        field("name", FieldKind::Text),
        field("gender", FieldKind::Text),
        field("age", FieldKind::Integer),
        field("joined_at", FieldKind::DateTime),
        field("is_active", FieldKind::Bool),
        field("obs", FieldKind::Text),
    ],
};

/// Name of the hidden field carrying the CSRF token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

impl FieldKind {
    fn convert(self, raw: &str) -> Option<Value> {
        match self {
            FieldKind::Text => Some(Value::String(raw.to_string())),
            FieldKind::Choice if raw.is_empty() => None,
            FieldKind::Choice => Some(Value::String(raw.to_string())),
            FieldKind::DateTime if raw.trim().is_empty() => Some(Value::Null),
            FieldKind::DateTime => Some(Value::String(
                to_utc_iso(raw).unwrap_or_else(|| raw.to_string()),
            )),
            FieldKind::Integer if raw.trim().is_empty() => Some(Value::Null),
            FieldKind::Integer => Some(match raw.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(raw.to_string()),
            }),
            FieldKind::Bool => Some(Value::Bool(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "on" | "true" | "1" | "yes"
            ))),
        }
    }
}

/// Reads the fields of `spec` off `form` into a plain JSON record.
///
/// Date/time fields are normalized with [`to_utc_iso`]. Nothing is
/// validated: unparseable values go through unchanged for the server to
/// reject. A blank identifier is left out.
pub fn extract<F: FormFields + ?Sized>(form: &F, spec: &FormSpec) -> Map<String, Value> {
    let mut record = Map::new();

    if let Some(id) = form.value(spec.id_field).filter(|id| !id.is_empty()) {
        record.insert(spec.id_field.to_string(), Value::String(id.to_string()));
    }

    for field in spec.fields {
        let raw = form.value(field.name).unwrap_or("");
        if let Some(value) = field.kind.convert(raw) {
            record.insert(field.name.to_string(), value);
        }
    }

    record
}

/// Formats an instant the way the browser's `Date.toISOString` does:
/// UTC, millisecond precision, `Z` suffix.
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Converts a form date/time value to a canonical UTC ISO-8601 string.
///
/// Offset-qualified values keep their instant, `datetime-local` values are
/// read in the local timezone and bare dates are UTC midnight. Returns
/// `None` when the value is not a date.
pub fn to_utc_iso(raw: &str) -> Option<String> {
    to_utc_iso_in(&Local, raw)
}

fn to_utc_iso_in<Tz: TimeZone>(tz: &Tz, raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_utc(dt.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(tz, &naive).map(format_utc);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| format_utc(Utc.from_utc_datetime(&naive)))
}

// A repeated wall time takes its earlier instant. A skipped one is read with
// the offset in force before the transition, which moves it forward.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let before = tz.offset_from_utc_datetime(&(*naive - Duration::days(1))).fix();
            before
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}
