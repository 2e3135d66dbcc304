/// Record and payload types for every stored collection
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};

/// Payloads whose required text fields must not be blank.
pub trait RequiredFields {
    /// Pairs of (field name, value) that have to carry some text.
    fn required_fields(&self) -> Vec<(&'static str, &str)>;

    /// Returns the name of the first required field that is blank, if any.
    fn blank_field(&self) -> Option<&'static str> {
        self.required_fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored session. The token itself is never kept, only its digest.
#[derive(Debug, Clone)]
pub struct DbSession {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RequiredFields for NewDepartment {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name), ("code", &self.code)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub department_id: String,
    pub designation: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub department_id: String,
    #[serde(default)]
    pub designation: Option<String>,
}

impl RequiredFields for NewStaff {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", &self.name),
            ("email", &self.email),
            ("department_id", &self.department_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: String,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub department_id: String,
    pub subject_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub department_id: String,
    #[serde(default = "default_subject_type")]
    pub subject_type: String,
}

fn default_subject_type() -> String {
    "REGULAR".to_string()
}

impl RequiredFields for NewSubject {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("code", &self.code),
            ("name", &self.name),
            ("department_id", &self.department_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub class_id: String,
    pub name: String,
    pub department_id: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClass {
    pub name: String,
    pub department_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RequiredFields for NewClass {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", &self.name), ("department_id", &self.department_id)]
    }
}

/// What a time slot is used for during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotType {
    #[default]
    Class,
    Break,
    Lunch,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Class => "CLASS",
            SlotType::Break => "BREAK",
            SlotType::Lunch => "LUNCH",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLASS" => Ok(SlotType::Class),
            "BREAK" => Ok(SlotType::Break),
            "LUNCH" => Ok(SlotType::Lunch),
            other => Err(format!("unknown slot type: {other}")),
        }
    }
}

impl ToSql for SlotType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SlotType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub slot_id: String,
    pub start_time: String,
    pub end_time: String,
    pub period_number: i32,
    pub slot_type: SlotType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeSlot {
    pub start_time: String,
    pub end_time: String,
    pub period_number: i32,
    #[serde(default)]
    pub slot_type: SlotType,
}

impl RequiredFields for NewTimeSlot {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("start_time", &self.start_time), ("end_time", &self.end_time)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub entry_id: String,
    pub academic_year: String,
    pub program: String,
    pub year: i32,
    pub semester: String,
    pub section: String,
    pub day_of_week: String,
    pub slot_id: String,
    pub subject_id: Option<String>,
    pub staff_id: Option<String>,
    pub class_id: Option<String>,
    pub department_id: Option<String>,
    pub remarks: Option<String>,
    pub entry_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimetableEntry {
    pub academic_year: String,
    pub program: String,
    /// Year of study, 1 through 5
    pub year: i32,
    /// Semester in roman numerals, I through VIII
    pub semester: String,
    pub section: String,
    pub day_of_week: String,
    pub slot_id: String,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default = "default_entry_type")]
    pub entry_type: String,
}

fn default_entry_type() -> String {
    "CLASS".to_string()
}

impl RequiredFields for NewTimetableEntry {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("academic_year", &self.academic_year),
            ("program", &self.program),
            ("semester", &self.semester),
            ("section", &self.section),
            ("day_of_week", &self.day_of_week),
            ("slot_id", &self.slot_id),
        ]
    }
}

/// Optional department filter shared by the staff, subject and class listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentFilter {
    pub department_id: Option<String>,
}

impl DepartmentFilter {
    pub(crate) fn predicates(&self) -> Vec<(&'static str, Value)> {
        let mut predicates = Vec::new();
        push_text(&mut predicates, "department_id", &self.department_id);
        predicates
    }
}

/// Equality filters for timetable listings. Absent or empty values match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableFilter {
    pub academic_year: Option<String>,
    pub program: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub year: Option<i32>,
    pub semester: Option<String>,
    pub section: Option<String>,
    pub class_id: Option<String>,
    pub staff_id: Option<String>,
}

impl TimetableFilter {
    pub(crate) fn predicates(&self) -> Vec<(&'static str, Value)> {
        let mut predicates = Vec::new();
        push_text(&mut predicates, "academic_year", &self.academic_year);
        push_text(&mut predicates, "program", &self.program);
        if let Some(year) = self.year.filter(|&y| y != 0) {
            predicates.push(("year", Value::Integer(year.into())));
        }
        push_text(&mut predicates, "semester", &self.semester);
        push_text(&mut predicates, "section", &self.section);
        push_text(&mut predicates, "class_id", &self.class_id);
        push_text(&mut predicates, "staff_id", &self.staff_id);
        predicates
    }
}

/// Reads a query value that may be sent empty (`?year=`) as no value at all.
fn optional_number<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn push_text(predicates: &mut Vec<(&'static str, Value)>, column: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        predicates.push((column, Value::Text(v.to_string())));
    }
}
