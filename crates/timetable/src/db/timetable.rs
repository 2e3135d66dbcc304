//! Timetable entries.

use chrono::Utc;
use rusqlite::{params, params_from_iter, Result, Row};

use super::{
    generate_id, where_clause, NewTimetableEntry, TimetableDb, TimetableEntry, TimetableFilter,
    LIST_LIMIT,
};

const ENTRY_COLUMNS: &str = "entry_id, academic_year, program, year, semester, section, \
     day_of_week, slot_id, subject_id, staff_id, class_id, department_id, remarks, entry_type, \
     created_at";

impl TimetableDb {
    pub fn insert_timetable_entry(&self, new: NewTimetableEntry) -> Result<TimetableEntry> {
        let entry = TimetableEntry {
            entry_id: generate_id("entry"),
            academic_year: new.academic_year,
            program: new.program,
            year: new.year,
            semester: new.semester,
            section: new.section,
            day_of_week: new.day_of_week,
            slot_id: new.slot_id,
            subject_id: new.subject_id,
            staff_id: new.staff_id,
            class_id: new.class_id,
            department_id: new.department_id,
            remarks: new.remarks,
            entry_type: new.entry_type,
            created_at: Utc::now(),
        };

        self.conn().execute(
            &format!(
                "INSERT INTO timetable ({ENTRY_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                entry.entry_id,
                entry.academic_year,
                entry.program,
                entry.year,
                entry.semester,
                entry.section,
                entry.day_of_week,
                entry.slot_id,
                entry.subject_id,
                entry.staff_id,
                entry.class_id,
                entry.department_id,
                entry.remarks,
                entry.entry_type,
                entry.created_at,
            ],
        )?;

        Ok(entry)
    }

    /// Lists entries matching every predicate in `filter`, in insertion order.
    pub fn list_timetable_entries(&self, filter: &TimetableFilter) -> Result<Vec<TimetableEntry>> {
        let (clause, values) = where_clause(filter.predicates());
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM timetable{clause} ORDER BY rowid LIMIT {LIST_LIMIT}"
        ))?;

        let entries = stmt.query_map(params_from_iter(values), row_to_entry)?;
        entries.collect()
    }

    /// Gets every entry taught by the given staff member.
    pub fn staff_schedule(&self, staff_id: &str) -> Result<Vec<TimetableEntry>> {
        self.list_timetable_entries(&TimetableFilter {
            staff_id: Some(staff_id.to_string()),
            ..Default::default()
        })
    }

    pub fn delete_timetable_entry(&self, entry_id: &str) -> Result<bool> {
        self.delete_by_id("timetable", "entry_id", entry_id)
    }
}

fn row_to_entry(row: &Row<'_>) -> Result<TimetableEntry> {
    Ok(TimetableEntry {
        entry_id: row.get(0)?,
        academic_year: row.get(1)?,
        program: row.get(2)?,
        year: row.get(3)?,
        semester: row.get(4)?,
        section: row.get(5)?,
        day_of_week: row.get(6)?,
        slot_id: row.get(7)?,
        subject_id: row.get(8)?,
        staff_id: row.get(9)?,
        class_id: row.get(10)?,
        department_id: row.get(11)?,
        remarks: row.get(12)?,
        entry_type: row.get(13)?,
        created_at: row.get(14)?,
    })
}
