//! Departments, staff, subjects and classes.

use chrono::Utc;
use rusqlite::{params, params_from_iter, Result, Row};

use super::{
    generate_id, where_clause, Class, Department, DepartmentFilter, NewClass, NewDepartment,
    NewStaff, NewSubject, Staff, Subject, TimetableDb, LIST_LIMIT,
};

impl TimetableDb {
    /// Deletes the row of `table` whose `id_column` equals `id`.
    ///
    /// Returns whether a row was removed. Table and column names are
    /// compile-time constants, never user input.
    pub(crate) fn delete_by_id(&self, table: &str, id_column: &str, id: &str) -> Result<bool> {
        let removed = self
            .conn()
            .execute(&format!("DELETE FROM {table} WHERE {id_column} = ?1"), [id])?;
        Ok(removed > 0)
    }

    pub fn insert_department(&self, new: NewDepartment) -> Result<Department> {
        let dept = Department {
            department_id: generate_id("dept"),
            name: new.name,
            code: new.code,
            description: new.description,
            created_at: Utc::now(),
        };

        self.conn().execute(
            "INSERT INTO departments (department_id, name, code, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![dept.department_id, dept.name, dept.code, dept.description, dept.created_at],
        )?;

        Ok(dept)
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT department_id, name, code, description, created_at
             FROM departments ORDER BY rowid LIMIT ?1",
        )?;

        let departments = stmt.query_map([LIST_LIMIT], |row| {
            Ok(Department {
                department_id: row.get(0)?,
                name: row.get(1)?,
                code: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        departments.collect()
    }

    pub fn delete_department(&self, department_id: &str) -> Result<bool> {
        self.delete_by_id("departments", "department_id", department_id)
    }

    pub fn insert_staff(&self, new: NewStaff) -> Result<Staff> {
        let staff = Staff {
            staff_id: generate_id("staff"),
            name: new.name,
            email: new.email,
            department_id: new.department_id,
            designation: new.designation,
            created_at: Utc::now(),
        };

        self.conn().execute(
            "INSERT INTO staff (staff_id, name, email, department_id, designation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                staff.staff_id,
                staff.name,
                staff.email,
                staff.department_id,
                staff.designation,
                staff.created_at
            ],
        )?;

        Ok(staff)
    }

    pub fn list_staff(&self, filter: &DepartmentFilter) -> Result<Vec<Staff>> {
        let (clause, values) = where_clause(filter.predicates());
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT staff_id, name, email, department_id, designation, created_at
             FROM staff{clause} ORDER BY rowid LIMIT {LIST_LIMIT}"
        ))?;

        let staff = stmt.query_map(params_from_iter(values), row_to_staff)?;
        staff.collect()
    }

    pub fn delete_staff(&self, staff_id: &str) -> Result<bool> {
        self.delete_by_id("staff", "staff_id", staff_id)
    }

    pub fn insert_subject(&self, new: NewSubject) -> Result<Subject> {
        let subject = Subject {
            subject_id: generate_id("subj"),
            code: new.code,
            name: new.name,
            credits: new.credits,
            department_id: new.department_id,
            subject_type: new.subject_type,
            created_at: Utc::now(),
        };

        self.conn().execute(
            "INSERT INTO subjects (subject_id, code, name, credits, department_id, subject_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                subject.subject_id,
                subject.code,
                subject.name,
                subject.credits,
                subject.department_id,
                subject.subject_type,
                subject.created_at
            ],
        )?;

        Ok(subject)
    }

    pub fn list_subjects(&self, filter: &DepartmentFilter) -> Result<Vec<Subject>> {
        let (clause, values) = where_clause(filter.predicates());
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT subject_id, code, name, credits, department_id, subject_type, created_at
             FROM subjects{clause} ORDER BY rowid LIMIT {LIST_LIMIT}"
        ))?;

        let subjects = stmt.query_map(params_from_iter(values), |row| {
            Ok(Subject {
                subject_id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
                credits: row.get(3)?,
                department_id: row.get(4)?,
                subject_type: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        subjects.collect()
    }

    pub fn delete_subject(&self, subject_id: &str) -> Result<bool> {
        self.delete_by_id("subjects", "subject_id", subject_id)
    }

    pub fn insert_class(&self, new: NewClass) -> Result<Class> {
        let class = Class {
            class_id: generate_id("class"),
            name: new.name,
            department_id: new.department_id,
            description: new.description,
            created_at: Utc::now(),
        };

        self.conn().execute(
            "INSERT INTO classes (class_id, name, department_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                class.class_id,
                class.name,
                class.department_id,
                class.description,
                class.created_at
            ],
        )?;

        Ok(class)
    }

    pub fn list_classes(&self, filter: &DepartmentFilter) -> Result<Vec<Class>> {
        let (clause, values) = where_clause(filter.predicates());
        let db = self.conn();
        let mut stmt = db.prepare(&format!(
            "SELECT class_id, name, department_id, description, created_at
             FROM classes{clause} ORDER BY rowid LIMIT {LIST_LIMIT}"
        ))?;

        let classes = stmt.query_map(params_from_iter(values), |row| {
            Ok(Class {
                class_id: row.get(0)?,
                name: row.get(1)?,
                department_id: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        classes.collect()
    }

    pub fn delete_class(&self, class_id: &str) -> Result<bool> {
        self.delete_by_id("classes", "class_id", class_id)
    }
}

fn row_to_staff(row: &Row<'_>) -> Result<Staff> {
    Ok(Staff {
        staff_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department_id: row.get(3)?,
        designation: row.get(4)?,
        created_at: row.get(5)?,
    })
}
