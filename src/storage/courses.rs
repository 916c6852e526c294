use redb::{ReadableTable, WriteTransaction};

use super::db::{indexed_file_ids, write_file_ids, Database, DatabaseError};
use super::models::{CourseRecord, FileRecord};
use super::tables::*;

impl Database {
    // ========================================================================
    // Course operations
    // ========================================================================

    /// List all courses, oldest first
    pub fn list_courses(&self) -> Result<Vec<CourseRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COURSES)?;

        let mut courses = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let course: CourseRecord = rmp_serde::from_slice(value.value())?;
            courses.push(course);
        }

        courses.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(courses)
    }

    /// Get a course by its UUID
    pub fn get_course(&self, id: &str) -> Result<Option<CourseRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COURSES)?;

        match table.get(id)? {
            Some(data) => {
                let course: CourseRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(course))
            }
            None => Ok(None),
        }
    }

    /// Get a course by its name (resolves name -> uuid -> course)
    pub fn find_course_by_name(&self, name: &str) -> Result<Option<CourseRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let names_table = read_txn.open_table(COURSE_NAMES)?;

        let id = match names_table.get(name)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let courses_table = read_txn.open_table(COURSES)?;
        match courses_table.get(id.as_str())? {
            Some(data) => {
                let course: CourseRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(course))
            }
            None => Ok(None),
        }
    }

    /// Create a course. The name check and insert share one write transaction,
    /// so two concurrent creates of the same name cannot both succeed.
    pub fn create_course(&self, name: &str) -> Result<CourseRecord, DatabaseError> {
        let write_txn = self.begin_write()?;
        if course_id_by_name(&write_txn, name)?.is_some() {
            return Err(DatabaseError::DuplicateName(name.to_string()));
        }

        let course = CourseRecord::new(name);
        insert_course(&write_txn, &course)?;
        write_txn.commit()?;
        Ok(course)
    }

    /// Return the course with this name, creating it if it does not exist.
    /// The boolean is true when the course was created by this call.
    pub fn ensure_course(&self, name: &str) -> Result<(CourseRecord, bool), DatabaseError> {
        let write_txn = self.begin_write()?;

        if let Some(id) = course_id_by_name(&write_txn, name)? {
            let existing: Option<CourseRecord> = {
                let table = write_txn.open_table(COURSES)?;
                let result = match table.get(id.as_str())? {
                    Some(data) => Some(rmp_serde::from_slice(data.value())?),
                    None => None,
                };
                result
            };
            if let Some(course) = existing {
                return Ok((course, false));
            }
        }

        // Either no index entry, or a dangling one: (re)create the course
        let course = CourseRecord::new(name);
        insert_course(&write_txn, &course)?;
        write_txn.commit()?;
        Ok((course, true))
    }

    /// Delete a course record and its name index entry. Files are left untouched.
    pub fn delete_course(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = remove_course(&write_txn, id)?;
        write_txn.commit()?;
        Ok(removed.is_some())
    }

    /// Delete a course together with every file indexed under its name, in a
    /// single transaction. Returns the removed records so the caller can
    /// clean up stored bytes, or `None` if the course does not exist.
    pub fn delete_course_cascade(
        &self,
        id: &str,
    ) -> Result<Option<(CourseRecord, Vec<FileRecord>)>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let course = match remove_course(&write_txn, id)? {
            Some(course) => course,
            None => return Ok(None),
        };

        let file_ids = indexed_file_ids(&write_txn, &course.name)?;
        let mut files = Vec::with_capacity(file_ids.len());
        {
            let mut table = write_txn.open_table(FILES)?;
            for file_id in &file_ids {
                let removed: Option<FileRecord> = match table.remove(file_id.as_str())? {
                    Some(data) => Some(rmp_serde::from_slice(data.value())?),
                    None => None,
                };
                if let Some(file) = removed {
                    files.push(file);
                }
            }
        }
        write_file_ids(&write_txn, &course.name, &[])?;

        write_txn.commit()?;
        Ok(Some((course, files)))
    }
}

fn course_id_by_name(
    write_txn: &WriteTransaction,
    name: &str,
) -> Result<Option<String>, DatabaseError> {
    let table = write_txn.open_table(COURSE_NAMES)?;
    let id = table.get(name)?.map(|v| v.value().to_string());
    Ok(id)
}

fn insert_course(write_txn: &WriteTransaction, course: &CourseRecord) -> Result<(), DatabaseError> {
    debug_assert!(!course.name.is_empty(), "course name must not be empty");

    let mut table = write_txn.open_table(COURSES)?;
    let data = rmp_serde::to_vec_named(course)?;
    table.insert(course.id.as_str(), data.as_slice())?;

    let mut names_table = write_txn.open_table(COURSE_NAMES)?;
    names_table.insert(course.name.as_str(), course.id.as_str())?;
    Ok(())
}

fn remove_course(
    write_txn: &WriteTransaction,
    id: &str,
) -> Result<Option<CourseRecord>, DatabaseError> {
    let existing: Option<CourseRecord> = {
        let table = write_txn.open_table(COURSES)?;
        let result = match table.get(id)? {
            Some(data) => Some(rmp_serde::from_slice(data.value())?),
            None => None,
        };
        result
    };

    let Some(course) = existing else {
        return Ok(None);
    };

    {
        let mut table = write_txn.open_table(COURSES)?;
        table.remove(id)?;
    }

    // Only drop the name entry if it still points at this course
    let mut names_table = write_txn.open_table(COURSE_NAMES)?;
    let owns_name = names_table
        .get(course.name.as_str())?
        .map(|v| v.value() == id)
        .unwrap_or(false);
    if owns_name {
        names_table.remove(course.name.as_str())?;
    }

    Ok(Some(course))
}
