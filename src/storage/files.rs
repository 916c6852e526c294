use redb::ReadableTable;

use super::db::{indexed_file_ids, write_file_ids, Database, DatabaseError};
use super::models::FileRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Create a file record under the given course name and index it.
    pub fn create_file(
        &self,
        title: &str,
        url: &str,
        course: &str,
    ) -> Result<FileRecord, DatabaseError> {
        let file = FileRecord::new(title, url, course);
        self.put_file(&file)?;
        Ok(file)
    }

    /// Store a file record and update the course index
    pub fn put_file(&self, file: &FileRecord) -> Result<(), DatabaseError> {
        debug_assert!(!file.id.is_empty(), "file id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(FILES)?;
            let data = rmp_serde::to_vec_named(file)?;
            table.insert(file.id.as_str(), data.as_slice())?;
        }

        let mut file_ids = indexed_file_ids(&write_txn, &file.course)?;
        if !file_ids.contains(&file.id) {
            file_ids.push(file.id.clone());
            write_file_ids(&write_txn, &file.course, &file_ids)?;
        }

        write_txn.commit()?;
        Ok(())
    }

    /// Get a file by its UUID
    pub fn get_file(&self, id: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        match table.get(id)? {
            Some(data) => {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }

    /// Get all files for a course name, in the order they were added
    pub fn list_files_by_course(&self, course: &str) -> Result<Vec<FileRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let course_table = read_txn.open_table(COURSE_FILES)?;
        let files_table = read_txn.open_table(FILES)?;

        let file_ids: Vec<String> = match course_table.get(course)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut files = Vec::with_capacity(file_ids.len());
        for file_id in file_ids {
            if let Some(data) = files_table.get(file_id.as_str())? {
                let file: FileRecord = rmp_serde::from_slice(data.value())?;
                files.push(file);
            }
        }

        Ok(files)
    }

    /// Delete a file by its UUID and clean up the course index
    pub fn delete_file(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let course: Option<String> = {
            let table = write_txn.open_table(FILES)?;
            let result = match table.get(id)? {
                Some(data) => {
                    let file: FileRecord = rmp_serde::from_slice(data.value())?;
                    Some(file.course)
                }
                None => None,
            };
            result
        };

        let deleted = match course {
            Some(course) => {
                {
                    let mut table = write_txn.open_table(FILES)?;
                    table.remove(id)?;
                }
                let mut ids = indexed_file_ids(&write_txn, &course)?;
                ids.retain(|fid| fid != id);
                write_file_ids(&write_txn, &course, &ids)?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
