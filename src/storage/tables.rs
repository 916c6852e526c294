use redb::TableDefinition;

/// Course records: uuid -> CourseRecord (msgpack)
pub const COURSES: TableDefinition<&str, &[u8]> = TableDefinition::new("courses");

/// Unique name index: course name -> uuid
pub const COURSE_NAMES: TableDefinition<&str, &str> = TableDefinition::new("course_names");

/// File records: uuid -> FileRecord (msgpack)
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Course index: course name -> msgpack Vec of file UUIDs, in insertion order
pub const COURSE_FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("course_files");
