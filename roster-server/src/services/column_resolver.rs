//! Column resolver
//!
//! Maps a worksheet's header row onto the three profile fields a roster
//! needs. Matching is exact after trimming and lowercasing; the accepted
//! spellings are tried in order and the first hit wins, regardless of
//! column position.

use thiserror::Error;

/// Semantic role a header column can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    StudentNumber,
    Name,
    Section,
}

impl ColumnRole {
    /// Accepted header spellings, lowercase, in priority order
    pub fn accepted_headers(self) -> &'static [&'static str] {
        match self {
            ColumnRole::StudentNumber => &["student number", "student_number", "id", "student id"],
            ColumnRole::Name => &["name", "student name", "full name"],
            ColumnRole::Section => &["section", "class", "group"],
        }
    }
}

/// A mandatory profile column is absent from the header row
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("No student identifier column found in worksheet \"{sheet}\". Expected columns: \"Student Number\", \"Student_Number\", \"ID\", or \"Student ID\"")]
    MissingIdentifierColumn { sheet: String },

    #[error("No name column found in worksheet \"{sheet}\". Expected columns: \"Name\", \"Student Name\", or \"Full Name\"")]
    MissingNameColumn { sheet: String },
}

/// Positions of the profile columns within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub student_number: usize,
    pub name: usize,
    pub section: Option<usize>,
}

/// Index of the first header matching any candidate, trying candidates in order
pub fn find_column_index(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.trim().to_lowercase() == *candidate)
    })
}

pub fn find_role(headers: &[String], role: ColumnRole) -> Option<usize> {
    find_column_index(headers, role.accepted_headers())
}

/// Resolve the profile columns of a worksheet
///
/// Identifier and name are mandatory; section is optional.
pub fn resolve_columns(sheet: &str, headers: &[String]) -> Result<ResolvedColumns, ColumnError> {
    let student_number = find_role(headers, ColumnRole::StudentNumber).ok_or_else(|| {
        ColumnError::MissingIdentifierColumn {
            sheet: sheet.to_string(),
        }
    })?;
    let name = find_role(headers, ColumnRole::Name).ok_or_else(|| ColumnError::MissingNameColumn {
        sheet: sheet.to_string(),
    })?;

    Ok(ResolvedColumns {
        student_number,
        name,
        section: find_role(headers, ColumnRole::Section),
    })
}
