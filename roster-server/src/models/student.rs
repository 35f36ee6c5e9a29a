//! Request bodies for the student endpoints

use serde::Deserialize;

/// POST /api/students body
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub student_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// PUT /api/students/:id body
#[derive(Debug, Clone, Deserialize)]
pub struct StudentUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewStudent {
    /// Collect every validation problem, empty when the body is acceptable
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.student_number.trim().is_empty() {
            problems.push("Student number is required".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push("Name is required".to_string());
        }
        if !optional_email_is_valid(self.email.as_deref()) {
            problems.push("Invalid email format".to_string());
        }
        problems
    }
}

impl StudentUpdate {
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Name is required".to_string());
        }
        if !optional_email_is_valid(self.email.as_deref()) {
            problems.push("Invalid email format".to_string());
        }
        problems
    }
}

/// Absent or blank emails are allowed; anything else must look like `local@domain.tld`
fn optional_email_is_valid(email: Option<&str>) -> bool {
    match email.map(str::trim) {
        None | Some("") => true,
        Some(email) => is_valid_email(email),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
