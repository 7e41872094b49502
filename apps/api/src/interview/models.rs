use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::transcript::EmptyMessage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Assistant => "Assistant",
            Role::Candidate => "Candidate",
        }
    }
}

/// One transcript entry. Content is never empty and cannot change once built.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self, EmptyMessage> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(EmptyMessage);
        }
        Ok(Self { role, content })
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self, EmptyMessage> {
        Self::new(Role::Assistant, content)
    }

    pub fn candidate(content: impl Into<String>) -> Result<Self, EmptyMessage> {
        Self::new(Role::Candidate, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkType {
    #[default]
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

/// Expected salary bucket, in thousands of USD.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SalaryRange {
    #[default]
    #[serde(rename = "40-60")]
    From40To60,
    #[serde(rename = "60-80")]
    From60To80,
    #[serde(rename = "80-100")]
    From80To100,
    #[serde(rename = "100-120")]
    From100To120,
    #[serde(rename = "120+")]
    Above120,
}

/// Candidate details captured by the intake form. Set once per session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub years_experience: u32,
    pub desired_position: String,
    pub location: String,
    pub tech_stack: String,
    pub work_type: WorkType,
    pub available_from: NaiveDate,
    pub salary_range: SalaryRange,
    pub notice_period_weeks: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub rating: u8,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_rejects_blank_content() {
        assert!(Message::assistant("").is_err());
        assert!(Message::candidate(" \n\t").is_err());
        assert_eq!(Message::candidate("ok").unwrap().role(), Role::Candidate);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&WorkType::OnSite).unwrap(), "\"On-site\"");
        assert_eq!(
            serde_json::from_str::<SalaryRange>("\"120+\"").unwrap(),
            SalaryRange::Above120
        );
        assert!(serde_json::from_str::<SalaryRange>("\"10-20\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Candidate).unwrap(), "\"candidate\"");
    }
}
