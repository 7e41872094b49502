//! Candidate intake form: the raw submission and its conversion into a profile.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::interview::models::{CandidateProfile, SalaryRange, WorkType};

pub const MAX_NOTICE_PERIOD_WEEKS: u8 = 12;

/// Form fields as submitted. Structured fields fall back to the form's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tech_stack: String,
    pub years_experience: u32,
    pub desired_position: String,
    pub location: String,
    pub work_type: WorkType,
    pub available_from: Option<NaiveDate>,
    pub salary_range: SalaryRange,
    pub notice_period_weeks: u8,
}

impl IntakeForm {
    /// Checks required fields and range constraints, then builds the profile.
    /// All missing required fields are reported in one error.
    pub fn into_profile(self, today: NaiveDate) -> Result<CandidateProfile, AppError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("tech_stack", &self.tech_stack),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            )));
        }

        if self.notice_period_weeks > MAX_NOTICE_PERIOD_WEEKS {
            return Err(AppError::Validation(format!(
                "notice_period_weeks must be between 0 and {MAX_NOTICE_PERIOD_WEEKS}"
            )));
        }

        let available_from = self.available_from.unwrap_or(today);
        if available_from < today {
            return Err(AppError::Validation(
                "available_from cannot be in the past".to_string(),
            ));
        }

        Ok(CandidateProfile {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            years_experience: self.years_experience,
            desired_position: self.desired_position.trim().to_string(),
            location: self.location.trim().to_string(),
            tech_stack: self.tech_stack.trim().to_string(),
            work_type: self.work_type,
            available_from,
            salary_range: self.salary_range,
            notice_period_weeks: self.notice_period_weeks,
        })
    }
}
