// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Provisioning & Admission Policy
//!
//! Student ids are ten characters: `YY` admission year, six digits, then a
//! two-digit faculty code.
//!
//! ```text
//! 65 312345 21
//! ^^        ^^
//! year      faculty
//! ```
//!
//! Study year is `current_academic_year - YY + 1`. First-time SSO logins are
//! refused when the study year exceeds `max_restrict_year`; that check runs
//! before anything is created.

pub mod faculty;

use crate::identity::{GoogleProfile, SsoCredential};
use crate::profile::NewUserProfile;

pub use faculty::Faculty;

pub const DEFAULT_CURRENT_ACADEMIC_YEAR: i32 = 65;
pub const DEFAULT_MAX_RESTRICT_YEAR: i32 = 8;

const STUDENT_ID_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
    #[error("invalid student id")]
    InvalidStudentId,

    #[error("invalid faculty id")]
    InvalidFacultyId,

    #[error("forbidden study year")]
    ForbiddenStudyYear,
}

/// Admission policy applied to first-time SSO logins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    pub current_academic_year: i32,
    pub max_restrict_year: i32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            current_academic_year: DEFAULT_CURRENT_ACADEMIC_YEAR,
            max_restrict_year: DEFAULT_MAX_RESTRICT_YEAR,
        }
    }
}

impl PolicyConfig {
    pub fn enforce_max_year(&self, study_year: i32) -> Result<(), ProvisioningError> {
        if study_year > self.max_restrict_year {
            return Err(ProvisioningError::ForbiddenStudyYear);
        }
        Ok(())
    }
}

/// Study year and faculty derived from a student id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentPlacement {
    pub study_year: i32,
    pub faculty: &'static Faculty,
}

/// Study year from the admission-year prefix.
pub fn calc_study_year(student_id: &str, current_academic_year: i32) -> Result<i32, ProvisioningError> {
    if student_id.len() != STUDENT_ID_LEN {
        return Err(ProvisioningError::InvalidStudentId);
    }
    let prefix = student_id
        .get(..2)
        .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(ProvisioningError::InvalidStudentId)?;
    let admitted: i32 = prefix
        .parse()
        .map_err(|_| ProvisioningError::InvalidStudentId)?;

    let study_year = current_academic_year - admitted + 1;
    if study_year <= 0 {
        return Err(ProvisioningError::InvalidStudentId);
    }
    Ok(study_year)
}

/// Faculty from the last two characters.
pub fn faculty_from_id(student_id: &str) -> Result<&'static Faculty, ProvisioningError> {
    if student_id.len() != STUDENT_ID_LEN {
        return Err(ProvisioningError::InvalidFacultyId);
    }
    student_id
        .get(8..10)
        .and_then(faculty::lookup)
        .ok_or(ProvisioningError::InvalidFacultyId)
}

pub fn derive_year_and_faculty(
    student_id: &str,
    current_academic_year: i32,
) -> Result<StudentPlacement, ProvisioningError> {
    let study_year = calc_study_year(student_id, current_academic_year)?;
    let faculty = faculty_from_id(student_id)?;
    Ok(StudentPlacement { study_year, faculty })
}

/// Derive placement, apply the year policy and build the profile to create.
pub fn provision_student(
    sso: &SsoCredential,
    policy: &PolicyConfig,
) -> Result<NewUserProfile, ProvisioningError> {
    let placement = derive_year_and_faculty(&sso.ouid, policy.current_academic_year)?;
    policy.enforce_max_year(placement.study_year)?;
    Ok(build_new_profile(sso, &placement))
}

pub fn build_new_profile(sso: &SsoCredential, placement: &StudentPlacement) -> NewUserProfile {
    NewUserProfile {
        email: sso.email.clone(),
        username: sso.username.clone(),
        firstname: sso.firstname.clone(),
        lastname: sso.lastname.clone(),
        student_id: sso.ouid.clone(),
        year: placement.study_year.to_string(),
        faculty_en: placement.faculty.faculty_en.to_string(),
        faculty_th: placement.faculty.faculty_th.to_string(),
    }
}

/// Google logins carry no student id; only email and display name.
pub fn build_google_profile(profile: &GoogleProfile) -> NewUserProfile {
    NewUserProfile {
        email: profile.email.clone(),
        username: profile.firstname.clone(),
        ..Default::default()
    }
}
