use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Scholar numbers are exactly this many characters.
pub const SCHOLAR_NO_LEN: usize = 8;
/// Mirrors the server's upload cap so oversized files fail before upload.
pub const MAX_RESUME_BYTES: u64 = 350 * 1024;

/// Roles an applicant may rank.
pub const ROLES: [&str; 7] = [
    "Treasurer",
    "Web Development Lead",
    "App Dev Lead",
    "PR & Outreach Lead",
    "Event Manager",
    "Executive",
    "Marketing & Design Lead",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    CurrentYear,
    ScholarNo,
    Branch,
    Pref1,
    Pref2,
    Resume,
    Message,
}

impl Field {
    /// Multipart field name expected by the intake service.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::CurrentYear => "currentyear",
            Field::ScholarNo => "scholarNo",
            Field::Branch => "branch",
            Field::Pref1 => "pref1",
            Field::Pref2 => "pref2",
            Field::Resume => "resume",
            Field::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full name",
            Field::Email => "Email",
            Field::CurrentYear => "Current year",
            Field::ScholarNo => "Scholar number",
            Field::Branch => "Branch",
            Field::Pref1 => "First preference",
            Field::Pref2 => "Second preference",
            Field::Resume => "Resume (PDF path)",
            Field::Message => "Message",
        }
    }

    pub fn required(self) -> bool {
        self != Field::Message
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Personal,
    Preferences,
    Resume,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Personal, Step::Preferences, Step::Resume];

    pub fn number(self) -> usize {
        match self {
            Step::Personal => 1,
            Step::Preferences => 2,
            Step::Resume => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personal => "About you",
            Step::Preferences => "Preferences",
            Step::Resume => "Resume",
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Personal => &[Field::Name, Field::Email, Field::CurrentYear, Field::ScholarNo],
            Step::Preferences => &[Field::Branch, Field::Pref1, Field::Pref2],
            Step::Resume => &[Field::Resume, Field::Message],
        }
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Personal => Some(Step::Preferences),
            Step::Preferences => Some(Step::Resume),
            Step::Resume => None,
        }
    }

    pub fn prev(self) -> Option<Step> {
        match self {
            Step::Personal => None,
            Step::Preferences => Some(Step::Personal),
            Step::Resume => Some(Step::Preferences),
        }
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(Field),

    #[error("Email must be a valid address")]
    InvalidEmail,

    #[error("Scholar number must be exactly {} characters (got {})", SCHOLAR_NO_LEN, .0)]
    ScholarNoLength(usize),

    #[error("{0} must be one of the listed roles, not '{1}'")]
    UnknownRole(Field, String),

    #[error("Second preference must differ from the first")]
    SamePreference,

    #[error("Resume {} cannot be read: {}", .0.display(), .1)]
    ResumeUnreadable(PathBuf, String),

    #[error("Resume file is empty")]
    ResumeEmpty,

    #[error("Resume is {} bytes; the limit is {} bytes (350KB)", .0, MAX_RESUME_BYTES)]
    ResumeTooLarge(u64),
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Required(field) | FieldError::UnknownRole(field, _) => *field,
            FieldError::InvalidEmail => Field::Email,
            FieldError::ScholarNoLength(_) => Field::ScholarNo,
            FieldError::SamePreference => Field::Pref2,
            FieldError::ResumeUnreadable(..)
            | FieldError::ResumeEmpty
            | FieldError::ResumeTooLarge(_) => Field::Resume,
        }
    }
}

/// Everything the applicant has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub currentyear: String,
    pub scholar_no: String,
    pub branch: String,
    pub pref1: String,
    pub pref2: String,
    pub resume: Option<PathBuf>,
    pub message: String,
}

impl FormData {
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::CurrentYear => &self.currentyear,
            Field::ScholarNo => &self.scholar_no,
            Field::Branch => &self.branch,
            Field::Pref1 => &self.pref1,
            Field::Pref2 => &self.pref2,
            Field::Message => &self.message,
            Field::Resume => self
                .resume
                .as_deref()
                .and_then(Path::to_str)
                .unwrap_or(""),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::CurrentYear => self.currentyear = value,
            Field::ScholarNo => self.scholar_no = value,
            Field::Branch => self.branch = value,
            Field::Pref1 => self.pref1 = value,
            Field::Pref2 => self.pref2 = value,
            Field::Message => self.message = value,
            Field::Resume => {
                self.resume = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value.trim()))
                }
            }
        }
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.text(field).trim().is_empty()
    }

    /// Text fields in the order they are sent, values exactly as entered.
    /// An empty message is left out.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        Step::ALL
            .iter()
            .flat_map(|step| step.fields())
            .filter(|field| **field != Field::Resume)
            .filter(|field| field.required() || !self.text(**field).is_empty())
            .map(|field| (field.wire_name(), self.text(*field).to_string()))
            .collect()
    }
}

/// Checks one field in isolation, plus the cross-field preference rule.
pub fn validate_field(data: &FormData, field: Field) -> Result<(), FieldError> {
    if field.required() && data.is_blank(field) {
        return Err(FieldError::Required(field));
    }

    let value = data.text(field).trim();
    match field {
        Field::Email if !looks_like_email(value) => Err(FieldError::InvalidEmail),
        Field::ScholarNo if value.chars().count() != SCHOLAR_NO_LEN => {
            Err(FieldError::ScholarNoLength(value.chars().count()))
        }
        Field::Pref1 | Field::Pref2 if !ROLES.contains(&value) => {
            Err(FieldError::UnknownRole(field, value.to_string()))
        }
        Field::Pref2 if value == data.pref1.trim() => Err(FieldError::SamePreference),
        Field::Resume => match &data.resume {
            Some(path) => check_resume(path),
            None => Err(FieldError::Required(Field::Resume)),
        },
        _ => Ok(()),
    }
}

/// Validates only the fields belonging to `step`.
pub fn validate_step(data: &FormData, step: Step) -> Vec<FieldError> {
    step.fields()
        .iter()
        .filter_map(|field| validate_field(data, *field).err())
        .collect()
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_resume(path: &Path) -> Result<(), FieldError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| FieldError::ResumeUnreadable(path.to_path_buf(), e.to_string()))?;
    if !meta.is_file() {
        return Err(FieldError::ResumeUnreadable(
            path.to_path_buf(),
            "not a regular file".to_string(),
        ));
    }
    match meta.len() {
        0 => Err(FieldError::ResumeEmpty),
        len if len > MAX_RESUME_BYTES => Err(FieldError::ResumeTooLarge(len)),
        _ => Ok(()),
    }
}

/// Linear three-step form. Moving forward requires the current step to be
/// valid; moving back never does.
#[derive(Debug)]
pub struct FormController {
    step: Step,
    data: FormData,
}

impl FormController {
    pub fn new(data: FormData) -> Self {
        Self {
            step: Step::Personal,
            data,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut FormData {
        &mut self.data
    }

    /// Advances one step. Stays put and returns the problems if the current
    /// step is invalid or already the last.
    pub fn next(&mut self) -> Result<Step, Vec<FieldError>> {
        let errors = validate_step(&self.data, self.step);
        if !errors.is_empty() {
            return Err(errors);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn prev(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// The data to send, once the final step is reached and valid.
    pub fn submission(&self) -> Result<&FormData, SubmitBlocked> {
        if !self.step.is_last() {
            return Err(SubmitBlocked::NotOnFinalStep(self.step));
        }
        let errors = validate_step(&self.data, self.step);
        if errors.is_empty() {
            Ok(&self.data)
        } else {
            Err(SubmitBlocked::Invalid(errors))
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("step {} of 3 is not the last step", .0.number())]
    NotOnFinalStep(Step),

    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
}
