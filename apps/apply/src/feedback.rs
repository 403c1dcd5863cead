use std::fmt;

use crate::client::{ClientError, Created};

/// The message box shown once a submission attempt finishes.
#[derive(Debug, PartialEq, Eq)]
pub struct Dialog {
    pub title: &'static str,
    pub message: String,
}

impl Dialog {
    pub fn for_submission(result: &Result<Created, ClientError>) -> Self {
        match result {
            Ok(_) => Dialog {
                title: "Registration Successful!",
                message: "Your details have been submitted. Welcome to Perceptron!".to_string(),
            },
            Err(err @ ClientError::Network(_)) => Dialog {
                title: "Network Error",
                message: err.to_string(),
            },
            Err(err) => Dialog {
                title: "Submission Failed",
                message: err.to_string(),
            },
        }
    }
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.title.len().max(self.message.chars().count()) + 4;
        let rule = "─".repeat(width);
        writeln!(f, "┌{rule}┐")?;
        writeln!(f, "│  {:<w$}  │", self.title, w = width - 4)?;
        writeln!(f, "├{rule}┤")?;
        writeln!(f, "│  {:<w$}  │", self.message, w = width - 4)?;
        write!(f, "└{rule}┘")
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_success_dialog() {
        let dialog = Dialog::for_submission(&Ok(Created {
            message: "Submission created".into(),
            id: "abc".into(),
        }));
        assert_eq!(dialog.title, "Registration Successful!");
    }

    #[test]
    fn test_rejection_dialog_shows_server_message() {
        let dialog = Dialog::for_submission(&Err(ClientError::Rejected {
            status: StatusCode::CONFLICT,
            message: "Form already filled with this email or scholar number.".into(),
        }));
        assert_eq!(dialog.title, "Submission Failed");
        assert_eq!(
            dialog.message,
            "Form already filled with this email or scholar number."
        );
    }

    #[test]
    fn test_dialog_renders_both_lines() {
        let dialog = Dialog {
            title: "Submission Failed",
            message: "Resume file is required".into(),
        };
        let rendered = dialog.to_string();
        assert!(rendered.contains("Submission Failed"));
        assert!(rendered.contains("Resume file is required"));
        assert_eq!(rendered.lines().count(), 5);
    }
}
