//! User consent for first-time and destructive actions

use inquire::Confirm;

use crate::error::Result;

pub trait Consent {
    /// Ask whether `action` may proceed.
    fn confirm(&self, action: &str) -> Result<bool>;
}

/// Accepts everything (`--no-confirm`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Consent for AssumeYes {
    fn confirm(&self, _action: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Asks on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConsent;

impl Consent for PromptConsent {
    fn confirm(&self, action: &str) -> Result<bool> {
        Ok(Confirm::new(&format!("{action}?"))
            .with_default(true)
            .with_help_message("Press Enter to confirm, or 'n' to cancel")
            .prompt()?)
    }
}

/// Pick the consent source for a command.
pub fn for_flags(no_confirm: bool) -> Box<dyn Consent> {
    if no_confirm {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConsent)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Scripted;
    use super::*;

    #[test]
    fn test_no_confirm_accepts() {
        assert!(for_flags(true).confirm("Install Nix").unwrap());
    }

    #[test]
    fn test_scripted_records_questions() {
        let consent = Scripted::answering(false);
        assert!(!consent.confirm("Install Nix").unwrap());
        assert_eq!(consent.asked(), ["Install Nix"]);
    }
}
