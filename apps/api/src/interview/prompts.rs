// Fixed assistant texts. These are appended verbatim and never generated.

pub const WELCOME_MESSAGE: &str =
    "👋 Welcome to TalentScout! I'm your AI Hiring Assistant. Let's start with your details.";

pub const CONCLUDING_MESSAGE: &str = "Thank you for your detailed responses throughout this technical assessment. I appreciate your thorough explanations and technical knowledge demonstrated. ";

/// Greeting appended after the intake form. Candidate text is inserted as-is.
pub fn welcome_back(name: &str, tech_stack: &str) -> String {
    format!(
        "Thank you, {name}! 🎉 I see you're experienced with {tech_stack}. \
         Let's proceed with the technical assessment."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_back_text() {
        assert_eq!(
            welcome_back("Ada", "Go, SQL"),
            "Thank you, Ada! 🎉 I see you're experienced with Go, SQL. Let's proceed with the technical assessment."
        );
    }

    #[test]
    fn test_welcome_back_keeps_braces_in_candidate_text() {
        assert_eq!(
            welcome_back("{tech_stack}", "Go"),
            "Thank you, {tech_stack}! 🎉 I see you're experienced with Go. Let's proceed with the technical assessment."
        );
        assert_eq!(
            welcome_back("Ada", "{name}"),
            "Thank you, Ada! 🎉 I see you're experienced with {name}. Let's proceed with the technical assessment."
        );
    }
}
