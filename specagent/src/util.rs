//! Small convenience constructors for common types.

use crate::{Message, ProviderId, SpecId};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    ProviderId::parse(value)
}

/// Parses a spec id, rejecting blank input.
pub fn parse_spec_id(value: &str) -> Option<SpecId> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| SpecId::from(trimmed))
}

#[cfg(test)]
mod tests {
    use crate::{ProviderId, Role};

    use super::{parse_provider_id, parse_spec_id, system_message, user_message};

    #[test]
    fn parse_provider_id_supports_aliases() {
        assert_eq!(parse_provider_id("openai"), Some(ProviderId::OpenAi));
        assert_eq!(parse_provider_id(" Claude "), Some(ProviderId::Anthropic));
        assert_eq!(parse_provider_id("gemini"), Some(ProviderId::Google));
        assert_eq!(parse_provider_id("unknown"), None);
    }

    #[test]
    fn parse_spec_id_rejects_blank_values() {
        assert_eq!(
            parse_spec_id(" spec-1 ").map(|id| id.to_string()),
            Some("spec-1".to_string())
        );
        assert!(parse_spec_id("   ").is_none());
    }

    #[test]
    fn message_helpers_set_roles() {
        assert_eq!(system_message("be brief").role, Role::System);
        assert_eq!(user_message("hello").role, Role::User);
    }
}
