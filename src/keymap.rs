use crate::config::InteractionConfig;

/// What a key press asks the scene to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Focus(String),
    HighlightAll,
    HidePanel,
}

/// Resolves a DOM-style key name (`"3"`, `"a"`, `"Escape"`) against the
/// configured bindings. The show-all key matches case-insensitively.
pub fn resolve_key(key: &str, config: &InteractionConfig) -> Option<KeyAction> {
    if key == "Escape" || key == "Esc" {
        return Some(KeyAction::HidePanel);
    }
    if key.eq_ignore_ascii_case(&config.show_all_key) {
        return Some(KeyAction::HighlightAll);
    }
    config
        .key_bindings
        .get(key)
        .map(|id| KeyAction::Focus(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_focus_bound_nodes() {
        let config = InteractionConfig::default();
        assert_eq!(resolve_key("1", &config), Some(KeyAction::Focus("bastion".to_string())));
        assert_eq!(resolve_key("5", &config), Some(KeyAction::Focus("documentation".to_string())));
        assert_eq!(resolve_key("0", &config), None);
    }

    #[test]
    fn show_all_and_escape() {
        let config = InteractionConfig::default();
        assert_eq!(resolve_key("a", &config), Some(KeyAction::HighlightAll));
        assert_eq!(resolve_key("A", &config), Some(KeyAction::HighlightAll));
        assert_eq!(resolve_key("Escape", &config), Some(KeyAction::HidePanel));
        assert_eq!(resolve_key("b", &config), None);
    }
}
