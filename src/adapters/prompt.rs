use crate::domain::ports::RenamePrompt;

/// 在終端詢問新檔名（預設值為目前檔名）
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default)]
pub struct InteractivePrompt;

#[cfg(feature = "cli")]
impl RenamePrompt for InteractivePrompt {
    fn ask(&self, current_name: &str) -> Option<String> {
        let term = dialoguer::console::Term::stderr();
        if !term.features().is_attended() {
            tracing::debug!("No interactive terminal, keeping {}", current_name);
            return None;
        }

        dialoguer::Input::<String>::new()
            .with_prompt("Image file name")
            .with_initial_text(current_name)
            .allow_empty(true)
            .interact_text_on(&term)
            .ok()
            .filter(|answer| !answer.trim().is_empty())
    }
}

/// Always keeps the current name.
#[derive(Debug, Clone, Default)]
pub struct KeepNamePrompt;

impl RenamePrompt for KeepNamePrompt {
    fn ask(&self, _current_name: &str) -> Option<String> {
        None
    }
}
