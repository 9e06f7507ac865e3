use crate::domain::ports::TerminalSink;
use crate::utils::error::{PasteError, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// 直接輸出到 stdout，由呼叫端（編輯器外掛、shell 綁定）送進終端
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

#[async_trait]
impl TerminalSink for StdoutSink {
    fn is_active(&self) -> bool {
        true
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Types the text into a tmux pane with `tmux send-keys -l`.
#[derive(Debug, Clone)]
pub struct TmuxSink {
    target: Option<String>,
    inside_tmux: bool,
}

impl TmuxSink {
    pub fn new(target: Option<String>) -> Self {
        Self {
            target: target.filter(|t| !t.trim().is_empty()),
            inside_tmux: std::env::var_os("TMUX").is_some(),
        }
    }

    pub fn command_args(&self, text: &str) -> Vec<String> {
        let mut args = vec!["send-keys".to_string()];
        if let Some(target) = &self.target {
            args.push("-t".to_string());
            args.push(target.clone());
        }
        args.push("-l".to_string());
        args.push(text.to_string());
        args
    }
}

#[async_trait]
impl TerminalSink for TmuxSink {
    fn is_active(&self) -> bool {
        self.inside_tmux || self.target.is_some()
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        let output = tokio::process::Command::new("tmux")
            .args(self.command_args(text))
            .output()
            .await
            .map_err(|e| PasteError::TerminalInsertFailed {
                detail: format!("spawning tmux: {}", e),
            })?;

        if !output.status.success() {
            return Err(PasteError::TerminalInsertFailed {
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmux_args() {
        let sink = TmuxSink::new(Some("work:1.0".to_string()));
        assert_eq!(
            sink.command_args("@/tmp/a.png"),
            vec!["send-keys", "-t", "work:1.0", "-l", "@/tmp/a.png"]
        );

        let sink = TmuxSink::new(Some("  ".to_string()));
        assert_eq!(sink.command_args("@x"), vec!["send-keys", "-l", "@x"]);
    }

    #[test]
    fn test_tmux_active_with_explicit_target() {
        assert!(TmuxSink::new(Some("main".to_string())).is_active());
    }
}
