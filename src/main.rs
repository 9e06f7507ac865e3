use anyhow::Context;
use clap::Parser;
use img_paste::adapters::{
    GitignoreRegistrar, InteractivePrompt, KeepNamePrompt, StdoutSink, TmuxSink,
    WindowsHostClipboard,
};
use img_paste::core::{filename, path_translator, retention, ClipboardCapture, TerminalSink};
use img_paste::domain::ports::RenamePrompt;
use img_paste::utils::{logger, validation::Validate};
use img_paste::{Cli, Command, IngestEngine, IngestSettings, Namespace, PasteArgs, PasteConfig, PasteError};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌（stderr）
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Paste(PasteArgs::default()));

    match command {
        Command::Paste(args) => run_paste(&cli, &args).await,
        Command::Clean { dir, max, json } => {
            let max = img_paste::utils::validation::clamp_range("max", max, 1, retention::MAX_RETAINED_IMAGES);
            let report = retention::clean(&dir, max);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serializing cleanup report")?
                );
            } else {
                println!(
                    "🧹 Scanned {} image(s), kept {}, deleted {}, failed {}",
                    report.scanned,
                    report.kept,
                    report.deleted.len(),
                    report.failed
                );
            }
            Ok(())
        }
        Command::Translate {
            to_guest,
            to_host,
            path,
        } => {
            let to_guest = to_guest || (!to_host && Namespace::detect(&path) == Namespace::Host);
            if to_guest {
                println!("{}", path_translator::to_guest(&path));
            } else {
                println!("{}", path_translator::to_host(&path));
            }
            Ok(())
        }
        Command::CheckName { name, ext } => match filename::validate_filename(&name, &ext) {
            Ok(()) => {
                println!("✅ '{}' is a valid file name", name);
                Ok(())
            }
            Err(e) => report_failure(&e),
        },
    }
}

async fn run_paste(cli: &Cli, args: &PasteArgs) -> anyhow::Result<()> {
    let mut config = match PasteConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => report_failure(&e),
    };

    // 命令列覆蓋設定
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    let mut settings = IngestSettings::from_config(&config);
    settings.project_root = match &args.project_root {
        Some(root) => Some(root.clone()),
        None => std::env::current_dir()
            .ok()
            .map(|dir| dir.to_string_lossy().into_owned()),
    };
    settings.home = dirs::home_dir().map(|home| home.to_string_lossy().into_owned());
    settings.capture_timeout = Duration::from_secs(config.capture_timeout_seconds);

    let Some(capture) = build_capture(&config.capture_backend) else {
        report_failure(&PasteError::PlatformUnsupported);
    };
    let terminal: Box<dyn TerminalSink> = match config.terminal.as_str() {
        "tmux" => Box::new(TmuxSink::new(config.tmux_target.clone())),
        _ => Box::new(StdoutSink),
    };
    let prompt: Box<dyn RenamePrompt> = if config.skip_rename_prompt {
        Box::new(KeepNamePrompt)
    } else {
        Box::new(InteractivePrompt)
    };

    let engine = IngestEngine::new(
        capture,
        terminal,
        Box::new(GitignoreRegistrar::new()),
        prompt,
        settings,
    );

    match engine.run().await {
        Ok(report) => {
            if report.deleted_old_images > 0 {
                tracing::info!("🧹 Removed {} old image(s)", report.deleted_old_images);
            }
            Ok(())
        }
        Err(failure) => report_failure(&failure.error),
    }
}

fn build_capture(backend: &str) -> Option<Box<dyn ClipboardCapture>> {
    match backend {
        "windows-host" => Some(Box::new(WindowsHostClipboard::new())),
        #[cfg(feature = "native-clipboard")]
        _ => Some(Box::new(img_paste::adapters::NativeClipboard::new())),
        #[cfg(not(feature = "native-clipboard"))]
        _ => None,
    }
}

fn report_failure(e: &PasteError) -> ! {
    // 詳細錯誤（含系統原文）只在 --verbose 時可見
    tracing::debug!(
        "{} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    eprintln!("{}", e.user_report());
    std::process::exit(e.exit_code());
}
