use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    /// 給編輯器外掛解析用
    Json,
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "img_paste=debug,info"
    } else {
        "img_paste=info"
    }
}

/// `RUST_LOG` takes precedence over the `--verbose` default.
///
/// Everything goes to stderr: stdout is reserved for the `@path` emitted by
/// the default terminal sink.
pub fn init_logger(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(verbose, LogFormat::Compact);
}

pub fn init_json_logger(verbose: bool) {
    init_logger(verbose, LogFormat::Json);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "img_paste=info");
        assert_eq!(default_directive(true), "img_paste=debug,info");
    }
}
