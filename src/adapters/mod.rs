// Adapters layer: concrete implementations of the domain ports (clipboard, terminal, ignore-file, prompt).

pub mod clipboard;
pub mod ignore_file;
pub mod prompt;
pub mod terminal;

#[cfg(feature = "native-clipboard")]
pub use clipboard::NativeClipboard;
pub use clipboard::WindowsHostClipboard;
pub use ignore_file::{GitignoreRegistrar, NoopRegistrar};
#[cfg(feature = "cli")]
pub use prompt::InteractivePrompt;
pub use prompt::KeepNamePrompt;
pub use terminal::{StdoutSink, TmuxSink};
