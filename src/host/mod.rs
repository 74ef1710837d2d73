// host/mod.rs
// ホスト連携モジュールのエントリポイント

pub mod actions;
pub mod download;
pub mod registry;
pub mod script_port;

// ホスト連携モジュールを一括でエクスポート
pub use actions::{ActionDispatcher, ActionOutcome};
pub use download::{DownloadPort, FsDownloadPort, NullDownloadPort};
pub use registry::{ScriptMode, ScriptRegistry};
pub use script_port::{HostScriptPort, LogHostScriptPort, NullHostScriptPort};
