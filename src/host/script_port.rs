// script_port.rs
// ホストのスクリプト起動機構へのポート
// 呼び出しは fire-and-forget で、結果の追跡も再試行もしない

#[cfg(test)]
use std::sync::Mutex;

/// ホストスクリプト呼び出しポート
pub trait HostScriptPort: Send + Sync {
    /// 名前付きスクリプトを単一の文字列パラメータで起動する。
    /// 呼び出しを受け付けたら true
    fn invoke(&self, name: &str, param: &str) -> bool;

    /// ホスト側でスクリプト呼び出しが利用可能か
    fn is_available(&self) -> bool {
        true
    }
}

/// ホストの無い環境向けのポート（常に利用不可）
#[derive(Debug, Default)]
pub struct NullHostScriptPort;

impl HostScriptPort for NullHostScriptPort {
    fn invoke(&self, name: &str, _param: &str) -> bool {
        log::debug!("Host script '{}' not invoked: no host attached", name);
        false
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// 呼び出しをログに流すだけのポート（ホスト無し実行用）
#[derive(Debug, Default)]
pub struct LogHostScriptPort;

impl HostScriptPort for LogHostScriptPort {
    fn invoke(&self, name: &str, param: &str) -> bool {
        log::info!("Host script '{}' invoked ({} chars)", name, param.len());
        true
    }
}

/// テスト用の記録ポート
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHostScriptPort {
    pub calls: Mutex<Vec<(String, String)>>,
    /// false にすると invoke が失敗を報告する
    pub reject: bool,
    /// true にするとホスト不在を装う
    pub unavailable: bool,
}

#[cfg(test)]
impl HostScriptPort for RecordingHostScriptPort {
    fn invoke(&self, name: &str, param: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), param.to_string()));
        !self.reject
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }
}
