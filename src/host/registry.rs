// host/registry.rs
// ホストスクリプトの登録と名前解決
// ホスト側にスクリプトの存在を問い合わせる手段はないため、
// ホストが自分から登録を申告する方式をとる。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// 既定のホストスクリプト名
pub const SCRIPT_EXPORT_IMAGE: &str = "Export Image to Desktop";
pub const SCRIPT_DELETE_IMAGE: &str = "Delete Image Record";
pub const SCRIPT_CLOSE: &str = "UNIV: Committ/Close Window/Exit";

/// レジストリのエラー型
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid script map JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Script map must be a JSON object")]
    NotAnObject,
}

/// スクリプト解決モード
/// - strict: 登録済みスクリプトだけを呼ぶ
/// - permissive: 未登録なら既定名をそのまま使う（デフォルト）
/// - browser: エクスポートをホスト呼び出しなしで処理する（検証用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptMode {
    Strict,
    #[default]
    Permissive,
    Browser,
}

impl ScriptMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "permissive" => Some(Self::Permissive),
            "browser" => Some(Self::Browser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
            Self::Browser => "browser",
        }
    }
}

/// 登録エントリ
/// 文字列は別名で呼ぶ、true は既定名のまま、それ以外は明示的な無効化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    Alias(String),
    Default,
    Disabled,
}

impl From<&JsonValue> for ScriptEntry {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(alias) => Self::Alias(alias.clone()),
            JsonValue::Bool(true) => Self::Default,
            _ => Self::Disabled,
        }
    }
}

/// スクリプトレジストリ
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    mode: ScriptMode,
    entries: HashMap<String, ScriptEntry>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ScriptMode) {
        self.mode = mode;
    }

    /// モードを文字列から設定。不正な値は警告して変更しない
    pub fn set_mode_str(&mut self, mode: &str) -> bool {
        match ScriptMode::parse(mode) {
            Some(mode) => {
                self.mode = mode;
                true
            }
            None => {
                log::warn!(
                    "Invalid script mode '{}', expected 'strict', 'permissive' or 'browser'",
                    mode
                );
                false
            }
        }
    }

    /// JSONオブジェクトのスクリプトマップをマージ登録する
    pub fn register_map(&mut self, map: &JsonValue) -> Result<(), RegistryError> {
        let object = map.as_object().ok_or(RegistryError::NotAnObject)?;
        for (name, value) in object {
            let entry = ScriptEntry::from(value);
            log::info!("Host script registered: '{}' -> {:?}", name, entry);
            self.entries.insert(name.clone(), entry);
        }
        Ok(())
    }

    /// JSON文字列からスクリプトマップを登録する（ホストは文字列しか渡せない）
    pub fn register_json(&mut self, json: &str) -> Result<(), RegistryError> {
        let map: JsonValue = serde_json::from_str(json)?;
        self.register_map(&map)
    }

    /// 既定名を実際に呼ぶべきスクリプト名へ解決する。呼ばない場合は None
    pub fn resolve(&self, default_name: &str) -> Option<String> {
        match self.entries.get(default_name) {
            Some(ScriptEntry::Alias(alias)) => Some(alias.clone()),
            Some(ScriptEntry::Default) => Some(default_name.to_string()),
            Some(ScriptEntry::Disabled) => None,
            None => {
                if self.mode == ScriptMode::Strict {
                    None
                } else {
                    Some(default_name.to_string())
                }
            }
        }
    }

    /// 解決可能かどうか
    pub fn is_resolvable(&self, default_name: &str) -> bool {
        self.resolve(default_name).is_some()
    }
}
