// config.rs
// ウィジェットの実行時設定
// 読み込み時はウェブビューのクエリ文字列から、実行中はセッター経由で変わる

use serde::Deserialize;

use crate::core::gallery_state::DEFAULT_VISIBLE_THUMBNAILS;
use crate::host::registry::ScriptMode;

/// ウィジェット設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// スクリプト解決モード
    pub script_mode: ScriptMode,
    /// 同時に表示するサムネイル数
    pub visible_thumbnails: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            script_mode: ScriptMode::default(),
            visible_thumbnails: DEFAULT_VISIBLE_THUMBNAILS,
        }
    }
}

impl WidgetConfig {
    /// クエリ文字列（例: `mode=strict&thumbs=5`）から設定を組み立てる。
    /// 未知のキーは無視し、不正な値は警告してデフォルトに落とす
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            match key {
                "mode" => match ScriptMode::parse(value) {
                    Some(mode) => config.script_mode = mode,
                    None => log::warn!("Ignoring invalid script mode '{}'", value),
                },
                "thumbs" => match value.parse::<usize>() {
                    Ok(n) if n >= 1 => config.visible_thumbnails = n,
                    _ => log::warn!("Ignoring invalid thumbnail count '{}'", value),
                },
                _ => {}
            }
        }
        config
    }

    /// JSON文字列から設定を読む
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse config JSON: {}", e))
    }
}
