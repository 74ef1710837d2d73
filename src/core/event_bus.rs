// event_bus.rs
// ウィジェット内イベントバス
// ホストや外側のUI層がギャラリーのライフサイクルを購読するための仕組み

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// ウィジェットが発行するイベント名
pub mod events {
    /// データ取り込みが完了した（data: {count}）
    pub const GALLERY_LOADED: &str = "gallery:loaded";
    /// 空のデータが届いた
    pub const GALLERY_EMPTY: &str = "gallery:empty";
    /// 現在インデックスが変わった（data: {index}）
    pub const GALLERY_NAVIGATED: &str = "gallery:navigated";
    /// サムネイルの可視範囲が動いた（data: {start}）
    pub const THUMBNAIL_SCROLL: &str = "thumbnail:scroll";
    /// クローズ操作が実行された
    pub const GALLERY_CLOSED: &str = "gallery:closed";
}

/// イベントのペイロード
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    /// イベント名
    pub event_type: String,
    /// イベントデータ（任意のJSON）
    pub data: JsonValue,
    /// 発行元ID（オプション）
    pub source: Option<String>,
}

/// イベントハンドラー関数タイプ
pub type EventHandler = Box<dyn Fn(&EventPayload) -> Result<(), String> + Send + Sync>;

/// イベントバス
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// イベントハンドラーを登録
    pub fn subscribe<F>(&self, event_type: &str, handler: F) -> Result<(), String>
    where
        F: Fn(&EventPayload) -> Result<(), String> + Send + Sync + 'static,
    {
        match self.handlers.lock() {
            Ok(mut handlers) => {
                handlers
                    .entry(event_type.to_string())
                    .or_default()
                    .push(Box::new(handler));
                Ok(())
            }
            Err(e) => Err(format!("Failed to lock handlers: {}", e)),
        }
    }

    /// イベントを発行
    pub fn publish(&self, event_type: &str, data: JsonValue) -> Result<(), String> {
        self.dispatch(EventPayload {
            event_type: event_type.to_string(),
            data,
            source: None,
        })
    }

    /// 発行元を名乗ってイベントを発行
    pub fn publish_from(&self, source: &str, event_type: &str, data: JsonValue) -> Result<(), String> {
        self.dispatch(EventPayload {
            event_type: event_type.to_string(),
            data,
            source: Some(source.to_string()),
        })
    }

    fn dispatch(&self, payload: EventPayload) -> Result<(), String> {
        let handlers = self
            .handlers
            .lock()
            .map_err(|e| format!("Failed to lock handlers: {}", e))?;

        let mut errors = Vec::new();
        if let Some(list) = handlers.get(&payload.event_type) {
            for handler in list {
                if let Err(e) = handler(&payload) {
                    errors.push(format!("Handler error for {}: {}", payload.event_type, e));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }

    /// 全ハンドラーをクリア
    pub fn clear(&self) -> Result<(), String> {
        match self.handlers.lock() {
            Ok(mut handlers) => {
                handlers.clear();
                Ok(())
            }
            Err(e) => Err(format!("Failed to lock handlers: {}", e)),
        }
    }
}
