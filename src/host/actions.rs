// actions.rs
// ユーザー操作（エクスポート・削除・クローズ）をホスト呼び出しへ変換する

use std::sync::Arc;

use serde::Serialize;

use crate::core::gallery_state::{GalleryItem, GalleryState};
use crate::core::mime;
use crate::host::download::DownloadPort;
use crate::host::registry::{
    ScriptMode, ScriptRegistry, SCRIPT_CLOSE, SCRIPT_DELETE_IMAGE, SCRIPT_EXPORT_IMAGE,
};
use crate::host::script_port::HostScriptPort;

/// シリアライズ後のペイロードがこの文字数未満なら完全なデータURIも同梱する
const EXPORT_COMPACT_LIMIT: usize = 120_000;
/// これを超えるサイズ（バイト）のエクスポートは警告を出す
const EXPORT_SIZE_ADVISORY: usize = 7_000_000;
/// `basename.ext` 全体の最大長（ホストのスクリプト環境の制約）
const MAX_FILENAME_LEN: usize = 30;

/// 操作の結末（fire-and-forget だがテストと診断のために返す）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// ホストスクリプトを起動した
    HostScript,
    /// ダウンロード経路で保存した
    Downloaded,
    /// 外部ビューアで開いた
    OpenedExternally,
    /// 条件を満たさず何もしなかった
    Skipped,
    /// すべての経路が失敗した
    Failed,
}

/// ホストへ渡すエクスポートペイロード
#[derive(Debug, Serialize)]
pub struct ExportPayload {
    pub filename: String,
    pub mime: String,
    pub ext: String,
    pub base64: String,
    #[serde(rename = "sizeBytes")]
    pub size_bytes: usize,
    #[serde(rename = "dataUrl", skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

/// ホストへ渡す削除ペイロード
#[derive(Debug, Serialize)]
pub struct DeletePayload {
    #[serde(rename = "recordId")]
    pub record_id: String,
    pub title: String,
    pub location: String,
    #[serde(rename = "serviceId")]
    pub service_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub action: String,
}

/// アクションディスパッチャ
/// スクリプト解決ポリシーとフォールバック段を持つ
pub struct ActionDispatcher {
    registry: ScriptRegistry,
    host: Arc<dyn HostScriptPort>,
    download: Arc<dyn DownloadPort>,
}

impl ActionDispatcher {
    pub fn new(host: Arc<dyn HostScriptPort>, download: Arc<dyn DownloadPort>) -> Self {
        Self {
            registry: ScriptRegistry::new(),
            host,
            download,
        }
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScriptRegistry {
        &mut self.registry
    }

    /// 現在の画像をエクスポートする
    /// データURI: ホストスクリプト → 直接保存 → 外部で開く
    /// 通常URL: 直接ダウンロード → 取得して保存 → 外部で開く
    pub fn export_current(&self, state: &GalleryState) -> ActionOutcome {
        let item = match state.current_item() {
            Some(item) if item.has_image() => item,
            _ => {
                log::debug!("Export skipped: no current image");
                return ActionOutcome::Skipped;
            }
        };

        let (mime_type, ext) = mime::mime_and_ext_from_src(&item.src);
        let base = export_base_name(item);
        let filename = build_safe_filename(&base, ext);

        if !mime::is_data_uri(&item.src) {
            return self.download_from_url(&item.src, &base, &filename, ext);
        }

        if self.registry.mode() == ScriptMode::Browser {
            // 検証用モード: ホスト呼び出しを完全に迂回する
            return self.download_data_uri(item, &filename, &mime_type);
        }

        if self.host.is_available() {
            match self.registry.resolve(SCRIPT_EXPORT_IMAGE) {
                Some(script) => {
                    let payload = build_export_payload(&item.src, &filename);
                    if payload.size_bytes > EXPORT_SIZE_ADVISORY {
                        log::warn!(
                            "Large image detected ({} bytes); consider browser mode",
                            payload.size_bytes
                        );
                    }
                    match serde_json::to_string(&payload) {
                        Ok(json) => {
                            if self.host.invoke(&script, &json) {
                                return ActionOutcome::HostScript;
                            }
                            log::warn!("Host export script failed, trying download fallback");
                        }
                        Err(e) => log::error!("Failed to serialize export payload: {}", e),
                    }
                }
                None => {
                    if self.registry.mode() == ScriptMode::Strict {
                        log::warn!("Export script not registered; using download fallback");
                    }
                }
            }
        }

        self.download_data_uri(item, &filename, &mime_type)
    }

    /// 現在の画像レコードの削除をホストに依頼する
    /// レコード識別子の無い項目はホストに実体が無いので何もしない
    pub fn delete_current(&self, state: &GalleryState) -> ActionOutcome {
        let item = match state.current_item() {
            Some(item) => item,
            None => return ActionOutcome::Skipped,
        };
        if item.record_id.is_empty() {
            log::debug!("Delete skipped: current item has no record id");
            return ActionOutcome::Skipped;
        }

        let script = match self.registry.resolve(SCRIPT_DELETE_IMAGE) {
            Some(script) => script,
            None => {
                if self.registry.mode() == ScriptMode::Strict {
                    log::warn!("Delete script not registered; skipping");
                }
                return ActionOutcome::Skipped;
            }
        };
        if !self.host.is_available() {
            log::debug!("Delete skipped: no host attached");
            return ActionOutcome::Skipped;
        }

        let payload = DeletePayload {
            record_id: item.record_id.clone(),
            title: item.title.clone(),
            location: item.caption.clone(),
            service_id: item.service_id.clone(),
            client_id: item.client_id.clone(),
            action: "delete".to_string(),
        };
        match serde_json::to_string(&payload) {
            Ok(json) => {
                if self.host.invoke(&script, &json) {
                    ActionOutcome::HostScript
                } else {
                    log::error!("Host delete script failed");
                    ActionOutcome::Failed
                }
            }
            Err(e) => {
                log::error!("Failed to serialize delete payload: {}", e);
                ActionOutcome::Failed
            }
        }
    }

    /// ギャラリーを閉じる操作をホストに依頼する
    pub fn close(&self) -> ActionOutcome {
        let script = match self.registry.resolve(SCRIPT_CLOSE) {
            Some(script) => script,
            None => {
                if self.registry.mode() == ScriptMode::Strict {
                    log::warn!("Close script not registered; skipping");
                }
                return ActionOutcome::Skipped;
            }
        };
        if !self.host.is_available() {
            log::debug!("Close skipped: no host attached");
            return ActionOutcome::Skipped;
        }
        if self.host.invoke(&script, "") {
            ActionOutcome::HostScript
        } else {
            log::error!("Host close script failed");
            ActionOutcome::Failed
        }
    }

    fn download_data_uri(&self, item: &GalleryItem, filename: &str, mime_type: &str) -> ActionOutcome {
        match mime::decode_data_uri(&item.src) {
            Ok(bytes) => match self.download.save_bytes(filename, &bytes, mime_type) {
                Ok(()) => return ActionOutcome::Downloaded,
                Err(e) => log::warn!("Direct save failed: {}", e),
            },
            Err(e) => log::error!("{}", e),
        }
        match self.download.open_external(&item.src) {
            Ok(()) => ActionOutcome::OpenedExternally,
            Err(e) => {
                log::error!("All export fallbacks failed: {}", e);
                ActionOutcome::Failed
            }
        }
    }

    fn download_from_url(&self, url: &str, base: &str, filename: &str, ext: &str) -> ActionOutcome {
        match self.download.save_url(url, filename) {
            Ok(()) => return ActionOutcome::Downloaded,
            Err(e) => log::warn!("Direct link download failed, trying fetch: {}", e),
        }
        match self.download.fetch_bytes(url) {
            Ok((bytes, fetched_mime)) => {
                // 取得できた実際のMIMEがあれば拡張子を推定し直す
                let guessed_ext = fetched_mime
                    .as_deref()
                    .and_then(mime::normalize_ext_from_mime)
                    .unwrap_or(ext);
                let final_name = build_safe_filename(base, guessed_ext);
                match self
                    .download
                    .save_bytes(&final_name, &bytes, mime::mime_for_ext(guessed_ext))
                {
                    Ok(()) => return ActionOutcome::Downloaded,
                    Err(e) => log::warn!("Fetched save failed: {}", e),
                }
            }
            Err(e) => log::warn!("Fetch fallback failed: {}", e),
        }
        match self.download.open_external(url) {
            Ok(()) => ActionOutcome::OpenedExternally,
            Err(e) => {
                log::error!("All export fallbacks failed: {}", e);
                ActionOutcome::Failed
            }
        }
    }
}

/// エクスポート用のベース名を組み立てる
fn export_base_name(item: &GalleryItem) -> String {
    let serial = if item.title.is_empty() {
        "image"
    } else {
        &item.title
    };
    let combined = if item.service_id.is_empty() {
        serial.to_string()
    } else {
        format!("{}_{}", serial, item.service_id)
    };
    let stripped = mime::strip_known_image_extension(&combined);
    let sanitized = sanitize_base_name(stripped);
    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}

/// ベース名を英数字とアンダースコアだけに正規化する
/// 連続した `_` は1つにまとめ、先頭末尾の `_` は落とす
pub fn sanitize_base_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            result.push('_');
            last_was_underscore = true;
        }
    }
    result.trim_matches('_').to_string()
}

/// `basename.ext` が MAX_FILENAME_LEN を超えないファイル名を作る
pub fn build_safe_filename(base: &str, ext: &str) -> String {
    let max_base = MAX_FILENAME_LEN.saturating_sub(1 + ext.len()).max(1);
    let mut safe = if base.len() > max_base {
        // sanitize_base_name 済みのASCIIなのでバイト単位で切ってよい
        base[..max_base].to_string()
    } else {
        base.to_string()
    };
    safe = safe.trim_end_matches('_').to_string();
    if safe.is_empty() {
        safe = "image".to_string();
    }
    format!("{}.{}", safe, ext)
}

/// データURIからホスト向けエクスポートペイロードを組み立てる
/// 小さいペイロードには冗長な完全URIも同梱する（閾値: EXPORT_COMPACT_LIMIT）
pub fn build_export_payload(data_uri: &str, filename: &str) -> ExportPayload {
    let (mime_type, ext) = mime::mime_and_ext_from_src(data_uri);
    let base64 = mime::data_uri_base64(data_uri).unwrap_or_default();
    let padding = if base64.ends_with("==") {
        2
    } else if base64.ends_with('=') {
        1
    } else {
        0
    };
    let size_bytes = (base64.len() * 3 / 4).saturating_sub(padding);

    let mut payload = ExportPayload {
        filename: filename.to_string(),
        mime: mime_type,
        ext: ext.to_string(),
        base64,
        size_bytes,
        data_url: None,
    };
    let compact_len = serde_json::to_string(&payload).map(|s| s.len()).unwrap_or(usize::MAX);
    if compact_len < EXPORT_COMPACT_LIMIT {
        payload.data_url = Some(data_uri.to_string());
    }
    payload
}
