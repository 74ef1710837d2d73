// ingest.rs
// ホストから渡された生レコードをギャラリー項目へ正規化する純粋変換

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::gallery_state::GalleryItem;
use crate::core::mime;

/// 取り込みのエラー型
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to parse payload JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Payload is missing a 'data' array")]
    MissingData,
}

/// ホストから渡される1レコード
/// 値はすべて文字列で、欠けているフィールドは空文字列になる
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostRow {
    /// インライン画像（base64、データURI接頭辞なし）。src より優先される
    pub image: String,
    /// 画像URLまたはデータURI
    pub src: String,
    /// 明示的なMIME種別（あれば最優先）
    #[serde(rename = "type")]
    pub mime_type: String,
    /// 明示的な拡張子
    pub ext: String,
    /// 元のファイル名（拡張子の推定に使う）
    pub filename: String,
    #[serde(rename = "UnitSerial")]
    pub unit_serial: String,
    #[serde(rename = "UnitLocation")]
    pub unit_location: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    #[serde(rename = "RECID")]
    pub record_id: String,
    #[serde(rename = "ClientID")]
    pub client_id: String,
}

/// `{ "data": [ <row>, ... ] }` 形式のJSON文字列をレコード列に分解する
/// `data` 配列が無い・JSONが壊れている場合はエラー（状態には触れない）
pub fn parse_payload(json: &str) -> Result<Vec<HostRow>, IngestError> {
    let value: JsonValue = serde_json::from_str(json)?;
    let rows = value
        .get("data")
        .and_then(JsonValue::as_array)
        .ok_or(IngestError::MissingData)?;

    let mut result = Vec::with_capacity(rows.len());
    for (i, raw) in rows.iter().enumerate() {
        match serde_json::from_value::<HostRow>(raw.clone()) {
            Ok(row) => result.push(row),
            Err(e) => {
                // 型の合わないレコードで全体を失敗させない
                log::warn!("Skipping malformed row {}: {}", i, e);
                result.push(HostRow::default());
            }
        }
    }
    Ok(result)
}

/// レコード1件をギャラリー項目へ変換する
/// インラインのbase64画像が最優先で、データURIに包んで src とする。
/// どちらも無ければ src は空のまま（プレースホルダ表示）。
pub fn row_to_item(row: &HostRow) -> GalleryItem {
    let src = if !row.image.is_empty() {
        let mime = resolve_inline_mime(row);
        format!("data:{};base64,{}", mime, row.image)
    } else {
        row.src.clone()
    };

    GalleryItem {
        thumb: src.clone(),
        src,
        title: row.unit_serial.clone(),
        caption: row.unit_location.clone(),
        service_id: row.service_id.clone(),
        record_id: row.record_id.clone(),
        client_id: row.client_id.clone(),
    }
}

/// レコード列をまとめて変換する
pub fn rows_to_items(rows: &[HostRow]) -> Vec<GalleryItem> {
    rows.iter().map(row_to_item).collect()
}

/// インライン画像をデータURIに包むときのMIMEを解決する。優先順:
/// 明示type → 明示ext → filenameの拡張子 → 先頭バイトのマジックナンバー
/// → URLパスの拡張子 → JPEG
fn resolve_inline_mime(row: &HostRow) -> String {
    if !row.mime_type.is_empty() {
        return row.mime_type.clone();
    }
    if let Some(ext) = mime::normalize_ext_raw(&row.ext) {
        return mime::mime_for_ext(ext).to_string();
    }
    if let Some((_, tail)) = row.filename.rsplit_once('.') {
        if let Some(ext) = mime::normalize_ext_raw(tail) {
            return mime::mime_for_ext(ext).to_string();
        }
    }
    if let Some(sniffed) = mime::sniff_mime_base64(&row.image) {
        return sniffed.to_string();
    }
    if let Some(ext) = mime::ext_from_url_path(&row.src) {
        return mime::mime_for_ext(ext).to_string();
    }
    "image/jpeg".to_string()
}
