// mime.rs
// MIME種別・拡張子の解決とマジックバイト判定

use base64::{engine::general_purpose, Engine as _};

/// MIME文字列から正規化済み拡張子を求める
pub fn normalize_ext_from_mime(mime: &str) -> Option<&'static str> {
    if mime.is_empty() {
        return None;
    }
    let m = mime.to_lowercase();
    if m.contains("jpeg") {
        Some("jpg")
    } else if m.contains("png") {
        Some("png")
    } else if m.contains("gif") {
        Some("gif")
    } else if m.contains("webp") {
        Some("webp")
    } else if m.contains("tif") {
        Some("tif")
    } else if m.contains("bmp") {
        Some("bmp")
    } else if m.contains("svg") {
        Some("svg")
    } else if m.contains("heic") || m.contains("heif") {
        Some("heic")
    } else {
        None
    }
}

/// 生の拡張子表記を正規化する（`JPEG` -> `jpg`、`tiff` -> `tif` など）
pub fn normalize_ext_raw(ext: &str) -> Option<&'static str> {
    let e: String = ext
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    match e.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "tif" | "tiff" => Some("tif"),
        "bmp" => Some("bmp"),
        "svg" => Some("svg"),
        "heic" | "heif" => Some("heic"),
        _ => None,
    }
}

/// 正規化済み拡張子に対応するMIMEを返す
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" => "image/tiff",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

/// URLのパス部分から拡張子を推定する（クエリ・フラグメントは無視）
pub fn ext_from_url_path(url: &str) -> Option<&'static str> {
    let clean = url.split(['?', '#']).next().unwrap_or("");
    let (_, tail) = clean.rsplit_once('.')?;
    if tail.is_empty() || tail.contains('/') {
        return None;
    }
    normalize_ext_raw(tail)
}

/// `src` 文字列（データURIまたはURL）からMIMEと拡張子を求める
pub fn mime_and_ext_from_src(src: &str) -> (String, &'static str) {
    if let Some(rest) = src.strip_prefix("data:") {
        // data:[<mediatype>][;base64],<data>
        let head = rest.split(',').next().unwrap_or("");
        let mime = head.split(';').next().unwrap_or("");
        let ext = normalize_ext_from_mime(mime).unwrap_or("jpg");
        let mime = if mime.is_empty() {
            "image/jpeg".to_string()
        } else {
            mime.to_string()
        };
        return (mime, ext);
    }
    let ext = ext_from_url_path(src).unwrap_or("jpg");
    (mime_for_ext(ext).to_string(), ext)
}

/// 先頭バイト列のマジックナンバーからMIMEを判定する
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF8") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        return Some("image/tiff");
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        let brand = &bytes[8..12];
        if matches!(brand, b"heic" | b"heix" | b"hevc" | b"heif" | b"mif1" | b"msf1") {
            return Some("image/heic");
        }
    }
    None
}

/// base64文字列の先頭部分だけをデコードしてMIMEを判定する
pub fn sniff_mime_base64(b64: &str) -> Option<&'static str> {
    let head: String = b64
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(64)
        .collect();
    // 4の倍数に切り詰めれば接頭辞として単独でデコードできる
    let usable = head.len() - head.len() % 4;
    let bytes = general_purpose::STANDARD.decode(&head[..usable]).ok()?;
    sniff_mime(&bytes)
}

/// データURIかどうか
pub fn is_data_uri(src: &str) -> bool {
    src.starts_with("data:")
}

/// データURIのカンマ以降のbase64部分を取り出す（空白は除去）
pub fn data_uri_base64(src: &str) -> Option<String> {
    let (_, body) = src.split_once(',')?;
    Some(body.chars().filter(|c| !c.is_whitespace()).collect())
}

/// データURIをバイト列にデコードする
pub fn decode_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let b64 = data_uri_base64(src).ok_or_else(|| "Not a data URI".to_string())?;
    general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| format!("Failed to decode data URI: {}", e))
}

/// 既知の画像拡張子を末尾から取り除く
pub fn strip_known_image_extension(name: &str) -> &str {
    if let Some((stem, tail)) = name.rsplit_once('.') {
        if !stem.is_empty() && normalize_ext_raw(tail).is_some() {
            return stem;
        }
    }
    name
}
