// download.rs
// ホストを介さないエクスポート経路（ブラウザ側ダウンロード相当）のポート

use std::fs;
use std::path::PathBuf;

/// ダウンロードポート
/// exportのフォールバック段はこのポートのメソッドを順に試す
pub trait DownloadPort: Send + Sync {
    /// デコード済みバイト列を指定ファイル名で保存する
    fn save_bytes(&self, filename: &str, bytes: &[u8], mime: &str) -> Result<(), String>;

    /// URLをそのままダウンロードする（アンカークリック相当）
    fn save_url(&self, url: &str, filename: &str) -> Result<(), String>;

    /// URLの内容を取得して返す（fetch相当）。MIMEが分かれば併せて返す
    fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>), String>;

    /// 最終手段として外部のビューアで開く
    fn open_external(&self, url: &str) -> Result<(), String>;
}

/// ダウンロード経路を持たない環境向けのポート
#[derive(Debug, Default)]
pub struct NullDownloadPort;

impl DownloadPort for NullDownloadPort {
    fn save_bytes(&self, _filename: &str, _bytes: &[u8], _mime: &str) -> Result<(), String> {
        Err("Download port not available".to_string())
    }

    fn save_url(&self, _url: &str, _filename: &str) -> Result<(), String> {
        Err("Download port not available".to_string())
    }

    fn fetch_bytes(&self, _url: &str) -> Result<(Vec<u8>, Option<String>), String> {
        Err("Download port not available".to_string())
    }

    fn open_external(&self, _url: &str) -> Result<(), String> {
        Err("Download port not available".to_string())
    }
}

/// ローカルディレクトリへ保存するポート（ホスト無し実行用）
/// ネットワーク取得は扱わない
#[derive(Debug, Clone)]
pub struct FsDownloadPort {
    out_dir: PathBuf,
}

impl FsDownloadPort {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &PathBuf {
        &self.out_dir
    }
}

impl DownloadPort for FsDownloadPort {
    fn save_bytes(&self, filename: &str, bytes: &[u8], mime: &str) -> Result<(), String> {
        fs::create_dir_all(&self.out_dir)
            .map_err(|e| format!("Failed to create output directory: {}", e))?;
        let path = self.out_dir.join(filename);
        fs::write(&path, bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        log::info!("Saved {} bytes ({}) to {}", bytes.len(), mime, path.display());
        Ok(())
    }

    fn save_url(&self, _url: &str, _filename: &str) -> Result<(), String> {
        Err("Network access not available".to_string())
    }

    fn fetch_bytes(&self, _url: &str) -> Result<(Vec<u8>, Option<String>), String> {
        Err("Network access not available".to_string())
    }

    fn open_external(&self, url: &str) -> Result<(), String> {
        // 開く手段は無いので参照だけ残す
        log::info!("Open externally: {}", url);
        Ok(())
    }
}

/// テスト用の記録ポート。各段の成否を切り替えられる
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingDownloadPort {
    pub calls: std::sync::Mutex<Vec<String>>,
    pub fail_save_bytes: bool,
    pub fail_save_url: bool,
    pub fail_fetch: bool,
    pub fail_open: bool,
    pub fetched_mime: Option<String>,
}

#[cfg(test)]
impl RecordingDownloadPort {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.split(':').next().unwrap_or("").to_string())
            .collect()
    }
}

#[cfg(test)]
impl DownloadPort for RecordingDownloadPort {
    fn save_bytes(&self, filename: &str, bytes: &[u8], _mime: &str) -> Result<(), String> {
        self.record(format!("save_bytes:{}:{}", filename, bytes.len()));
        if self.fail_save_bytes {
            Err("save_bytes failed".to_string())
        } else {
            Ok(())
        }
    }

    fn save_url(&self, url: &str, filename: &str) -> Result<(), String> {
        self.record(format!("save_url:{}:{}", url, filename));
        if self.fail_save_url {
            Err("save_url failed".to_string())
        } else {
            Ok(())
        }
    }

    fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>), String> {
        self.record(format!("fetch:{}", url));
        if self.fail_fetch {
            Err("fetch failed".to_string())
        } else {
            Ok((b"fetched".to_vec(), self.fetched_mime.clone()))
        }
    }

    fn open_external(&self, url: &str) -> Result<(), String> {
        self.record(format!("open:{}", url));
        if self.fail_open {
            Err("open failed".to_string())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_port_saves_bytes() {
        let dir = std::env::temp_dir().join("gallery-widget-test-downloads");
        let port = FsDownloadPort::new(&dir);
        port.save_bytes("probe.bin", b"abc", "image/jpeg").unwrap();
        assert_eq!(fs::read(dir.join("probe.bin")).unwrap(), b"abc");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_fs_port_has_no_network_path() {
        let port = FsDownloadPort::new("unused");
        assert!(port.save_url("https://example.com/a.jpg", "a.jpg").is_err());
        assert!(port.fetch_bytes("https://example.com/a.jpg").is_err());
    }
}
