// main.rs
// ホスト無しでウィジェットを動かす確認用バイナリ
// 標準入力のコマンドでナビゲーションと各操作を試せる

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde_json::json;

use gallery_widget_lib::core::config::WidgetConfig;
use gallery_widget_lib::core::render_sink::LogRenderSink;
use gallery_widget_lib::host::download::FsDownloadPort;
use gallery_widget_lib::host::script_port::LogHostScriptPort;
use gallery_widget_lib::GalleryWidget;

fn main() {
    env_logger::init();

    let mut widget = GalleryWidget::with_config(
        WidgetConfig::default(),
        Box::new(LogRenderSink::default()),
        Arc::new(LogHostScriptPort::default()),
        Arc::new(FsDownloadPort::new("exports")),
    );

    // 引数でペイロードファイルを指定できる。無ければサンプルデータ
    let payload = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                log::error!("Failed to read {}: {}", path, e);
                return;
            }
        },
        None => sample_payload(),
    };
    match widget.load_payload(&payload) {
        Ok(count) => log::info!("Loaded {} items", count),
        Err(e) => {
            log::error!("Failed to load payload: {}", e);
            return;
        }
    }
    widget.finish_transition();

    println!("commands: next prev first last goto N left right thumbs N mode M export delete close quit");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("next") => widget.next(),
            Some("prev") => widget.previous(),
            Some("first") => widget.first(),
            Some("last") => widget.last(),
            Some("goto") => match tokens.next().and_then(|n| n.parse().ok()) {
                Some(index) => widget.go_to(index),
                None => println!("usage: goto N"),
            },
            Some("left") => widget.scroll_thumbnails_left(),
            Some("right") => widget.scroll_thumbnails_right(),
            Some("thumbs") => match tokens.next().and_then(|n| n.parse().ok()) {
                Some(count) => widget.set_visible_thumbnails(count),
                None => println!("usage: thumbs N"),
            },
            Some("mode") => match tokens.next() {
                Some(mode) => {
                    widget.set_script_mode_str(mode);
                }
                None => println!("usage: mode strict|permissive|browser"),
            },
            Some("export") => {
                println!("export: {:?}", widget.export_current_image());
            }
            Some("delete") => {
                println!("delete: {:?}", widget.delete_current_image());
            }
            Some("close") => {
                println!("close: {:?}", widget.close());
            }
            Some("quit") => break,
            Some(other) => println!("unknown command: {}", other),
            None => {}
        }
        // このバイナリはアニメーションしないので遷移は即完了させる
        widget.finish_transition();
        let _ = io::stdout().flush();
    }
}

/// 動作確認用のサンプルペイロード
fn sample_payload() -> String {
    let png_dot = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
    json!({
        "data": [
            {
                "image": png_dot,
                "type": "image/png",
                "UnitSerial": "SN-001",
                "UnitLocation": "Server Room",
                "ServiceID": "svc-100",
                "RECID": "1001",
                "ClientID": "acme"
            },
            {
                "src": "https://example.com/photos/unit-2.jpg",
                "UnitSerial": "SN-002",
                "UnitLocation": "Lobby",
                "ServiceID": "svc-100",
                "RECID": "1002",
                "ClientID": "acme"
            },
            {
                "UnitSerial": "SN-003",
                "UnitLocation": "Warehouse",
                "RECID": "1003"
            }
        ]
    })
    .to_string()
}
