// render_sink.rs
// 描画側への書き込み専用インターフェース
// コアは状態の変化をここへ通知するだけで、描画結果には依存しない。

use serde::Serialize;

use crate::core::gallery_state::GalleryItem;
use crate::core::transition::SlideDirection;

/// ナビゲーションボタンの活性状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavButtons {
    pub first_enabled: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub last_enabled: bool,
}

/// 描画シンク
/// すべてのメソッドはデフォルトで no-op。描画を持たないホストは
/// 必要なものだけ実装すればよい。
pub trait RenderSink {
    /// サムネイル一覧を作り直す（データ差し替え時）
    fn regenerate_thumbnails(&mut self, _items: &[GalleryItem]) {}

    /// カウンタ表示を更新（0始まりの現在位置と総数）
    fn update_counter(&mut self, _current: usize, _total: usize) {}

    /// アクティブなサムネイルの強調を更新
    fn update_active_thumbnail(&mut self, _index: usize) {}

    /// 情報パネルを更新
    fn update_info(&mut self, _item: Option<&GalleryItem>) {}

    /// 主画像のスライドアウトを開始
    fn begin_slide_out(&mut self, _direction: SlideDirection) {}

    /// 主画像を差し替える（src の無い項目はプレースホルダ表示）
    fn show_main_image(&mut self, _item: Option<&GalleryItem>, _direction: SlideDirection) {}

    /// スライドインが完了した
    fn end_slide_in(&mut self) {}

    /// ナビゲーションボタンの活性状態を更新
    fn update_nav_buttons(&mut self, _buttons: NavButtons) {}

    /// サムネイルの可視範囲を更新（start..end、endは排他的）
    fn update_thumbnail_window(&mut self, _start: usize, _end: usize) {}

    /// 「画像なし」メッセージを表示
    fn show_empty_message(&mut self) {}
}

/// 何も描画しないシンク
#[derive(Debug, Default)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {}

/// 描画呼び出しをログに流すシンク（ホスト無し環境での実行用）
#[derive(Debug, Default)]
pub struct LogRenderSink;

impl RenderSink for LogRenderSink {
    fn regenerate_thumbnails(&mut self, items: &[GalleryItem]) {
        log::info!("render: regenerated {} thumbnails", items.len());
    }

    fn update_counter(&mut self, current: usize, total: usize) {
        log::info!("render: counter {}/{}", current + 1, total);
    }

    fn update_active_thumbnail(&mut self, index: usize) {
        log::debug!("render: active thumbnail {}", index);
    }

    fn update_info(&mut self, item: Option<&GalleryItem>) {
        if let Some(item) = item {
            log::info!("render: info title='{}' caption='{}'", item.title, item.caption);
        }
    }

    fn begin_slide_out(&mut self, direction: SlideDirection) {
        log::debug!("render: slide out {:?}", direction);
    }

    fn show_main_image(&mut self, item: Option<&GalleryItem>, direction: SlideDirection) {
        match item {
            Some(item) if item.has_image() => {
                log::info!(
                    "render: main image '{}' ({} chars, {:?})",
                    item.title,
                    item.src.len(),
                    direction
                );
            }
            _ => log::info!("render: main image placeholder"),
        }
    }

    fn end_slide_in(&mut self) {
        log::debug!("render: slide in finished");
    }

    fn update_nav_buttons(&mut self, buttons: NavButtons) {
        log::debug!("render: nav buttons {:?}", buttons);
    }

    fn update_thumbnail_window(&mut self, start: usize, end: usize) {
        log::info!("render: thumbnail window {}..{}", start, end);
    }

    fn show_empty_message(&mut self) {
        log::warn!("render: no images exist");
    }
}

/// テスト用の記録シンク
/// 呼び出し列を文字列で記録し、直近の値をフィールドに残す
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderSink {
    pub calls: Vec<String>,
    pub last_counter: Option<(usize, usize)>,
    pub last_active: Option<usize>,
    pub last_window: Option<(usize, usize)>,
    pub last_buttons: Option<NavButtons>,
    pub main_images: Vec<Option<String>>,
    pub empty_shown: bool,
}

#[cfg(test)]
impl RenderSink for RecordingRenderSink {
    fn regenerate_thumbnails(&mut self, items: &[GalleryItem]) {
        self.calls.push(format!("thumbnails:{}", items.len()));
    }

    fn update_counter(&mut self, current: usize, total: usize) {
        self.last_counter = Some((current, total));
        self.calls.push(format!("counter:{}/{}", current, total));
    }

    fn update_active_thumbnail(&mut self, index: usize) {
        self.last_active = Some(index);
        self.calls.push(format!("active:{}", index));
    }

    fn update_info(&mut self, item: Option<&GalleryItem>) {
        self.calls
            .push(format!("info:{}", item.map(|i| i.title.as_str()).unwrap_or("-")));
    }

    fn begin_slide_out(&mut self, direction: SlideDirection) {
        self.calls.push(format!("slide_out:{:?}", direction));
    }

    fn show_main_image(&mut self, item: Option<&GalleryItem>, direction: SlideDirection) {
        self.main_images.push(item.map(|i| i.title.clone()));
        self.calls.push(format!(
            "main:{}:{:?}",
            item.map(|i| i.title.as_str()).unwrap_or("-"),
            direction
        ));
    }

    fn end_slide_in(&mut self) {
        self.calls.push("slide_in_done".to_string());
    }

    fn update_nav_buttons(&mut self, buttons: NavButtons) {
        self.last_buttons = Some(buttons);
        self.calls.push("buttons".to_string());
    }

    fn update_thumbnail_window(&mut self, start: usize, end: usize) {
        self.last_window = Some((start, end));
        self.calls.push(format!("window:{}..{}", start, end));
    }

    fn show_empty_message(&mut self) {
        self.empty_shown = true;
        self.calls.push("empty".to_string());
    }
}
