// navigation.rs
// インデックス遷移とサムネイルビューポートの追従制御

use std::time::Instant;

use crate::core::gallery_state::{GalleryItem, GalleryState};
use crate::core::render_sink::{NavButtons, RenderSink};
use crate::core::transition::{SlideDirection, SlideTransition, TransitionEvent};

/// ナビゲーションコントローラ
/// ギャラリー状態と主画像遷移を所有し、変更のたびに描画シンクへ通知する
#[derive(Debug, Default)]
pub struct NavigationController {
    state: GalleryState,
    transition: SlideTransition,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    /// 項目列を差し替えて初期描画を行う。空入力は no-op で false を返す
    pub fn initialize(&mut self, items: Vec<GalleryItem>, sink: &mut dyn RenderSink) -> bool {
        if !self.state.initialize(items) {
            return false;
        }
        self.transition.cancel();
        sink.regenerate_thumbnails(self.state.items());
        sink.update_counter(self.state.current_index(), self.state.len());
        sink.update_active_thumbnail(self.state.current_index());
        sink.update_info(self.state.current_item());
        // 初期表示はスライドさせずに即時差し替える
        sink.show_main_image(self.state.current_item(), SlideDirection::Forward);
        sink.update_nav_buttons(self.nav_buttons());
        sink.update_thumbnail_window(self.state.viewport_start(), self.state.viewport_end());
        true
    }

    /// 先頭へ移動。既に先頭なら何もしない
    pub fn first(&mut self, sink: &mut dyn RenderSink) {
        if self.state.current_index() > 0 {
            self.state.set_current_index(0);
            self.update_gallery(sink);
        }
    }

    /// 1つ前へ。先頭では何もしない（折り返しなし）
    pub fn previous(&mut self, sink: &mut dyn RenderSink) {
        if self.state.current_index() > 0 {
            self.state.set_current_index(self.state.current_index() - 1);
            self.update_gallery(sink);
        }
    }

    /// 1つ次へ。末尾では何もしない（折り返しなし）
    pub fn next(&mut self, sink: &mut dyn RenderSink) {
        if !self.state.is_empty() && self.state.current_index() < self.state.len() - 1 {
            self.state.set_current_index(self.state.current_index() + 1);
            self.update_gallery(sink);
        }
    }

    /// 末尾へ移動。既に末尾なら何もしない
    pub fn last(&mut self, sink: &mut dyn RenderSink) {
        if !self.state.is_empty() && self.state.current_index() < self.state.len() - 1 {
            self.state.set_current_index(self.state.len() - 1);
            self.update_gallery(sink);
        }
    }

    /// 指定インデックスへ移動し、同じ位置でも無条件で再描画する
    /// （サムネイルクリックが再描画を当てにするため短絡しない）
    pub fn go_to(&mut self, index: usize, sink: &mut dyn RenderSink) {
        if self.state.is_empty() {
            return;
        }
        self.state.set_current_index(index);
        self.update_gallery(sink);
    }

    /// ビューポートを1ページ（viewport_size 個）左へ
    pub fn scroll_viewport_left(&mut self, sink: &mut dyn RenderSink) {
        let start = self.state.viewport_start();
        if start > 0 {
            let size = self.state.viewport_size();
            self.state.set_viewport_start(start.saturating_sub(size));
            sink.update_thumbnail_window(self.state.viewport_start(), self.state.viewport_end());
        }
    }

    /// ビューポートを1ページ右へ
    pub fn scroll_viewport_right(&mut self, sink: &mut dyn RenderSink) {
        let start = self.state.viewport_start();
        if start < self.state.max_viewport_start() {
            let size = self.state.viewport_size();
            self.state.set_viewport_start(start + size);
            sink.update_thumbnail_window(self.state.viewport_start(), self.state.viewport_end());
        }
    }

    /// ビューポート開始位置を直接設定（追従処理と外部呼び出しの両方が使う）
    pub fn scroll_viewport_to(&mut self, pos: usize, sink: &mut dyn RenderSink) {
        self.state.set_viewport_start(pos);
        sink.update_thumbnail_window(self.state.viewport_start(), self.state.viewport_end());
    }

    /// 表示サムネイル数を変更（開始位置は0に戻る）
    pub fn set_viewport_size(&mut self, count: usize, sink: &mut dyn RenderSink) {
        self.state.set_viewport_size(count);
        sink.update_thumbnail_window(self.state.viewport_start(), self.state.viewport_end());
    }

    /// 遷移状態機械を進める。発生したイベントを描画シンクへ流す
    pub fn poll_transition(&mut self, now: Instant, sink: &mut dyn RenderSink) {
        while let Some(event) = self.transition.poll(now) {
            match event {
                TransitionEvent::SwapImage { index, direction } => {
                    sink.show_main_image(self.state.item(index), direction);
                }
                TransitionEvent::Settled => sink.end_slide_in(),
            }
        }
    }

    /// 進行中の遷移を即座に完了させる（アニメーションしないホスト向け)
    pub fn finish_transition(&mut self, sink: &mut dyn RenderSink) {
        let far = Instant::now() + std::time::Duration::from_secs(3600);
        self.poll_transition(far, sink);
    }

    /// インデックス変更後の一括更新:
    /// カウンタ → アクティブサムネイル → 情報 → 主画像（方向付き遷移）
    /// → ボタン状態 → 追従不変条件
    fn update_gallery(&mut self, sink: &mut dyn RenderSink) {
        sink.update_counter(self.state.current_index(), self.state.len());
        sink.update_active_thumbnail(self.state.current_index());
        sink.update_info(self.state.current_item());

        let direction = if self.state.current_index() >= self.state.previous_index() {
            SlideDirection::Forward
        } else {
            SlideDirection::Backward
        };
        self.transition
            .start(self.state.current_index(), direction, Instant::now());
        sink.begin_slide_out(direction);

        sink.update_nav_buttons(self.nav_buttons());
        self.ensure_active_visible(sink);
    }

    /// 追従不変条件: 選択中の項目が常にビューポートに含まれるよう、
    /// 最小のスクロール量で開始位置を調整する
    fn ensure_active_visible(&mut self, sink: &mut dyn RenderSink) {
        let active = self.state.current_index();
        let start = self.state.viewport_start();
        let end = start + self.state.viewport_size() - 1;
        if active < start {
            self.scroll_viewport_to(active, sink);
        } else if active > end {
            self.scroll_viewport_to(active + 1 - self.state.viewport_size(), sink);
        }
    }

    fn nav_buttons(&self) -> NavButtons {
        let at_first = self.state.current_index() == 0;
        let at_last = self.state.is_empty() || self.state.current_index() + 1 >= self.state.len();
        NavButtons {
            first_enabled: !at_first,
            prev_enabled: !at_first,
            next_enabled: !at_last,
            last_enabled: !at_last,
        }
    }
}
