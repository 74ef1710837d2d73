// lib.rs
// 組み込みイメージギャラリーウィジェット
// ホスト環境（ウェブビュー）から渡されたレコード列を閲覧し、
// エクスポート・削除などの操作をホストスクリプトへ橋渡しする

pub mod core;
pub mod host;

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::core::config::WidgetConfig;
use crate::core::event_bus::{events, EventBus};
use crate::core::gallery_state::GalleryState;
use crate::core::ingest::{self, IngestError};
use crate::core::navigation::NavigationController;
use crate::core::render_sink::RenderSink;
use crate::host::actions::{ActionDispatcher, ActionOutcome};
use crate::host::download::DownloadPort;
use crate::host::registry::{RegistryError, ScriptMode};
use crate::host::script_port::HostScriptPort;

/// ギャラリーウィジェット本体
/// 依存はすべてコンストラクタで受け取る（グローバル状態を持たない）
pub struct GalleryWidget {
    nav: NavigationController,
    dispatcher: ActionDispatcher,
    sink: Box<dyn RenderSink>,
    bus: Arc<EventBus>,
}

impl GalleryWidget {
    pub fn new(
        sink: Box<dyn RenderSink>,
        host: Arc<dyn HostScriptPort>,
        download: Arc<dyn DownloadPort>,
    ) -> Self {
        Self::with_config(WidgetConfig::default(), sink, host, download)
    }

    pub fn with_config(
        config: WidgetConfig,
        sink: Box<dyn RenderSink>,
        host: Arc<dyn HostScriptPort>,
        download: Arc<dyn DownloadPort>,
    ) -> Self {
        let mut widget = Self {
            nav: NavigationController::new(),
            dispatcher: ActionDispatcher::new(host, download),
            sink,
            bus: Arc::new(EventBus::new()),
        };
        widget.apply_config(&config);
        widget
    }

    /// 設定を反映する（読み込み後の適用も可）
    pub fn apply_config(&mut self, config: &WidgetConfig) {
        self.dispatcher.registry_mut().set_mode(config.script_mode);
        self.nav
            .set_viewport_size(config.visible_thumbnails, self.sink.as_mut());
    }

    pub fn state(&self) -> &GalleryState {
        self.nav.state()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    /// ホストから渡されたJSONペイロードを取り込んで初期描画する。
    /// 取り込んだ件数を返す。空データは既存状態を保ったまま
    /// 空メッセージを表示して 0 を返す
    pub fn load_payload(&mut self, json: &str) -> Result<usize, IngestError> {
        let rows = ingest::parse_payload(json)?;
        let items = ingest::rows_to_items(&rows);
        if !self.nav.initialize(items, self.sink.as_mut()) {
            log::info!("No images exist!");
            self.sink.show_empty_message();
            self.publish(events::GALLERY_EMPTY, json!({}));
            return Ok(0);
        }
        let count = self.nav.state().len();
        log::info!("Gallery loaded with {} items", count);
        self.publish(events::GALLERY_LOADED, json!({ "count": count }));
        Ok(count)
    }

    // --- ナビゲーション ---

    pub fn first(&mut self) {
        let before = self.nav.state().current_index();
        self.nav.first(self.sink.as_mut());
        self.publish_if_navigated(before);
    }

    pub fn previous(&mut self) {
        let before = self.nav.state().current_index();
        self.nav.previous(self.sink.as_mut());
        self.publish_if_navigated(before);
    }

    pub fn next(&mut self) {
        let before = self.nav.state().current_index();
        self.nav.next(self.sink.as_mut());
        self.publish_if_navigated(before);
    }

    pub fn last(&mut self) {
        let before = self.nav.state().current_index();
        self.nav.last(self.sink.as_mut());
        self.publish_if_navigated(before);
    }

    pub fn go_to(&mut self, index: usize) {
        let before = self.nav.state().current_index();
        self.nav.go_to(index, self.sink.as_mut());
        self.publish_if_navigated(before);
    }

    pub fn scroll_thumbnails_left(&mut self) {
        let before = self.nav.state().viewport_start();
        self.nav.scroll_viewport_left(self.sink.as_mut());
        self.publish_if_scrolled(before);
    }

    pub fn scroll_thumbnails_right(&mut self) {
        let before = self.nav.state().viewport_start();
        self.nav.scroll_viewport_right(self.sink.as_mut());
        self.publish_if_scrolled(before);
    }

    /// サムネイルの可視範囲を指定位置までスクロールする（追従はしない）
    pub fn scroll_thumbnails_to(&mut self, pos: usize) {
        let before = self.nav.state().viewport_start();
        self.nav.scroll_viewport_to(pos, self.sink.as_mut());
        self.publish_if_scrolled(before);
    }

    pub fn set_visible_thumbnails(&mut self, count: usize) {
        self.nav.set_viewport_size(count, self.sink.as_mut());
    }

    /// 主画像の遷移状態機械を進める。ホストの描画ループから呼ぶ
    pub fn poll(&mut self, now: Instant) {
        self.nav.poll_transition(now, self.sink.as_mut());
    }

    /// 進行中の遷移を即座に完了させる（アニメーションしないホスト向け）
    pub fn finish_transition(&mut self) {
        self.nav.finish_transition(self.sink.as_mut());
    }

    // --- ホスト連携 ---

    pub fn set_script_mode(&mut self, mode: ScriptMode) {
        self.dispatcher.registry_mut().set_mode(mode);
    }

    /// スクリプトモードを文字列で設定。不正な値は無視して false
    pub fn set_script_mode_str(&mut self, mode: &str) -> bool {
        self.dispatcher.registry_mut().set_mode_str(mode)
    }

    /// ホストスクリプトの登録マップ（JSON文字列）を取り込む
    pub fn register_scripts(&mut self, json: &str) -> Result<(), RegistryError> {
        self.dispatcher.registry_mut().register_json(json)
    }

    pub fn export_current_image(&self) -> ActionOutcome {
        self.dispatcher.export_current(self.nav.state())
    }

    pub fn delete_current_image(&self) -> ActionOutcome {
        self.dispatcher.delete_current(self.nav.state())
    }

    pub fn close(&self) -> ActionOutcome {
        let outcome = self.dispatcher.close();
        self.publish(events::GALLERY_CLOSED, json!({}));
        outcome
    }

    // --- 内部 ---

    fn publish_if_navigated(&self, before: usize) {
        let index = self.nav.state().current_index();
        if index != before {
            self.publish(events::GALLERY_NAVIGATED, json!({ "index": index }));
        }
    }

    fn publish_if_scrolled(&self, before: usize) {
        let start = self.nav.state().viewport_start();
        if start != before {
            self.publish(events::THUMBNAIL_SCROLL, json!({ "start": start }));
        }
    }

    /// イベント発行は fire-and-forget。ハンドラーの失敗はログに流すだけ
    fn publish(&self, event_type: &str, data: serde_json::Value) {
        if let Err(e) = self.bus.publish_from("gallery-widget", event_type, data) {
            log::warn!("Event publish failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render_sink::RecordingRenderSink;
    use crate::host::download::RecordingDownloadPort;
    use crate::host::registry::SCRIPT_EXPORT_IMAGE;
    use crate::host::script_port::RecordingHostScriptPort;
    use std::sync::Mutex;

    /// RecordingRenderSink をウィジェットと共有するためのラッパ
    #[derive(Default)]
    struct SharedSink(Arc<Mutex<RecordingRenderSink>>);

    impl SharedSink {
        fn handle(&self) -> Arc<Mutex<RecordingRenderSink>> {
            Arc::clone(&self.0)
        }
    }

    impl RenderSink for SharedSink {
        fn regenerate_thumbnails(&mut self, items: &[crate::core::gallery_state::GalleryItem]) {
            self.0.lock().unwrap().regenerate_thumbnails(items);
        }
        fn update_counter(&mut self, current: usize, total: usize) {
            self.0.lock().unwrap().update_counter(current, total);
        }
        fn update_active_thumbnail(&mut self, index: usize) {
            self.0.lock().unwrap().update_active_thumbnail(index);
        }
        fn update_info(&mut self, item: Option<&crate::core::gallery_state::GalleryItem>) {
            self.0.lock().unwrap().update_info(item);
        }
        fn begin_slide_out(&mut self, direction: crate::core::transition::SlideDirection) {
            self.0.lock().unwrap().begin_slide_out(direction);
        }
        fn show_main_image(
            &mut self,
            item: Option<&crate::core::gallery_state::GalleryItem>,
            direction: crate::core::transition::SlideDirection,
        ) {
            self.0.lock().unwrap().show_main_image(item, direction);
        }
        fn end_slide_in(&mut self) {
            self.0.lock().unwrap().end_slide_in();
        }
        fn update_nav_buttons(&mut self, buttons: crate::core::render_sink::NavButtons) {
            self.0.lock().unwrap().update_nav_buttons(buttons);
        }
        fn update_thumbnail_window(&mut self, start: usize, end: usize) {
            self.0.lock().unwrap().update_thumbnail_window(start, end);
        }
        fn show_empty_message(&mut self) {
            self.0.lock().unwrap().show_empty_message();
        }
    }

    struct Harness {
        widget: GalleryWidget,
        sink: Arc<Mutex<RecordingRenderSink>>,
        host: Arc<RecordingHostScriptPort>,
        download: Arc<RecordingDownloadPort>,
    }

    fn harness_with_config(config: WidgetConfig) -> Harness {
        let shared = SharedSink::default();
        let sink = shared.handle();
        let host = Arc::new(RecordingHostScriptPort::default());
        let download = Arc::new(RecordingDownloadPort::default());
        let widget = GalleryWidget::with_config(
            config,
            Box::new(shared),
            Arc::clone(&host) as Arc<dyn HostScriptPort>,
            Arc::clone(&download) as Arc<dyn DownloadPort>,
        );
        Harness {
            widget,
            sink,
            host,
            download,
        }
    }

    fn harness() -> Harness {
        harness_with_config(WidgetConfig::default())
    }

    fn payload(n: usize) -> String {
        let rows: Vec<serde_json::Value> = (0..n)
            .map(|i| {
                json!({
                    "image": "QUJD",
                    "type": "image/jpeg",
                    "UnitSerial": format!("SN-{:03}", i),
                    "RECID": format!("r{}", i)
                })
            })
            .collect();
        json!({ "data": rows }).to_string()
    }

    fn recorded_events(bus: &Arc<EventBus>) -> Arc<Mutex<Vec<(String, serde_json::Value)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for event in [
            events::GALLERY_LOADED,
            events::GALLERY_EMPTY,
            events::GALLERY_NAVIGATED,
            events::THUMBNAIL_SCROLL,
            events::GALLERY_CLOSED,
        ] {
            let seen_clone = Arc::clone(&seen);
            bus.subscribe(event, move |p| {
                seen_clone
                    .lock()
                    .unwrap()
                    .push((p.event_type.clone(), p.data.clone()));
                Ok(())
            })
            .unwrap();
        }
        seen
    }

    #[test]
    fn test_load_payload_renders_and_publishes() {
        let mut h = harness();
        let seen = recorded_events(&h.widget.event_bus());

        assert_eq!(h.widget.load_payload(&payload(3)).unwrap(), 3);
        assert_eq!(h.widget.state().len(), 3);

        let sink = h.sink.lock().unwrap();
        assert!(sink.calls.contains(&"thumbnails:3".to_string()));
        assert!(sink.calls.contains(&"counter:0/3".to_string()));
        assert_eq!(sink.main_images, vec![Some("SN-000".to_string())]);
        drop(sink);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("gallery:loaded".to_string(), json!({ "count": 3 }))]
        );
    }

    #[test]
    fn test_load_empty_payload_shows_message() {
        let mut h = harness();
        let seen = recorded_events(&h.widget.event_bus());

        assert_eq!(h.widget.load_payload(r#"{"data": []}"#).unwrap(), 0);
        assert!(h.sink.lock().unwrap().empty_shown);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("gallery:empty".to_string(), json!({}))]
        );
    }

    #[test]
    fn test_load_bad_payload_is_an_error() {
        let mut h = harness();
        assert!(h.widget.load_payload("not json").is_err());
        assert!(h.widget.load_payload(r#"{"rows": []}"#).is_err());
        assert!(h.sink.lock().unwrap().calls.is_empty());
    }

    #[test]
    fn test_reload_replaces_items() {
        let mut h = harness();
        h.widget.load_payload(&payload(3)).unwrap();
        h.widget.go_to(2);

        h.widget.load_payload(&payload(5)).unwrap();
        assert_eq!(h.widget.state().len(), 5);
        assert_eq!(h.widget.state().current_index(), 0);
    }

    #[test]
    fn test_navigation_publishes_index_changes_only() {
        let mut h = harness();
        h.widget.load_payload(&payload(3)).unwrap();
        let seen = recorded_events(&h.widget.event_bus());

        h.widget.next();
        h.widget.next();
        h.widget.next(); // 末尾で no-op
        h.widget.first();

        let events: Vec<_> = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                ("gallery:navigated".to_string(), json!({ "index": 1 })),
                ("gallery:navigated".to_string(), json!({ "index": 2 })),
                ("gallery:navigated".to_string(), json!({ "index": 0 })),
            ]
        );
    }

    #[test]
    fn test_thumbnail_scroll_publishes_start() {
        let mut h = harness_with_config(WidgetConfig {
            visible_thumbnails: 3,
            ..Default::default()
        });
        h.widget.load_payload(&payload(10)).unwrap();
        let seen = recorded_events(&h.widget.event_bus());

        h.widget.scroll_thumbnails_right();
        h.widget.scroll_thumbnails_left();
        h.widget.scroll_thumbnails_left(); // 端で no-op

        let events: Vec<_> = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                ("thumbnail:scroll".to_string(), json!({ "start": 3 })),
                ("thumbnail:scroll".to_string(), json!({ "start": 0 })),
            ]
        );
    }

    #[test]
    fn test_poll_completes_slide() {
        let mut h = harness();
        h.widget.load_payload(&payload(3)).unwrap();

        h.widget.next();
        h.widget.finish_transition();

        let sink = h.sink.lock().unwrap();
        assert_eq!(
            sink.main_images,
            vec![Some("SN-000".to_string()), Some("SN-001".to_string())]
        );
        assert_eq!(sink.calls.last().map(String::as_str), Some("slide_in_done"));
    }

    #[test]
    fn test_export_goes_through_host_script() {
        let mut h = harness();
        h.widget.load_payload(&payload(2)).unwrap();
        h.widget
            .register_scripts(r#"{ "Export Image to Desktop": "Do Export" }"#)
            .unwrap();

        assert_eq!(h.widget.export_current_image(), ActionOutcome::HostScript);
        let calls = h.host.calls.lock().unwrap();
        assert_eq!(calls[0].0, "Do Export");
        assert!(h.download.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_uses_record_id_of_current_item() {
        let mut h = harness();
        h.widget.load_payload(&payload(3)).unwrap();
        h.widget.go_to(2);

        assert_eq!(h.widget.delete_current_image(), ActionOutcome::HostScript);
        let calls = h.host.calls.lock().unwrap();
        let payload: serde_json::Value = serde_json::from_str(&calls[0].1).unwrap();
        assert_eq!(payload["recordId"], "r2");
    }

    #[test]
    fn test_close_publishes_event() {
        let h = harness();
        let seen = recorded_events(&h.widget.event_bus());

        assert_eq!(h.widget.close(), ActionOutcome::HostScript);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("gallery:closed".to_string(), json!({}))]
        );
        let calls = h.host.calls.lock().unwrap();
        assert_eq!(calls[0].0, crate::host::registry::SCRIPT_CLOSE);
    }

    #[test]
    fn test_config_sets_mode_and_viewport() {
        let mut h = harness_with_config(WidgetConfig::from_query("?mode=strict&thumbs=4"));
        h.widget.load_payload(&payload(10)).unwrap();
        assert_eq!(h.widget.state().viewport_size(), 4);

        // strict で未登録のエクスポートはホストを呼ばずにダウンロードへ
        assert_eq!(h.widget.export_current_image(), ActionOutcome::Downloaded);
        assert!(h.host.calls.lock().unwrap().is_empty());

        h.widget
            .register_scripts(&format!(r#"{{ "{}": true }}"#, SCRIPT_EXPORT_IMAGE))
            .unwrap();
        assert_eq!(h.widget.export_current_image(), ActionOutcome::HostScript);
    }
}
