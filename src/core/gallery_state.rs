// gallery_state.rs
// ギャラリーの正規状態と不変条件を守るセッター

use serde::{Deserialize, Serialize};

/// デフォルトで同時に表示するサムネイル数
pub const DEFAULT_VISIBLE_THUMBNAILS: usize = 8;

/// ギャラリーの1項目（取り込み後は不変）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// 主画像の参照（データURIまたはURL）
    pub src: String,
    /// サムネイル参照（無ければ src と同じ）
    pub thumb: String,
    /// 表示ラベル（シリアル番号に対応）
    pub title: String,
    /// 補助ラベル（設置場所に対応）
    pub caption: String,
    /// ホスト側の識別子（空でもよい）
    pub service_id: String,
    pub record_id: String,
    pub client_id: String,
}

impl GalleryItem {
    /// 視覚的に描画できる画像参照を持つか
    pub fn has_image(&self) -> bool {
        !self.src.is_empty()
    }

    /// サムネイル用の参照（thumb が空なら src）
    pub fn thumb_src(&self) -> &str {
        if self.thumb.is_empty() {
            &self.src
        } else {
            &self.thumb
        }
    }
}

/// ギャラリーの正規状態
/// すべてのセッターは入力を黙ってクランプし、エラーを返さない
#[derive(Debug, Clone)]
pub struct GalleryState {
    items: Vec<GalleryItem>,
    current_index: usize,
    previous_index: usize,
    viewport_start: usize,
    viewport_size: usize,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_index: 0,
            previous_index: 0,
            viewport_start: 0,
            viewport_size: DEFAULT_VISIBLE_THUMBNAILS,
        }
    }
}

impl GalleryState {
    /// 空のギャラリー状態を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 項目列を丸ごと差し替える
    /// 空入力は no-op（既存のギャラリーを消さないための意図的なガード）
    /// 差し替え時はインデックスとビューポートを0に戻す
    pub fn initialize(&mut self, items: Vec<GalleryItem>) -> bool {
        if items.is_empty() {
            return false;
        }
        self.items = items;
        self.current_index = 0;
        self.previous_index = 0;
        self.viewport_start = 0;
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// 現在表示中の項目
    pub fn current_item(&self) -> Option<&GalleryItem> {
        self.items.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 直前の current_index（遷移方向の判定にのみ使う）
    pub fn previous_index(&self) -> usize {
        self.previous_index
    }

    pub fn viewport_start(&self) -> usize {
        self.viewport_start
    }

    pub fn viewport_size(&self) -> usize {
        self.viewport_size
    }

    /// viewport_start が取り得る最大値
    pub fn max_viewport_start(&self) -> usize {
        self.items.len().saturating_sub(self.viewport_size)
    }

    /// ビューポートの終端（排他的、項目数でクランプ済み）
    pub fn viewport_end(&self) -> usize {
        (self.viewport_start + self.viewport_size).min(self.items.len())
    }

    /// 現在インデックスを [0, len-1] にクランプして設定
    /// 空のギャラリーでは値を変えない（描画経路は非空を前提にガードされる）
    pub fn set_current_index(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        self.previous_index = self.current_index;
        self.current_index = index.min(self.items.len() - 1);
    }

    /// ビューポート開始位置を [0, max_viewport_start] にクランプして設定
    pub fn set_viewport_start(&mut self, pos: usize) {
        self.viewport_start = pos.min(self.max_viewport_start());
    }

    /// 表示サムネイル数を [1, max(len, n)] にクランプして設定
    /// 副作用としてビューポート開始位置を0に戻す
    pub fn set_viewport_size(&mut self, count: usize) {
        let upper = self.items.len().max(count).max(1);
        self.viewport_size = count.clamp(1, upper);
        self.viewport_start = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<GalleryItem> {
        (0..n)
            .map(|i| GalleryItem {
                src: format!("https://example.com/{}.jpg", i),
                thumb: format!("https://example.com/{}.jpg", i),
                title: format!("SN-{:03}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_initialize_resets_indices() {
        let mut state = GalleryState::new();
        assert!(state.initialize(items(5)));
        state.set_current_index(4);
        state.set_viewport_start(2);

        assert!(state.initialize(items(3)));
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.previous_index(), 0);
        assert_eq!(state.viewport_start(), 0);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_initialize_empty_is_noop() {
        let mut state = GalleryState::new();
        state.initialize(items(5));
        state.set_current_index(3);

        // 空の差し替えは既存状態を消さない
        assert!(!state.initialize(Vec::new()));
        assert_eq!(state.len(), 5);
        assert_eq!(state.current_index(), 3);
    }

    #[test]
    fn test_set_current_index_clamps() {
        let mut state = GalleryState::new();
        state.initialize(items(4));

        state.set_current_index(100);
        assert_eq!(state.current_index(), 3);

        state.set_current_index(0);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.previous_index(), 3);
    }

    #[test]
    fn test_set_current_index_on_empty_leaves_value() {
        let mut state = GalleryState::new();
        state.set_current_index(7);
        assert_eq!(state.current_index(), 0);
        assert!(state.current_item().is_none());
    }

    #[test]
    fn test_previous_index_tracks_prior_value() {
        let mut state = GalleryState::new();
        state.initialize(items(10));

        state.set_current_index(4);
        assert_eq!(state.previous_index(), 0);

        state.set_current_index(2);
        assert_eq!(state.previous_index(), 4);
    }

    #[test]
    fn test_viewport_start_clamps() {
        let mut state = GalleryState::new();
        state.initialize(items(20));
        state.set_viewport_size(8);

        state.set_viewport_start(100);
        assert_eq!(state.viewport_start(), 12);

        state.set_viewport_start(5);
        assert_eq!(state.viewport_start(), 5);
        assert_eq!(state.viewport_end(), 13);
    }

    #[test]
    fn test_viewport_start_when_fewer_items_than_viewport() {
        let mut state = GalleryState::new();
        state.initialize(items(3));
        state.set_viewport_size(8);

        state.set_viewport_start(2);
        assert_eq!(state.viewport_start(), 0);
        assert_eq!(state.viewport_end(), 3);
    }

    #[test]
    fn test_set_viewport_size_resets_start() {
        let mut state = GalleryState::new();
        state.initialize(items(10));
        state.set_viewport_start(4);

        state.set_viewport_size(3);
        assert_eq!(state.viewport_size(), 3);
        assert_eq!(state.viewport_start(), 0);
    }

    #[test]
    fn test_set_viewport_size_lower_bound() {
        let mut state = GalleryState::new();
        state.set_viewport_size(0);
        assert_eq!(state.viewport_size(), 1);
    }

    #[test]
    fn test_set_viewport_size_may_exceed_item_count() {
        // 項目未読み込みの状態では要求値をそのまま受け入れる
        let mut state = GalleryState::new();
        state.set_viewport_size(32);
        assert_eq!(state.viewport_size(), 32);
    }

    #[test]
    fn test_thumb_src_falls_back_to_src() {
        let item = GalleryItem {
            src: "a.jpg".to_string(),
            ..Default::default()
        };
        assert_eq!(item.thumb_src(), "a.jpg");
        assert!(item.has_image());
        assert!(!GalleryItem::default().has_image());
    }
}
