// core/mod.rs
// コアモジュールのエントリポイント

pub mod config;
pub mod event_bus;
pub mod gallery_state;
pub mod ingest;
pub mod mime;
pub mod navigation;
pub mod render_sink;
pub mod transition;

// コアモジュールを一括でエクスポート
pub use config::WidgetConfig;
pub use event_bus::EventBus;
pub use gallery_state::{GalleryItem, GalleryState};
pub use navigation::NavigationController;
pub use render_sink::{LogRenderSink, NavButtons, NullRenderSink, RenderSink};
pub use transition::{SlideDirection, SlideTransition};
