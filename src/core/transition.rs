// transition.rs
// 主画像スライド遷移の状態機械
// idle -> sliding-out -> sliding-in -> idle を期限付きで進める。
// 進行中に新しいナビゲーションが来たら start() が遷移を丸ごと置き換えるため、
// 古い遷移が新しい状態を上書きすることはない。

use std::time::{Duration, Instant};

/// スライドアウト相の所要時間
pub const SLIDE_OUT_DURATION: Duration = Duration::from_millis(300);
/// スライドイン相の所要時間
pub const SLIDE_IN_DURATION: Duration = Duration::from_millis(10);

/// 遷移の視覚的な方向（インデックスが増える方向が Forward）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Forward,
    Backward,
}

/// 遷移の相
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    SlidingOut,
    SlidingIn,
}

/// poll() が報告するイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// スライドアウト完了。このインデックスの画像に差し替える
    SwapImage {
        index: usize,
        direction: SlideDirection,
    },
    /// スライドイン完了。遷移終了
    Settled,
}

/// 主画像のスライド遷移
#[derive(Debug, Clone)]
pub struct SlideTransition {
    phase: TransitionPhase,
    direction: SlideDirection,
    target_index: usize,
    deadline: Option<Instant>,
}

impl Default for SlideTransition {
    fn default() -> Self {
        Self {
            phase: TransitionPhase::Idle,
            direction: SlideDirection::Forward,
            target_index: 0,
            deadline: None,
        }
    }
}

impl SlideTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransitionPhase::Idle
    }

    /// 進行中の遷移を破棄して新しい遷移を開始する
    pub fn start(&mut self, target_index: usize, direction: SlideDirection, now: Instant) {
        self.phase = TransitionPhase::SlidingOut;
        self.direction = direction;
        self.target_index = target_index;
        self.deadline = Some(now + SLIDE_OUT_DURATION);
    }

    /// 遷移を中断して idle に戻す
    pub fn cancel(&mut self) {
        self.phase = TransitionPhase::Idle;
        self.deadline = None;
    }

    /// 期限を過ぎた相をひとつ進め、発生したイベントを返す
    pub fn poll(&mut self, now: Instant) -> Option<TransitionEvent> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        match self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::SlidingOut => {
                self.phase = TransitionPhase::SlidingIn;
                self.deadline = Some(now + SLIDE_IN_DURATION);
                Some(TransitionEvent::SwapImage {
                    index: self.target_index,
                    direction: self.direction,
                })
            }
            TransitionPhase::SlidingIn => {
                self.phase = TransitionPhase::Idle;
                self.deadline = None;
                Some(TransitionEvent::Settled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let t0 = Instant::now();
        let mut transition = SlideTransition::new();
        assert!(transition.is_idle());

        transition.start(3, SlideDirection::Forward, t0);
        assert_eq!(transition.phase(), TransitionPhase::SlidingOut);

        // 期限前は何も起きない
        assert_eq!(transition.poll(t0 + Duration::from_millis(100)), None);

        let swap = transition.poll(t0 + SLIDE_OUT_DURATION);
        assert_eq!(
            swap,
            Some(TransitionEvent::SwapImage {
                index: 3,
                direction: SlideDirection::Forward,
            })
        );
        assert_eq!(transition.phase(), TransitionPhase::SlidingIn);

        let settled = transition.poll(t0 + SLIDE_OUT_DURATION + SLIDE_IN_DURATION);
        assert_eq!(settled, Some(TransitionEvent::Settled));
        assert!(transition.is_idle());
        assert_eq!(transition.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_restart_replaces_in_flight_transition() {
        let t0 = Instant::now();
        let mut transition = SlideTransition::new();

        transition.start(5, SlideDirection::Forward, t0);
        // スライドアウト中に新しいナビゲーションが到着
        let t1 = t0 + Duration::from_millis(150);
        transition.start(2, SlideDirection::Backward, t1);

        // 古い期限では発火しない
        assert_eq!(transition.poll(t0 + SLIDE_OUT_DURATION), None);

        // 新しい遷移のみが完了する
        let swap = transition.poll(t1 + SLIDE_OUT_DURATION);
        assert_eq!(
            swap,
            Some(TransitionEvent::SwapImage {
                index: 2,
                direction: SlideDirection::Backward,
            })
        );
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut transition = SlideTransition::new();
        transition.start(1, SlideDirection::Forward, t0);
        transition.cancel();
        assert!(transition.is_idle());
        assert_eq!(transition.poll(t0 + Duration::from_secs(1)), None);
    }
}
