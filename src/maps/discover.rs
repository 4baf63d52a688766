//! スクロール探索の収束判定
//!
//! 結果パネルを一定量スクロールしては描画済みリスティング数を数え直す
//! ループの終了判定を、ブラウザから切り離した純粋な状態機械として持つ。

use crate::error::ScraperError;

/// 描画済み場所アンカー一覧の中の1リスティングを指すハンドル
///
/// クリック時にアンカーの包含行へ解決されるのはスクレイパー側のJS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingHandle {
    pub index: usize,
}

impl ListingHandle {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

/// 1回の観測後のループ判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollStatus {
    /// まだ目標に達しておらず、伸びてもいる。スクロール継続
    Continue,
    /// 描画数が目標件数に到達
    TargetReached,
    /// 2回連続で同じ件数（結果セットの終端、またはネットワーク停滞）。
    /// 目標未達でも成功として扱う
    Stalled,
}

/// スクロール探索の収束トラッカー
///
/// 停滞判定だけでは振動するリモートUIバグに対して無防備なので、
/// 反復上限を超えたらエラーに変換する。
#[derive(Debug)]
pub struct ScrollTracker {
    total: usize,
    max_iterations: u32,
    previous: Option<usize>,
    iterations: u32,
}

impl ScrollTracker {
    pub fn new(total: usize, max_iterations: u32) -> Self {
        Self {
            total,
            max_iterations,
            // 0件スタート扱い。最初の観測が0なら即停滞（空の結果セット）
            previous: Some(0),
            iterations: 0,
        }
    }

    /// 描画済みリスティング数を1回分観測する
    pub fn observe(&mut self, count: usize) -> Result<ScrollStatus, ScraperError> {
        self.iterations += 1;
        if self.iterations > self.max_iterations {
            return Err(ScraperError::Timeout(format!(
                "listing discovery did not converge after {} scroll iterations",
                self.max_iterations
            )));
        }

        if count >= self.total {
            return Ok(ScrollStatus::TargetReached);
        }
        if self.previous == Some(count) {
            return Ok(ScrollStatus::Stalled);
        }
        self.previous = Some(count);
        Ok(ScrollStatus::Continue)
    }

    /// 終了時に採用するハンドル数（目標超過分は切り捨て）
    pub fn take_count(&self, rendered: usize) -> usize {
        rendered.min(self.total)
    }
}
