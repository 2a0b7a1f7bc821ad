//! チャンク分割並列実行
//!
//! レコード列を連続したC個のチャンクに分割し、番号を付けてP個の
//! ワーカー（rayonスレッドプール）に投入する。完了順は不定だが、
//! 結果はチャンク番号順に並べ直して連結するため、入力順と一致する。
//!
//! - 同時に実行中のチャンクはワーカー数まで（1つ完了したら次を投入）
//! - ワーカーが失敗したら新規投入を止め、実行中のチャンクを待ってからエラーを返す
//! - `CancelFlag` で中断を要求した場合も同様に待ってから `Cancelled` を返す

use crate::error::{BrandDetectError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::any::Any;
use std::fmt::Display;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use tracing::{debug, warn};

/// 実行オプション
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// ワーカー数
    pub workers: usize,
    /// チャンク数（ワーカー数より多くすると遅いチャンクの影響が小さい）
    pub chunks: usize,
    /// 進捗バーを表示する
    pub progress: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            chunks: 100,
            progress: false,
        }
    }
}

/// 中断要求フラグ（複製して他スレッドから立てられる）
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// `len` 件を `chunks` 個の連続した範囲に分割する
///
/// 先頭の `len % chunks` 個が1件ずつ多くなる。`chunks > len` なら空の範囲を含む。
pub fn partition(len: usize, chunks: usize) -> Vec<Range<usize>> {
    if chunks == 0 {
        return Vec::new();
    }
    let base = len / chunks;
    let extra = len % chunks;

    let mut ranges = Vec::with_capacity(chunks);
    let mut start = 0;
    for i in 0..chunks {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

type ChunkOutcome<R> = std::result::Result<Vec<R>, String>;

pub struct ChunkedRunner {
    options: RunnerOptions,
    pool: rayon::ThreadPool,
    cancel: CancelFlag,
}

impl ChunkedRunner {
    pub fn new(options: RunnerOptions) -> Result<Self> {
        if options.workers == 0 {
            return Err(BrandDetectError::InvalidParameter("ワーカー数は1以上".into()));
        }
        if options.chunks == 0 {
            return Err(BrandDetectError::InvalidParameter("チャンク数は1以上".into()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .thread_name(|i| format!("brand-detect-worker-{}", i))
            .build()
            .map_err(|e| BrandDetectError::InvalidParameter(format!("スレッドプール作成失敗: {}", e)))?;

        Ok(Self {
            options,
            pool,
            cancel: CancelFlag::new(),
        })
    }

    /// 外部から中断できるフラグを設定
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// 全レコードに `f` を適用し、入力順の結果を返す
    ///
    /// `items` と `f` は全ワーカーで読み取り専用として共有される。
    /// 各チャンクは担当ワーカーだけが読む。
    pub fn run<T, R, E, F>(&self, items: Arc<Vec<T>>, f: Arc<F>) -> Result<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        E: Display,
        F: Fn(&T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        let ranges = partition(items.len(), self.options.chunks);
        let total = ranges.len();
        let progress = self.progress_bar(total);

        let (tx, rx) = mpsc::channel::<(usize, ChunkOutcome<R>)>();
        let mut pending = ranges.into_iter().enumerate();
        let mut slots: Vec<Option<Vec<R>>> = (0..total).map(|_| None).collect();
        let mut in_flight = 0;
        let mut completed = 0;
        let mut failure: Option<(usize, String)> = None;

        debug!(rows = items.len(), chunks = total, workers = self.options.workers, "並列処理開始");

        loop {
            // 失敗・中断後は新しいチャンクを投入しない
            let stopping = failure.is_some() || self.cancel.is_cancelled();
            while !stopping && in_flight < self.options.workers {
                let Some((index, range)) = pending.next() else {
                    break;
                };
                self.dispatch(index, range, &items, &f, &tx);
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            let (index, outcome) = rx.recv().map_err(|_| BrandDetectError::ChunkFailed {
                index: usize::MAX,
                message: "ワーカーとの通信が切断されました".into(),
            })?;
            in_flight -= 1;

            match outcome {
                Ok(rows) => {
                    debug!(chunk = index, rows = rows.len(), "チャンク完了");
                    slots[index] = Some(rows);
                    completed += 1;
                    progress.inc(1);
                }
                Err(message) => {
                    warn!(chunk = index, error = %message, "チャンク失敗");
                    if failure.as_ref().map_or(true, |(i, _)| index < *i) {
                        failure = Some((index, message));
                    }
                }
            }
        }

        progress.finish_and_clear();

        if let Some((index, message)) = failure {
            return Err(BrandDetectError::ChunkFailed { index, message });
        }
        if completed < total {
            return Err(BrandDetectError::Cancelled { completed });
        }

        // チャンク番号順に連結
        let mut output = Vec::with_capacity(items.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let rows = slot.ok_or_else(|| BrandDetectError::ChunkFailed {
                index,
                message: "結果が届いていません".into(),
            })?;
            output.extend(rows);
        }
        Ok(output)
    }

    fn dispatch<T, R, E, F>(
        &self,
        index: usize,
        range: Range<usize>,
        items: &Arc<Vec<T>>,
        f: &Arc<F>,
        tx: &mpsc::Sender<(usize, ChunkOutcome<R>)>,
    ) where
        T: Send + Sync + 'static,
        R: Send + 'static,
        E: Display,
        F: Fn(&T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        let items = Arc::clone(items);
        let f = Arc::clone(f);
        let tx = tx.clone();

        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                process_chunk(&items[range.clone()], range.start, f.as_ref())
            }))
            .unwrap_or_else(|payload| Err(format!("パニック: {}", panic_message(payload.as_ref()))));

            // 受信側が先に終了している場合は結果を捨てる
            let _ = tx.send((index, outcome));
        });
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} チャンク")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}

/// 1チャンクを先頭から順に処理する
fn process_chunk<T, R, E, F>(slice: &[T], offset: usize, f: &F) -> ChunkOutcome<R>
where
    E: Display,
    F: Fn(&T) -> std::result::Result<R, E>,
{
    slice
        .iter()
        .enumerate()
        .map(|(i, item)| f(item).map_err(|e| format!("行{}: {}", offset + i, e)))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "不明なパニック".to_string()
    }
}
