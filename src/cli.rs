use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brand-detect")]
#[command(about = "動画メタデータからスマートフォンブランドの言及を検出するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時は ~/.config/brand-detect/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// カタログ読み込みから照合・保存まで一括実行
    Run {
        /// 動画メタデータCSV（ヘッダーなし12列）
        #[arg(short, long, default_value = "science_and_technology_videos.csv")]
        input: PathBuf,

        /// 出力ファイル（gzip圧縮CSV）
        #[arg(short, long, default_value = "videos_with_brands.csv.gz")]
        output: PathBuf,

        /// 端末カタログCSV
        #[arg(short, long, default_value = "Phone_to_Smartphone.csv")]
        catalog: PathBuf,

        /// ワーカー数（省略時は設定値）
        #[arg(short, long)]
        workers: Option<usize>,

        /// チャンク数（省略時は設定値）
        #[arg(long)]
        chunks: Option<usize>,

        /// 読み込む最大行数
        #[arg(long, default_value = "1000000")]
        num_rows: usize,

        /// 先頭から読み飛ばす行数
        #[arg(long, default_value = "0")]
        skip_rows: usize,

        /// 対象ブランド（複数指定可、省略時は設定値）
        #[arg(short, long = "brand")]
        brands: Vec<String>,

        /// 進捗バーを表示しない
        #[arg(long)]
        no_progress: bool,
    },

    /// キーワード辞書を作成して表示/保存
    Keywords {
        /// 端末カタログCSV
        #[arg(short, long, default_value = "Phone_to_Smartphone.csv")]
        catalog: PathBuf,

        /// 出力JSONファイル（省略時は件数のみ表示）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// カタログの絞り込み結果を表示
    Catalog {
        /// 端末カタログCSV
        #[arg(short, long, default_value = "Phone_to_Smartphone.csv")]
        catalog: PathBuf,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定をファイルに書き出す
        #[arg(long)]
        init: bool,
    },
}
