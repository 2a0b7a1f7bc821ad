//! 動画メタデータのスマートフォンブランド検出
//!
//! 端末カタログから機種名キーワード辞書を作り、動画のタイトル・説明・タグに
//! 含まれるブランドをチャンク単位で並列に照合する。

pub mod catalog;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod runner;
pub mod videos;

pub use brand_detect_common as common;
