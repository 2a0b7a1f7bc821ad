//! Brand Detect Common Library
//!
//! 機種名キーワード辞書（Lexicon）の構築と、動画メタデータの
//! テキスト項目に対するブランド照合を提供する。

pub mod types;
pub mod lexicon;
pub mod matcher;
pub mod error;

pub use types::{BrandSet, MatchResult, VideoRecord, MATCH_COLUMNS, VIDEO_COLUMNS};
pub use lexicon::{BrandKeywords, Lexicon, LexiconBuilder, LexiconOptions};
pub use matcher::{match_fields, match_record};
pub use error::{Error, Result};
