use anyhow::Context;
use brand_detect::catalog::Catalog;
use brand_detect::cli::{Cli, Commands};
use brand_detect::config::Config;
use brand_detect::runner::RunnerOptions;
use brand_detect::{detect, videos};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 初期化時は既存ファイルの有無に関わらずデフォルトから始める
    let config = if matches!(cli.command, Commands::Config { init: true, .. }) {
        Config::default()
    } else {
        Config::load(cli.config.as_deref()).context("設定の読み込みに失敗")?
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            catalog,
            workers,
            chunks,
            num_rows,
            skip_rows,
            brands,
            no_progress,
        } => {
            println!("📱 brand-detect - ブランド検出\n");

            let mut config = config;
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(chunks) = chunks {
                config.chunks = chunks;
            }
            if !brands.is_empty() {
                config.brands = brands;
            }
            config.validate()?;

            // 1. カタログ
            println!("[1/4] 端末カタログを読み込み中...");
            let catalog = Catalog::from_path(&catalog).context("カタログの読み込みに失敗")?;
            println!(
                "✔ {}機種（発売年なし{}件を除外）\n",
                catalog.entries().len(),
                catalog.dropped()
            );

            // 2. 辞書
            println!("[2/4] キーワード辞書を作成中...");
            let lexicon = Arc::new(detect::build_lexicon(&catalog, &config));
            for brand in lexicon.brands() {
                println!("  {}: {}語", brand.brand(), brand.len());
            }
            println!("✔ {}語\n", lexicon.keyword_count());

            // 3. メタデータ
            println!("[3/4] 動画メタデータを読み込み中...");
            let read_options = videos::VideoReadOptions {
                skip_rows,
                max_rows: num_rows,
            };
            let records = Arc::new(
                videos::load_videos(&input, read_options).context("メタデータの読み込みに失敗")?,
            );
            println!("✔ {}行\n", records.len());

            // 4. 照合・保存
            println!(
                "[4/4] 並列照合中...（ワーカー{} / チャンク{}）",
                config.workers, config.chunks
            );
            let options = RunnerOptions {
                workers: config.workers,
                chunks: config.chunks,
                progress: !no_progress,
            };
            let results = detect::detect_brands(Arc::clone(&records), Arc::clone(&lexicon), options)
                .context("ブランド照合に失敗")?;

            videos::write_results_gz(&output, &records, &results).context("結果の保存に失敗")?;
            println!("✔ 結果を保存: {}", output.display());

            let summary = detect::RunSummary::from_results(&lexicon, &results);
            println!("\n検出: {}/{}行", summary.detected, summary.rows);
            for (brand, count) in &summary.per_brand {
                println!("  {}: {}行", brand, count);
            }

            println!("\n✅ 完了");
        }

        Commands::Keywords { catalog, output } => {
            config.validate()?;
            let catalog = Catalog::from_path(&catalog).context("カタログの読み込みに失敗")?;
            let lexicon = detect::build_lexicon(&catalog, &config);

            let stats = lexicon.stats();
            println!(
                "機種: {}（非スマートフォン{} / キーワードなし{} / 順列省略{}）",
                stats.models,
                stats.non_phone,
                stats.empty,
                stats.truncated.len()
            );
            for brand in lexicon.brands() {
                println!("  {}: {}語", brand.brand(), brand.len());
            }

            if let Some(path) = output {
                lexicon.write_json(&path)?;
                println!("✔ 辞書を保存: {}", path.display());
            }
        }

        Commands::Catalog { catalog } => {
            let catalog = Catalog::from_path(&catalog).context("カタログの読み込みに失敗")?;
            println!("カタログ: {}行（発売年なし{}件を除外）", catalog.entries().len(), catalog.dropped());

            let filtered = catalog.filter_by_year(config.min_year, config.max_year);
            println!("{}-{}年発売: {}行", config.min_year, config.max_year, filtered.len());

            for group in catalog.models_by_brand(&config.brands, config.min_year, config.max_year) {
                println!("  {}: {}機種", group.brand, group.models.len());
            }

            println!("発売日の精度:");
            for (precision, count) in catalog.precision_counts(config.min_year, config.max_year) {
                match precision {
                    Some(p) => println!("  {}: {}", p, count),
                    None => println!("  解析不能: {}", count),
                }
            }
        }

        Commands::Config { show, init } => {
            if init {
                let path = Config::default()
                    .save(cli.config.as_deref())
                    .context("設定の保存に失敗")?;
                println!("✔ デフォルト設定を保存しました: {}", path.display());
            }

            if show || !init {
                println!("設定:");
                println!("  ブランド: {}", config.brands.join(", "));
                println!("  発売年: {}-{}", config.min_year, config.max_year);
                println!("  除去語: {}", config.removal_tokens.join(" "));
                println!("  非スマートフォン語: {}", config.non_phone_markers.join(" "));
                println!("  順列の最大トークン数: {}", config.max_permutation_tokens);
                println!("  ワーカー数: {}", config.workers);
                println!("  チャンク数: {}", config.chunks);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
