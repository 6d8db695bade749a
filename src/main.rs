use anyhow::Context;
use clap::Parser;
use gcsl_leaderboard::adapters::{self, LocalStorage};
use gcsl_leaderboard::config::cli::{Cli, Command, OutputFormat, OverrideAction};
use gcsl_leaderboard::core::export::{render, render_table, LeaderboardExporter};
use gcsl_leaderboard::core::import::RosterImport;
use gcsl_leaderboard::core::ranking::{rank, search};
use gcsl_leaderboard::core::repository::parse_overrides;
use gcsl_leaderboard::utils::error::ErrorSeverity;
use gcsl_leaderboard::utils::{logger, validation::Validate};
use gcsl_leaderboard::{parse_roster, AppConfig, FixedRankings, LeaderboardError, LeaderboardRepository};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    match &cli.command {
        Command::Serve {
            json_logs: true, ..
        } => logger::init_server_logger(cli.verbose),
        _ => logger::init_cli_logger(cli.verbose),
    }

    if let Err(e) = run(cli).await {
        let exit_code = match e.downcast_ref::<LeaderboardError>() {
            Some(err) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", err.recovery_suggestion());
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼 (失敗一律非零)
                match err.severity() {
                    ErrorSeverity::Low | ErrorSeverity::High => 1,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };

        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    // 應用命令列覆蓋設定
    match &cli.command {
        Command::Serve { port: Some(port), .. } => config.server.port = *port,
        Command::Export {
            output: Some(output),
        } => config.export.output_path = output.clone(),
        _ => {}
    }

    // 驗證配置
    config.validate()?;
    if cli.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    match cli.command {
        Command::Rank {
            csv,
            overrides,
            format,
            search: query,
        } => {
            let data = std::fs::read(&csv)
                .with_context(|| format!("failed to read roster {}", csv.display()))?;
            let participants = parse_roster(&data)?;

            let fixed = match overrides {
                Some(path) => load_overrides_file(&path)?,
                None => FixedRankings::new(),
            };

            let mut entries = rank(&participants, &fixed);
            if let Some(q) = query.as_deref() {
                entries = search(&entries, q);
            }

            match format {
                OutputFormat::Table => print!("{}", render_table(&entries)),
                OutputFormat::Json => println!("{}", render(&entries)?.json_output),
                OutputFormat::Csv => print!("{}", render(&entries)?.csv_output),
            }
        }

        Command::Import { csv, dry_run } => {
            let repository = open_repository(&config)?;
            let import = RosterImport::new(LocalStorage::new("."), repository);
            let summary = import.run(&csv.to_string_lossy(), dry_run).await?;

            tracing::info!("✅ Import finished");
            println!(
                "{} participants ({} qualifying) {}",
                summary.rows,
                summary.qualified,
                if summary.committed {
                    "committed"
                } else {
                    "parsed (dry run)"
                }
            );
        }

        Command::Overrides { action } => {
            let repository = open_repository(&config)?;
            match action {
                OverrideAction::List => {
                    let overrides = repository.overrides().await?;
                    println!("{}", serde_json::to_string_pretty(&overrides)?);
                }
                OverrideAction::Set { email, rank } => {
                    repository.set_override(&email, rank).await?;
                    println!("✅ {} pinned to rank {}", email.trim().to_lowercase(), rank);
                }
                OverrideAction::Remove { email } => {
                    if repository.remove_override(&email).await? {
                        println!("✅ Removed fixed rank for {}", email.trim().to_lowercase());
                    } else {
                        println!("No fixed rank stored for {}", email.trim().to_lowercase());
                    }
                }
                OverrideAction::Load { file } => {
                    let overrides = load_overrides_file(&file)?;
                    let count = overrides.len();
                    repository.replace_overrides(overrides).await?;
                    println!("✅ Stored {} fixed rankings", count);
                }
            }
        }

        Command::Export { .. } => {
            let repository = open_repository(&config)?;
            let entries = repository.leaderboard().await?;
            let storage = LocalStorage::new(config.export.output_path.clone());
            let exporter = LeaderboardExporter::new(storage, config.export.clone());
            let written = exporter.export(&entries).await?;

            tracing::info!("✅ Exported {} participants", entries.len());
            for path in written {
                println!("📁 {}/{}", config.export.output_path, path);
            }
        }

        Command::Serve { .. } => {
            let repository = open_repository(&config)?;
            gcsl_leaderboard::server::serve(&config, repository).await?;
        }
    }

    Ok(())
}

fn open_repository(config: &AppConfig) -> gcsl_leaderboard::Result<LeaderboardRepository> {
    let kv = adapters::connect(&config.store)?;
    Ok(LeaderboardRepository::new(kv, config.store.keys()))
}

fn load_overrides_file(path: &std::path::Path) -> anyhow::Result<FixedRankings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read overrides {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(parse_overrides(&value)?)
}
