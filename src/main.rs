use clap::Parser;
use std::process::ExitCode;

use memoport::cli::{self, Cli, Commands, report, theme};
use memoport::config::StorageConfig;
use memoport::exchange::ImportRequest;
use memoport::storage::StorageManager;

fn main() -> ExitCode {
    memoport::logging::init();
    theme::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", theme::error("Error:"), e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn open_storage(db: Option<std::path::PathBuf>) -> memoport::Result<StorageManager> {
    let config = StorageConfig::resolve(db).ok_or_else(|| {
        memoport::MemoportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        ))
    })?;

    StorageManager::open(config)
}

fn run(cli: Cli) -> memoport::Result<()> {
    let storage = open_storage(cli.db)?;
    let user = storage.ensure_user(&cli.user)?;

    match cli.command {
        Commands::Add {
            content,
            visibility,
            pinned,
        } => {
            let memo = storage.add_memo(&user, &content, visibility, pinned)?;
            println!("{} {}", theme::success("Added memo"), memo.uid);
            if !memo.payload.tags.is_empty() {
                println!("  tags: {}", theme::label(&memo.payload.tags.join(", ")));
            }
            Ok(())
        }

        Commands::List => {
            let memos = storage.list_memos(&user)?;
            report::print_memo_list(&memos);
            Ok(())
        }

        Commands::Archive { uid } => {
            storage.archive_memo(&user, &uid)?;
            println!("{} {}", theme::success("Archived memo"), uid);
            Ok(())
        }

        Commands::Delete { uid } => {
            storage.delete_memo(&user, &uid)?;
            println!("{} {}", theme::success("Deleted memo"), uid);
            Ok(())
        }

        Commands::Export {
            out,
            filter,
            exclude_archived,
            include_attachments,
            include_relations,
            json,
        } => {
            let request =
                cli::export_request(filter, exclude_archived, include_attachments, include_relations);
            let response = storage.export(&user.username, &request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            let path = out.unwrap_or_else(|| response.filename.clone().into());
            std::fs::write(&path, &response.data)?;
            report::print_export(&response, &path.display().to_string());
            Ok(())
        }

        Commands::Import {
            path,
            overwrite,
            validate_only,
            no_preserve_timestamps,
            skip_attachments,
            skip_relations,
        } => {
            if !path.exists() {
                return Err(memoport::MemoportError::FileNotFound { path });
            }
            let data = std::fs::read(&path)?;

            let request = ImportRequest {
                options: cli::import_options(
                    overwrite,
                    validate_only,
                    no_preserve_timestamps,
                    skip_attachments,
                    skip_relations,
                ),
                ..ImportRequest::new(data)
            };
            let response = storage.import(&user.username, &request)?;
            report::print_import(&response, validate_only);
            Ok(())
        }

        Commands::Limit { bytes } => {
            if let Some(bytes) = bytes {
                storage.set_content_length_limit(bytes)?;
            }
            println!(
                "Content length limit: {} bytes",
                theme::meta(&storage.content_length_limit()?.to_string())
            );
            Ok(())
        }
    }
}
