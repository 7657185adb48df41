pub mod report;
pub mod theme;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::exchange::{ExportRequest, ImportOptions};
use crate::model::Visibility;

#[derive(Parser)]
#[command(name = "memoport")]
#[command(about = "Export and import memos as portable JSON snapshots")]
pub struct Cli {
    /// Database file (defaults to MEMOPORT_DB, then the platform data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user
    #[arg(long, global = true, env = "MEMOPORT_USER", default_value = "admin")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new memo
    Add {
        content: String,

        #[arg(long, default_value_t = Visibility::Private)]
        visibility: Visibility,

        #[arg(long)]
        pinned: bool,
    },

    /// List your memos
    List,

    /// Archive a memo by UID
    Archive { uid: String },

    /// Permanently delete a memo by UID
    Delete { uid: String },

    /// Export memos to a snapshot file
    Export {
        /// Output path (defaults to a timestamped file in the current dir)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        filter: Option<String>,

        #[arg(long)]
        exclude_archived: bool,

        #[arg(long)]
        include_attachments: bool,

        #[arg(long)]
        include_relations: bool,

        /// Print the response envelope as JSON instead of writing a file
        #[arg(long)]
        json: bool,
    },

    /// Import memos from a snapshot file
    Import {
        path: PathBuf,

        #[arg(long)]
        overwrite: bool,

        #[arg(long)]
        validate_only: bool,

        #[arg(long)]
        no_preserve_timestamps: bool,

        #[arg(long)]
        skip_attachments: bool,

        #[arg(long)]
        skip_relations: bool,
    },

    /// Show or set the content length limit in bytes
    Limit { bytes: Option<usize> },
}

/// Build an export request from the `export` flags.
pub fn export_request(
    filter: Option<String>,
    exclude_archived: bool,
    include_attachments: bool,
    include_relations: bool,
) -> ExportRequest {
    ExportRequest {
        filter,
        exclude_archived,
        include_attachments,
        include_relations,
        ..Default::default()
    }
}

/// Build import options from the `import` flags.
pub fn import_options(
    overwrite: bool,
    validate_only: bool,
    no_preserve_timestamps: bool,
    skip_attachments: bool,
    skip_relations: bool,
) -> ImportOptions {
    ImportOptions {
        overwrite_existing: overwrite,
        validate_only,
        preserve_timestamps: !no_preserve_timestamps,
        skip_attachments,
        skip_relations,
    }
}
