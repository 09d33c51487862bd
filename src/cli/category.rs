//! Category CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::category::format_category_tree;
use crate::error::{LedgerError, LedgerResult};
use crate::models::CategoryKind;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories grouped by kind
    List {
        /// Only one kind (income or expense)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Kind (income or expense)
        #[arg(short, long, default_value = "expense")]
        kind: String,
    },
}

fn parse_kind(input: &str) -> LedgerResult<CategoryKind> {
    CategoryKind::parse(input).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid category kind: '{}'. Valid kinds: income, expense",
            input
        ))
    })
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> LedgerResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let categories = service.list(settings.user_id, kind)?;
            println!("{}", format_category_tree(&categories));
        }

        CategoryCommands::Create { name, kind } => {
            let kind = parse_kind(&kind)?;
            let category = service.create(settings.user_id, &name, kind)?;

            println!("Created category: {}", category.name);
            println!("  Kind: {}", category.kind);
            println!("  ID: {}", category.id);
        }
    }

    Ok(())
}
