//! Operator CLI handlers for `cadence catalog` subcommands.

use anyhow::{Context, Result};

use cadence_core::catalog::{Catalog, Category, parse_catalog_toml};

use crate::CatalogCommands;

/// Dispatch a `CatalogCommands` variant to the appropriate handler.
pub fn run_catalog_command(command: CatalogCommands) -> Result<()> {
    match command {
        CatalogCommands::List {
            category,
            verbose,
            catalog,
        } => cmd_list(catalog.as_deref(), category, verbose),
    }
}

fn cmd_list(path: Option<&str>, category: Option<Category>, verbose: bool) -> Result<()> {
    let catalog = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog file: {path}"))?;
            parse_catalog_toml(&content)
                .with_context(|| format!("failed to parse catalog file: {path}"))?
        }
        None => Catalog::embedded(),
    };

    let units: Vec<_> = catalog
        .units()
        .iter()
        .filter(|u| category.is_none_or(|c| u.category == c))
        .collect();

    if units.is_empty() {
        match category {
            Some(c) => println!("No units in category {c}."),
            None => println!("The catalog is empty."),
        }
        return Ok(());
    }

    let id_w = units.iter().map(|u| u.id.len()).max().unwrap_or(2).max(2);
    let title_w = units.iter().map(|u| u.title.len()).max().unwrap_or(5).max(5);

    println!(
        "{:<id_w$}  {:<title_w$}  {:>5}  {:<12}  {:>4}",
        "ID", "TITLE", "LEVEL", "CATEGORY", "MIN",
    );
    for unit in &units {
        println!(
            "{:<id_w$}  {:<title_w$}  {:>5}  {:<12}  {:>4}",
            unit.id,
            unit.title,
            unit.level,
            unit.category.to_string(),
            unit.duration_minutes,
        );
        if verbose && !unit.description.is_empty() {
            println!("{:id_w$}  {}", "", unit.description);
        }
    }

    println!();
    println!("{} units.", units.len());
    Ok(())
}
