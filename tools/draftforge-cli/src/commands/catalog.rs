//! List catalog entries.

use draftforge_project_model::{CatalogKind, Catalogs};

pub fn run(kind: Option<CatalogKind>) -> anyhow::Result<()> {
    let catalogs = Catalogs::builtin()?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![
            CatalogKind::Effect,
            CatalogKind::Transition,
            CatalogKind::Animation,
        ],
    };

    for kind in kinds {
        println!("{kind}s:");
        for entry in catalogs.entries(kind) {
            let detail = match kind {
                CatalogKind::Effect => format!("{} params", entry.default_parameters.len()),
                CatalogKind::Transition => format!(
                    "{:.1}s{}",
                    entry.default_duration_micros as f64 / 1e6,
                    if entry.is_overlapping { ", overlap" } else { "" }
                ),
                CatalogKind::Animation => format!(
                    "{:.1}s",
                    entry.default_duration_micros as f64 / 1e6
                ),
            };
            println!(
                "  {:<14} {:<20} {:<8} {detail}",
                entry.name, entry.resource_id, entry.category
            );
        }
        println!();
    }

    Ok(())
}
