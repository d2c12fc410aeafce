//! `adtsync list` — show the resolved work list, offline.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::ItemArgs;

/// Arguments for `adtsync list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub items: ItemArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.items.settings()?;
        let items = self.items.resolve(&settings)?;

        if self.json {
            let rows: Vec<_> = items
                .iter()
                .map(|item| json!({ "label": item.label.to_string(), "url": item.locator }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if items.is_empty() {
            println!("No work items. Pass --url or --urls-file.");
            return Ok(());
        }
        let width = items.iter().map(|i| i.label.0.len()).max().unwrap_or(0);
        for item in &items {
            println!("{:<width$}  {}", item.label.0, item.locator);
        }
        Ok(())
    }
}
