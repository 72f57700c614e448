use anyhow::Result;
use clap::Parser;
use console::style;
use serde_json::json;
use typesync_codegen::{load_metadata_dir, Classification, TypingsGenerator};

use super::CommonArgs;

/// Show the strategy chosen for every type.
#[derive(Parser)]
pub struct ClassifyCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print one JSON object per type instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl ClassifyCommand {
    pub async fn execute(self) -> Result<()> {
        self.common.init_tracing();
        let config = self.common.load_config()?;

        let registry = load_metadata_dir(&config.input.metadata)?;
        let generator = TypingsGenerator::new(&registry, config.generator);

        for (name, result) in generator.classify_all() {
            match result {
                Ok(classification) if self.json => {
                    println!("{}", to_json(&name, &classification));
                }
                Ok(classification) => {
                    println!(
                        "  {:<48} {:<20} {}",
                        name,
                        style(strategies(&classification)).cyan(),
                        identifiers(&classification)
                    );
                }
                Err(e) if self.json => {
                    println!("{}", json!({ "type": name, "error": e.to_string() }));
                }
                Err(e) => {
                    println!("  {:<48} {}", name, style(e).red());
                }
            }
        }
        Ok(())
    }
}

/// `form+basic` for dual emission, otherwise the single strategy.
fn strategies(classification: &Classification) -> String {
    classification
        .selections
        .iter()
        .map(|s| s.strategy.as_str())
        .collect::<Vec<_>>()
        .join("+")
}

fn identifiers(classification: &Classification) -> String {
    classification
        .selections
        .iter()
        .map(|s| s.identifier.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_json(name: &str, classification: &Classification) -> serde_json::Value {
    json!({
        "type": name,
        "selections": classification
            .selections
            .iter()
            .map(|s| json!({ "strategy": s.strategy.as_str(), "identifier": s.identifier }))
            .collect::<Vec<_>>(),
        "matched": classification
            .matched
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>(),
    })
}
