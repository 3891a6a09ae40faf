pub mod cli;

use cli::{Cli, Command};
use model::JsonValue;
use std::io::Write;

/// Runs the resolved CLI invocation end-to-end and returns the final,
/// already-substituted document text.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let document = match &cli.command {
        Command::Single { name_or_path } => {
            tracing::info!(root = %cli.root.display(), %name_or_path, "resolving single config");
            let stack = catalog::load_and_resolve(&cli.root, name_or_path)?;
            JsonValue::Object(merge::fold_stack(&stack)?)
        }
        Command::Group { top_id } => {
            tracing::info!(root = %cli.root.display(), %top_id, "assembling group hierarchy");
            let apps = load_group_apps(&cli.root)?;
            let group = catalog::build_hierarchy(top_id, apps, cli.flatten_hierarchy)?;
            serde_json::to_value(group)?
        }
    };

    let serialized = model::to_canonical_string(&document)?;
    let keys: Vec<(&str, &str)> = cli
        .template_keys
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    Ok(catalog::substitute(&serialized, keys))
}

fn load_group_apps(root: &std::path::Path) -> anyhow::Result<Vec<model::Application>> {
    let mut apps = Vec::new();
    for path in catalog::find_instances(root) {
        let stack = catalog::resolve_extend_stack(root, &path)?;
        let merged = merge::fold_stack(&stack)?;
        apps.push(model::Application::from_value(JsonValue::Object(merged))?);
    }
    Ok(apps)
}

/// Writes `document` to `output` (`-` means stdout).
pub fn write_output(output: &str, document: &str) -> anyhow::Result<()> {
    if output == "-" {
        println!("{document}");
    } else {
        let mut file = std::fs::File::create(output)?;
        file.write_all(document.as_bytes())?;
        file.write_all(b"\n")?;
    }
    Ok(())
}
