use std::path::Path;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde_json::json;

use stree_diff::{
    describe, diff_state_trees, DiffConfig, DiffEntry, DiffLabels, DiffSeverity, DiffSummary,
};
use stree_model::StateTree;
use stree_types::StateId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::Show(args) => cmd_show(args, &cli.format),
    }
}

fn load_tree(path: &Path) -> anyhow::Result<StateTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    StateTree::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DiffConfig> {
    match path {
        Some(path) => DiffConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DiffConfig::default()),
    }
}

fn label_for(explicit: Option<String>, path: &Path) -> String {
    explicit.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    })
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let left = load_tree(&args.left)?;
    let right = load_tree(&args.right)?;

    let mut labels = DiffLabels::new(
        label_for(args.left_label, &args.left),
        label_for(args.right_label, &args.right),
    );
    labels.display_ids = config.display_ids;

    let entries = diff_state_trees(&left, &right, &config);
    match format {
        OutputFormat::Text => print_report_text(&entries, &labels),
        OutputFormat::Json => print_report_json(&entries, &labels)?,
    }
    Ok(())
}

fn marker(severity: DiffSeverity) -> ColoredString {
    match severity {
        DiffSeverity::Addition => "+".green().bold(),
        DiffSeverity::Removal => "-".red().bold(),
        DiffSeverity::Modification => "~".yellow().bold(),
        DiffSeverity::Relocation => ">".blue().bold(),
        DiffSeverity::Global => "*".magenta().bold(),
        DiffSeverity::Neutral => " ".normal(),
    }
}

fn print_report_text(entries: &[DiffEntry], labels: &DiffLabels) {
    println!("Comparing {} with {}", labels.left.bold(), labels.right.bold());
    if entries.is_empty() {
        println!("{} No differences.", "✓".green().bold());
        return;
    }
    for entry in entries {
        println!("  {} {}", marker(entry.severity()), describe(entry, labels));
    }

    let summary = DiffSummary::from_entries(entries);
    println!("\n{} differences", summary.total().to_string().bold());
    for (kind, count) in summary.iter() {
        println!("  {kind:?}: {count}");
    }
}

fn report_json(entries: &[DiffEntry], labels: &DiffLabels) -> serde_json::Value {
    let items: Vec<_> = entries
        .iter()
        .map(|entry| {
            json!({
                "kind": entry.kind,
                "severity": entry.severity(),
                "description": describe(entry, labels),
                "identifier": entry.identifier.as_ref().map(|p| p.display_string(labels.display_ids)),
                "secondary_identifier": entry
                    .secondary_identifier
                    .as_ref()
                    .map(|p| p.display_string(labels.display_ids)),
                "binding_path": entry.binding_path_string(),
            })
        })
        .collect();

    json!({
        "left": labels.left,
        "right": labels.right,
        "entries": items,
        "summary": DiffSummary::from_entries(entries),
    })
}

fn print_report_json(entries: &[DiffEntry], labels: &DiffLabels) -> anyhow::Result<()> {
    let report = report_json(entries, labels);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_show(args: ShowArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let tree = load_tree(&args.tree)?;
    match format {
        OutputFormat::Text => {
            println!(
                "{} ({} states, {} bindings)",
                args.tree.display().to_string().bold(),
                tree.len(),
                tree.bindings().len()
            );
            if let Some(schema) = &tree.schema {
                println!("Schema: {}", schema.cyan());
            }
            for root in tree.roots() {
                print_state(&tree, *root, 0);
            }
        }
        OutputFormat::Json => println!("{}", tree.to_json_pretty()?),
    }
    Ok(())
}

fn print_state(tree: &StateTree, id: StateId, depth: usize) {
    let Some(state) = tree.state(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let name = if state.enabled {
        state.name.bold()
    } else {
        state.name.dimmed()
    };
    let mut line = format!("{indent}{name} {}", format!("[{}]", id.short_id()).dimmed());
    if let Some(tag) = &state.tag {
        line.push_str(&format!(" #{}", tag.cyan()));
    }
    if !state.enabled {
        line.push_str(&format!(" {}", "(disabled)".red()));
    }
    println!("{line}");
    for child in tree.children_of(id) {
        print_state(tree, *child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stree_model::State;

    fn write_tree(dir: &Path, name: &str, tree: &StateTree) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(tree.to_json_pretty().unwrap().as_bytes()).unwrap();
        path
    }

    fn tree(enabled: bool) -> StateTree {
        let mut tree = StateTree::new();
        tree.add_root(State::with_id(StateId::from_u128(1), "Root")).unwrap();
        tree.add_child(
            StateId::from_u128(1),
            State::with_id(StateId::from_u128(2), "Idle").with_enabled(enabled),
        )
        .unwrap();
        tree
    }

    #[test]
    fn label_defaults_to_file_name() {
        assert_eq!(label_for(None, Path::new("/tmp/old.json")), "old.json");
        assert_eq!(label_for(Some("r42".into()), Path::new("/tmp/old.json")), "r42");
    }

    #[test]
    fn loads_tree_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tree(dir.path(), "a.json", &tree(true));
        let loaded = load_tree(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_tree(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn json_report_lists_entries() {
        let entries = diff_state_trees(&tree(true), &tree(false), &DiffConfig::default());
        let labels = DiffLabels::new("old", "new");
        let report = report_json(&entries, &labels);

        assert_eq!(report["left"], "old");
        let items = report["entries"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["kind"], "StateDisabled");
        assert_eq!(items[0]["identifier"], "Root/Idle");
        assert_eq!(items[0]["description"], "State 'Root/Idle' was disabled in new");
    }

    #[test]
    fn diff_command_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_tree(dir.path(), "a.json", &tree(true));
        let right = write_tree(dir.path(), "b.json", &tree(false));
        let args = DiffArgs {
            left,
            right,
            config: None,
            left_label: None,
            right_label: None,
        };
        cmd_diff(args, &OutputFormat::Json).unwrap();
    }
}
