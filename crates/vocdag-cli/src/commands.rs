//! CLI command implementations.

use crate::config::{LoadConfig, CONFIG_DIR, CONFIG_FILE};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::warn;
use vocdag_core::OboParser;
use vocdag_graph::{LoadSet, Ontology, OntologyBuilder};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Initialize vocdag in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_dir = path.join(CONFIG_DIR);

    if config_dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&config_dir)?;
    let config_path = config_dir.join(CONFIG_FILE);
    fs::write(
        &config_path,
        serde_json::to_string_pretty(&LoadConfig::default())?,
    )?;

    println!("{} Initialized vocdag in {}", "✓".green(), path.display());
    println!("  Edit {} to filter what gets loaded", config_path.display().to_string().cyan());

    Ok(())
}

/// Parses and builds an ontology, without checking for cycles.
fn load(file: &Path, config: &LoadConfig) -> Result<Ontology> {
    let started = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Parsing {}...", file.display()));

    let parsed = OboParser::parse_file(file)?;
    spinner.set_message("Building graph...");

    let mut builder = OntologyBuilder::with_options(config.build_options());
    builder.add_parsed(parsed);
    let ontology = builder.build()?;

    spinner.finish_and_clear();
    eprintln!(
        "{} Loaded {} terms and {} relationships in {}ms",
        "✓".green(),
        ontology.term_count().to_string().cyan(),
        ontology.relationship_count().to_string().cyan(),
        started.elapsed().as_millis()
    );

    Ok(ontology)
}

/// Loads an ontology and rejects it if it has cycles and the config says so.
fn load_checked(file: &Path, config: &LoadConfig) -> Result<Ontology> {
    let ontology = load(file, config)?;
    let cyclic = ontology.check_cycles();
    if !cyclic.is_empty() {
        if config.fail_on_cycles {
            return Err(format!(
                "{} terms lie on cycles; run `vocdag check` for details",
                cyclic.len()
            )
            .into());
        }
        warn!("{} terms lie on cycles, results may be incomplete", cyclic.len());
    }
    Ok(ontology)
}

/// Report cycles in an ontology file.
pub fn check(file: &Path, config: &LoadConfig) -> Result<()> {
    let ontology = load(file, config)?;
    let cyclic = ontology.check_cycles();

    if cyclic.is_empty() {
        println!("{} No cycles found", "✓".green());
        return Ok(());
    }

    println!("{} {} terms lie on cycles:", "⚠".yellow(), cyclic.len());
    for id in &cyclic {
        let label = ontology.term(id).map(|t| t.label().to_string()).unwrap_or_default();
        println!("  {} {}", id.red(), label.dimmed());
    }

    Err("ontology is not acyclic".into())
}

/// Show term, relationship and namespace statistics.
pub fn stats(file: &Path, config: &LoadConfig) -> Result<()> {
    let ontology = load(file, config)?;

    println!("{}", "Ontology Statistics".cyan().bold());
    println!("{}", "═".repeat(50));
    println!("  Terms:          {}", ontology.term_count().to_string().cyan());
    println!("  Relationships:  {}", ontology.relationship_count().to_string().cyan());
    println!("  Obsolete:       {}", ontology.obsolete_terms().len());

    let mut per_namespace: BTreeMap<&str, usize> = BTreeMap::new();
    for term in ontology.terms() {
        *per_namespace
            .entry(term.namespace.as_deref().unwrap_or("(none)"))
            .or_default() += 1;
    }
    println!("\n{}", "Namespaces".bold());
    for (namespace, count) in per_namespace {
        let roots = ontology.roots(Some(namespace)).len();
        println!("  {:<30} {:>8} terms {:>4} roots", namespace, count, roots);
    }

    let mut per_type: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, rel, _) in ontology.relationships() {
        *per_type.entry(rel).or_default() += 1;
    }
    println!("\n{}", "Relationship types".bold());
    for (rel, count) in per_type {
        println!("  {:<30} {:>8}", rel.yellow(), count);
    }

    Ok(())
}

/// List root terms.
pub fn roots(file: &Path, namespace: Option<&str>, config: &LoadConfig) -> Result<()> {
    let ontology = load_checked(file, config)?;
    let roots = ontology.roots(namespace);

    if roots.is_empty() {
        println!("No roots found");
        return Ok(());
    }

    for term in roots {
        println!(
            "  {} {} {}",
            term.id.cyan(),
            term.label(),
            format!("({})", term.namespace.as_deref().unwrap_or("-")).dimmed()
        );
    }

    Ok(())
}

/// Print the descendants (or ancestors) of a term.
pub fn closure(
    file: &Path,
    term: &str,
    ancestors: bool,
    json_output: bool,
    config: &LoadConfig,
) -> Result<()> {
    let ontology = load_checked(file, config)?;
    let ids = if ancestors {
        ontology.ancestors(term)?
    } else {
        ontology.descendants(term)?
    };

    if json_output {
        let output = serde_json::json!({
            "term": term,
            "direction": if ancestors { "ancestors" } else { "descendants" },
            "count": ids.len(),
            "terms": ids,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let direction = if ancestors { "ancestors" } else { "descendants" };
    println!("{} {} of {}:\n", ids.len().to_string().cyan(), direction, term.cyan());
    for id in &ids {
        let label = ontology.term(id).map(|t| t.label().to_string()).unwrap_or_default();
        println!("  {} {}", id, label.dimmed());
    }

    Ok(())
}

/// Print everything below a term as an indented tree.
pub fn tree(file: &Path, term: &str, config: &LoadConfig) -> Result<()> {
    let ontology = load_checked(file, config)?;
    println!("{}", ontology.render_tree(term)?);
    Ok(())
}

/// Export terms, relationships and closure rows to JSON.
pub fn export(file: &Path, output: &Path, config: &LoadConfig) -> Result<()> {
    let ontology = load_checked(file, config)?;
    let set = LoadSet::from_ontology(&ontology);

    fs::write(output, serde_json::to_string_pretty(&set)?)?;
    println!(
        "{} Exported {} terms, {} edges and {} closure rows to {}",
        "✓".green(),
        set.terms.len(),
        set.edges.len(),
        set.closure.len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
format-version: 1.2

[Term]
id: X:1
name: root
namespace: demo

[Term]
id: X:2
name: leaf
namespace: demo
is_a: X:1
";

    const CYCLIC: &str = "\
[Term]
id: X:1
is_a: X:2

[Term]
id: X:2
is_a: X:1
";

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();

        let config = LoadConfig::read(&LoadConfig::path_in(dir.path())).unwrap();
        assert_eq!(config, LoadConfig::default());

        // Second run leaves the file alone.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_export_writes_load_set() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("sample.obo");
        let output = dir.path().join("out.json");
        fs::write(&file, SAMPLE).unwrap();

        export(&file, &output, &LoadConfig::default()).unwrap();

        let set: LoadSet = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(set.terms.len(), 2);
        assert_eq!(set.edges.len(), 1);
        assert_eq!(set.closure[0].ancestor, "X:1");
    }

    #[test]
    fn test_cycles_fail_when_configured() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("cyclic.obo");
        fs::write(&file, CYCLIC).unwrap();

        assert!(check(&file, &LoadConfig::default()).is_err());
        assert!(load_checked(&file, &LoadConfig::default()).is_err());

        let lenient = LoadConfig {
            fail_on_cycles: false,
            ..LoadConfig::default()
        };
        assert!(load_checked(&file, &lenient).is_ok());
    }
}
