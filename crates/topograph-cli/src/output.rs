//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use topograph_graph::queries::{
    BlastRadius, DependencyGraph, EntityContext, EntityRef, NeighborSet, SearchResults,
    SummaryCounts, TopologySummary,
};
use topograph_graph::{NodeRecord, RelRecord, Value};
use unicode_width::UnicodeWidthStr;

/// Print an entity and its one-hop neighborhood.
pub fn print_entity_context(ctx: &EntityContext) {
    print_heading("Entity", &ctx.entity);
    println!("{}: {}", "Labels".bold(), ctx.node.labels.join(", "));
    for (key, value) in &ctx.node.props {
        println!("  {} {}", pad_right(key, 16).dimmed(), render_value(value));
    }

    print_neighbor_set("Outgoing", &ctx.neighbors.outgoing);
    print_neighbor_set("Incoming", &ctx.neighbors.incoming);
}

fn print_neighbor_set(title: &str, set: &NeighborSet) {
    println!();
    println!("{} ({} nodes, {} relationships)", title.bold(), set.nodes.len(), set.rels.len());
    print_nodes_table(&set.nodes);
    print_rels(&set.rels);
}

/// Print the result of a dependency or dependents walk.
pub fn print_dependency_graph(result: &DependencyGraph, heading: &str) {
    print_heading(heading, &result.entity);
    println!("{}: {}", "Depth".bold(), result.depth);
    println!();
    print_nodes_table(&result.graph.nodes);
    print_rels(&result.graph.rels);
}

/// Print the blast radius with per-bucket counts.
pub fn print_blast_radius(result: &BlastRadius) {
    print_heading("Blast radius of", &result.entity);
    println!("{}: {}", "Max depth".bold(), result.max_depth);
    println!();

    if result.impacted.is_empty() {
        println!("{}", "Nothing depends on this entity.".dimmed());
        return;
    }

    for (bucket, count) in &result.summary {
        println!("  {} {}", pad_right(bucket, 12).cyan(), count);
    }
    println!();

    let width = term_width().saturating_sub(12).max(20);
    let critical = result.impacted.iter().filter(|n| n.critical_impacted).count();
    for item in &result.impacted {
        let marker: ColoredString = if item.critical_impacted {
            "!!".red().bold()
        } else {
            "  ".normal()
        };
        println!("{} {}", marker, truncate_visual(&node_label(&item.node), width));
    }
    println!();
    println!(
        "{} impacted, {} via critical dependencies",
        result.impacted.len(),
        critical.to_string().red()
    );
}

/// Print search hits.
pub fn print_search_results(results: &SearchResults) {
    let scope = match results.entity_type {
        Some(label) => format!(" in {}", label),
        None => String::new(),
    };
    println!("{} '{}'{}", "Search".cyan().bold(), results.query, scope);
    println!("{}", "─".repeat(50));
    print_nodes_table(&results.results);
    println!();
    println!("{} result(s)", results.results.len());
}

/// Print aggregate counts.
pub fn print_summary(result: &TopologySummary) {
    let scope = result.scope.as_deref().unwrap_or("global");
    println!("{} {}", "Topology summary".cyan().bold(), format!("({})", scope).dimmed());
    println!("{}", "─".repeat(50));

    let rows: Vec<(&str, u64)> = match result.summary {
        SummaryCounts::Global { plants, services, incidents } => {
            vec![("Plants", plants), ("Services", services), ("Incidents", incidents)]
        }
        SummaryCounts::Plant { lines, machines, incidents } => {
            vec![("Lines", lines), ("Machines", machines), ("Incidents", incidents)]
        }
        SummaryCounts::Service { dependencies, dependents } => {
            vec![("Dependencies", dependencies), ("Dependents", dependents)]
        }
    };
    for (name, count) in rows {
        println!("  {} {}", pad_right(name, 14).bold(), count);
    }
}

fn print_heading(title: &str, entity: &EntityRef) {
    println!(
        "{} {}",
        title.cyan().bold(),
        format!("{}:{}", entity.entity_type, entity.id).bold()
    );
    println!("{}", "─".repeat(50));
}

fn print_nodes_table(nodes: &[NodeRecord]) {
    if nodes.is_empty() {
        println!("{}", "  (none)".dimmed());
        return;
    }

    let width = term_width();
    let label_col = 14;
    let id_col = ((width.saturating_sub(label_col + 4)) / 2).max(12);
    for node in nodes {
        let labels = truncate_visual(&node.labels.join(":"), label_col);
        let id = truncate_visual(&prop_text(node, "id"), id_col);
        let name = node
            .props
            .get("name")
            .or_else(|| node.props.get("title"))
            .map(render_value)
            .unwrap_or_default();
        println!(
            "  {} {} {}",
            pad_right(&labels, label_col).yellow(),
            pad_right(&id, id_col),
            truncate_visual(&name, id_col).dimmed()
        );
    }
}

fn print_rels(rels: &[RelRecord]) {
    for rel in rels {
        let strength = rel
            .props
            .get("strength")
            .map(|s| format!(" [{}]", render_value(s)))
            .unwrap_or_default();
        println!(
            "  {} -{}-> {}{}",
            rel.start.dimmed(),
            rel.rel_type.magenta(),
            rel.end.dimmed(),
            strength
        );
    }
}

/// `Label:id` for a node, falling back to `?` when it has no id.
fn node_label(node: &NodeRecord) -> String {
    format!("{}:{}", node.labels.join(":"), prop_text(node, "id"))
}

fn prop_text(node: &NodeRecord, key: &str) -> String {
    node.props.get(key).map(render_value).unwrap_or_else(|| "?".to_string())
}

/// Strings print bare; everything else as its JSON form.
fn render_value(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
