//! Output formatting and display utilities
//!
//! Provides colored, formatted output for the CLI

use colored::{ColoredString, Colorize};

use blueprint::catalog::{CatalogControl, CatalogStats};
use blueprint::oscal::Component;
use blueprint::project::{ControlStatus, ControlView, Progress};

use crate::check::{CheckResult, Finding, Severity};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

/// Print a subheader
pub fn subheader(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print a JSON report
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn status_label(status: ControlStatus) -> ColoredString {
    match status {
        ControlStatus::Complete => status.name().green(),
        ControlStatus::Incomplete => status.name().yellow(),
        ControlStatus::NotStarted => status.name().dimmed(),
    }
}

/// Print the aggregated view of one control
pub fn print_control_view(view: &ControlView) {
    header(&format!("{} {}", view.control.control_label, view.control.title));
    println!("Project: {} ({})", view.project.title, view.project.id);
    println!("Status:  {}", status_label(view.status));
    if view.control.withdrawn {
        warning("This control has been withdrawn");
    }

    let nav = &view.catalog_data;
    let label = |r: &Option<blueprint::project::ControlRef>| {
        r.as_ref()
            .map(|c| c.control_label.clone())
            .unwrap_or_else(|| "-".to_string())
    };
    println!(
        "{} {}   {} {}   {} {}",
        "parent".dimmed(),
        label(&nav.parent),
        "prev".dimmed(),
        label(&nav.previous),
        "next".dimmed(),
        label(&nav.next)
    );
    if !nav.children.is_empty() {
        let children: Vec<_> = nav.children.iter().map(|c| c.control_label.as_str()).collect();
        println!("{} {}", "enhancements".dimmed(), children.join(", "));
    }

    let narratives = &view.component_data;
    if let Some(responsibility) = &narratives.responsibility {
        println!("Responsibility: {}", responsibility);
    }

    let inherited = &narratives.components.inherited;
    subheader("Inherited narratives:");
    if inherited.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for narrative in inherited {
        let icon = if narrative.enabled { "✓".green() } else { "○".dimmed() };
        let mut title = narrative.title.clone();
        if let Some(responsibility) = &narrative.responsibility {
            title.push_str(&format!(" [{responsibility}]"));
        }
        println!("  {} {}", icon, title.bold());
        println!("    {}", narrative.description);
        for statement in &narrative.statements {
            println!("    {} {}", statement.statement_id.cyan(), statement.description);
        }
    }

    subheader("System narrative:");
    match narratives.system() {
        None => println!("  {}", "no system component attached".dimmed()),
        Some(private) if !private.implemented || private.description.is_empty() => {
            println!("  {} {}", "○".dimmed(), "not written yet".dimmed())
        }
        Some(private) => {
            println!("  {}", private.description);
            for statement in &private.statements {
                println!("  {} {}", statement.statement_id.cyan(), statement.description);
            }
        }
    }
    println!();
}

/// Print project progress with a per-family table
pub fn print_progress(progress: &Progress) {
    header("Project Progress");
    println!(
        "{} complete, {} incomplete, {} not started of {} controls ({:.1}%)",
        progress.complete.to_string().green(),
        progress.incomplete.to_string().yellow(),
        progress.not_started.to_string().dimmed(),
        progress.total,
        progress.percent_complete
    );

    subheader("By family:");
    for (id, family) in &progress.by_family {
        println!(
            "  {:<4} {:<45} {:>4}/{:<4} {:>5.1}%",
            id.to_uppercase().cyan(),
            family.title,
            family.complete,
            family.total,
            family.percent_complete()
        );
    }
    println!();
}

/// Print a one-line summary per component
pub fn print_components(components: &[&Component]) {
    header(&format!("Components ({})", components.len()));
    for component in components {
        let versions: Vec<_> = component.catalog_versions().iter().map(|v| v.as_str()).collect();
        println!(
            "  {} {} {}",
            "→".cyan(),
            component.title.bold(),
            format!("[{}]", component.component_type).dimmed()
        );
        println!("    {} {}", "uuid".dimmed(), component.uuid);
        println!(
            "    {} {}",
            "catalogs".dimmed(),
            if versions.is_empty() { "-".to_string() } else { versions.join(", ") }
        );
        println!("    {} {}", "controls".dimmed(), component.control_ids().join(", "));
    }
    println!();
}

/// Print catalog statistics
pub fn print_catalog_stats(stats: &CatalogStats) {
    println!("{stats}");
}

/// Print one catalog control
pub fn print_catalog_control(control: &CatalogControl) {
    header(&format!("{} {}", control.control_label, control.title));
    println!("{} {}", "id".dimmed(), control.control_id);
    println!("{} {}", "family".dimmed(), control.family.to_uppercase());
    if control.withdrawn {
        warning("withdrawn");
    }
    if let Some(parent) = &control.parent {
        println!("{} {}", "parent".dimmed(), parent);
    }
    if !control.children.is_empty() {
        println!("{} {}", "enhancements".dimmed(), control.children.join(", "));
    }
    let statements = control.statement_ids();
    if !statements.is_empty() {
        println!("{} {}", "statements".dimmed(), statements.join(", "));
    }
    if !control.parameters.is_empty() {
        let params: Vec<_> = control.parameters.iter().map(|p| p.id.as_str()).collect();
        println!("{} {}", "parameters".dimmed(), params.join(", "));
    }
    println!();
}

/// Print component-definition check results
pub fn print_check_result(result: &CheckResult) {
    header(&format!("Check: {}", result.title));

    if result.passed {
        success(&format!(
            "{} component(s), {} warning(s)",
            result.components, result.warning_count
        ));
    } else {
        error(&format!(
            "{} errors, {} warnings",
            result.error_count, result.warning_count
        ));
    }

    let errors: Vec<_> = result.errors().collect();
    if !errors.is_empty() {
        subheader("Errors (must fix):");
        for finding in errors {
            print_finding(finding);
        }
    }

    let warnings: Vec<_> = result.warnings().collect();
    if !warnings.is_empty() {
        subheader("Warnings:");
        for finding in warnings {
            print_finding(finding);
        }
    }

    println!();
}

fn print_finding(finding: &Finding) {
    let (icon, message) = match finding.severity {
        Severity::Error => ("✗".red(), finding.message.red()),
        Severity::Warning => ("⚠".yellow(), finding.message.yellow()),
    };
    println!("  {} {}", icon, message);
    println!("    {}", finding.location.dimmed());
}
