//! Rendering of the stack listing
//!
//! Tables are column aligned with three spaces between columns. The JSON
//! format writes one object per line. Any other caller format is a line
//! template with `{{.Name}}`, `{{.Services}}`, `{{.Orchestrator}}` and
//! `{{.Namespace}}` placeholders. A template prefixed with `table ` gets a
//! header row and its tab separated cells aligned like the built-in tables.

use crate::Result;
use serde::Serialize;
use stackls_common::StackRecord;
use std::io::Write;

pub const TABLE_FORMAT_KEY: &str = "table";
pub const JSON_FORMAT_KEY: &str = "json";

const COLUMN_PADDING: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    /// NAME, SERVICES, ORCHESTRATOR
    Swarm,
    /// NAME, SERVICES, ORCHESTRATOR, NAMESPACE
    Kubernetes,
}

impl TableLayout {
    fn headers(&self) -> &'static [&'static str] {
        match self {
            TableLayout::Swarm => &["NAME", "SERVICES", "ORCHESTRATOR"],
            TableLayout::Kubernetes => &["NAME", "SERVICES", "ORCHESTRATOR", "NAMESPACE"],
        }
    }

    fn row(&self, stack: &StackRecord) -> Vec<String> {
        let mut row = vec![
            stack.name.clone(),
            stack.services.to_string(),
            stack.orchestrator.to_string(),
        ];
        if *self == TableLayout::Kubernetes {
            row.push(stack.namespace.clone());
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Table(TableLayout),
    Json,
    Template(String),
    TableTemplate(String),
}

impl OutputFormat {
    /// Interpret a caller supplied format string
    ///
    /// `table` means the default layout for the active backends.
    pub fn parse(format: &str, default_layout: TableLayout) -> Self {
        match format.trim() {
            TABLE_FORMAT_KEY => OutputFormat::Table(default_layout),
            JSON_FORMAT_KEY => OutputFormat::Json,
            trimmed => match trimmed.strip_prefix(TABLE_FORMAT_KEY) {
                Some(rest) if rest.starts_with(char::is_whitespace) => {
                    OutputFormat::TableTemplate(rest.trim_start().to_string())
                }
                _ => OutputFormat::Template(format.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonStack<'a> {
    name: &'a str,
    services: usize,
    orchestrator: &'a str,
    namespace: &'a str,
}

pub fn write_stacks<W: Write>(
    out: &mut W,
    format: &OutputFormat,
    stacks: &[StackRecord],
) -> Result<()> {
    match format {
        OutputFormat::Table(layout) => write_table(out, *layout, stacks)?,
        OutputFormat::Json => {
            for stack in stacks {
                let line = serde_json::to_string(&JsonStack {
                    name: &stack.name,
                    services: stack.services,
                    orchestrator: stack.orchestrator.display_name(),
                    namespace: &stack.namespace,
                })
                .map_err(std::io::Error::from)?;
                writeln!(out, "{}", line)?;
            }
        }
        OutputFormat::Template(template) => {
            for stack in stacks {
                writeln!(out, "{}", render_template(template, stack))?;
            }
        }
        OutputFormat::TableTemplate(template) => {
            let mut rows = vec![split_cells(&render_header(template))];
            rows.extend(
                stacks
                    .iter()
                    .map(|stack| split_cells(&render_template(template, stack))),
            );
            write_aligned(out, &rows)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn write_table<W: Write>(out: &mut W, layout: TableLayout, stacks: &[StackRecord]) -> std::io::Result<()> {
    let mut rows = vec![layout.headers().iter().map(|h| h.to_string()).collect()];
    rows.extend(stacks.iter().map(|s| layout.row(s)));

    write_aligned(out, &rows)
}

/// Rows may differ in length, each column is as wide as its widest cell
fn write_aligned<W: Write>(out: &mut W, rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(cell.len()),
                None => widths.push(cell.len()),
            }
        }
    }

    for row in rows {
        write_row(out, &widths, row)?;
    }

    Ok(())
}

fn write_row<W: Write>(out: &mut W, widths: &[usize], cells: &[String]) -> std::io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}", cell, width = width + COLUMN_PADDING));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

fn render_template(template: &str, stack: &StackRecord) -> String {
    substitute(
        template,
        &stack.name,
        &stack.services.to_string(),
        stack.orchestrator.display_name(),
        &stack.namespace,
    )
}

fn render_header(template: &str) -> String {
    substitute(template, "NAME", "SERVICES", "ORCHESTRATOR", "NAMESPACE")
}

fn substitute(
    template: &str,
    name: &str,
    services: &str,
    orchestrator: &str,
    namespace: &str,
) -> String {
    template
        .replace("{{.Name}}", name)
        .replace("{{.Services}}", services)
        .replace("{{.Orchestrator}}", orchestrator)
        .replace("{{.Namespace}}", namespace)
        .replace("\\t", "\t")
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_string).collect()
}
