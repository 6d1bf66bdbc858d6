use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::domain::{product::DenormalizedProduct, user::Sex};

pub const EMPTY_MESSAGE: &str = "No products matching selected criteria";

const TABLE_TEMPLATE: &str = "product_table.html";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
}

/// Row highlight derived from the category owner's sex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStyle {
    Link,
    Danger,
}

impl RowStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Link => "has-text-link",
            Self::Danger => "has-text-danger",
        }
    }
}

pub fn row_style(row: &DenormalizedProduct) -> Option<RowStyle> {
    match row.user.as_ref()?.sex {
        Sex::Male => Some(RowStyle::Link),
        Sex::Female => Some(RowStyle::Danger),
        Sex::Unrecognized => None,
    }
}

/// One display row. Unresolved category or owner render as empty cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: u32,
    pub product: String,
    pub category: String,
    pub user: String,
    pub style: Option<&'static str>,
}

impl From<&DenormalizedProduct> for TableRow {
    fn from(row: &DenormalizedProduct) -> Self {
        Self {
            id: row.id().0,
            product: row.name().to_owned(),
            category: row
                .category
                .as_ref()
                .map(|category| format!("{} - {}", category.icon, category.title))
                .unwrap_or_default(),
            user: row.user_name().unwrap_or_default().to_owned(),
            style: row_style(row).map(RowStyle::css_class),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("json rendering failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

pub fn render(rows: &[DenormalizedProduct], format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Text => Ok(render_text(rows)),
        OutputFormat::Json => render_json(rows),
        OutputFormat::Html => render_html(rows),
    }
}

pub fn render_text(rows: &[DenormalizedProduct]) -> String {
    if rows.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let table: Vec<TableRow> = rows.iter().map(TableRow::from).collect();
    let header = ["ID", "Product", "Category", "User"];
    let cells: Vec<[String; 4]> = table
        .iter()
        .map(|row| [row.id.to_string(), row.product.clone(), row.category.clone(), row.user.clone()])
        .collect();

    // Terminal columns, not chars: category icons are double-width emoji.
    let mut widths = header.map(|title| title.width());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.as_str().width());
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(render_cells(header.iter().copied(), &widths));
    lines.push(widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>().join("  "));
    for row in &cells {
        lines.push(render_cells(row.iter().map(String::as_str), &widths));
    }

    lines.join("\n")
}

fn render_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize; 4]) -> String {
    cells
        .zip(widths.iter())
        .map(|(cell, width)| format!("{cell}{}", " ".repeat(width.saturating_sub(cell.width()))))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn render_json(rows: &[DenormalizedProduct]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn render_html(rows: &[DenormalizedProduct]) -> Result<String, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TABLE_TEMPLATE, include_str!("../templates/product_table.html"))?;

    let table: Vec<TableRow> = rows.iter().map(TableRow::from).collect();
    let mut context = Context::new();
    context.insert("rows", &table);
    context.insert("empty_message", EMPTY_MESSAGE);

    Ok(tera.render(TABLE_TEMPLATE, &context)?)
}
