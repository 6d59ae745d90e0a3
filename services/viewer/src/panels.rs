//! Plain-text layer panels.

use std::fmt;

use layer_catalog::{replace_category_view, LayerCatalog, LayerListView};
use viewer_common::{Category, Layer};

/// One category's layer list, top-most layer first.
#[derive(Debug, Clone)]
pub struct TextPanel {
    pub category: Category,
    rows: Vec<String>,
}

impl TextPanel {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl LayerListView for TextPanel {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn push(&mut self, layer: Layer) {
        let mark = if layer.enabled { "x" } else { " " };
        let mut row = format!("[{}] {}", mark, layer.display_name);
        if layer.opacity < 1.0 {
            row.push_str(&format!(" ({:.0}%)", layer.opacity * 100.0));
        }
        if layer.is_pending() {
            row.push_str(" (loading)");
        }
        self.rows.push(row);
    }
}

impl fmt::Display for TextPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.category)?;
        for row in &self.rows {
            writeln!(f, "  {}", row)?;
        }
        Ok(())
    }
}

/// A panel for every category in the catalog, in block order.
pub fn build_panels(catalog: &LayerCatalog) -> Vec<TextPanel> {
    catalog
        .categories()
        .into_iter()
        .map(|category| {
            let mut panel = TextPanel::new(category.clone());
            replace_category_view(catalog.layers_by_category(&category), &mut panel);
            panel
        })
        .collect()
}
