//! Structured and human-readable summaries for the command line

use crate::qr::ModuleGrid;
use crate::session::GeneratedCode;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Combined structured and human-readable representation of a result
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Structured JSON representation suitable for scripts
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Summarise a generated code and any files written for it.
pub fn render_code(code: &GeneratedCode, files: &[&Path]) -> Rendered {
    let request = code.request();
    let grid = code.grid();

    let mut root = Map::new();
    root.insert("payload".to_string(), Value::String(code.payload().to_string()));
    root.insert("payload_bytes".to_string(), Value::from(code.payload().len()));
    root.insert(
        "render".to_string(),
        json!({
            "size": request.size,
            "level": request.level.as_str(),
            "foreground": request.foreground.to_string(),
            "background": request.background.to_string(),
        }),
    );
    root.insert("grid".to_string(), grid_value(grid));
    root.insert(
        "files".to_string(),
        Value::Array(
            files
                .iter()
                .map(|path| Value::String(path.display().to_string()))
                .collect(),
        ),
    );

    let mut human = vec![
        "QR code generated".to_string(),
        format!("  Payload: {}", format_text_snippet(code.payload())),
        format!(
            "  Size: {}px, level {}, {} on {}",
            request.size,
            request.level.as_str(),
            request.foreground,
            request.background
        ),
        format!(
            "  Modules: {}x{} ({} dark)",
            grid.width(),
            grid.width(),
            grid.dark_count()
        ),
    ];
    for path in files {
        human.push(format!("  Saved: {}", path.display()));
    }

    Rendered {
        json: Value::Object(root),
        human,
    }
}

/// Summarise a grid recovered from a raster.
pub fn render_grid(grid: &ModuleGrid) -> Rendered {
    let mut human = vec![
        "Recovered module grid".to_string(),
        format!("  Module size: {}px", grid.cell_size()),
        format!("  Modules: {}x{}", grid.width(), grid.width()),
        format!("  Dark modules: {}", grid.dark_count()),
    ];
    if grid.is_degenerate() {
        human.push("  Warning: no dark pixel on the first row".to_string());
    } else if !grid.is_valid_symbol_width() {
        human.push("  Warning: width is not a QR symbol width (21 + 4k)".to_string());
    }

    Rendered {
        json: grid_value(grid),
        human,
    }
}

fn grid_value(grid: &ModuleGrid) -> Value {
    json!({
        "modules": grid.width(),
        "cell_size": grid.cell_size(),
        "dark_modules": grid.dark_count(),
        "valid_symbol_width": grid.is_valid_symbol_width(),
        "degenerate": grid.is_degenerate(),
    })
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let snippet: String = text.chars().take(MAX).collect();
        let total = text.chars().count();
        format!("{}... ({} chars)", snippet, total)
    }
}
