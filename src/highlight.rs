//! Syntax highlighting for generated Lua and diff views using syntect.

use crate::diff::{DiffKind, DiffLine};
use egui::Color32;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const ADDED_BG: Color32 = Color32::from_rgb(20, 60, 30);
const REMOVED_BG: Color32 = Color32::from_rgb(70, 25, 25);

/// Cached syntax highlighting resources.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
        }
    }

    /// Highlight Lua code and return a list of (text, color) spans.
    pub fn highlight_lua(&self, code: &str) -> Vec<(String, Color32)> {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension("lua")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return vec![(code.to_string(), Color32::LIGHT_GRAY)];
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut result = Vec::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        result.push((text.to_string(), style_to_color32(style)));
                    }
                }
                Err(_) => {
                    // Fallback to plain text on error
                    result.push((line.to_string(), Color32::LIGHT_GRAY));
                }
            }
        }

        result
    }

    /// Render highlighted code as a LayoutJob for egui.
    pub fn layout_job(&self, code: &str) -> egui::text::LayoutJob {
        let mut job = egui::text::LayoutJob::default();

        for (text, color) in self.highlight_lua(code) {
            job.append(
                &text,
                0.0,
                egui::TextFormat {
                    font_id: egui::FontId::monospace(12.0),
                    color,
                    ..Default::default()
                },
            );
        }

        job
    }
}

/// Lays out a diff with `+`/`-` gutters and tinted backgrounds.
pub fn diff_layout_job(lines: &[DiffLine]) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    let width = lines.len().to_string().len();

    for (i, line) in lines.iter().enumerate() {
        let (color, background) = match line.kind {
            DiffKind::Same => (Color32::GRAY, Color32::TRANSPARENT),
            DiffKind::Added => (Color32::from_rgb(170, 230, 170), ADDED_BG),
            DiffKind::Removed => (Color32::from_rgb(240, 160, 160), REMOVED_BG),
        };
        let format = egui::TextFormat {
            font_id: egui::FontId::monospace(12.0),
            color,
            background,
            strikethrough: if line.kind == DiffKind::Removed {
                egui::Stroke::new(1.0, color.gamma_multiply(0.6))
            } else {
                egui::Stroke::NONE
            },
            ..Default::default()
        };
        let gutter = egui::TextFormat {
            font_id: egui::FontId::monospace(10.0),
            color: Color32::DARK_GRAY,
            ..Default::default()
        };
        job.append(&format!("{:>width$} ", i + 1), 0.0, gutter);
        job.append(
            &format!("{} {}\n", line.kind.marker(), line.line),
            0.0,
            format,
        );
    }

    job
}

/// Convert syntect Style to egui Color32.
fn style_to_color32(style: Style) -> Color32 {
    Color32::from_rgb(style.foreground.r, style.foreground.g, style.foreground.b)
}

/// Read-only highlighted code view.
pub fn code_viewer(ui: &mut egui::Ui, highlighter: &Highlighter, code: &str) {
    let job = highlighter.layout_job(code);

    egui::ScrollArea::both()
        .id_salt("highlighted_code_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.add(egui::Label::new(job).selectable(true));
        });
}

/// Editable code view; returns whether the text changed.
pub fn code_editor(ui: &mut egui::Ui, code: &mut String) -> bool {
    let mut changed = false;

    egui::ScrollArea::both()
        .id_salt("code_editor_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            // Highlighting while typing is too slow; the viewer highlights
            let response = ui.add(
                egui::TextEdit::multiline(code)
                    .code_editor()
                    .desired_rows(30)
                    .desired_width(f32::INFINITY),
            );
            changed = response.changed();
        });

    changed
}
