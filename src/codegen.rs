//! Lua code generation for the Tora UI library.
//!
//! `generate` is a pure function of the window and the options: the history
//! browser compares generated text to decide whether two versions differ, so
//! the output for a given window must be byte-identical across calls.

use crate::widget::{Element, ElementKind, Folder, Window};
use std::fmt::Write as _;

const BANNER: &str =
    "-- =============================================================================\n";
const INDENT: &str = "    ";

/// Default expression bound to `library` at the top of every script.
pub(crate) const DEFAULT_LIBRARY_LOADER: &str =
    "require(game:GetService(\"ReplicatedStorage\"):WaitForChild(\"ToraLibrary\"))";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GeneratorOptions {
    /// Emit the full banner instead of a one-line marker
    pub(crate) include_header: bool,
    /// Lua expression that evaluates to the Tora library table
    pub(crate) library_loader: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            library_loader: DEFAULT_LIBRARY_LOADER.to_owned(),
        }
    }
}

/// Escapes `s` for use inside a double-quoted Lua string literal.
pub(crate) fn escape_lua(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// A quoted Lua string literal.
pub(crate) fn lua_string(s: &str) -> String {
    format!("\"{}\"", escape_lua(s))
}

/// Renders a number as a Lua numeric literal.
///
/// Integral values print without a fractional part. Non-finite values never
/// pass the editing boundary but are still given a valid Lua spelling.
pub(crate) fn lua_number(n: f64) -> String {
    if n.is_nan() {
        "0/0".to_owned()
    } else if n == f64::INFINITY {
        "math.huge".to_owned()
    } else if n == f64::NEG_INFINITY {
        "-math.huge".to_owned()
    } else {
        format!("{n}")
    }
}

/// Generates the complete Lua script for a window.
pub(crate) fn generate(window: &Window, options: &GeneratorOptions) -> String {
    let mut out = String::new();

    if options.include_header {
        out.push_str(BANNER);
        out.push_str("-- Generated by Tora GUI Builder\n");
        out.push_str(&format!("-- Window: {}\n", lua_string(&window.title)));
        out.push_str(BANNER);
        out.push('\n');
    } else {
        out.push_str("-- generated by Tora GUI Builder\n");
    }

    out.push_str(&format!("local library = {}\n\n", options.library_loader));
    out.push_str(&format!(
        "local window = library:CreateWindow({})\n",
        lua_string(&window.title)
    ));

    for folder in &window.folders {
        out.push('\n');
        emit_folder(folder, &mut out);
    }

    out.push_str("\nlibrary:Init()\n");
    out
}

fn emit_folder(folder: &Folder, out: &mut String) {
    // Each tab lives in its own scope so the local name never depends on
    // the folder's position in the window.
    out.push_str("do\n");
    out.push_str(&format!(
        "{INDENT}local tab = window:AddFolder({})\n",
        lua_string(&folder.text)
    ));
    for element in &folder.elements {
        out.push('\n');
        emit_element(element, out);
    }
    out.push_str("end\n");
}

fn field(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("{INDENT}{INDENT}{name} = {value},\n"));
}

fn emit_element(element: &Element, out: &mut String) {
    let (constructor, params) = match &element.kind {
        ElementKind::Button => ("AddButton", ""),
        ElementKind::Toggle { .. } => ("AddToggle", "state"),
        ElementKind::Slider { .. } => ("AddSlider", "value"),
        ElementKind::Dropdown { .. } => ("AddDropdown", "value"),
    };

    out.push_str(&format!("{INDENT}tab:{constructor}({{\n"));
    field(out, "text", &lua_string(&element.text));

    match &element.kind {
        ElementKind::Button => {}
        ElementKind::Toggle {
            flag,
            default_state,
        } => {
            field(out, "flag", &lua_string(flag));
            field(out, "state", if *default_state { "true" } else { "false" });
        }
        ElementKind::Slider {
            flag,
            min,
            max,
            value,
            decimals,
        } => {
            field(out, "flag", &lua_string(flag));
            field(out, "min", &lua_number(*min));
            field(out, "max", &lua_number(*max));
            field(out, "value", &lua_number(*value));
            field(out, "decimals", &decimals.to_string());
        }
        ElementKind::Dropdown { flag, values } => {
            field(out, "flag", &lua_string(flag));
            let list = values
                .iter()
                .map(|v| lua_string(v))
                .collect::<Vec<_>>()
                .join(", ");
            if list.is_empty() {
                field(out, "values", "{}");
            } else {
                field(out, "values", &format!("{{ {list} }}"));
            }
        }
    }

    out.push_str(&format!(
        "{INDENT}{INDENT}callback = function({params})\n"
    ));
    match element.logic() {
        // User logic goes in byte for byte; re-indenting would change
        // the contents of multi-line strings.
        Some(logic) => {
            out.push_str(logic);
            if !logic.ends_with('\n') {
                out.push('\n');
            }
        }
        None => {
            out.push_str(&INDENT.repeat(3));
            out.push_str(&placeholder(element));
            out.push('\n');
        }
    }
    out.push_str(&format!("{INDENT}{INDENT}end,\n"));
    out.push_str(&format!("{INDENT}}})\n"));
}

/// The statement used when an element has no user logic.
fn placeholder(element: &Element) -> String {
    let label = lua_string(&element.text);
    match element.kind {
        ElementKind::Button => format!("print({label} .. \" pressed\")"),
        ElementKind::Toggle { .. } => format!("print({label}, state)"),
        ElementKind::Slider { .. } | ElementKind::Dropdown { .. } => {
            format!("print({label}, value)")
        }
    }
}

/// Filename offered when exporting generated code.
///
/// Keeps `name` if it already carries `.ext`, otherwise replaces everything
/// from the first dot onward.
pub(crate) fn export_file_name(name: &str, ext: &str) -> String {
    let suffix = format!(".{ext}");
    if name.ends_with(&suffix) {
        return name.to_owned();
    }
    let stem = name.split('.').next().unwrap_or_default();
    let stem = if stem.is_empty() { "script" } else { stem };
    format!("{stem}{suffix}")
}

/// Regenerates only when the window or options changed since the last call.
#[derive(Default)]
pub(crate) struct CachedGenerator {
    last: Option<(Window, GeneratorOptions, String)>,
}

impl CachedGenerator {
    pub fn generate(&mut self, window: &Window, options: &GeneratorOptions) -> &str {
        let stale = !matches!(
            &self.last,
            Some((w, o, _)) if w == window && o == options
        );
        if stale {
            log::debug!("regenerating code for window {:?}", window.title);
            let text = generate(window, options);
            self.last = Some((window.clone(), options.clone(), text));
        }
        self.last.as_ref().map(|(_, _, text)| text.as_str()).unwrap_or_default()
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

/// The script shown in the editor: generated code that the user may have
/// edited by hand. Hand edits last until the file or its generated code
/// changes.
#[derive(Default)]
pub(crate) struct CodeBuffer {
    text: String,
    generated: String,
    file_id: String,
    manual_edit: bool,
}

impl CodeBuffer {
    pub fn sync(&mut self, file_id: &str, generated: &str) {
        if generated == self.generated && file_id == self.file_id {
            return;
        }
        if self.manual_edit {
            log::info!("discarding manual edits to {}", self.file_id);
        }
        self.generated = generated.to_owned();
        self.file_id = file_id.to_owned();
        self.revert();
    }

    /// Drops hand edits in favour of the generated code.
    pub fn revert(&mut self) {
        self.text.clone_from(&self.generated);
        self.manual_edit = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Buffer for an editor widget; call [`Self::mark_edited`] after a change.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn mark_edited(&mut self) {
        self.manual_edit = self.text != self.generated;
    }

    pub fn is_manual_edit(&self) -> bool {
        self.manual_edit
    }
}
