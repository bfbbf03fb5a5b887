use crate::{
    codegen::{CachedGenerator, CodeBuffer, export_file_name},
    console::{Console, Level},
    diff::DiffStats,
    highlight::{self, Highlighter},
    history::{
        History,
        lineage::{VersionRecord, compare_with_previous, lineage},
    },
    library::ScriptLibrary,
    project::Project,
    session::{self, ElementPatch, FolderPatch, Session, WindowPatch},
    settings::EditorSettings,
    store,
    validate::validate,
    widget::{Element, ElementKind, ElementType, Snapshot, Window, parse_options},
};
use egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};
use std::path::PathBuf;

/// What the inspector is pointing at in the active file.
#[derive(Clone, Debug, PartialEq)]
enum Selection {
    Window,
    Folder(String),
    Element(String),
}

/// Everything the UI can ask for. Panels collect these while drawing and
/// they are applied once the frame's borrows are released.
#[derive(Clone, Debug)]
enum Action {
    Undo,
    Redo,
    NewFile,
    SelectFile(String),
    CloseFile(String),
    BeginRename(String),
    OpenHistory(String),
    Select(Selection),
    AddFolder,
    AddElement(ElementType),
    DeleteSelection,
    PatchElement(String, ElementPatch),
    PatchFolder(String, FolderPatch),
    PatchWindow(WindowPatch),
    Restore(VersionRecord),
    Analyze,
    Generate,
    CopyCode,
    Export(&'static str),
    SaveToLibrary,
    ShowLibrary,
    ShowSettings,
    ToggleConsole,
    ToggleHighlighting,
    OpenSaved(Window),
    LoadSavedHere(Window),
    RemoveSaved(String),
    NewProject,
    OpenProject,
    SaveProject,
    SaveProjectAs,
}

struct HistoryView {
    file_id: String,
    /// Index into the newest-first version list
    selected: usize,
}

struct RenameDialog {
    file_id: String,
    buffer: String,
}

pub(crate) struct ToraBuilderApp {
    session: Session,
    settings: EditorSettings,
    library: ScriptLibrary,
    console: Console,
    selection: Selection,
    generator: CachedGenerator,
    /// Code shown in the central panel
    code: CodeBuffer,
    /// Central panel shows the editor instead of the highlighted view
    editing_code: bool,
    highlighter: Highlighter,
    /// Current project file path (for Save)
    project_path: Option<PathBuf>,
    console_open: bool,
    library_open: bool,
    settings_open: bool,
    history_view: Option<HistoryView>,
    rename: Option<RenameDialog>,
}

impl ToraBuilderApp {
    pub fn new(settings: EditorSettings, library: ScriptLibrary) -> Self {
        let history = History::new(Snapshot::default(), settings.history_capacity);
        let mut app = Self {
            session: Session::new(history),
            settings,
            library,
            console: Console::default(),
            selection: Selection::Window,
            generator: CachedGenerator::default(),
            code: CodeBuffer::default(),
            editing_code: false,
            highlighter: Highlighter::new(),
            project_path: None,
            console_open: false,
            library_open: false,
            settings_open: false,
            history_view: None,
            rename: None,
        };
        app.regenerate();
        app
    }

    fn regenerate(&mut self) {
        let options = self.settings.generator_options();
        let file = self.session.active_file();
        let generated = self.generator.generate(&file.data, &options);
        self.code.sync(&file.id, generated);
    }

    /// Logs a failed edit; returns whether it went through.
    fn report(&mut self, result: session::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.console.warn(e.to_string());
                false
            }
        }
    }

    /// The tab new elements go into.
    fn target_folder(&self) -> Option<String> {
        let window = &self.session.active_file().data;
        match &self.selection {
            Selection::Folder(id) => Some(id.clone()),
            Selection::Element(id) => window.folder_of(id).map(|f| f.id.clone()),
            Selection::Window => None,
        }
        .or_else(|| window.folders.first().map(|f| f.id.clone()))
    }

    /// Drops a selection that no longer exists, e.g. after undo.
    fn fix_selection(&mut self) {
        let window = &self.session.active_file().data;
        let valid = match &self.selection {
            Selection::Window => true,
            Selection::Folder(id) => window.folder(id).is_some(),
            Selection::Element(id) => window.element(id).is_some(),
        };
        if !valid {
            self.selection = Selection::Window;
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Undo => {
                if self.session.undo() {
                    self.console.info("Undo successful");
                }
            }
            Action::Redo => {
                if self.session.redo() {
                    self.console.info("Redo successful");
                }
            }
            Action::NewFile => {
                self.session.new_file();
                self.selection = Selection::Window;
                self.console.info("Opened new tab.");
            }
            Action::SelectFile(id) => {
                let result = self.session.set_active_file(&id);
                if self.report(result) {
                    self.selection = Selection::Window;
                }
            }
            Action::CloseFile(id) => {
                let result = self.session.close_file(&id);
                if self.report(result) && self.history_view.as_ref().is_some_and(|v| v.file_id == id) {
                    self.history_view = None;
                }
            }
            Action::BeginRename(id) => {
                if let Some(file) = self.session.snapshot().file(&id) {
                    self.rename = Some(RenameDialog {
                        buffer: file.name.clone(),
                        file_id: id,
                    });
                } else {
                    self.console.error("File not found for renaming");
                }
            }
            Action::OpenHistory(id) => {
                self.history_view = Some(HistoryView {
                    file_id: id,
                    selected: 0,
                });
            }
            Action::Select(selection) => self.selection = selection,
            Action::AddFolder => match self.session.add_folder() {
                Ok(id) => self.selection = Selection::Folder(id),
                Err(e) => self.console.warn(e.to_string()),
            },
            Action::AddElement(ty) => {
                let Some(folder) = self.target_folder() else {
                    self.console.warn("Add a tab first.");
                    return;
                };
                match self.session.add_element(&folder, ty) {
                    Ok(id) => self.selection = Selection::Element(id),
                    Err(e) => self.console.warn(e.to_string()),
                }
            }
            Action::DeleteSelection => {
                let result = match &self.selection {
                    Selection::Element(id) => self.session.delete_element(id),
                    Selection::Folder(id) => self.session.delete_folder(id),
                    Selection::Window => return,
                };
                if self.report(result) {
                    self.selection = Selection::Window;
                }
            }
            Action::PatchElement(id, patch) => {
                let result = self.session.patch_element(&id, patch);
                self.report(result);
            }
            Action::PatchFolder(id, patch) => {
                let result = self.session.patch_folder(&id, patch);
                self.report(result);
            }
            Action::PatchWindow(patch) => {
                let result = self.session.patch_window(patch);
                self.report(result);
            }
            Action::Restore(version) => {
                let result = self.session.restore_version(&version);
                if self.report(result) {
                    self.console
                        .success(format!("Restored version of {}", version.file.name));
                }
            }
            Action::Analyze => self.analyze(),
            Action::Generate => {
                self.regenerate();
                self.code.revert();
                self.console.info("Code regenerated.");
            }
            Action::CopyCode => {
                self.regenerate();
                ctx.copy_text(self.code.text().to_owned());
                self.console.info("Source code copied to clipboard.");
            }
            Action::Export(ext) => self.export(ext),
            Action::ShowLibrary => self.library_open = true,
            Action::ShowSettings => self.settings_open = true,
            Action::ToggleConsole => self.console_open = !self.console_open,
            Action::ToggleHighlighting => {
                let settings = EditorSettings {
                    syntax_highlighting: !self.settings.syntax_highlighting,
                    ..self.settings.clone()
                };
                self.update_settings(settings);
            }
            Action::SaveToLibrary => {
                let file = self.session.active_file();
                let name = file.name.clone();
                match self.library.save(&name, &file.data) {
                    Ok(()) => self
                        .console
                        .success(format!("Saved \"{name}\" to local history.")),
                    Err(e) => self.console.error(format!("Save failed: {e}")),
                }
            }
            Action::OpenSaved(data) => match self.session.open_window_as_file(data) {
                Ok(_) => {
                    self.selection = Selection::Window;
                    self.console.info("Loaded script into new tab.");
                }
                Err(e) => self.console.error(format!("Could not open saved script: {e}")),
            },
            Action::LoadSavedHere(data) => {
                let id = self.session.active_file_id().to_owned();
                let result = self.session.replace_file_data(&id, data);
                if self.report(result) {
                    self.selection = Selection::Window;
                    self.console.info("Loaded script into current tab.");
                }
            }
            Action::RemoveSaved(id) => {
                if let Err(e) = self.library.remove(&id) {
                    self.console.error(format!("Could not update saved scripts: {e}"));
                }
            }
            Action::NewProject => {
                let history = History::new(Snapshot::default(), self.settings.history_capacity);
                self.session = Session::new(history);
                self.generator.invalidate();
                self.selection = Selection::Window;
                self.project_path = None;
                self.history_view = None;
                self.console.info("New project created");
            }
            Action::OpenProject => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Tora Project", &["json"])
                    .pick_file()
                {
                    self.load_project(path);
                }
            }
            Action::SaveProject => match self.project_path.clone() {
                Some(path) => self.save_project(path),
                None => self.apply(ctx, Action::SaveProjectAs),
            },
            Action::SaveProjectAs => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Tora Project", &["json"])
                    .set_file_name("project.json")
                    .save_file()
                {
                    self.save_project(path);
                }
            }
        }
    }

    fn analyze(&mut self) {
        let file = self.session.active_file();
        let name = file.name.clone();
        let warnings = validate(&file.data);

        self.console_open = true;
        self.console.report_analysis(&name, &warnings);
    }

    fn export(&mut self, ext: &str) {
        let name = export_file_name(&self.session.active_file().name, ext);
        let filter = if ext == "lua" { "Lua script" } else { "Text" };
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(name)
            .save_file()
        else {
            return;
        };
        self.regenerate();
        match store::write_text(&path, self.code.text()) {
            Ok(()) => self
                .console
                .success(format!("Downloaded {}", path.display())),
            Err(e) => self.console.error(format!("Export failed: {e}")),
        }
    }

    fn save_project(&mut self, path: PathBuf) {
        let project = Project::from_snapshot(self.session.snapshot(), self.session.active_file_id());
        match project.save(&path) {
            Ok(()) => {
                self.console.success(format!("Saved to {}", path.display()));
                self.project_path = Some(path);
            }
            Err(e) => self.console.error(format!("Save failed: {e}")),
        }
    }

    fn load_project(&mut self, path: PathBuf) {
        let project = match Project::load(&path) {
            Ok(project) => project,
            Err(e) => {
                self.console.error(format!("Load failed: {e}"));
                return;
            }
        };
        let Some((snapshot, active)) = project.into_snapshot() else {
            self.console
                .error(format!("Load failed: {} has no files", path.display()));
            return;
        };
        let result = self.session.replace_all(snapshot);
        if !self.report(result) {
            return;
        }
        if let Some(id) = active {
            // a stale id just leaves the first file active
            let _ = self.session.set_active_file(&id);
        }
        self.selection = Selection::Window;
        self.history_view = None;
        self.console.success(format!("Loaded {}", path.display()));
        self.project_path = Some(path);
    }

    fn update_settings(&mut self, settings: EditorSettings) {
        if settings.history_capacity != self.settings.history_capacity {
            self.session
                .history_mut()
                .set_capacity(settings.history_capacity);
        }
        self.settings = settings;
        if let Err(e) = self.settings.save() {
            self.console.warn(format!("Could not save settings: {e}"));
        }
    }

    fn top_bar(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let mut item = |ui: &mut egui::Ui, label: &str, hint: &str, action: Action| {
                    if ui.button(label).on_hover_text(hint).clicked() {
                        actions.push(action);
                        ui.close_kind(egui::UiKind::Menu);
                    }
                };
                item(ui, "New File", "Open a new tab", Action::NewFile);
                ui.separator();
                item(ui, "New Project", "Discard all tabs and history", Action::NewProject);
                item(ui, "Open Project...", "Open a project file", Action::OpenProject);
                item(ui, "Save Project", "Save all tabs (Ctrl+S)", Action::SaveProject);
                item(ui, "Save Project As...", "Save all tabs to a new file", Action::SaveProjectAs);
                ui.separator();
                item(ui, "Save to Library", "Keep a copy of this file for later", Action::SaveToLibrary);
                item(ui, "Saved Scripts...", "Browse saved scripts", Action::ShowLibrary);
                item(ui, "Settings...", "Editor preferences", Action::ShowSettings);
                ui.separator();
                item(ui, "Export .lua", "Write the generated script to disk", Action::Export("lua"));
                item(ui, "Export .txt", "Write the generated script as text", Action::Export("txt"));
                item(ui, "Copy Code", "Copy the generated script", Action::CopyCode);
            });

            ui.menu_button("Edit", |ui| {
                let history = self.session.history();
                if ui
                    .add_enabled(history.can_undo(), egui::Button::new("Undo"))
                    .on_hover_text("Ctrl+Z")
                    .clicked()
                {
                    actions.push(Action::Undo);
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui
                    .add_enabled(history.can_redo(), egui::Button::new("Redo"))
                    .on_hover_text("Ctrl+Y")
                    .clicked()
                {
                    actions.push(Action::Redo);
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                if ui
                    .add_enabled(
                        self.selection != Selection::Window,
                        egui::Button::new("Delete"),
                    )
                    .on_hover_text("Delete the selected element or tab (Del)")
                    .clicked()
                {
                    actions.push(Action::DeleteSelection);
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui.button("File History...").clicked() {
                    actions.push(Action::OpenHistory(
                        self.session.active_file_id().to_owned(),
                    ));
                    ui.close_kind(egui::UiKind::Menu);
                }
            });

            ui.menu_button("Insert", |ui| {
                if ui.button("Tab").clicked() {
                    actions.push(Action::AddFolder);
                    ui.close_kind(egui::UiKind::Menu);
                }
                ui.separator();
                for ty in ElementType::ALL {
                    if ui.button(ty.display_name()).clicked() {
                        actions.push(Action::AddElement(ty));
                        ui.close_kind(egui::UiKind::Menu);
                    }
                }
            });

            ui.menu_button("View", |ui| {
                let mut console = self.console_open;
                if ui.checkbox(&mut console, "Output Console").clicked() {
                    actions.push(Action::ToggleConsole);
                    ui.close_kind(egui::UiKind::Menu);
                }
                let mut highlighting = self.settings.syntax_highlighting;
                if ui.checkbox(&mut highlighting, "Syntax Highlighting").clicked() {
                    actions.push(Action::ToggleHighlighting);
                    ui.close_kind(egui::UiKind::Menu);
                }
            });

            ui.menu_button("Run", |ui| {
                if ui
                    .button("Analyze")
                    .on_hover_text("Check flags, labels and callback syntax")
                    .clicked()
                {
                    actions.push(Action::Analyze);
                    ui.close_kind(egui::UiKind::Menu);
                }
                if ui.button("Generate Code").on_hover_text("Ctrl+G").clicked() {
                    actions.push(Action::Generate);
                    ui.close_kind(egui::UiKind::Menu);
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.strong("Tora GUI Builder");
                ui.separator();
                let history = self.session.history();
                ui.weak(format!(
                    "history {}/{} (max {})",
                    history.index() + 1,
                    history.len(),
                    history.capacity()
                ));
            });
        });
    }

    fn tabs_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal_wrapped(|ui| {
            let active = self.session.active_file_id();
            for file in self.session.snapshot().files() {
                let response = ui.selectable_label(file.id == active, file.name.as_str());
                if response.clicked() {
                    actions.push(Action::SelectFile(file.id.clone()));
                }
                response.context_menu(|ui| {
                    if ui.button("Rename").clicked() {
                        actions.push(Action::BeginRename(file.id.clone()));
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("History").clicked() {
                        actions.push(Action::OpenHistory(file.id.clone()));
                        ui.close_kind(egui::UiKind::Menu);
                    }
                    if ui.button("Close").clicked() {
                        actions.push(Action::CloseFile(file.id.clone()));
                        ui.close_kind(egui::UiKind::Menu);
                    }
                });
                let closable = self.session.snapshot().len() > 1;
                if ui
                    .add_enabled(closable, egui::Button::new("x").small())
                    .on_hover_text("Close")
                    .clicked()
                {
                    actions.push(Action::CloseFile(file.id.clone()));
                }
                ui.separator();
            }
            if ui.button("+").on_hover_text("New file").clicked() {
                actions.push(Action::NewFile);
            }
        });
    }

    fn outline_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.heading("Explorer");
        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("+ Tab").clicked() {
                actions.push(Action::AddFolder);
            }
            for ty in ElementType::ALL {
                if ui.button(format!("+ {ty}")).clicked() {
                    actions.push(Action::AddElement(ty));
                }
            }
        });
        ui.separator();

        let window = &self.session.active_file().data;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let title = RichText::new(format!("Window: {}", window.title)).strong();
                if ui
                    .selectable_label(self.selection == Selection::Window, title)
                    .clicked()
                {
                    actions.push(Action::Select(Selection::Window));
                }
                for folder in &window.folders {
                    ui.indent(("folder", folder.id.as_str()), |ui| {
                        let selected =
                            matches!(&self.selection, Selection::Folder(id) if *id == folder.id);
                        if ui
                            .selectable_label(selected, format!("Tab: {}", folder.text))
                            .clicked()
                        {
                            actions.push(Action::Select(Selection::Folder(folder.id.clone())));
                        }
                        ui.indent(("elements", folder.id.as_str()), |ui| {
                            for element in &folder.elements {
                                let selected = matches!(
                                    &self.selection,
                                    Selection::Element(id) if *id == element.id
                                );
                                let label = format!("{} ({})", element.text, element.element_type());
                                if ui.selectable_label(selected, label).clicked() {
                                    actions.push(Action::Select(Selection::Element(
                                        element.id.clone(),
                                    )));
                                }
                            }
                            if folder.elements.is_empty() {
                                ui.weak("empty");
                            }
                        });
                    });
                }
            });
    }

    fn inspector_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.heading("Properties");
        ui.separator();
        let window = &self.session.active_file().data;

        match &self.selection {
            Selection::Window => {
                ui.label("Window Title");
                let mut title = window.title.clone();
                if ui.text_edit_singleline(&mut title).changed() {
                    actions.push(Action::PatchWindow(WindowPatch::Title(title)));
                }
                ui.add_space(6.0);
                ui.weak(format!(
                    "{} tab(s), {} element(s)",
                    window.folders.len(),
                    window.element_count()
                ));
            }
            Selection::Folder(id) => {
                let Some(folder) = window.folder(id) else {
                    ui.weak("No selection");
                    return;
                };
                ui.label("Tab Name");
                let mut text = folder.text.clone();
                if ui.text_edit_singleline(&mut text).changed() {
                    actions.push(Action::PatchFolder(folder.id.clone(), FolderPatch::Text(text)));
                }
                ui.add_space(6.0);
                if ui.button("Delete Tab").clicked() {
                    actions.push(Action::DeleteSelection);
                }
            }
            Selection::Element(id) => {
                let Some(element) = window.element(id) else {
                    ui.weak("No selection");
                    return;
                };
                element_inspector(ui, element, actions);
            }
        }
    }

    fn code_ui(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading(self.session.active_file().name.as_str());
            if self.code.is_manual_edit() {
                ui.label(
                    RichText::new("MANUAL EDIT")
                        .small()
                        .strong()
                        .color(Color32::YELLOW),
                )
                .on_hover_text("Hand edits are replaced when the GUI changes");
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Copy").clicked() {
                    actions.push(Action::CopyCode);
                }
                ui.toggle_value(&mut self.editing_code, "Edit");
                let label = if self.code.is_manual_edit() {
                    "Revert"
                } else {
                    "Generate"
                };
                if (self.code.is_manual_edit() || !self.settings.auto_generate)
                    && ui.button(label).clicked()
                {
                    actions.push(Action::Generate);
                }
            });
        });
        ui.separator();

        if self.editing_code {
            if highlight::code_editor(ui, self.code.text_mut()) {
                self.code.mark_edited();
            }
        } else if self.settings.syntax_highlighting && !self.code.text().is_empty() {
            highlight::code_viewer(ui, &self.highlighter, self.code.text());
        } else {
            egui::ScrollArea::both()
                .id_salt("generated_output_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.code.text())
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
        }
    }

    fn console_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong("Output Console");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Close").clicked() {
                    self.console_open = false;
                }
                if ui.small_button("Clear").clicked() {
                    self.console.clear();
                }
            });
        });
        ui.separator();

        let entries = self.console.entries();
        TableBuilder::new(ui)
            .striped(true)
            .stick_to_bottom(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .body(|body| {
                body.rows(18.0, entries.len(), |mut row| {
                    let entry = &entries[row.index()];
                    row.col(|ui| {
                        ui.monospace(entry.time());
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(entry.level.label()).color(level_color(entry.level)));
                    });
                    row.col(|ui| {
                        ui.label(entry.message.as_str());
                    });
                });
            });
    }

    fn history_window(&mut self, ctx: &egui::Context) {
        let Some(view) = &self.history_view else {
            return;
        };
        let file_id = view.file_id.clone();
        let mut selected = view.selected;
        let mut open = true;
        let mut restore = None;

        let versions = lineage(self.session.history(), &file_id);
        let name = self
            .session
            .snapshot()
            .file(&file_id)
            .map(|f| f.name.clone())
            .or_else(|| versions.first().map(|v| v.file.name.clone()))
            .unwrap_or_default();
        let options = self.settings.generator_options();

        egui::Window::new(format!("File History: {name}"))
            .id(egui::Id::new("file_history"))
            .open(&mut open)
            .default_size([820.0, 480.0])
            .show(ctx, |ui| {
                ui.weak(format!("{} version(s) found", versions.len()));
                egui::SidePanel::left("history_versions")
                    .resizable(false)
                    .default_width(170.0)
                    .show_inside(ui, |ui| {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            for (i, version) in versions.iter().enumerate() {
                                let label = if i == 0 {
                                    "Latest".to_owned()
                                } else {
                                    format!("Version {}", versions.len() - i)
                                };
                                let text = format!(
                                    "{label}  {}",
                                    version.committed_at.format("%H:%M:%S")
                                );
                                let text = if version.is_latest {
                                    RichText::new(text).color(Color32::LIGHT_GREEN)
                                } else {
                                    RichText::new(text)
                                };
                                if ui.selectable_label(selected == i, text).clicked() {
                                    selected = i;
                                }
                            }
                        });
                    });

                egui::CentralPanel::default().show_inside(ui, |ui| {
                    if versions.is_empty() {
                        ui.weak("No versions recorded for this file.");
                        return;
                    }
                    selected = selected.min(versions.len() - 1);
                    let lines = compare_with_previous(&versions, selected, &options);
                    let stats = DiffStats::of(&lines);
                    ui.horizontal(|ui| {
                        ui.label(format!(
                            "Comparing version {} vs previous  (+{} -{})",
                            versions.len() - selected,
                            stats.added,
                            stats.removed
                        ));
                        if selected != 0 && ui.button("Restore this Version").clicked() {
                            restore = Some(versions[selected].clone());
                        }
                    });
                    ui.separator();
                    if !stats.has_changes() {
                        ui.weak("No code changes from the previous version.");
                    }
                    egui::ScrollArea::both()
                        .id_salt("history_diff_scroll")
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            ui.add(egui::Label::new(highlight::diff_layout_job(&lines)));
                        });
                });
            });

        if let Some(version) = restore {
            self.apply(ctx, Action::Restore(version));
            open = false;
        }
        self.history_view = open.then_some(HistoryView { file_id, selected });
    }

    fn rename_window(&mut self, ctx: &egui::Context) {
        let Some(rename) = self.rename.as_mut() else {
            return;
        };
        let mut open = true;
        let mut commit = false;
        let mut cancel = false;

        egui::Window::new("Rename file")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                let response = ui.text_edit_singleline(&mut rename.buffer);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Rename").clicked() {
                        commit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if commit {
            if let Some(RenameDialog { file_id, buffer }) = self.rename.take() {
                let result = self.session.rename_file(&file_id, &buffer);
                if self.report(result) {
                    self.console.success(format!("Renamed to {buffer}"));
                }
            }
        } else if cancel || !open {
            self.rename = None;
        }
    }

    fn library_window(&mut self, ctx: &egui::Context) {
        if !self.library_open {
            return;
        }
        let mut open = true;
        let mut actions = Vec::new();

        egui::Window::new("Saved Scripts")
            .open(&mut open)
            .default_width(380.0)
            .show(ctx, |ui| {
                if ui.button("Save current file").clicked() {
                    actions.push(Action::SaveToLibrary);
                }
                if let Some(path) = self.library.path() {
                    ui.weak(path.display().to_string());
                }
                ui.separator();
                if self.library.scripts().is_empty() {
                    ui.weak("Nothing saved yet.");
                }
                for script in self.library.scripts() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(script.name.as_str()).strong());
                        if let Some(at) = script.saved_at() {
                            ui.weak(at.format("%Y-%m-%d %H:%M").to_string());
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Delete").clicked() {
                                actions.push(Action::RemoveSaved(script.id.clone()));
                            }
                            if ui
                                .small_button("Load here")
                                .on_hover_text("Replace the current tab")
                                .clicked()
                            {
                                actions.push(Action::LoadSavedHere(script.data.clone()));
                            }
                            if ui.small_button("Open").clicked() {
                                actions.push(Action::OpenSaved(script.data.clone()));
                            }
                        });
                    });
                }
            });

        self.library_open = open;
        for action in actions {
            self.apply(ctx, action);
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }
        let mut open = true;
        let mut draft = self.settings.clone();

        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .show(ui, |ui| {
                        ui.label("Undo depth");
                        ui.add(egui::DragValue::new(&mut draft.history_capacity).range(1..=1000));
                        ui.end_row();
                        ui.label("Syntax highlighting");
                        ui.checkbox(&mut draft.syntax_highlighting, "");
                        ui.end_row();
                        ui.label("Auto-generate code");
                        ui.checkbox(&mut draft.auto_generate, "");
                        ui.end_row();
                        ui.label("Header banner");
                        ui.checkbox(&mut draft.include_header, "");
                        ui.end_row();
                        ui.label("Open console on error");
                        ui.checkbox(&mut draft.open_console_on_error, "");
                        ui.end_row();
                    });
                ui.separator();
                ui.label("Library loader expression");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.library_loader)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });

        self.settings_open = open;
        if draft != self.settings {
            self.update_settings(draft);
        }
    }
}

fn level_color(level: Level) -> Color32 {
    match level {
        Level::Info => Color32::LIGHT_BLUE,
        Level::Success => Color32::LIGHT_GREEN,
        Level::Warn => Color32::YELLOW,
        Level::Error => Color32::LIGHT_RED,
    }
}

fn element_inspector(ui: &mut egui::Ui, element: &Element, actions: &mut Vec<Action>) {
    let mut patches = Vec::new();

    ui.label(RichText::new(format!("{} Properties", element.element_type())).strong());
    ui.add_space(4.0);
    ui.label("Display Text");
    let mut text = element.text.clone();
    if ui.text_edit_singleline(&mut text).changed() {
        patches.push(ElementPatch::Text(text));
    }

    if let Some(flag) = element.flag() {
        ui.label("Flag (unique id)");
        let mut flag = flag.to_owned();
        if ui
            .text_edit_singleline(&mut flag)
            .on_hover_text("Used to save/load configuration. Must be unique.")
            .changed()
        {
            patches.push(ElementPatch::Flag(flag));
        }
    }

    match &element.kind {
        ElementKind::Button => {}
        ElementKind::Toggle { default_state, .. } => {
            let mut state = *default_state;
            if ui.checkbox(&mut state, "On by default").changed() {
                patches.push(ElementPatch::DefaultState(state));
            }
        }
        ElementKind::Slider {
            min,
            max,
            value,
            decimals,
            ..
        } => {
            let (mut min, mut max, mut value, mut decimals) = (*min, *max, *value, *decimals);
            egui::Grid::new(("slider_config", element.id.as_str()))
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("Min");
                    if ui.add(egui::DragValue::new(&mut min)).changed() {
                        patches.push(ElementPatch::Min(min));
                    }
                    ui.end_row();
                    ui.label("Max");
                    if ui.add(egui::DragValue::new(&mut max)).changed() {
                        patches.push(ElementPatch::Max(max));
                    }
                    ui.end_row();
                    ui.label("Default");
                    if ui.add(egui::DragValue::new(&mut value)).changed() {
                        patches.push(ElementPatch::Value(value));
                    }
                    ui.end_row();
                    ui.label("Decimals");
                    if ui
                        .add(egui::DragValue::new(&mut decimals).range(0..=10))
                        .changed()
                    {
                        patches.push(ElementPatch::Decimals(decimals));
                    }
                    ui.end_row();
                });
        }
        ElementKind::Dropdown { values, .. } => {
            ui.label("Options (comma separated)");
            let mut buf = values.join(", ");
            if ui
                .add(
                    egui::TextEdit::multiline(&mut buf)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                patches.push(ElementPatch::Values(parse_options(&buf)));
            }
        }
    }

    ui.add_space(6.0);
    ui.label("Callback Logic (Lua)");
    let mut logic = element.custom_logic.clone().unwrap_or_default();
    if ui
        .add(
            egui::TextEdit::multiline(&mut logic)
                .code_editor()
                .desired_rows(8)
                .desired_width(f32::INFINITY)
                .hint_text("print('Clicked!')"),
        )
        .changed()
    {
        patches.push(ElementPatch::CustomLogic((!logic.is_empty()).then_some(logic)));
    }

    ui.add_space(6.0);
    if ui.button("Delete Element").clicked() {
        actions.push(Action::DeleteSelection);
    }

    actions.extend(
        patches
            .into_iter()
            .map(|p| Action::PatchElement(element.id.clone(), p)),
    );
}

impl eframe::App for ToraBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        // Keyboard shortcuts; text fields keep their own undo while focused
        let typing = ctx.wants_keyboard_input();
        let (undo, redo, generate, delete, save) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let undo = cmd && !i.modifiers.shift && i.key_pressed(egui::Key::Z);
            let redo = cmd
                && (i.key_pressed(egui::Key::Y)
                    || (i.modifiers.shift && i.key_pressed(egui::Key::Z)));
            let generate = cmd && i.key_pressed(egui::Key::G);
            let delete = i.key_pressed(egui::Key::Delete);
            let save = cmd && i.key_pressed(egui::Key::S);
            (undo, redo, generate, delete, save)
        });
        if !typing {
            if undo {
                actions.push(Action::Undo);
            }
            if redo {
                actions.push(Action::Redo);
            }
            if delete {
                actions.push(Action::DeleteSelection);
            }
        }
        if generate {
            actions.push(Action::Generate);
        }
        if save {
            actions.push(Action::SaveProject);
        }

        if self.settings.auto_generate {
            self.regenerate();
        }

        egui::TopBottomPanel::top("menubar").show(ctx, |ui| {
            self.top_bar(ui, &mut actions);
        });
        egui::TopBottomPanel::top("file_tabs").show(ctx, |ui| {
            self.tabs_ui(ui, &mut actions);
        });
        if self.console_open {
            egui::TopBottomPanel::bottom("console")
                .resizable(true)
                .default_height(160.0)
                .show(ctx, |ui| self.console_ui(ui));
        }
        egui::SidePanel::left("explorer")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                self.outline_ui(ui, &mut actions);
            });
        egui::SidePanel::right("inspector")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("inspector_scroll")
                    .show(ui, |ui| self.inspector_ui(ui, &mut actions));
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.code_ui(ui, &mut actions);
        });

        self.history_window(ctx);
        self.rename_window(ctx);
        self.library_window(ctx);
        self.settings_window(ctx);

        if !actions.is_empty() {
            for action in actions {
                self.apply(ctx, action);
            }
            self.fix_selection();
            ctx.request_repaint();
        }

        if self.console.wants_attention {
            if self.settings.open_console_on_error {
                self.console_open = true;
            }
            self.console.wants_attention = false;
        }
    }
}
