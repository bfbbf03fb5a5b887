//! A visual builder for Roblox GUIs made with the Tora library.

mod app;
mod codegen;
mod console;
mod diff;
mod highlight;
mod history;
mod library;
mod project;
mod session;
mod settings;
mod store;
mod validate;
mod widget;

use crate::app::ToraBuilderApp;
use crate::library::ScriptLibrary;
use crate::settings::EditorSettings;

use eframe::egui;

fn initial_inner_size() -> egui::Vec2 {
    // Explorer (240) + code view + inspector (300)
    let code_width = 640.0;
    let w = 240.0 + code_width + 300.0 + 16.0;
    // Menubar, file tabs and console
    let h = 560.0 + 40.0 + 160.0;
    egui::vec2(w, h)
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = EditorSettings::load();
    let library = ScriptLibrary::load();
    log::info!(
        "starting with {} saved script(s), undo depth {}",
        library.scripts().len(),
        settings.history_capacity
    );

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_inner_size(initial_inner_size())
        .with_min_inner_size([800.0, 500.0])
        .with_resizable(true);

    eframe::run_native(
        "Tora GUI Builder",
        native_options,
        Box::new(|_cc| Ok(Box::new(ToraBuilderApp::new(settings, library)))),
    )
}
