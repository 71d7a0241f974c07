use ratatui::Frame;

use crate::{
    ui::help::{ExportPreview, HelpOverlay},
    App,
};

/// A UI Screen boundary: the annotation view plus whatever overlay is open
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct AnnotateScreen;

impl Screen for AnnotateScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct HelpScreen;

impl Screen for HelpScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        AnnotateScreen.render(app, f);
        f.render_widget(HelpOverlay, f.area());
    }
}

pub struct ExportPreviewScreen;

impl Screen for ExportPreviewScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        AnnotateScreen.render(app, f);
        let text = app.export_preview_text();
        f.render_widget(ExportPreview { text: &text }, f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(app: &App) -> Box<dyn Screen> {
    if app.session.show_help() {
        Box::new(HelpScreen)
    } else if app.session.show_export_preview() {
        Box::new(ExportPreviewScreen)
    } else {
        Box::new(AnnotateScreen)
    }
}
