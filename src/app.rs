use crate::heatmap::{HeatmapStyle, HeatmapView};
use crate::loader::{load_table, CSV_EXTENSIONS, SPREADSHEET_EXTENSIONS};
use crate::pipeline::{render, RenderRequest, Rendering};
use crate::schema::IdentifierSchema;
use crate::table::RawTable;
use crate::utils::{display_matrix, display_table};
use egui::{Color32, ComboBox, Grid, TextEdit, Window};
use rfd::FileDialog;
use std::path::Path;

/// A decoded upload kept so the heatmap can be redrawn when the controls change.
#[derive(Clone, Debug, PartialEq)]
struct Upload {
    file_name: String,
    table: RawTable,
}

/// What a control edit asks of the current rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Change {
    #[default]
    None,
    Title,
    Rebuild,
}

impl Change {
    fn merge(self, other: Change) -> Change {
        match (self, other) {
            (Change::Rebuild, _) | (_, Change::Rebuild) => Change::Rebuild,
            (Change::Title, _) | (_, Change::Title) => Change::Title,
            _ => Change::None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Status {
    #[default]
    Waiting,
    Rendered,
    Failed(String),
}

/// We derive Deserialize/Serialize so we can persist the controls on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct App {
    label: String,
    title: String,
    cluster: bool,
    schema: IdentifierSchema,
    #[serde(skip)]
    style: HeatmapStyle,
    #[serde(skip)]
    upload: Option<Upload>,
    #[serde(skip)]
    rendering: Option<Rendering>,
    #[serde(skip)]
    status: Status,
    #[serde(skip)]
    show_matrix: bool,
    #[serde(skip)]
    show_upload: bool,
}

impl Default for App {
    fn default() -> Self {
        let request = RenderRequest::default();
        Self {
            label: "Heatmap Maker".to_owned(),
            title: request.title,
            cluster: request.cluster,
            schema: request.schema,
            style: HeatmapStyle::default(),
            upload: None,
            rendering: None,
            status: Status::default(),
            show_matrix: false,
            show_upload: false,
        }
    }
}

impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Restore the title, clustering toggle and identifier schema.
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Default::default()
    }

    fn request(&self) -> RenderRequest {
        RenderRequest {
            title: self.title.clone(),
            cluster: self.cluster,
            schema: self.schema,
        }
    }

    fn open(&mut self, path: &Path) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match load_table(path) {
            Ok(table) => {
                self.upload = Some(Upload { file_name, table });
                self.rerender();
            }
            Err(e) => {
                log::error!("could not load {}: {}", path.display(), e);
                self.upload = None;
                self.rendering = None;
                self.status = Status::Failed(format!("❌ Error processing file: {}", e));
            }
        }
    }

    /// Runs the whole pipeline again on the current upload.
    fn rerender(&mut self) {
        let Some(upload) = &self.upload else {
            return;
        };
        match render(upload.table.clone(), &self.request()) {
            Ok(rendering) => {
                self.rendering = Some(rendering);
                self.status = Status::Rendered;
            }
            Err(e) => {
                log::warn!("{}: {}", upload.file_name, e);
                self.rendering = None;
                self.status = Status::Failed(e.to_string());
            }
        }
    }

    /// Title edits only relabel the current heatmap; matrix and clustering stay as built.
    fn apply(&mut self, change: Change) {
        match change {
            Change::None => {}
            Change::Title => {
                if let Some(rendering) = &mut self.rendering {
                    rendering.title = self.title.clone();
                }
            }
            Change::Rebuild => self.rerender(),
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) -> Change {
        let mut change = Change::None;
        Grid::new("controls_grid")
            .num_columns(2)
            .spacing([40.0, 4.0])
            .show(ui, |ui| {
                ui.label("File: ");
                ui.horizontal(|ui| {
                    if ui.button("Open…").clicked() {
                        if let Some(path) = pick_upload() {
                            self.open(&path);
                        }
                    }
                    if let Some(upload) = &self.upload {
                        ui.label(format!("{} {:?}", upload.file_name, upload.table.shape()));
                    }
                });
                ui.end_row();
                ui.label("Identifier column: ");
                ComboBox::new("schema", "")
                    .selected_text(self.schema.column_name())
                    .show_ui(ui, |ui| {
                        for schema in IdentifierSchema::ALL {
                            if ui
                                .selectable_value(&mut self.schema, schema, schema.column_name())
                                .changed()
                            {
                                change = change.merge(Change::Rebuild);
                            }
                        }
                    });
                ui.end_row();
                ui.label("Heatmap title: ");
                if ui
                    .add(TextEdit::singleline(&mut self.title).desired_width(240.0))
                    .changed()
                {
                    change = change.merge(Change::Title);
                }
                ui.end_row();
                ui.label("Rows: ");
                if ui.checkbox(&mut self.cluster, "Cluster rows").changed() {
                    change = change.merge(Change::Rebuild);
                }
                ui.end_row();
                ui.label("Data: ");
                ui.horizontal(|ui| {
                    if ui.button("Upload").clicked() {
                        self.show_upload = !self.show_upload;
                    }
                    if ui.button("Matrix").clicked() {
                        self.show_matrix = !self.show_matrix;
                    }
                });
                ui.end_row();
            });
        change
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        match &self.status {
            Status::Waiting => {
                ui.label("Please upload an Excel or CSV file with one row per entity.");
            }
            Status::Rendered => {
                ui.colored_label(
                    Color32::from_rgb(100, 200, 100),
                    "✅ Heatmap generated successfully!",
                );
            }
            Status::Failed(message) => {
                ui.colored_label(Color32::from_rgb(255, 80, 80), message);
            }
        }
        if let Some(rendering) = &self.rendering {
            for warning in rendering.warnings() {
                ui.colored_label(Color32::from_rgb(255, 180, 100), warning.to_string());
            }
        }
    }
}

fn pick_upload() -> Option<std::path::PathBuf> {
    FileDialog::new()
        .add_filter("Spreadsheet", SPREADSHEET_EXTENSIONS)
        .add_filter("CSV", CSV_EXTENSIONS)
        .pick_file()
}

impl eframe::App for App {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open…").clicked() {
                        ui.close_menu();
                        if let Some(path) = pick_upload() {
                            self.open(&path);
                        }
                    }
                    #[cfg(not(target_arch = "wasm32"))] // no File->Quit on web pages!
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::left("controls_panel").show(ctx, |ui| {
            ui.heading(&self.label);
            ui.add_space(10.0);
            let change = self.show_controls(ui);
            self.apply(change);
            ui.add_space(10.0);
            self.show_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(rendering) = &self.rendering {
                egui::ScrollArea::both().show(ui, |ui| {
                    HeatmapView::new(rendering, &self.style).show(ui);
                });
            }
            egui::warn_if_debug_build(ui);
        });

        if let Some(rendering) = &self.rendering {
            Window::new(format!("Matrix: {}", rendering.title))
                .open(&mut self.show_matrix)
                .vscroll(true)
                .show(ctx, |ui| {
                    display_matrix(&rendering.heatmap.matrix, &rendering.heatmap.annotations, ui)
                });
        }
        if let Some(upload) = &self.upload {
            Window::new(format!("Upload: {}", upload.file_name))
                .open(&mut self.show_upload)
                .vscroll(true)
                .show(ctx, |ui| display_table(&upload.table, ui));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableColumn;

    fn loaded_app() -> App {
        let table = RawTable::new(vec![
            TableColumn::new("Molecule", vec!["A".into(), "B".into()]),
            TableColumn::new("t0", vec![1.0.into(), 2.0.into()]),
        ])
        .unwrap();
        let mut app = App::default();
        app.upload = Some(Upload {
            file_name: "upload.xlsx".to_owned(),
            table,
        });
        app.rerender();
        app
    }

    #[test]
    fn title_edit_relabels_without_rebuilding() {
        let mut app = loaded_app();
        let built = app.rendering.clone().unwrap();

        // A rebuild on this table would fail, so a surviving rendering was not rebuilt.
        app.upload.as_mut().unwrap().table = RawTable::default();
        app.title = "Day 3".to_owned();
        app.apply(Change::Title);

        let rendering = app.rendering.as_ref().unwrap();
        assert_eq!(rendering.title, "Day 3");
        assert_eq!(rendering.heatmap, built.heatmap);
        assert_eq!(app.status, Status::Rendered);
    }

    #[test]
    fn cluster_toggle_rebuilds() {
        let mut app = loaded_app();
        app.upload.as_mut().unwrap().table = RawTable::default();
        app.cluster = true;
        app.apply(Change::Rebuild);
        assert!(app.rendering.is_none());
        assert!(matches!(app.status, Status::Failed(_)));
    }

    #[test]
    fn rebuild_outranks_title() {
        assert_eq!(Change::Title.merge(Change::Rebuild), Change::Rebuild);
        assert_eq!(Change::None.merge(Change::Title), Change::Title);
        assert_eq!(Change::None.merge(Change::None), Change::None);
    }
}
