use anyhow::Context;
use fablemap::{
    backend::perform,
    prelude::*,
    rendering::{collect_input, EguiRenderer, TileTextures},
    tiles::TilePipeline,
};
use serde::Deserialize;

const DEMO_FIXTURE: &str = include_str!("../assets/demo.json");

/// Map, locations and viewer options the app starts from
#[derive(Deserialize)]
struct Fixture {
    map: MapDescriptor,
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    options: Option<ViewerOptions>,
}

/// Standalone map viewer and location editor
///
/// Usage: `fablemap-app [fixture.json]`. Without an argument a bundled demo
/// map is opened against an in-memory backend.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let fixture = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?,
        None => DEMO_FIXTURE.to_string(),
    };
    let fixture: Fixture = serde_json::from_str(&fixture).context("parsing fixture")?;
    let options = fixture.options.unwrap_or_default();
    options.validate()?;

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let title = format!("{} - fablemap", fixture.map.title);
    let app = FablemapApp::new(runtime, fixture.map, fixture.locations, options);

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title(title),
        ..Default::default()
    };
    eframe::run_native("fablemap-app", native, Box::new(|_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("eframe: {}", e))
}

/// Side panel content, detached from the editor borrow
enum Side {
    Empty,
    Details(Location),
    Form { title: String, deletable: bool },
}

struct FablemapApp {
    runtime: tokio::runtime::Runtime,
    backend: Arc<InMemoryBackend>,
    map: MapDescriptor,
    options: ViewerOptions,
    editor: Option<MapEditor>,
    poller: Option<PollHandle>,
    pipeline: TilePipeline,
    textures: TileTextures,
    was_hovered: bool,
    form_error: Option<String>,
}

impl FablemapApp {
    fn new(
        runtime: tokio::runtime::Runtime,
        map: MapDescriptor,
        locations: Vec<Location>,
        options: ViewerOptions,
    ) -> Self {
        let backend = Arc::new(InMemoryBackend::with_map(map.clone(), locations));
        let mut app = Self {
            runtime,
            backend,
            pipeline: TilePipeline::new(TileLoader::http(), options.tile_cache_size),
            textures: TileTextures::new(),
            map,
            options,
            editor: None,
            poller: None,
            was_hovered: false,
            form_error: None,
        };

        if app.map.tiles_ready {
            app.open_editor(app.map.clone());
        } else {
            log::info!("tiles for {} not generated yet, polling", app.map.id);
            let _guard = app.runtime.enter();
            app.poller = Some(spawn_tile_poller(
                app.backend.clone(),
                app.map.id,
                app.options.tile_poll_interval(),
            ));
        }
        app
    }

    fn open_editor(&mut self, map: MapDescriptor) {
        let locations = match self.runtime.block_on(self.backend.fetch_locations(map.id)) {
            Ok(locations) => locations,
            Err(e) => {
                log::error!("loading locations of {}: {}", map.id, e);
                Vec::new()
            }
        };
        match MapEditor::new(map.clone(), self.options.clone(), Point::new(800.0, 600.0)) {
            Ok(mut editor) => {
                editor.set_locations(locations);
                self.editor = Some(editor);
                self.textures.clear();
                self.pipeline = TilePipeline::new(TileLoader::http(), self.options.tile_cache_size);
            }
            Err(e) => log::error!("cannot open map {}: {}", map.id, e),
        }
        self.map = map;
    }

    /// Performs queued requests against the backend and feeds the outcomes back
    fn flush_events(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        for event in editor.drain_events() {
            log::debug!("{} event", event.name());
            let Some(token) = event.request() else {
                continue;
            };
            if let Some(outcome) = self.runtime.block_on(perform(self.backend.as_ref(), &event)) {
                editor.resolve_request(token, outcome);
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        ui.horizontal(|ui| {
            ui.heading(&self.map.title);
            ui.separator();
            let Some(editor) = self.editor.as_mut() else {
                ui.spinner();
                ui.label("Generating tiles...");
                return;
            };

            if ui.button("+").on_hover_text("Zoom in").clicked() {
                editor.zoom_in(now);
            }
            if ui.button("-").on_hover_text("Zoom out").clicked() {
                editor.zoom_out(now);
            }
            if ui.button("Fit").clicked() {
                editor.fit_extent();
            }
            if editor.options().editable {
                let adding = editor.state().is_add_mode();
                if ui.selectable_label(adding, "Add location").clicked() {
                    editor.toggle_add_mode();
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "zoom {:.2} | {} tiles | {} markers",
                    editor.view().zoom(),
                    self.textures.len(),
                    editor.markers().len()
                ));
            });
        });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        if let Some(notice) = editor.notice().map(str::to_string) {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 50), notice);
                if ui.small_button("x").clicked() {
                    editor.dismiss_notice();
                }
            });
            ui.separator();
        }

        let side = match editor.panel() {
            Panel::Empty => Side::Empty,
            Panel::Details(location) => Side::Details(location.clone()),
            Panel::EditLocation { location, .. } => Side::Form {
                title: format!("Edit {}", location.name),
                deletable: true,
            },
            Panel::NewLocation(_) => Side::Form {
                title: "New location".to_string(),
                deletable: false,
            },
        };

        match side {
            Side::Empty => {
                ui.label("Select a marker to see its details.");
                if editor.state().is_add_mode() {
                    ui.label("Click the map to place a new location.");
                }
            }
            Side::Details(location) => {
                ui.heading(&location.name);
                ui.label(egui::RichText::new(&location.kind).italics());
                ui.separator();
                ui.label(&location.description_md);
                if ui.button("Close").clicked() {
                    editor.deselect();
                }
            }
            Side::Form { title, deletable } => {
                ui.heading(title);
                if let Some(form) = editor.form_mut() {
                    egui::Grid::new("location_form").num_columns(2).show(ui, |ui| {
                        ui.label("Name");
                        ui.text_edit_singleline(&mut form.name);
                        ui.end_row();
                        ui.label("Type");
                        ui.text_edit_singleline(&mut form.kind);
                        ui.end_row();
                        ui.label("X");
                        ui.text_edit_singleline(&mut form.x);
                        ui.end_row();
                        ui.label("Y");
                        ui.text_edit_singleline(&mut form.y);
                        ui.end_row();
                    });
                    ui.label("Description");
                    ui.text_edit_multiline(&mut form.description_md);
                }

                if let Some(error) = &self.form_error {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 50), error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.form_error = editor.submit_form().err().map(|e| e.to_string());
                    }
                    if ui.button("Cancel").clicked() {
                        self.form_error = None;
                        editor.cancel_form();
                    }
                    if deletable && ui.button("Delete").clicked() {
                        self.form_error = editor.delete_selected().err().map(|e| e.to_string());
                    }
                });
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let now = Instant::now();
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        for event in collect_input(&response, ui, &mut self.was_hovered) {
            editor.handle_input(event, now);
        }

        let frame = editor.frame();
        let uploaded = self.textures.sync(ui.ctx(), &mut self.pipeline, &frame);

        painter.rect_filled(response.rect, 0.0, egui::Color32::from_rgb(38, 44, 52));
        let mut renderer = EguiRenderer::new(&painter, response.rect.min, &self.textures);
        if let Err(e) = renderer.render(&frame) {
            log::error!("rendering map frame: {}", e);
        }

        if editor.tick(now) || uploaded || self.pipeline.loader().in_flight() > 0 {
            ui.ctx().request_repaint();
        }
    }
}

impl eframe::App for FablemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(ready) = self.poller.as_ref().and_then(PollHandle::try_ready) {
            self.poller = None;
            self.open_editor(ready);
        } else if self.poller.is_some() {
            ctx.request_repaint_after(self.options.tile_poll_interval());
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        if self.editor.is_some() {
            egui::SidePanel::right("location_panel")
                .resizable(true)
                .default_width(300.0)
                .show(ctx, |ui| self.side_panel(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas(ui));

        self.flush_events();
    }
}
