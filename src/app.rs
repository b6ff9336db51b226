use std::path::{Path, PathBuf};

use egui::{Key, ScrollArea};
use log::warn;

use crate::canvas;
use crate::export;
use crate::geometry::SelectionId;
use crate::session::EditorSession;
use crate::workspace::{TagId, Workspace};

pub struct BoxtagApp {
    workspace: Workspace,
    session: EditorSession,
    tag_name_input: String,
    /// Expanded branches in the tag tree, by tag id.
    open_branches: Vec<TagId>,
}

impl BoxtagApp {
    pub fn new(image_paths: Vec<PathBuf>) -> Self {
        let mut workspace = Workspace::new();
        for path in &image_paths {
            load_image_file(&mut workspace, path);
        }
        Self {
            workspace,
            session: EditorSession::new(),
            tag_name_input: String::new(),
            open_branches: Vec::new(),
        }
    }

    fn branch_open(&self, tag_id: TagId) -> bool {
        self.open_branches.contains(&tag_id)
    }

    fn toggle_branch(&mut self, tag_id: TagId) {
        if let Some(index) = self.open_branches.iter().position(|id| *id == tag_id) {
            self.open_branches.remove(index);
        } else {
            self.open_branches.push(tag_id);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (escape, space_down, pointer_down) = ctx.input(|input| {
            (
                input.key_pressed(Key::Escape),
                input.key_down(Key::Space),
                input.pointer.primary_down(),
            )
        });
        if escape {
            self.session.cancel();
        }
        self.session.set_pan_armed(space_down, pointer_down);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = &file.path {
                load_image_file(&mut self.workspace, path);
            } else if let Some(bytes) = &file.bytes {
                self.workspace.add_image(&file.name, bytes.to_vec());
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open images…").clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_files()
                {
                    for path in paths {
                        load_image_file(&mut self.workspace, &path);
                    }
                }
            }
            if ui.button("Export JSON").clicked() {
                if let Err(err) = export::save_with_dialog(&self.workspace) {
                    warn!("export failed: {err:#}");
                }
            }
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", self.session.viewport.scale * 100.0));
            ui.separator();
            match self.workspace.selected_tag() {
                Some(tag) => ui.label(format!("Tag: {}", tag.name)),
                None => ui.label("No tag selected — pick one to draw"),
            };
            ui.separator();
            ui.label(if self.session.pan_armed() {
                "Pan: drag to move the view"
            } else {
                "Hold Space to pan, scroll to zoom, Esc to cancel"
            });
        });
    }

    fn tag_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tags");
        ui.horizontal(|ui| {
            let field = ui.text_edit_singleline(&mut self.tag_name_input);
            let submitted = field.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
            if ui.button("Add").clicked() || submitted {
                let name = std::mem::take(&mut self.tag_name_input);
                self.workspace.create_tag(&name);
            }
        });
        ui.separator();

        let tags: Vec<(TagId, String)> = self
            .workspace
            .tags
            .iter()
            .map(|tag| (tag.id, tag.name.clone()))
            .collect();
        let selected_tag = self.workspace.selected_tag().map(|tag| tag.id);

        ScrollArea::vertical().show(ui, |ui| {
            for (tag_id, tag_name) in tags {
                ui.horizontal(|ui| {
                    let open = self.branch_open(tag_id);
                    if ui
                        .small_button(if open { "▾" } else { "▸" })
                        .clicked()
                    {
                        self.toggle_branch(tag_id);
                    }
                    if ui
                        .selectable_label(selected_tag == Some(tag_id), &tag_name)
                        .clicked()
                    {
                        self.workspace.select_tag(tag_id);
                    }
                    if ui.small_button("✕").clicked() {
                        self.workspace.delete_tag(tag_id);
                    }
                });
                if self.branch_open(tag_id) {
                    self.tag_branch(ui, tag_id);
                }
            }
        });
    }

    /// Rows for one tag's selections on the current image. Hovering a
    /// row mirrors into the selection's highlight flag so the canvas
    /// emphasizes it.
    fn tag_branch(&mut self, ui: &mut egui::Ui, tag_id: TagId) {
        let rows: Vec<(SelectionId, String)> = self
            .workspace
            .selections_of_tag(tag_id)
            .iter()
            .map(|selection| {
                let top_left = selection.top_left();
                (
                    selection.id,
                    format!(
                        "({}, {})  {}×{}",
                        top_left.x,
                        top_left.y,
                        selection.abs_height(),
                        selection.abs_width()
                    ),
                )
            })
            .collect();

        ui.indent(("tag-branch", tag_id), |ui| {
            for (selection_id, label) in rows {
                ui.horizontal(|ui| {
                    let row = ui.label(label);
                    self.workspace
                        .set_highlight(tag_id, selection_id, row.hovered());
                    if ui.small_button("✕").clicked() {
                        self.workspace.delete_selection(tag_id, selection_id);
                    }
                });
            }
        });
    }

    fn carousel(&mut self, ui: &mut egui::Ui) {
        if self.workspace.images.is_empty() {
            ui.label("No images yet");
            return;
        }
        let selected = self.workspace.selected_image().map(|image| image.id);
        let mut select = None;
        let mut remove = None;

        ScrollArea::horizontal().show(ui, |ui| {
            ui.horizontal(|ui| {
                for image in &self.workspace.images {
                    let size = image.size_vec2();
                    let thumb = egui::Vec2::new(64.0 * size.x / size.y, 64.0);
                    // Thumbnails go through the egui_extras byte loader,
                    // keyed by image id; the full-size canvas texture is
                    // managed separately.
                    let widget = egui::Image::from_bytes(
                        format!("bytes://boxtag/thumb/{}", image.id),
                        image.data.clone(),
                    )
                    .fit_to_exact_size(thumb);
                    ui.vertical(|ui| {
                        let response = ui
                            .add(egui::ImageButton::new(widget))
                            .on_hover_text(&image.name);
                        if selected == Some(image.id) {
                            ui.painter().rect_stroke(
                                response.rect,
                                2.0,
                                egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 120, 255)),
                                egui::StrokeKind::Outside,
                            );
                        }
                        if response.clicked() {
                            select = Some(image.id);
                        }
                        if ui.small_button("✕").clicked() {
                            remove = Some(image.id);
                        }
                    });
                }
            });
        });

        if let Some(id) = select {
            self.workspace.select_image(id);
        }
        if let Some(id) = remove {
            self.workspace.remove_image(id);
        }
    }
}

impl eframe::App for BoxtagApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("carousel")
            .resizable(false)
            .show(ctx, |ui| self.carousel(ui));
        egui::SidePanel::right("tags")
            .default_width(220.0)
            .show(ctx, |ui| self.tag_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::show_canvas(ui, &mut self.workspace, &mut self.session);
        });
    }
}

fn load_image_file(workspace: &mut Workspace, path: &Path) {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    match std::fs::read(path) {
        Ok(bytes) => {
            workspace.add_image(&name, bytes);
        }
        Err(err) => warn!("cannot read {}: {err}", path.display()),
    }
}
