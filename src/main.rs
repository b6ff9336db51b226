use std::path::PathBuf;

use boxtag::app::BoxtagApp;

fn main() {
    env_logger::init();

    // Any paths on the command line are uploaded at startup; everything
    // else arrives via the file dialog or drag-and-drop.
    let image_paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("boxtag"),
        ..Default::default()
    };

    eframe::run_native(
        "boxtag",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(BoxtagApp::new(image_paths)))
        }),
    )
    .expect("Failed to run eframe");
}
