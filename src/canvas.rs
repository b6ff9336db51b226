use egui::{
    Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, Stroke, StrokeKind, Ui,
};

use crate::geometry::{Selection, Vector2};
use crate::session::EditorSession;
use crate::workspace::Workspace;

const SELECTION_STROKE: Color32 = Color32::from_rgb(230, 68, 68);
const HIGHLIGHT_STROKE: Color32 = Color32::from_rgb(0, 120, 255);

/// Draws the editor surface and feeds pointer input into the session.
/// Rendering is a pure read of workspace/session state; all mutation
/// happens through the session's event entry points below.
pub fn show_canvas(ui: &mut Ui, workspace: &mut Workspace, session: &mut EditorSession) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let canvas_rect = response.rect;

    painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(40));

    let Some(image_id) = workspace.selected_image().map(|image| image.id) else {
        painter.text(
            canvas_rect.center(),
            Align2::CENTER_CENTER,
            "Drop images here or use Open images…",
            FontId::proportional(18.0),
            Color32::from_gray(140),
        );
        return;
    };

    // Refit on image switch and on canvas resize; zoom/pan in between
    // leave the fitted state untouched.
    let image_size = workspace.selected_image().map(|image| image.size_vec2());
    if let Some(size) = image_size {
        session.maybe_refit(image_id, size, canvas_rect);
    }

    if let Some(image) = workspace.selected_image_mut() {
        image.ensure_texture(ui.ctx());
    }
    if let Some(image) = workspace.selected_image() {
        if let Some(texture) = &image.texture {
            let image_rect = Rect::from_min_max(
                session.viewport.image_to_screen(Vector2::ZERO),
                session.viewport.image_to_screen(Vector2::new(
                    image.image.width() as i32,
                    image.image.height() as i32,
                )),
            );
            painter.image(
                texture.id(),
                image_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        for group in &image.groups {
            for selection in &group.selections {
                draw_selection(&painter, session, selection, selection.is_highlighted);
            }
        }
    }

    if let Some(selection) = session.creating() {
        draw_selection(&painter, session, selection, false);
    }

    handle_input(ui, &response, workspace, session);
}

fn draw_selection(
    painter: &Painter,
    session: &EditorSession,
    selection: &Selection,
    highlighted: bool,
) {
    let rect = Rect::from_min_max(
        session.viewport.image_to_screen(selection.top_left()),
        session.viewport.image_to_screen(selection.bottom_right()),
    );
    let stroke = if highlighted {
        Stroke::new(3.0, HIGHLIGHT_STROKE)
    } else {
        Stroke::new(2.0, SELECTION_STROKE)
    };
    painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Middle);
}

fn handle_input(
    ui: &Ui,
    response: &egui::Response,
    workspace: &mut Workspace,
    session: &mut EditorSession,
) {
    let ctx = ui.ctx();
    let pointer_pos = response
        .hover_pos()
        .or_else(|| ctx.input(|input| input.pointer.latest_pos()));

    if response.drag_started_by(PointerButton::Primary) {
        if let Some(pos) = pointer_pos {
            session.pointer_pressed(pos, workspace);
        }
    }
    if response.dragged_by(PointerButton::Primary) {
        if let Some(pos) = pointer_pos {
            session.pointer_moved(pos, workspace);
        }
    }
    if response.drag_stopped_by(PointerButton::Primary) {
        session.pointer_released(workspace);
    }

    if response.hovered() {
        let scroll = ctx.input(|input| input.smooth_scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pos) = response.hover_pos() {
                session.zoom_by(pos, scroll);
            }
        }
        ctx.set_cursor_icon(session.cursor_hint(response.hover_pos(), workspace));
    }
}
