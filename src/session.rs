use egui::{CursorIcon, Pos2, Rect, Vec2};

use crate::geometry::{Corner, Selection, SelectionId, Vector2};
use crate::hit;
use crate::viewport::Viewport;
use crate::workspace::{ImageId, TagId, Workspace};

/// What the pointer is currently doing.
#[derive(Clone, Debug)]
enum DragState {
    Idle,
    /// Space held and button down: every move shifts the viewport.
    Panning,
    /// Drawing a brand-new selection; it lives here, uncommitted, until
    /// pointer-up. Corner `c` is the active corner so the rectangle
    /// grows away from the anchor.
    Creating { selection: Selection },
    /// Re-shaping a selection already committed to its group. The
    /// geometry is edited in place through the workspace.
    Editing {
        tag_id: TagId,
        selection_id: SelectionId,
        corners: Vec<Corner>,
        cursor: CursorIcon,
    },
}

/// Per-editor-session interaction state: the viewport plus the pointer
/// state machine. One logical writer at a time — every transition runs
/// to completion on the event thread before the next event lands.
pub struct EditorSession {
    pub viewport: Viewport,
    drag: DragState,
    pan_armed: bool,
    last_screen_pos: Option<Pos2>,
    /// (image, canvas rect) the viewport was last fitted for; a change
    /// in either triggers a refit.
    fitted_for: Option<(ImageId, Rect)>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            drag: DragState::Idle,
            pan_armed: false,
            last_screen_pos: None,
            fitted_for: None,
        }
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recenters and rescales when the displayed image or the canvas
    /// geometry changed (image switch, window resize).
    pub fn maybe_refit(&mut self, image_id: ImageId, image_size: Vec2, canvas_rect: Rect) {
        if self.fitted_for == Some((image_id, canvas_rect)) {
            return;
        }
        self.viewport.fit_to_container(image_size, canvas_rect);
        self.fitted_for = Some((image_id, canvas_rect));
    }

    /// Discrete key-down/up events keep the pan modifier as plain input
    /// state, combined with the pointer machine via a guard. Letting go
    /// of the key mid-pan ends the pan only once the button is up too.
    pub fn set_pan_armed(&mut self, armed: bool, pointer_down: bool) {
        self.pan_armed = armed;
        if !armed && !pointer_down && matches!(self.drag, DragState::Panning) {
            self.drag = DragState::Idle;
        }
    }

    pub fn pan_armed(&self) -> bool {
        self.pan_armed
    }

    /// The uncommitted in-progress selection, if one is being drawn.
    pub fn creating(&self) -> Option<&Selection> {
        match &self.drag {
            DragState::Creating { selection } => Some(selection),
            _ => None,
        }
    }

    /// The (tag, selection) pair currently being reshaped, if any.
    pub fn editing(&self) -> Option<(TagId, SelectionId)> {
        match &self.drag {
            DragState::Editing {
                tag_id,
                selection_id,
                ..
            } => Some((*tag_id, *selection_id)),
            _ => None,
        }
    }

    pub fn pointer_pressed(&mut self, screen: Pos2, workspace: &mut Workspace) {
        if !matches!(self.drag, DragState::Idle) {
            return;
        }
        self.last_screen_pos = Some(screen);

        if self.pan_armed {
            self.drag = DragState::Panning;
            return;
        }

        let image_pos = self.viewport.screen_to_image(screen);
        let Some(image) = workspace.selected_image() else {
            return;
        };
        if let Some(hit) = hit::resolve(image_pos, &image.groups) {
            self.drag = DragState::Editing {
                tag_id: hit.tag_id,
                selection_id: hit.selection_id,
                corners: hit.corners,
                cursor: hit.cursor,
            };
        } else if workspace.selected_tag().is_some() {
            let id = workspace.allocate_selection_id();
            self.drag = DragState::Creating {
                selection: Selection::new(id, image_pos),
            };
        }
    }

    pub fn pointer_moved(&mut self, screen: Pos2, workspace: &mut Workspace) {
        let Some(last) = self.last_screen_pos.replace(screen) else {
            return;
        };
        let image_delta =
            self.viewport.screen_to_image(screen) - self.viewport.screen_to_image(last);

        match &mut self.drag {
            DragState::Idle => {}
            DragState::Panning => self.viewport.pan(screen - last),
            DragState::Creating { selection } => {
                let moved = selection.point(Corner::C) + image_delta;
                selection.set_point(Corner::C, moved);
            }
            DragState::Editing {
                tag_id,
                selection_id,
                corners,
                ..
            } => {
                let (tag_id, selection_id, corners) = (*tag_id, *selection_id, corners.clone());
                if let Some(selection) = workspace.find_selection_mut(tag_id, selection_id) {
                    for corner in corners {
                        let moved = selection.point(corner) + image_delta;
                        selection.set_point(corner, moved);
                    }
                }
            }
        }
    }

    pub fn pointer_released(&mut self, workspace: &mut Workspace) {
        let finished = std::mem::replace(&mut self.drag, DragState::Idle);
        if let DragState::Creating { selection } = finished {
            workspace.commit_selection(selection);
        }
        self.last_screen_pos = None;
    }

    /// Escape: throw away an uncommitted new selection. An in-progress
    /// edit just ends — corner moves already applied stay applied.
    pub fn cancel(&mut self) {
        if matches!(
            self.drag,
            DragState::Creating { .. } | DragState::Editing { .. }
        ) {
            self.drag = DragState::Idle;
            self.last_screen_pos = None;
        }
    }

    /// Wheel input; positive scroll zooms in, anchored on the cursor.
    pub fn zoom_by(&mut self, anchor: Pos2, scroll_y: f32) {
        if scroll_y != 0.0 {
            self.viewport.zoom(anchor, 1.0 + scroll_y * 0.002);
        }
    }

    /// Cursor affordance for the current hover position.
    pub fn cursor_hint(&self, hover: Option<Pos2>, workspace: &Workspace) -> CursorIcon {
        match &self.drag {
            DragState::Panning => return CursorIcon::Grabbing,
            DragState::Creating { .. } => return CursorIcon::Crosshair,
            DragState::Editing { cursor, .. } => return *cursor,
            DragState::Idle => {}
        }
        if self.pan_armed {
            return CursorIcon::Grab;
        }
        let Some(image) = workspace.selected_image() else {
            return CursorIcon::Default;
        };
        if let Some(hover) = hover {
            let image_pos = self.viewport.screen_to_image(hover);
            if let Some(hit) = hit::resolve(image_pos, &image.groups) {
                return hit.cursor;
            }
        }
        if workspace.selected_tag().is_some() {
            CursorIcon::Crosshair
        } else {
            CursorIcon::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EditorSession;
    use crate::geometry::Vector2;
    use crate::workspace::tests::workspace_with_image_and_tag;
    use crate::workspace::Workspace;
    use egui::{CursorIcon, Pos2, Vec2};

    // The default viewport is identity (scale 1, no offset), so screen
    // and image coordinates coincide in these tests.

    fn drag(session: &mut EditorSession, ws: &mut Workspace, from: (f32, f32), to: (f32, f32)) {
        session.pointer_pressed(Pos2::new(from.0, from.1), ws);
        session.pointer_moved(Pos2::new(to.0, to.1), ws);
        session.pointer_released(ws);
    }

    #[test]
    fn click_drag_release_commits_a_selection_for_the_active_tag() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        drag(&mut session, &mut ws, (50.0, 50.0), (150.0, 120.0));

        let image = ws.selected_image().unwrap();
        assert_eq!(image.groups.len(), 1);
        assert_eq!(image.groups[0].tag_id, ws.tags[0].id);
        let selection = &image.groups[0].selections[0];
        assert_eq!(selection.top_left(), Vector2::new(50, 50));
        assert_eq!(selection.abs_height(), 100);
        assert_eq!(selection.abs_width(), 70);
    }

    #[test]
    fn dragging_a_corner_resizes_the_committed_selection() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        drag(&mut session, &mut ws, (50.0, 50.0), (150.0, 120.0));

        // Grab corner c and pull it 50 pixels to the right.
        drag(&mut session, &mut ws, (150.0, 120.0), (200.0, 120.0));

        let image = ws.selected_image().unwrap();
        assert_eq!(image.groups[0].selections.len(), 1);
        let selection = &image.groups[0].selections[0];
        assert_eq!(selection.a(), Vector2::new(50, 50));
        assert_eq!(selection.abs_height(), 150);
    }

    #[test]
    fn dragging_the_body_moves_the_whole_rectangle() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        drag(&mut session, &mut ws, (50.0, 50.0), (150.0, 120.0));

        drag(&mut session, &mut ws, (100.0, 85.0), (110.0, 95.0));

        let selection = &ws.selected_image().unwrap().groups[0].selections[0];
        assert_eq!(selection.top_left(), Vector2::new(60, 60));
        assert_eq!(selection.abs_height(), 100);
        assert_eq!(selection.abs_width(), 70);
    }

    #[test]
    fn press_without_selected_tag_is_a_no_op() {
        let mut ws = Workspace::new();
        ws.add_image("img1", crate::workspace::tests::png_bytes(64, 64, 5));
        let mut session = EditorSession::new();
        drag(&mut session, &mut ws, (10.0, 10.0), (30.0, 30.0));
        assert!(ws.selected_image().unwrap().groups.is_empty());
    }

    #[test]
    fn escape_discards_an_uncommitted_selection() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        session.pointer_pressed(Pos2::new(10.0, 10.0), &mut ws);
        session.pointer_moved(Pos2::new(60.0, 60.0), &mut ws);
        session.cancel();
        session.pointer_released(&mut ws);
        assert!(ws.selected_image().unwrap().groups.is_empty());
    }

    #[test]
    fn escape_mid_edit_keeps_the_geometry_already_applied() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        drag(&mut session, &mut ws, (50.0, 50.0), (150.0, 120.0));

        session.pointer_pressed(Pos2::new(150.0, 120.0), &mut ws);
        session.pointer_moved(Pos2::new(180.0, 120.0), &mut ws);
        session.cancel();
        session.pointer_released(&mut ws);

        let selection = &ws.selected_image().unwrap().groups[0].selections[0];
        assert_eq!(selection.c(), Vector2::new(180, 120));
        assert!(session.editing().is_none());
    }

    #[test]
    fn pan_mode_moves_the_viewport_not_the_content() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        session.viewport.scale = 2.0;
        session.set_pan_armed(true, false);
        session.pointer_pressed(Pos2::new(100.0, 100.0), &mut ws);
        session.pointer_moved(Pos2::new(130.0, 90.0), &mut ws);
        session.pointer_released(&mut ws);
        session.set_pan_armed(false, false);

        // Raw screen delta, not divided by scale.
        assert_eq!(session.viewport.image_offset, Vec2::new(30.0, -10.0));
        assert!(ws.selected_image().unwrap().groups.is_empty());
    }

    #[test]
    fn cursor_hint_tracks_state_and_hover() {
        let mut ws = workspace_with_image_and_tag("cat");
        let mut session = EditorSession::new();
        assert_eq!(
            session.cursor_hint(Some(Pos2::new(5.0, 5.0)), &ws),
            CursorIcon::Crosshair
        );

        drag(&mut session, &mut ws, (50.0, 50.0), (150.0, 120.0));
        assert_eq!(
            session.cursor_hint(Some(Pos2::new(100.0, 85.0)), &ws),
            CursorIcon::Move
        );
        assert_eq!(
            session.cursor_hint(Some(Pos2::new(50.0, 50.0)), &ws),
            CursorIcon::ResizeNwSe
        );

        session.set_pan_armed(true, false);
        assert_eq!(session.cursor_hint(None, &ws), CursorIcon::Grab);
    }

    #[test]
    fn zoom_by_anchors_on_the_cursor() {
        let mut session = EditorSession::new();
        let anchor = Pos2::new(80.0, 60.0);
        let before = session.viewport.screen_to_image(anchor);
        session.zoom_by(anchor, 240.0);
        assert!(session.viewport.scale > 1.0);
        let after = session.viewport.screen_to_image(anchor);
        assert!((after.x - before.x).abs() <= 1 && (after.y - before.y).abs() <= 1);
    }
}
