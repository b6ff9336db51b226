use egui::CursorIcon;

use crate::geometry::{Corner, Selection, SelectionId, Vector2};
use crate::workspace::{SelectionGroup, TagId};

/// Half-size of the box around each corner, in image pixels, within
/// which a pointer press grabs that corner.
pub const HIT_TOLERANCE: i32 = 10;

/// Outcome of probing the selection groups at one image-space point.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub tag_id: TagId,
    pub selection_id: SelectionId,
    /// Corners a drag will move: one corner for a resize, `{A, C}` for a
    /// whole-rectangle move.
    pub corners: Vec<Corner>,
    pub cursor: CursorIcon,
}

/// Finds what the pointer is on. Groups and selections are scanned in
/// insertion order and the first hit wins, so overlap resolution is
/// deterministic: the earliest-registered selection takes priority.
/// Within one selection, corners are checked before the body.
pub fn resolve(point: Vector2, groups: &[SelectionGroup]) -> Option<Hit> {
    for group in groups {
        for selection in &group.selections {
            if let Some(corner) = corner_hit(selection, point) {
                return Some(Hit {
                    tag_id: group.tag_id,
                    selection_id: selection.id,
                    corners: vec![corner],
                    cursor: corner_cursor(selection, corner),
                });
            }
            if body_hit(selection, point) {
                return Some(Hit {
                    tag_id: group.tag_id,
                    selection_id: selection.id,
                    corners: vec![Corner::A, Corner::C],
                    cursor: CursorIcon::Move,
                });
            }
        }
    }
    None
}

fn corner_hit(selection: &Selection, point: Vector2) -> Option<Corner> {
    Corner::ALL.into_iter().find(|&corner| {
        let at = selection.point(corner);
        (point.x - at.x).abs() <= HIT_TOLERANCE && (point.y - at.y).abs() <= HIT_TOLERANCE
    })
}

/// Strict interior of the rectangle shrunk by half the corner tolerance,
/// so a press near an edge still prefers the corner zones.
fn body_hit(selection: &Selection, point: Vector2) -> bool {
    let inset = HIT_TOLERANCE / 2;
    let min = selection.top_left();
    let max = selection.bottom_right();
    point.x > min.x + inset
        && point.x < max.x - inset
        && point.y > min.y + inset
        && point.y < max.y - inset
}

/// Resize cursor for a corner, following the diagonal it sits on. The
/// rectangle may be "flipped" (dragged right-to-left or bottom-to-top),
/// which swaps which diagonal `a`/`c` occupy.
fn corner_cursor(selection: &Selection, corner: Corner) -> CursorIcon {
    let a = selection.a();
    let c = selection.c();
    let on_main_diagonal = (a.x <= c.x) == (a.y <= c.y);
    match corner {
        Corner::A | Corner::C => {
            if on_main_diagonal {
                CursorIcon::ResizeNwSe
            } else {
                CursorIcon::ResizeNeSw
            }
        }
        Corner::B | Corner::D => {
            if on_main_diagonal {
                CursorIcon::ResizeNeSw
            } else {
                CursorIcon::ResizeNwSe
            }
        }
    }
}
