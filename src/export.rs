use anyhow::{Context as _, Result};
use log::info;
use serde::Serialize;

use crate::workspace::Workspace;

/// `h` spans x and `w` spans y — the axis naming downstream consumers
/// of `output.json` already rely on.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RegionRect {
    pub x: i32,
    pub y: i32,
    pub h: i32,
    pub w: i32,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Region {
    pub rectangle: RegionRect,
    pub object: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ImageRegions {
    pub file: String,
    pub regions: Vec<Region>,
}

/// Flattens the workspace into the export document: one entry per image
/// in upload order, with every committed selection normalized to its
/// top-left corner and absolute extents.
pub fn build_document(workspace: &Workspace) -> Vec<ImageRegions> {
    workspace
        .images
        .iter()
        .map(|image| ImageRegions {
            file: image.name.clone(),
            regions: image
                .groups
                .iter()
                .filter_map(|group| {
                    let object = workspace.tag_name(group.tag_id)?;
                    Some(group.selections.iter().map(|selection| {
                        let top_left = selection.top_left();
                        Region {
                            rectangle: RegionRect {
                                x: top_left.x,
                                y: top_left.y,
                                h: selection.abs_height(),
                                w: selection.abs_width(),
                            },
                            object: object.to_owned(),
                        }
                    }))
                })
                .flatten()
                .collect(),
        })
        .collect()
}

pub fn to_json(workspace: &Workspace) -> Result<String> {
    serde_json::to_string(&build_document(workspace)).context("serializing export document")
}

/// Asks the user where to save and writes the document. Cancelling the
/// dialog is not an error.
pub fn save_with_dialog(workspace: &Workspace) -> Result<()> {
    let json = to_json(workspace)?;
    let Some(path) = rfd::FileDialog::new()
        .set_file_name("output.json")
        .save_file()
    else {
        return Ok(());
    };
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("exported {} image(s) to {}", workspace.images.len(), path.display());
    Ok(())
}
