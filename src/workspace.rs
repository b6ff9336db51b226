use egui::{ColorImage, Context, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;
use log::warn;

use crate::geometry::{Selection, SelectionId};

pub type TagId = i32;
pub type ImageId = u64;

/// A user-defined label. Ids start at 1 and are never reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// All selections on one image sharing one tag. Created lazily at the
/// first commit for that (image, tag) pair and removed as soon as its
/// selection list empties.
#[derive(Clone, Debug)]
pub struct SelectionGroup {
    pub tag_id: TagId,
    pub selections: Vec<Selection>,
}

/// One uploaded image and its selection groups.
pub struct ImageEntry {
    pub id: ImageId,
    pub name: String,
    /// Encoded bytes as uploaded; duplicate uploads are detected by
    /// comparing these byte-for-byte.
    pub data: Vec<u8>,
    pub image: DynamicImage,
    pub texture: Option<TextureHandle>,
    pub groups: Vec<SelectionGroup>,
}

impl ImageEntry {
    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    pub fn ensure_texture(&mut self, ctx: &Context) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.image.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture(self.name.clone(), color, TextureOptions::LINEAR));
    }
}

/// The in-memory working set: every uploaded image, the tag registry,
/// and the current image/tag choice. Precondition failures (no image,
/// no tag, empty name, duplicates) are silent no-ops throughout —
/// invalid interactions simply do nothing.
#[derive(Default)]
pub struct Workspace {
    pub images: Vec<ImageEntry>,
    pub tags: Vec<Tag>,
    selected_image: Option<ImageId>,
    selected_tag: Option<TagId>,
    next_image_id: ImageId,
    next_tag_id: TagId,
    next_selection_id: SelectionId,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ── images ──────────────────────────────────────────────────────

    /// Decodes and registers an uploaded file. Returns `true` when the
    /// image was added. Non-image payloads and byte-identical duplicates
    /// are dropped. The first image added becomes the selected image.
    pub fn add_image(&mut self, name: &str, data: Vec<u8>) -> bool {
        let image = match image::load_from_memory(&data) {
            Ok(image) => image,
            Err(err) => {
                warn!("ignoring {name}: not a decodable image ({err})");
                return false;
            }
        };
        if self.images.iter().any(|entry| entry.data == data) {
            return false;
        }
        self.next_image_id += 1;
        let id = self.next_image_id;
        self.images.push(ImageEntry {
            id,
            name: name.to_owned(),
            data,
            image,
            texture: None,
            groups: Vec::new(),
        });
        if self.selected_image.is_none() {
            self.selected_image = Some(id);
        }
        true
    }

    pub fn remove_image(&mut self, id: ImageId) {
        self.images.retain(|entry| entry.id != id);
        if self.selected_image == Some(id) {
            self.selected_image = self.images.first().map(|entry| entry.id);
        }
    }

    /// Swaps the working set to another image. Returns `true` when the
    /// selection actually changed (the caller refits the viewport then).
    pub fn select_image(&mut self, id: ImageId) -> bool {
        if self.selected_image == Some(id) || !self.images.iter().any(|entry| entry.id == id) {
            return false;
        }
        self.selected_image = Some(id);
        true
    }

    pub fn selected_image(&self) -> Option<&ImageEntry> {
        let id = self.selected_image?;
        self.images.iter().find(|entry| entry.id == id)
    }

    pub fn selected_image_mut(&mut self) -> Option<&mut ImageEntry> {
        let id = self.selected_image?;
        self.images.iter_mut().find(|entry| entry.id == id)
    }

    // ── tags ────────────────────────────────────────────────────────

    /// Adds a tag. Empty names and case-insensitive duplicates are
    /// rejected without feedback.
    pub fn create_tag(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if self
            .tags
            .iter()
            .any(|tag| tag.name.eq_ignore_ascii_case(name))
        {
            return;
        }
        self.next_tag_id += 1;
        self.tags.push(Tag {
            id: self.next_tag_id,
            name: name.to_owned(),
        });
    }

    pub fn select_tag(&mut self, id: TagId) {
        if self.tags.iter().any(|tag| tag.id == id) {
            self.selected_tag = Some(id);
        }
    }

    pub fn selected_tag(&self) -> Option<&Tag> {
        let id = self.selected_tag?;
        self.tags.iter().find(|tag| tag.id == id)
    }

    pub fn tag_name(&self, id: TagId) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.id == id)
            .map(|tag| tag.name.as_str())
    }

    /// Deletes a tag and cascades: the matching selection group is
    /// removed from every image, and the selected tag is cleared if it
    /// was the one deleted.
    pub fn delete_tag(&mut self, id: TagId) {
        self.tags.retain(|tag| tag.id != id);
        for image in &mut self.images {
            image.groups.retain(|group| group.tag_id != id);
        }
        if self.selected_tag == Some(id) {
            self.selected_tag = None;
        }
    }

    // ── selections ──────────────────────────────────────────────────

    /// Next id from the monotonically increasing per-session counter.
    pub fn allocate_selection_id(&mut self) -> SelectionId {
        self.next_selection_id += 1;
        self.next_selection_id
    }

    /// Commits a finished selection into the group for the currently
    /// selected tag on the currently selected image, creating the group
    /// on first use. Zero-area selections are dropped here rather than
    /// stored: they cannot describe a region in the export.
    pub fn commit_selection(&mut self, selection: Selection) {
        if selection.is_degenerate() {
            return;
        }
        let Some(tag_id) = self.selected_tag().map(|tag| tag.id) else {
            return;
        };
        let Some(image) = self.selected_image_mut() else {
            return;
        };
        match image.groups.iter_mut().find(|group| group.tag_id == tag_id) {
            Some(group) => group.selections.push(selection),
            None => image.groups.push(SelectionGroup {
                tag_id,
                selections: vec![selection],
            }),
        }
    }

    /// Looks up a committed selection on the selected image for an edit
    /// session.
    pub fn find_selection_mut(
        &mut self,
        tag_id: TagId,
        selection_id: SelectionId,
    ) -> Option<&mut Selection> {
        self.selected_image_mut()?
            .groups
            .iter_mut()
            .find(|group| group.tag_id == tag_id)?
            .selections
            .iter_mut()
            .find(|selection| selection.id == selection_id)
    }

    /// Removes one selection from the selected image, dropping the whole
    /// group once it has no selections left.
    pub fn delete_selection(&mut self, tag_id: TagId, selection_id: SelectionId) {
        let Some(image) = self.selected_image_mut() else {
            return;
        };
        let Some(index) = image.groups.iter().position(|group| group.tag_id == tag_id) else {
            return;
        };
        let group = &mut image.groups[index];
        group
            .selections
            .retain(|selection| selection.id != selection_id);
        if group.selections.is_empty() {
            image.groups.remove(index);
        }
    }

    pub fn set_highlight(&mut self, tag_id: TagId, selection_id: SelectionId, value: bool) {
        if let Some(selection) = self.find_selection_mut(tag_id, selection_id) {
            selection.is_highlighted = value;
        }
    }

    /// Selections of one tag on the selected image, for the tag panel's
    /// tree view.
    pub fn selections_of_tag(&self, tag_id: TagId) -> &[Selection] {
        self.selected_image()
            .and_then(|image| image.groups.iter().find(|group| group.tag_id == tag_id))
            .map(|group| group.selections.as_slice())
            .unwrap_or(&[])
    }
}
