//! Builds the report's [`LayoutTree`] from a record and its inlined assets.

use crate::text::WrapMode;
use crate::theme;
use crate::tree::{Align, ImageSource, LayoutNode, LayoutTree, TextBlock, TextStyle, Weight};
use dossier_types::{AssetRef, Attachment, Field, InlinedAsset, Record, Size, SubRecord};
use std::io::Cursor;

#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    viewport_width: f32,
    thumbnail_box: Size,
    footer: Option<String>,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self {
            viewport_width: theme::VIEWPORT_WIDTH,
            thumbnail_box: theme::THUMBNAIL_BOX,
            footer: None,
        }
    }

    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_thumbnail_box(mut self, bounds: Size) -> Self {
        self.thumbnail_box = bounds;
        self
    }

    /// Adds a right-aligned `Generated: {timestamp}` line after the sections.
    pub fn with_generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.footer = Some(format!("Generated: {}", timestamp.into()));
        self
    }

    /// Builds the full tree. `assets[i][j]` is the inlined form of
    /// `record.entries[i].attachments[j]`; missing positions fall back to
    /// the attachment's own reference.
    pub fn build(&self, record: &Record, assets: &[Vec<AssetRef>]) -> LayoutTree {
        self.assemble(record, |entry_index, entry| {
            let entry_assets = assets.get(entry_index).map(Vec::as_slice).unwrap_or(&[]);
            let items: Vec<LayoutNode> = entry
                .attachments
                .iter()
                .enumerate()
                .map(|(j, attachment)| match entry_assets.get(j) {
                    Some(asset) => self.attachment_node(attachment, asset),
                    None => self.attachment_node(attachment, &unresolved(attachment)),
                })
                .collect();
            LayoutNode::grid(
                theme::ATTACHMENT_COLUMNS,
                theme::ATTACHMENT_GAP,
                theme::ATTACHMENT_GAP,
                items,
            )
        })
    }

    /// Builds the tree with every attachment drawn as its text reference,
    /// listed in a single column. Contains no image leaves.
    pub fn build_text_only(&self, record: &Record) -> LayoutTree {
        self.assemble(record, |_, entry| {
            let items = entry
                .attachments
                .iter()
                .map(|a| reference_line(&a.source_url))
                .collect();
            LayoutNode::grid(1, theme::REFERENCE_MARGIN, 0.0, items)
        })
    }

    fn assemble(
        &self,
        record: &Record,
        mut attachment_list: impl FnMut(usize, &SubRecord) -> LayoutNode,
    ) -> LayoutTree {
        let mut tree = LayoutTree::new(self.viewport_width);

        tree.children.push(LayoutNode::Section {
            title: record.summary_title.clone(),
            body: vec![field_grid(&record.summary)],
        });

        for (i, entry) in record.entries.iter().enumerate() {
            let mut body = vec![field_grid(&entry.fields)];
            body.push(LayoutNode::Rule {
                margin_top: theme::ATTACHMENT_MARGIN_TOP,
                margin_bottom: theme::ATTACHMENT_PADDING_TOP,
                color: theme::SECTION_BORDER,
            });
            body.push(LayoutNode::Text(
                TextBlock::new(
                    "Attachments",
                    TextStyle::new(theme::ATTACHMENT_HEADING_SIZE, Weight::Bold, theme::INK),
                )
                .margins(0.0, theme::ATTACHMENT_HEADING_GAP),
            ));
            if entry.attachments.is_empty() {
                body.push(LayoutNode::Text(TextBlock::new(
                    "No attachments",
                    TextStyle::new(theme::VALUE_SIZE, Weight::Regular, theme::MUTED),
                )));
            } else {
                body.push(attachment_list(i, entry));
            }
            tree.children.push(LayoutNode::Section {
                title: entry.title.clone(),
                body,
            });
        }

        if let Some(footer) = &self.footer {
            tree.children.push(LayoutNode::Text(
                TextBlock::new(
                    footer.clone(),
                    TextStyle::new(theme::FOOTER_SIZE, Weight::Regular, theme::FOOTER_COLOR),
                )
                .align(Align::Right)
                .margins(theme::FOOTER_MARGIN_TOP, 0.0),
            ));
        }

        tree
    }

    fn attachment_node(&self, attachment: &Attachment, asset: &AssetRef) -> LayoutNode {
        match asset {
            AssetRef::Embedded(inlined) => LayoutNode::Image {
                size: self.thumbnail_size(inlined),
                source: ImageSource::Embedded(inlined.clone()),
                reference: attachment.source_url.clone(),
            },
            AssetRef::Raw(url) => LayoutNode::Image {
                size: self.thumbnail_box,
                source: ImageSource::Remote(url.clone()),
                reference: url.clone(),
            },
            AssetRef::TextReference(url) => reference_line(url),
        }
    }

    /// Natural size scaled down to the thumbnail box; the full box when the
    /// header can't be read.
    fn thumbnail_size(&self, asset: &InlinedAsset) -> Size {
        match read_dimensions(asset) {
            Some(natural) => natural.fit_within(self.thumbnail_box),
            None => {
                log::debug!("could not read dimensions of {} asset", asset.mime);
                self.thumbnail_box
            }
        }
    }
}

fn field_grid(fields: &[Field]) -> LayoutNode {
    let cells = fields
        .iter()
        .map(|f| LayoutNode::Field {
            label: f.label.clone(),
            value: f.display_value().to_string(),
        })
        .collect();
    LayoutNode::grid(
        theme::FIELD_COLUMNS,
        theme::FIELD_ROW_GAP,
        theme::FIELD_COLUMN_GAP,
        cells,
    )
}

fn reference_line(url: &str) -> LayoutNode {
    LayoutNode::Text(
        TextBlock::new(
            format!("• {}", url),
            TextStyle::new(theme::REFERENCE_SIZE, Weight::Regular, theme::REFERENCE_INK),
        )
        .wrap(WrapMode::Anywhere)
        .margins(theme::REFERENCE_MARGIN, theme::REFERENCE_MARGIN),
    )
}

fn unresolved(attachment: &Attachment) -> AssetRef {
    if attachment.kind().is_image() && !attachment.source_url.trim().is_empty() {
        AssetRef::Raw(attachment.source_url.clone())
    } else {
        AssetRef::TextReference(attachment.source_url.clone())
    }
}

/// Reads only the image header to find its pixel dimensions.
pub fn read_dimensions(asset: &InlinedAsset) -> Option<Size> {
    let bytes = asset.decode()?;
    let (w, h) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    Some(Size::new(w as f32, h as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_types::asset::encode_data_uri;

    fn png(width: u32, height: u32) -> InlinedAsset {
        let mut bytes = Vec::new();
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        InlinedAsset::from_data_uri(encode_data_uri(&bytes, "image/png"))
    }

    fn record() -> Record {
        let mut record = Record::new("training", "42");
        record.summary = vec![Field::new("Name", "Ada"), Field::new("Email Id", "")];
        let mut entry = SubRecord::new("Fire Safety");
        entry.fields = vec![Field::new("Status", "Pass")];
        entry.attachments = vec![
            Attachment::new(Some(1), "https://cdn.test/wide.png"),
            Attachment::new(Some(2), "https://cdn.test/gone.jpg"),
            Attachment::new(Some(3), "https://cdn.test/report.pdf"),
        ];
        record.entries = vec![entry, SubRecord::new("Empty")];
        record
    }

    #[test]
    fn summary_then_one_section_per_entry() {
        let tree = LayoutBuilder::new().build(&record(), &[]);
        assert_eq!(
            tree.section_titles(),
            vec!["PERSONAL DETAILS", "Fire Safety", "Empty"]
        );
        assert_eq!(tree.width, 1000.0);
    }

    #[test]
    fn empty_values_render_as_placeholder() {
        let tree = LayoutBuilder::new().build(&record(), &[]);
        let values: Vec<&str> = tree
            .walk()
            .filter_map(|n| match n {
                LayoutNode::Field { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec!["Ada", "—", "Pass"]);
    }

    #[test]
    fn thumbnails_keep_aspect_inside_box() {
        let assets = vec![
            vec![
                AssetRef::Embedded(png(320, 80)),
                AssetRef::Raw("https://cdn.test/gone.jpg".into()),
                AssetRef::TextReference("https://cdn.test/report.pdf".into()),
            ],
            vec![],
        ];
        let tree = LayoutBuilder::new().build(&record(), &assets);

        let images: Vec<(&ImageSource, Size)> = tree
            .walk()
            .filter_map(|n| match n {
                LayoutNode::Image { source, size, .. } => Some((source, *size)),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].1, Size::new(160.0, 40.0));
        assert_eq!(images[1].1, theme::THUMBNAIL_BOX);
        assert!(matches!(images[1].0, ImageSource::Remote(_)));
        assert_eq!(tree.remote_image_count(), 1);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let assets = vec![vec![AssetRef::Embedded(png(20, 10))]];
        let tree = LayoutBuilder::new().build(&record(), &assets);
        let size = tree
            .walk()
            .find_map(|n| match n {
                LayoutNode::Image { size, .. } => Some(*size),
                _ => None,
            })
            .unwrap();
        assert_eq!(size, Size::new(20.0, 10.0));
    }

    #[test]
    fn empty_entry_says_no_attachments() {
        let tree = LayoutBuilder::new().build(&record(), &[]);
        let has_placeholder = tree
            .walk()
            .any(|n| matches!(n, LayoutNode::Text(t) if t.text == "No attachments"));
        assert!(has_placeholder);
    }

    #[test]
    fn text_only_tree_has_no_images() {
        let tree = LayoutBuilder::new().build_text_only(&record());
        assert_eq!(tree.image_count(), 0);
        let references: Vec<&str> = tree
            .walk()
            .filter_map(|n| match n {
                LayoutNode::Text(t) if t.text.starts_with("• ") => Some(t.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            references,
            vec![
                "• https://cdn.test/wide.png",
                "• https://cdn.test/gone.jpg",
                "• https://cdn.test/report.pdf"
            ]
        );
    }

    #[test]
    fn footer_is_last_and_right_aligned() {
        let tree = LayoutBuilder::new()
            .with_generated_at("18/10/2026, 10:00:00")
            .build(&record(), &[]);
        let Some(LayoutNode::Text(footer)) = tree.children.last() else {
            panic!("expected a footer line");
        };
        assert_eq!(footer.text, "Generated: 18/10/2026, 10:00:00");
        assert_eq!(footer.align, Align::Right);
    }

    #[test]
    fn unreadable_asset_gets_full_box() {
        let junk = InlinedAsset::from_data_uri(encode_data_uri(b"not an image", "image/png"));
        assert_eq!(read_dimensions(&junk), None);
        let sized = LayoutBuilder::new().thumbnail_size(&junk);
        assert_eq!(sized, theme::THUMBNAIL_BOX);
    }
}
