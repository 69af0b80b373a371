//! The layout tree: an engine-independent description of the report.
//!
//! Nodes carry content and intrinsic sizes only; positions are computed by
//! [`crate::engine::layout_tree`]. The tree has a fixed nominal width and
//! a height driven entirely by content.

use crate::text::WrapMode;
use crate::theme;
use dossier_types::{Color, InlinedAsset, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f32, weight: Weight, color: Color) -> Self {
        Self {
            size,
            weight,
            color,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.size * theme::LINE_HEIGHT
    }

    pub fn is_bold(&self) -> bool {
        self.weight == Weight::Bold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub style: TextStyle,
    pub wrap: WrapMode,
    pub align: Align,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            wrap: WrapMode::Words,
            align: Align::Left,
            margin_top: 0.0,
            margin_bottom: 0.0,
        }
    }

    pub fn wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn margins(mut self, top: f32, bottom: f32) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }
}

/// Where the pixels of an image leaf come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Self-contained bytes; always safe to rasterize.
    Embedded(InlinedAsset),
    /// An external reference that was never fetched.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// A titled card with a header bar and padded body.
    Section {
        title: String,
        body: Vec<LayoutNode>,
    },
    /// Equal-width columns filled row by row.
    Grid {
        columns: usize,
        row_gap: f32,
        column_gap: f32,
        cells: Vec<LayoutNode>,
    },
    /// A small label above a bold value.
    Field { label: String, value: String },
    Image {
        source: ImageSource,
        /// Display size, already fitted to the thumbnail box.
        size: Size,
        /// Shown instead of the image when rendering text-only.
        reference: String,
    },
    Text(TextBlock),
    /// A horizontal separator line with spacing around it.
    Rule {
        margin_top: f32,
        margin_bottom: f32,
        color: Color,
    },
}

impl LayoutNode {
    pub fn grid(columns: usize, row_gap: f32, column_gap: f32, cells: Vec<LayoutNode>) -> Self {
        LayoutNode::Grid {
            columns,
            row_gap,
            column_gap,
            cells,
        }
    }

    fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Section { body, .. } => body,
            LayoutNode::Grid { cells, .. } => cells,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTree {
    /// Nominal rendering width in CSS pixels.
    pub width: f32,
    pub padding: f32,
    pub background: Color,
    pub children: Vec<LayoutNode>,
}

impl LayoutTree {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            padding: theme::PAGE_PADDING,
            background: theme::PAGE_BACKGROUND,
            children: Vec::new(),
        }
    }

    /// Depth-first iterator over every node.
    pub fn walk(&self) -> impl Iterator<Item = &LayoutNode> {
        let mut stack: Vec<&LayoutNode> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }

    pub fn image_count(&self) -> usize {
        self.walk()
            .filter(|n| matches!(n, LayoutNode::Image { .. }))
            .count()
    }

    pub fn remote_image_count(&self) -> usize {
        self.walk()
            .filter(|n| {
                matches!(
                    n,
                    LayoutNode::Image {
                        source: ImageSource::Remote(_),
                        ..
                    }
                )
            })
            .count()
    }

    pub fn section_titles(&self) -> Vec<&str> {
        self.walk()
            .filter_map(|n| match n {
                LayoutNode::Section { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> LayoutNode {
        LayoutNode::Text(TextBlock::new(s, TextStyle::new(12.0, Weight::Regular, Color::BLACK)))
    }

    #[test]
    fn walk_is_depth_first_in_document_order() {
        let mut tree = LayoutTree::new(500.0);
        tree.children = vec![
            LayoutNode::Section {
                title: "A".into(),
                body: vec![LayoutNode::grid(2, 0.0, 0.0, vec![text("a1"), text("a2")])],
            },
            LayoutNode::Section {
                title: "B".into(),
                body: vec![text("b1")],
            },
        ];

        let order: Vec<String> = tree
            .walk()
            .map(|n| match n {
                LayoutNode::Section { title, .. } => title.clone(),
                LayoutNode::Grid { .. } => "grid".into(),
                LayoutNode::Text(t) => t.text.clone(),
                _ => "?".into(),
            })
            .collect();
        assert_eq!(order, vec!["A", "grid", "a1", "a2", "B", "b1"]);
        assert_eq!(tree.section_titles(), vec!["A", "B"]);
    }

    #[test]
    fn counts_images_by_source() {
        let mut tree = LayoutTree::new(500.0);
        let image = |source| LayoutNode::Image {
            source,
            size: Size::new(10.0, 10.0),
            reference: "r".into(),
        };
        tree.children = vec![LayoutNode::grid(
            2,
            0.0,
            0.0,
            vec![
                image(ImageSource::Remote("https://x/y.png".into())),
                image(ImageSource::Embedded(InlinedAsset::from_data_uri(
                    "data:image/png;base64,AAAA".into(),
                ))),
            ],
        )];
        assert_eq!(tree.image_count(), 2);
        assert_eq!(tree.remote_image_count(), 1);
    }
}
