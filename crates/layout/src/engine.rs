//! Block flow layout: turns a [`LayoutTree`] into absolutely positioned
//! paint elements.
//!
//! Coordinates are CSS pixels with the origin at the top-left of the tree.
//! Elements are emitted in paint order: backgrounds before the content they
//! contain.

use crate::LayoutError;
use crate::text::{TextMeasure, wrap_text};
use crate::theme;
use crate::tree::{Align, ImageSource, LayoutNode, LayoutTree, TextBlock, TextStyle, Weight};
use dossier_types::{Color, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Fill(Color),
    /// A rectangle outline of the given stroke width.
    Stroke { color: Color, width: f32 },
    /// One line of text; `rect` spans the full line box.
    Text { text: String, style: TextStyle },
    Image(ImageSource),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedElement {
    pub rect: Rect,
    pub kind: ElementKind,
}

impl PositionedElement {
    fn fill(rect: Rect, color: Color) -> Self {
        Self {
            rect,
            kind: ElementKind::Fill(color),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFrame {
    pub size: Size,
    pub elements: Vec<PositionedElement>,
}

impl LayoutFrame {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = (&Rect, &ImageSource)> {
        self.elements.iter().filter_map(|e| match &e.kind {
            ElementKind::Image(source) => Some((&e.rect, source)),
            _ => None,
        })
    }
}

/// Lays out `tree` at its nominal width. The frame height is whatever the
/// content needs.
pub fn layout_tree(tree: &LayoutTree, measure: &dyn TextMeasure) -> Result<LayoutFrame, LayoutError> {
    let content_width = tree.width - 2.0 * tree.padding;
    if !content_width.is_finite() || content_width <= 0.0 {
        return Err(LayoutError::InvalidWidth(tree.width));
    }

    let mut flow = Flow {
        measure,
        elements: Vec::new(),
    };
    let mut y = tree.padding;
    for child in &tree.children {
        y += flow.place(child, tree.padding, y, content_width)?;
    }
    let height = (y + tree.padding).ceil();

    let mut elements = Vec::with_capacity(flow.elements.len() + 1);
    elements.push(PositionedElement::fill(
        Rect::new(0.0, 0.0, tree.width, height),
        tree.background,
    ));
    elements.append(&mut flow.elements);

    log::debug!(
        "laid out {} elements in a {}x{} frame",
        elements.len(),
        tree.width,
        height
    );
    Ok(LayoutFrame {
        size: Size::new(tree.width, height),
        elements,
    })
}

struct Flow<'a> {
    measure: &'a dyn TextMeasure,
    elements: Vec<PositionedElement>,
}

impl Flow<'_> {
    /// Places `node` with its top-left at (`x`, `y`) and returns the
    /// vertical space it consumed, margins included.
    fn place(&mut self, node: &LayoutNode, x: f32, y: f32, width: f32) -> Result<f32, LayoutError> {
        match node {
            LayoutNode::Section { title, body } => self.place_section(title, body, x, y, width),
            LayoutNode::Grid {
                columns,
                row_gap,
                column_gap,
                cells,
            } => self.place_grid(*columns, *row_gap, *column_gap, cells, x, y, width),
            LayoutNode::Field { label, value } => Ok(self.place_field(label, value, x, y, width)),
            LayoutNode::Image { source, size, .. } => {
                let display = size.fit_within(Size::new(width, size.height));
                self.elements.push(PositionedElement {
                    rect: Rect::new(x, y + theme::IMAGE_PADDING, display.width, display.height),
                    kind: ElementKind::Image(source.clone()),
                });
                Ok(display.height + 2.0 * theme::IMAGE_PADDING)
            }
            LayoutNode::Text(block) => Ok(self.place_text(block, x, y, width)),
            LayoutNode::Rule {
                margin_top,
                margin_bottom,
                color,
            } => {
                self.elements.push(PositionedElement::fill(
                    Rect::new(x, y + margin_top, width, 1.0),
                    *color,
                ));
                Ok(margin_top + 1.0 + margin_bottom)
            }
        }
    }

    fn place_section(
        &mut self,
        title: &str,
        body: &[LayoutNode],
        x: f32,
        y: f32,
        width: f32,
    ) -> Result<f32, LayoutError> {
        // Backgrounds depend on the final height; content is laid out first
        // into a separate buffer and spliced in after them.
        let outer = std::mem::take(&mut self.elements);

        let title_style = TextStyle::new(theme::TITLE_SIZE, Weight::Bold, theme::INK);
        let title_block = TextBlock::new(title, title_style);
        let header_height = 2.0 * theme::HEADER_PADDING_Y
            + self.place_text(
                &title_block,
                x + theme::HEADER_PADDING_X,
                y + theme::HEADER_PADDING_Y,
                width - 2.0 * theme::HEADER_PADDING_X,
            );

        let inner_x = x + theme::SECTION_BODY_PADDING;
        let inner_width = width - 2.0 * theme::SECTION_BODY_PADDING;
        let mut cursor = y + header_height + theme::SECTION_BODY_PADDING;
        for child in body {
            cursor += self.place(child, inner_x, cursor, inner_width)?;
        }
        let height = cursor + theme::SECTION_BODY_PADDING - y;

        let content = std::mem::replace(&mut self.elements, outer);
        self.elements.push(PositionedElement::fill(
            Rect::new(x, y, width, height),
            theme::SECTION_BACKGROUND,
        ));
        self.elements.push(PositionedElement::fill(
            Rect::new(x, y, width, header_height),
            theme::HEADER_BACKGROUND,
        ));
        self.elements.extend(content);
        self.elements.push(PositionedElement {
            rect: Rect::new(x, y, width, height),
            kind: ElementKind::Stroke {
                color: theme::SECTION_BORDER,
                width: 1.0,
            },
        });

        Ok(height + theme::SECTION_MARGIN_BOTTOM)
    }

    #[allow(clippy::too_many_arguments)]
    fn place_grid(
        &mut self,
        columns: usize,
        row_gap: f32,
        column_gap: f32,
        cells: &[LayoutNode],
        x: f32,
        y: f32,
        width: f32,
    ) -> Result<f32, LayoutError> {
        if columns == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        let cell_width = (width - column_gap * (columns as f32 - 1.0)) / columns as f32;
        let mut cursor = y;
        for (row_index, row) in cells.chunks(columns).enumerate() {
            if row_index > 0 {
                cursor += row_gap;
            }
            let mut row_height = 0.0f32;
            for (col, cell) in row.iter().enumerate() {
                let cell_x = x + col as f32 * (cell_width + column_gap);
                row_height = row_height.max(self.place(cell, cell_x, cursor, cell_width)?);
            }
            cursor += row_height;
        }
        Ok(cursor - y)
    }

    fn place_field(&mut self, label: &str, value: &str, x: f32, y: f32, width: f32) -> f32 {
        let label_style = TextStyle::new(theme::LABEL_SIZE, Weight::Regular, theme::LABEL_COLOR);
        let value_style = TextStyle::new(theme::VALUE_SIZE, Weight::Bold, theme::INK);

        let mut height = self.place_text(&TextBlock::new(label, label_style), x, y, width);
        height += theme::FIELD_LABEL_GAP;
        height += self.place_text(&TextBlock::new(value, value_style), x, y + height, width);
        height
    }

    fn place_text(&mut self, block: &TextBlock, x: f32, y: f32, width: f32) -> f32 {
        let style = block.style;
        let line_height = style.line_height();
        let lines = wrap_text(
            &block.text,
            width.max(1.0),
            style.size,
            style.is_bold(),
            block.wrap,
            self.measure,
        );

        let mut cursor = y + block.margin_top;
        for line in &lines {
            if !line.text.is_empty() {
                let line_x = match block.align {
                    Align::Left => x,
                    Align::Right => x + (width - line.width).max(0.0),
                };
                self.elements.push(PositionedElement {
                    rect: Rect::new(line_x, cursor, line.width, line_height),
                    kind: ElementKind::Text {
                        text: line.text.clone(),
                        style,
                    },
                });
            }
            cursor += line_height;
        }
        block.margin_top + lines.len() as f32 * line_height + block.margin_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxMetrics;

    fn field(label: &str, value: &str) -> LayoutNode {
        LayoutNode::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    fn section(title: &str, body: Vec<LayoutNode>) -> LayoutNode {
        LayoutNode::Section {
            title: title.into(),
            body,
        }
    }

    #[test]
    fn rejects_width_without_content_area() {
        let tree = LayoutTree::new(40.0);
        assert_eq!(
            layout_tree(&tree, &ApproxMetrics::default()),
            Err(LayoutError::InvalidWidth(40.0))
        );
    }

    #[test]
    fn empty_tree_is_just_padding() {
        let tree = LayoutTree::new(1000.0);
        let frame = layout_tree(&tree, &ApproxMetrics::default()).unwrap();
        assert_eq!(frame.size, Size::new(1000.0, 48.0));
        assert_eq!(frame.elements.len(), 1);
    }

    #[test]
    fn section_backgrounds_precede_content() {
        let mut tree = LayoutTree::new(1000.0);
        tree.children = vec![section("DETAILS", vec![field("Name", "Ada")])];
        let frame = layout_tree(&tree, &ApproxMetrics::default()).unwrap();

        let first_text = frame
            .elements
            .iter()
            .position(|e| matches!(e.kind, ElementKind::Text { .. }))
            .unwrap();
        let section_bg = frame
            .elements
            .iter()
            .position(|e| e.kind == ElementKind::Fill(theme::SECTION_BACKGROUND))
            .unwrap();
        assert!(section_bg < first_text);
        assert_eq!(frame.texts().collect::<Vec<_>>(), vec!["DETAILS", "Name", "Ada"]);
    }

    #[test]
    fn grid_rows_stack_with_gap() {
        let mut tree = LayoutTree::new(1000.0);
        tree.padding = 0.0;
        tree.children = vec![LayoutNode::grid(
            3,
            16.0,
            32.0,
            (0..4).map(|i| field("L", &i.to_string())).collect(),
        )];
        let frame = layout_tree(&tree, &ApproxMetrics::default()).unwrap();

        let labels: Vec<&PositionedElement> = frame
            .elements
            .iter()
            .filter(|e| matches!(&e.kind, ElementKind::Text { text, .. } if text == "L"))
            .collect();
        assert_eq!(labels.len(), 4);
        let cell_width = (1000.0 - 64.0) / 3.0;
        assert_eq!(labels[0].rect.x, 0.0);
        assert!((labels[1].rect.x - (cell_width + 32.0)).abs() < 1e-3);
        assert_eq!(labels[3].rect.x, 0.0);

        let field_height = theme::LABEL_SIZE * theme::LINE_HEIGHT
            + theme::FIELD_LABEL_GAP
            + theme::VALUE_SIZE * theme::LINE_HEIGHT;
        assert!((labels[3].rect.y - (field_height + 16.0)).abs() < 1e-3);
    }

    #[test]
    fn height_grows_with_content() {
        let short = {
            let mut tree = LayoutTree::new(1000.0);
            tree.children = vec![section("A", vec![field("x", "y")])];
            layout_tree(&tree, &ApproxMetrics::default()).unwrap().size.height
        };
        let long = {
            let mut tree = LayoutTree::new(1000.0);
            tree.children = (0..10).map(|_| section("A", vec![field("x", "y")])).collect();
            layout_tree(&tree, &ApproxMetrics::default()).unwrap().size.height
        };
        assert!(long > short * 5.0);
    }

    #[test]
    fn right_aligned_text_hugs_the_edge() {
        let mut tree = LayoutTree::new(1000.0);
        let style = TextStyle::new(10.0, Weight::Regular, Color::BLACK);
        tree.children = vec![LayoutNode::Text(
            TextBlock::new("Generated: now", style).align(Align::Right),
        )];
        let frame = layout_tree(&tree, &ApproxMetrics::default()).unwrap();
        let line = frame
            .elements
            .iter()
            .find(|e| matches!(e.kind, ElementKind::Text { .. }))
            .unwrap();
        assert!((line.rect.right() - (1000.0 - 24.0)).abs() < 1e-3);
    }

    #[test]
    fn images_are_padded_and_clamped_to_cell() {
        let mut tree = LayoutTree::new(200.0);
        tree.padding = 0.0;
        tree.children = vec![LayoutNode::Image {
            source: ImageSource::Remote("https://x/y.png".into()),
            size: Size::new(500.0, 100.0),
            reference: "https://x/y.png".into(),
        }];
        let frame = layout_tree(&tree, &ApproxMetrics::default()).unwrap();
        let (rect, _) = frame.images().next().unwrap();
        assert_eq!(*rect, Rect::new(0.0, 4.0, 200.0, 40.0));
        assert_eq!(frame.size.height, 48.0);
    }
}
