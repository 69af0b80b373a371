//! Fixed visual constants of the exported report, in CSS pixels.

use dossier_types::{Color, Size};

pub const VIEWPORT_WIDTH: f32 = 1000.0;
pub const PAGE_PADDING: f32 = 24.0;
pub const PAGE_BACKGROUND: Color = Color::rgb(0xf3, 0xf4, 0xf6);

pub const SECTION_BACKGROUND: Color = Color::WHITE;
pub const SECTION_BORDER: Color = Color::rgb(0xe5, 0xe7, 0xeb);
pub const SECTION_MARGIN_BOTTOM: f32 = 24.0;
pub const SECTION_BODY_PADDING: f32 = 24.0;
pub const HEADER_BACKGROUND: Color = Color::rgb(0xf6, 0xf4, 0xee);
pub const HEADER_PADDING_X: f32 = 16.0;
pub const HEADER_PADDING_Y: f32 = 12.0;
pub const TITLE_SIZE: f32 = 16.0;

pub const FIELD_COLUMNS: usize = 3;
pub const FIELD_ROW_GAP: f32 = 16.0;
pub const FIELD_COLUMN_GAP: f32 = 32.0;
pub const FIELD_LABEL_GAP: f32 = 4.0;
pub const LABEL_SIZE: f32 = 12.0;
pub const LABEL_COLOR: Color = Color::rgb(0x6b, 0x72, 0x80);
pub const VALUE_SIZE: f32 = 13.0;

pub const INK: Color = Color::rgb(0x11, 0x11, 0x11);
pub const MUTED: Color = Color::rgb(0x9c, 0xa3, 0xaf);
pub const REFERENCE_INK: Color = Color::rgb(0x1f, 0x29, 0x37);

pub const ATTACHMENT_COLUMNS: usize = 2;
pub const ATTACHMENT_GAP: f32 = 16.0;
pub const ATTACHMENT_MARGIN_TOP: f32 = 24.0;
pub const ATTACHMENT_PADDING_TOP: f32 = 12.0;
pub const ATTACHMENT_HEADING_SIZE: f32 = 14.0;
pub const ATTACHMENT_HEADING_GAP: f32 = 6.0;
pub const REFERENCE_SIZE: f32 = 12.0;
pub const REFERENCE_MARGIN: f32 = 4.0;
pub const IMAGE_PADDING: f32 = 4.0;
pub const THUMBNAIL_BOX: Size = Size {
    width: 160.0,
    height: 110.0,
};

pub const FOOTER_SIZE: f32 = 10.0;
pub const FOOTER_COLOR: Color = Color::rgb(0x66, 0x66, 0x66);
pub const FOOTER_MARGIN_TOP: f32 = 8.0;

pub const LINE_HEIGHT: f32 = 1.3;
