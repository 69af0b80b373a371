use super::TextMeasure;

/// How a paragraph may be broken across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Break at whitespace; words wider than the line are split.
    #[default]
    Words,
    /// Break between any two characters. Used for URLs.
    Anywhere,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f32,
}

/// Greedily breaks `text` into lines no wider than `max_width`.
///
/// Explicit newlines always break. Every line holds at least one character,
/// so a very narrow `max_width` still terminates.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    size: f32,
    bold: bool,
    mode: WrapMode,
    measure: &dyn TextMeasure,
) -> Vec<Line> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        match mode {
            WrapMode::Words => wrap_words(paragraph, max_width, size, bold, measure, &mut lines),
            WrapMode::Anywhere => {
                wrap_chars(paragraph, max_width, size, bold, measure, &mut lines)
            }
        }
    }
    if lines.is_empty() {
        lines.push(Line {
            text: String::new(),
            width: 0.0,
        });
    }
    lines
}

fn wrap_words(
    paragraph: &str,
    max_width: f32,
    size: f32,
    bold: bool,
    measure: &dyn TextMeasure,
    lines: &mut Vec<Line>,
) {
    let space = measure.advance(" ", size, bold);
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in paragraph.split_whitespace() {
        let word_width = measure.advance(word, size, bold);

        if word_width > max_width {
            if !current.is_empty() {
                lines.push(Line {
                    text: std::mem::take(&mut current),
                    width: current_width,
                });
            }
            wrap_chars(word, max_width, size, bold, measure, lines);
            // Continue on the last fragment so following words can join it.
            if let Some(last) = lines.pop() {
                current = last.text;
                current_width = last.width;
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
        } else if current_width + space + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space + word_width;
        } else {
            lines.push(Line {
                text: std::mem::replace(&mut current, word.to_string()),
                width: current_width,
            });
            current_width = word_width;
        }
    }

    lines.push(Line {
        text: current,
        width: current_width,
    });
}

fn wrap_chars(
    paragraph: &str,
    max_width: f32,
    size: f32,
    bold: bool,
    measure: &dyn TextMeasure,
    lines: &mut Vec<Line>,
) {
    let mut current = String::new();
    let mut current_width = 0.0;
    let mut buf = [0u8; 4];

    for c in paragraph.chars() {
        let w = measure.advance(c.encode_utf8(&mut buf), size, bold);
        if !current.is_empty() && current_width + w > max_width {
            lines.push(Line {
                text: std::mem::take(&mut current),
                width: current_width,
            });
            current_width = 0.0;
        }
        current.push(c);
        current_width += w;
    }

    lines.push(Line {
        text: current,
        width: current_width,
    });
}
