//! Baseline placement: vertical stacking, alignment, and truncation
//!
//! Wrapped lines become baselines with absolute element-local geometry.
//! Lines stack top to bottom with paragraph spacing taken from the previous
//! logical line, the whole block shifts for vertical alignment, and each
//! line shifts horizontally per the alignment mode. Leading trim and
//! truncation adjust the block afterwards.

use crate::justify;
use crate::wrap::{indentation_px, WrappedLine};
use serde::{Deserialize, Serialize};
use text_model::{
    AlignHorizontal, AlignVertical, AutoResize, LeadingTrim, LineHeightUnit, TextData, Toggle,
};

/// One physical display line's geometry
///
/// `position` is the pen origin: x at the line's left edge (indentation and
/// alignment applied), y at the baseline. `line_y` is the top of the line
/// box. The character range is half-open and includes a terminating break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub position: (f32, f32),
    pub width: f32,
    pub line_y: f32,
    pub default_line_height: f32,
    pub line_height: f32,
    pub ascent: f32,
    pub cap_height: f32,
    pub first_character: usize,
    pub end_character: usize,
}

impl Baseline {
    /// Vertical span of the line box
    pub fn vertical_range(&self) -> (f32, f32) {
        (self.line_y, self.line_y + self.line_height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaselineLayout {
    pub baselines: Vec<Baseline>,
    /// Wrapped lines aligned 1:1 with `baselines` (truncated tail removed)
    pub lines: Vec<WrappedLine>,
    pub content_width: f32,
    pub content_height: f32,
    /// `(first truncated character, visible height)` when truncation cut
    /// the tail off
    pub truncation: Option<(usize, f32)>,
}

struct LineVertical {
    ascent: f32,
    cap_height: f32,
    default_line_height: f32,
    line_height: f32,
}

fn resolved_line_height(data: &TextData, offset: usize, record_height: f32) -> f32 {
    let style = data.style_at(offset);
    match style.line_height.unit {
        LineHeightUnit::Percent => style.line_height.value / 100.0 * record_height,
        LineHeightUnit::Pixels => style.line_height.value,
        LineHeightUnit::Raw => style.line_height.value / 100.0 * style.font_size,
    }
}

fn line_vertical(data: &TextData, line: &WrappedLine) -> LineVertical {
    if line.records.is_empty() {
        return empty_line_vertical(data, line.first_character);
    }
    let mut ascent: f32 = 0.0;
    let mut cap_height: f32 = 0.0;
    let mut default_line_height: f32 = 0.0;
    let mut line_height: f32 = 0.0;
    for r in &line.records {
        ascent = ascent.max(r.ascent);
        cap_height = cap_height.max(r.cap_height);
        default_line_height = default_line_height.max(r.height);
        line_height = line_height.max(resolved_line_height(data, r.first_character, r.height));
    }
    LineVertical {
        ascent,
        cap_height,
        default_line_height,
        line_height,
    }
}

fn empty_line_vertical(data: &TextData, offset: usize) -> LineVertical {
    let style = data.style_at(offset);
    let height = style.font_size;
    LineVertical {
        ascent: style.font_size * 0.8,
        cap_height: style.font_size * 0.7,
        default_line_height: height,
        line_height: resolved_line_height(data, offset, height),
    }
}

/// Extra line height for the phantom line after a trailing break
fn phantom_line_height(data: &TextData) -> f32 {
    if data.characters.ends_with('\n') {
        let v = empty_line_vertical(data, data.char_len());
        v.line_height
    } else {
        0.0
    }
}

/// Place baselines for wrapped lines. Mutates `lines` when justification
/// applies. `available_width`/`available_height` of `None` mean the
/// corresponding dimension auto-sizes to content.
pub fn compute(
    data: &TextData,
    mut lines: Vec<WrappedLine>,
    available_width: Option<f32>,
    available_height: Option<f32>,
) -> BaselineLayout {
    if data.style.text_align_horizontal == AlignHorizontal::Justified {
        if let Some(width) = available_width {
            justify::apply(data, &mut lines, width);
        }
    }

    let verticals: Vec<LineVertical> = lines.iter().map(|l| line_vertical(data, l)).collect();

    // Vertical stacking with paragraph spacing
    let mut line_tops = Vec::with_capacity(lines.len());
    let mut y = 0.0;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 && line.starts_paragraph {
            let prev_logical = line.logical_line.saturating_sub(1);
            y += data
                .lines
                .get(prev_logical)
                .map(|l| l.paragraph_spacing)
                .unwrap_or(0.0);
        }
        line_tops.push(y);
        y += verticals[i].line_height;
    }
    let mut content_height = y + phantom_line_height(data);

    // Leading trim removes the space above the cap height on the first line
    // and below the baseline on the last
    let mut top_trim = 0.0;
    if data.style.leading_trim == LeadingTrim::CapHeight {
        if let (Some(first), Some(last)) = (verticals.first(), verticals.last()) {
            top_trim = (first.ascent - first.cap_height).max(0.0)
                + (first.line_height - first.default_line_height).max(0.0) / 2.0;
            let bottom_trim = (last.line_height - last.ascent).max(0.0);
            content_height = (content_height - top_trim - bottom_trim).max(0.0);
        }
    }

    // Truncation cut: max-lines and available-height limits
    let truncation_on =
        data.style.text_truncation == Toggle::Enable && data.style.text_auto_resize == AutoResize::None;
    let mut visible = lines.len();
    if truncation_on {
        if data.style.max_lines > 0 {
            visible = visible.min(data.style.max_lines);
        }
        if let Some(avail_h) = available_height {
            let mut fitting = 0;
            for i in 0..lines.len() {
                let bottom = line_tops[i] - top_trim + verticals[i].line_height;
                if bottom <= avail_h + 1e-3 || i == 0 {
                    fitting = i + 1;
                } else {
                    break;
                }
            }
            visible = visible.min(fitting);
        }
    }
    let truncation = if truncation_on && visible < lines.len() {
        let start = lines[visible].first_character;
        let height = line_tops[visible - 1] - top_trim + verticals[visible - 1].line_height;
        Some((start, height))
    } else {
        None
    };
    if truncation.is_some() {
        lines.truncate(visible);
        line_tops.truncate(visible);
        content_height = truncation.map(|(_, h)| h).unwrap_or(content_height);
    }
    let verticals = &verticals[..lines.len()];

    // Content width before horizontal placement
    let mut content_width: f32 = 0.0;
    for line in &lines {
        let indent = indentation_px(data, line.logical_line);
        content_width = content_width.max(indent + line.paragraph_indent + line.width());
    }

    // Vertical alignment offset; any auto-resize mode pins to the top
    let auto = data.style.text_auto_resize != AutoResize::None;
    let v_offset = match (auto, available_height) {
        (false, Some(avail_h)) => match data.style.text_align_vertical {
            AlignVertical::Top => 0.0,
            AlignVertical::Middle => (avail_h - content_height) / 2.0,
            AlignVertical::Bottom => avail_h - content_height,
        },
        _ => 0.0,
    };

    let avail_w = available_width.unwrap_or(content_width);
    let mut baselines = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let v = &verticals[i];
        let indent = indentation_px(data, line.logical_line);
        let visible_width = line.width_sans_trailing_spaces();
        let x = match data.style.text_align_horizontal {
            AlignHorizontal::Left | AlignHorizontal::Justified => indent,
            AlignHorizontal::Center => {
                indent + (avail_w - indent - visible_width - line.paragraph_indent) / 2.0
            }
            AlignHorizontal::Right => {
                avail_w - visible_width - line.paragraph_indent
            }
        };
        let line_y = line_tops[i] - top_trim + v_offset;
        // Text centers inside an oversized line box
        let baseline_y =
            line_y + v.ascent + (v.line_height - v.default_line_height).max(0.0) / 2.0;
        baselines.push(Baseline {
            position: (x, baseline_y),
            width: line.paragraph_indent + line.width(),
            line_y,
            default_line_height: v.default_line_height,
            line_height: v.line_height,
            ascent: v.ascent,
            cap_height: v.cap_height,
            first_character: line.first_character,
            end_character: line.end_character,
        });
    }

    BaselineLayout {
        baselines,
        lines,
        content_width,
        content_height,
        truncation,
    }
}
