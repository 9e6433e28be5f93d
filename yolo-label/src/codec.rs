//! YOLO text annotation codec.
//!
//! One line per object: `class_id center_x center_y width height`, the four
//! box fields in ratio units. Blank lines are ignored.

use crate::{CyCxHW, Label, RatioLabel, Rect, RectExt};
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseLabelError {
    #[error("line {line}: expected 5 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: field '{field}' is not numeric")]
    InvalidNumber { line: usize, field: String },
    #[error("line {line}: class id must be non-negative, found {value}")]
    NegativeClass { line: usize, value: f64 },
    #[error("line {line}: {reason}")]
    InvalidBox { line: usize, reason: String },
}

pub fn parse_labels(text: &str) -> Result<Vec<RatioLabel>, ParseLabelError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(lineno: usize, line: &str) -> Result<RatioLabel, ParseLabelError> {
    let fields: Vec<_> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(ParseLabelError::FieldCount {
            line: lineno,
            found: fields.len(),
        });
    }

    let values = fields
        .iter()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| ParseLabelError::InvalidNumber {
                    line: lineno,
                    field: field.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let [class, cx, cy, w, h] = <[f64; 5]>::try_from(values).unwrap();

    // the class field is numeric in the wild; truncate it to an id
    if class < 0.0 {
        return Err(ParseLabelError::NegativeClass {
            line: lineno,
            value: class,
        });
    }
    let class = class.trunc() as usize;

    let rect =
        CyCxHW::try_from_cycxhw([cy, cx, h, w]).map_err(|err| ParseLabelError::InvalidBox {
            line: lineno,
            reason: err.to_string(),
        })?;

    Ok(Label { rect, class })
}

pub fn serialize_labels(labels: &[RatioLabel]) -> String {
    labels.iter().fold(String::new(), |mut text, label| {
        let [cy, cx, h, w] = label.rect.cycxhw();
        writeln!(text, "{} {} {} {} {}", label.class, cx, cy, w, h).unwrap();
        text
    })
}
