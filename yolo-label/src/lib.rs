//! Bounding box types and the YOLO text annotation codec.

mod common;

pub use rect::*;
pub mod rect;

pub use cycxhw::*;
pub mod cycxhw;

pub use tlbr::*;
pub mod tlbr;

pub use label::*;
pub mod label;

pub use codec::*;
pub mod codec;

pub mod prelude {
    pub use crate::rect::{Rect, RectExt};
}
