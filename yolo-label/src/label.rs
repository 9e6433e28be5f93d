use crate::{CyCxHW, Rect};

/// A bounding box paired with its class.
#[derive(Debug, Clone, PartialEq)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
}

/// A labeled box in ratio units, the form stored in annotation files.
pub type RatioLabel = Label<CyCxHW<f64>, usize>;
