//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use indexmap::IndexSet;
pub use itertools::Itertools;
pub use log::{debug, error, info, warn};
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    fs,
    path::{Path, PathBuf},
};
pub use yolo_label::{
    parse_labels, serialize_labels, CyCxHW, Label, ParseLabelError, RatioLabel, Rect, RectExt,
    TLBR,
};
