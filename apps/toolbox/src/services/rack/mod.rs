//! Rack elevation planning: racks, placed components and exports.

mod model;
mod report;
mod xml;

use thiserror::Error;

use super::image_convert::ConvertError;

pub use model::{
    Component, ComponentDraft, ComponentKind, Rack, RackProject, Utilization, DEFAULT_HEIGHT,
    MAX_HEIGHT, MIN_HEIGHT,
};
pub use report::{to_csv, to_excel_html, to_png, to_printable_html};
pub use xml::{from_xml, to_xml};

#[derive(Debug, Error)]
pub enum RackError {
    #[error("rack `{0}` does not exist")]
    UnknownRack(String),
    #[error("component `{0}` does not exist")]
    UnknownComponent(String),
    #[error("rack height must be between {min} and {max} U, got {0}", min = MIN_HEIGHT, max = MAX_HEIGHT)]
    InvalidHeight(u32),
    #[error("{size}U at U{position} does not fit in a {height}U rack")]
    OutOfBounds { position: u32, size: u32, height: u32 },
    #[error("overlaps `{name}` at U{position}")]
    Collision { name: String, position: u32 },
    #[error("no free {size}U slot left")]
    NoSpace { size: u32 },
    #[error("`{component}` sits above U{height}")]
    HeightTooSmall { height: u32, component: String },
    #[error("invalid rack XML: {0}")]
    Xml(String),
    #[error("csv export failed: {0}")]
    Csv(String),
    #[error(transparent)]
    Image(#[from] ConvertError),
}
