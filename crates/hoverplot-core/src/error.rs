pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{name} must be a series or an ordered sequence (array, list, vector), found {found}")]
    InputType { name: String, found: &'static str },

    #[error("Labels and groups must have the same length (labels: {labels}, groups: {groups})")]
    LengthMismatch { labels: usize, groups: usize },

    #[error("Invalid plot data contract: {message}")]
    ContractParse { message: String },

    #[error("Invalid SVG document: {message}")]
    SvgParse { message: String },

    #[error("No SVG container found for axis `{axis}`")]
    MissingAxisContainer { axis: String },

    #[error(
        "Classification mismatch on {axis} ({layer} layer): {primitives} primitives for {entries} tooltip entries"
    )]
    ClassificationMismatch {
        axis: String,
        layer: &'static str,
        primitives: usize,
        entries: usize,
    },

    #[error("Axis index {index} is out of range (figure has {available} axes)")]
    UnknownAxis { index: usize, available: usize },
}

impl From<roxmltree::Error> for Error {
    fn from(value: roxmltree::Error) -> Self {
        Self::SvgParse {
            message: value.to_string(),
        }
    }
}
