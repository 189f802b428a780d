use error_stack::{AttachmentKind, FrameKind, Report};
use std::fmt::Display;

#[derive(Debug)]
pub enum SPError {
    InvalidData,
    ParserError,
    UiError,
    IOError,
    NetworkError,
}

impl Display for SPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            SPError::InvalidData => "Invalid data",
            SPError::ParserError => "Parser error",
            SPError::UiError => "UI error",
            SPError::IOError => "IO error",
            SPError::NetworkError => "Network error",
        };

        write!(f, "{msg}")
    }
}

impl std::error::Error for SPError {}

pub trait SPErrorExt {
    fn error_str(&self) -> Option<String> {
        None
    }
}

impl SPErrorExt for Report<SPError> {
    fn error_str(&self) -> Option<String> {
        // Frames are stored newest first, the printable added last sits on top.
        for frame in self.frames() {
            if let FrameKind::Attachment(AttachmentKind::Printable(a)) = frame.kind() {
                return Some(a.to_string());
            }
        }

        None
    }
}
