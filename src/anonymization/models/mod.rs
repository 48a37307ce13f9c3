//! Data models shared across the detection and redaction pipeline

pub mod span;

pub use span::{
    AnalysisResult, AnonymizeRequest, AnonymizedText, OperatorPreset, ReportedSpan, Span,
};
