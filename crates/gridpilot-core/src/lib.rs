//! gridpilot-core - UI-agnostic classification, validation, and execution.

pub mod classify;
pub mod document;
pub mod error;
pub mod executor;
pub mod host;
pub mod op;
pub mod storage;
pub mod validate;

pub use document::Workbook;
pub use error::{CoreError, Result};
pub use host::{HostError, HostResult, SheetHost};
pub use op::{
    ActionKind, Classification, ClassifyOutcome, ClassifyResponse, DocumentContext, Operation,
    OperationResult,
};

pub use gridpilot_engine::sheet::{Cell, CellRef, CellType, ChartKind, NumberFormat, RangeRef};
