//! TradeGrid Core — the list pipeline behind every data screen.
//!
//! This crate turns loosely shaped trade records into displayable pages:
//! - Rows, dot-path resolution and column descriptors
//! - Missing-value classification and missing-data filter policies
//! - Declarative stable sorting with missing values last
//! - Windowed pagination with first/last anchors
//! - Aggregation of heterogeneous records into normalized rows and summary stats
//! - Tagged column formatters shared by every output path
//! - Key-value persistence for watchlists, notes and saved filters
//! - A pure filter → sort → paginate pipeline with an optional memo

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod format;
pub mod missing;
pub mod paginate;
pub mod record;
pub mod sort;
pub mod store;
pub mod view;

pub use aggregate::{Aggregation, FieldAliases, ListAggregator, SummaryStats, TradeRow};
pub use config::{ConfigError, GridConfig, Orientation, PaperSize, PdfSettings};
pub use filter::{FieldPredicate, FilterSet, MissingPolicy};
pub use format::Formatter;
pub use missing::{is_missing, Missing};
pub use paginate::{PageItem, PageState, PaginationError, Paginator};
pub use record::{resolve_path, ColumnDescriptor, Row, RowId};
pub use sort::{SortDirection, SortRegistry, SortSpec};
pub use store::{KeyValueStore, StoreError};
pub use view::{build_view, prepare, MemoizedView, ViewPage, ViewQuery};
