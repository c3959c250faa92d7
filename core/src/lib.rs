pub mod conclusion;
pub mod config;
pub mod error;
pub mod ffi;
pub mod fields;
pub mod form;
pub mod format;
pub mod images;
pub mod logging;
pub mod measurement;
pub mod number;
pub mod pmta;
pub mod print;
pub mod report;
pub mod session;
pub mod store;

uniffi::include_scaffolding!("laudo");

pub use config::Config;
pub use error::{ConfigError, LaudoError, SessionError, StoreError, ValidationError};
pub use ffi::{
    compute_pmta, field_catalog, MeasurementRowView, PmtaInputs, ReportArchive, ReportSession,
    ReportSummary,
};
pub use fields::{CheckboxGroup, FieldId, ImageSlot, ImageTarget};
pub use form::FormState;
pub use logging::{init_logging, init_logging_from_env};
pub use pmta::{DerivedQuantities, PmtaDisplay, ReportParameters};
pub use report::Report;
pub use session::{Session, SessionOptions};
pub use store::{FileStore, KeyValueStore, MemoryStore, ReportStore};
