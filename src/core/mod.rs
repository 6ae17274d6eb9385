//! Typed cell values: classification, formatting and temporal payloads

pub mod classifier;
pub mod datum;
pub mod formatter;
pub mod julian;
pub mod locale;
pub mod texmap;

pub use classifier::classify;
pub use datum::{Datum, DatumType, Number, NULL_VALUE};
pub use formatter::format;
pub use julian::Julian;
pub use locale::NumberLocale;
