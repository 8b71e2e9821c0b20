//! Local command handlers
//!
//! Each handler turns a routed transcript into a reply without touching the
//! network. None of them fail: errors become fixed apology strings.

pub mod arith;
mod calculate;
mod open_app;
mod volume;

pub use arith::CalcError;
pub use calculate::{CALCULATION_FAILED, CalculationHandler};
pub use open_app::{
    APP_NOT_FOUND, AppEntry, DEFAULT_APPS, OpenAppHandler, SystemUrlOpener, UrlOpener,
};
pub use volume::{VOLUME_UNSUPPORTED, VolumeHandler};
