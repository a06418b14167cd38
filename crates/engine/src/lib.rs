pub use error::EngineError;
pub use line_items::{LineItem, LineItemKind, NewLineItem};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use reports::{Report, ReportDraft};
pub use totals::{ReportTotals, TITHE_RATE};
pub use users::{NewUser, User, UserPatch};

mod error;
mod line_items;
mod money;
mod ops;
mod reports;
mod totals;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
