pub mod accounts;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod session;
pub mod telemetry;
pub mod views;

pub use accounts::{Account, Role};
pub use api::AppContext;
pub use ledger::{EmployeeRef, JoinedPunch, PunchEvent};
pub use session::Session;
