pub mod api;
pub mod clock;
pub mod config;
pub mod datetime;
pub mod display;
pub mod driver;
pub mod filter;
pub mod form;
pub mod session;
pub mod task;

pub use api::{
  ApiError,
  TaskApi
};
pub use datetime::Zone;
pub use session::{
  Effect,
  Msg,
  Session
};
