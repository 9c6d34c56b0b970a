// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive client.
//
// Module responsibilities:
// - `config`: fixed endpoints, environment names, session settings.
// - `credentials`: key sanitization, masking and source precedence.
// - `store`: the local credentials file.
// - `api`, `transport`, `outcome`: the guarded HTTP call and its results.
// - `endpoints`: one request descriptor per API operation.
// - `output`: terminal rendering of results.
// - `prompt`, `menu`, `ui`: operator input, the action table and the loop.
pub mod api;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod menu;
pub mod outcome;
pub mod output;
pub mod prompt;
pub mod store;
pub mod transport;
pub mod ui;

pub use error::{CliError, Result};
