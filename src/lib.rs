//! Core library for the xml-sheets command line application.
//!
//! The library turns XML documents into flat tables and exports them to Excel
//! workbooks. Responsibilities are kept narrow: the tree-to-table algorithm
//! lives in [`flatten`], file adapters under [`io`], the table representation
//! in [`model`], the observable table state in [`store`], the user-facing
//! event log in [`events`], and the orchestration that ties them together
//! through a [`session::Session`] in [`sync`].

pub mod error;
pub mod events;
pub mod flatten;
pub mod io;
pub mod model;
pub mod observe;
pub mod session;
pub mod store;
pub mod sync;

pub use error::{ErrorKind, IoFailure, Result, ToolError};
pub use session::Session;
