#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared data access layer for Corvid: schema migrations, row projections,
//! and the repositories that pack rows into API representations.

pub mod error;
pub mod meta;
pub mod migrations;
pub mod notes;
pub mod pack;
pub mod rows;
pub mod schools;
pub mod users;

pub use error::{DataError, Result as DataResult};
pub use meta::{META_ROW_ID, MetaStore};
pub use migrations::{Migrator, SchemaMigration, column_exists, constraint_exists, index_exists};
pub use notes::{NewNote, NoteStore};
pub use pack::PackSource;
pub use rows::{MetaRow, NoteRow, SchoolRow, UserRow};
pub use schools::{NewSchool, SchoolStore};
pub use users::{NewUser, UserStore};
