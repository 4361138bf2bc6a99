pub mod api;
pub mod auth;
pub mod blob;
pub mod config;
pub mod database;
pub mod error;
pub mod locks;
pub mod logger;
pub mod rating;
pub mod video;

pub use error::{InitError, ValidationError};

pub mod prelude {
    pub use crate::database::{
        Database, DatabaseQueryError, EmptyQuerySnafu, MalformedQuerySnafu, Record, Sql, Table, Thing,
    };
    pub use crate::{define_relation, define_table};
    pub use derive_new::new;
    pub use serde::{Deserialize, Serialize};
    pub use snafu::{ensure, Location, OptionExt, ResultExt, Snafu};
    pub use tracing::instrument;
}
