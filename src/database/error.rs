use snafu::Snafu;
use url::Url;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseConnectionError {
    #[snafu(display("cannot connect to the database `{url}`: {source}"))]
    Connection { url: Url, source: surrealdb::Error },

    #[snafu(display("cannot sign in to the database as `{username}`: {source}"))]
    SignIn {
        username: String,
        source: surrealdb::Error,
    },

    #[snafu(display("cannot use namespace `{namespace}` and database `{database}`: {source}"))]
    Select {
        namespace: String,
        database: String,
        source: surrealdb::Error,
    },

    #[snafu(display("failed to apply the database schema: {source}"))]
    Setup { source: surrealdb::Error },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseQueryError {
    #[snafu(display("failed to execute the query: {source}"))]
    MalformedQuery { source: surrealdb::Error },

    #[snafu(display("failed to deserialize the database response: {source}"))]
    Deserialize { source: surrealdb::Error },

    #[snafu(display("the database returned no record for `{id}`"))]
    EmptyQuery { id: String },
}
