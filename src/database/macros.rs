/// Binds a model to its table.
///
/// # Syntax
/// ```ignore
/// define_table!("table name" : Model);
/// ```
#[macro_export]
macro_rules! define_table {
    ($table:literal : $model:ty) => {
        impl $crate::database::Table for $model {
            fn table() -> &'static str {
                $table
            }
        }
    };
}

/// Defines a method to query the database using SQL.
///
/// # Syntax
/// ```ignore
/// [Base Type] > method_name(...arguments) > [Output Type] where "sql query"
/// ```
/// Where the `Base Type` is the type that the method is being defined for and the `Output Type` is the type that the method will return.
/// Every argument is bound to the query under its own name.
///
/// # Example
///
/// ```ignore
/// define_relation! {
///     Video > owned_by(owner: &str) > Vec<Video>
///         where "SELECT * FROM videos WHERE user = $owner"
/// }
///
/// let videos = Video::owned_by("alice@example.com", &db).await?;
/// ```
#[macro_export]
macro_rules! define_relation {
    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) > $export:ty where $query:literal) => {
        impl $model {
            #[tracing::instrument(skip(db))]
            pub async fn $relation(
                $($binding : $binding_type ,)* db: &$crate::database::Database,
            ) -> ::std::result::Result<$export, $crate::database::DatabaseQueryError> {
                use $crate::database::Sql as _;
                db.sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .fetch_first()
                    .await
            }
        }
    };
}
