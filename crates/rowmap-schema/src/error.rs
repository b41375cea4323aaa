use thiserror::Error;

/// Errors raised while deriving a [`Schema`](crate::Schema) from a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type `{type_name}` is not a struct with named fields")]
    NotAStruct { type_name: String },

    #[error("type `{type_name}` has no fields with `rowmap::` attributes")]
    NoColumns { type_name: String },

    #[error("unsupported type `{shape}` for field `{field}` of `{type_name}`")]
    UnsupportedType {
        type_name: String,
        field: String,
        shape: String,
    },

    #[error("duplicate column `{column}` in table `{table}`")]
    DuplicateColumn { table: String, column: String },

    #[error("index `{index}` on table `{table}` has no columns")]
    EmptyIndex { table: String, index: String },

    #[error("index `{index}` on table `{table}` references unknown column `{column}`")]
    UnknownIndexColumn {
        table: String,
        index: String,
        column: String,
    },
}
