/// Faults raised by the filters and by the registry that dispatches to them.
///
/// Filters never recover from these, they are handed back to the template
/// engine as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("item {index} has no attribute `{attribute}`")]
    MissingAttribute { attribute: String, index: usize },

    #[error("cannot order a `{left}` against a `{right}`")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot render value as RFC 3339: {reason}")]
    InvalidDateTime { reason: String },

    #[error("{value} has no JSON representation")]
    NotJson { value: String },

    #[error("no filter named `{name}` is registered")]
    UnknownFilter { name: String },

    #[error("filter `{filter}` is missing its `{name}` argument")]
    MissingArgument {
        filter: &'static str,
        name: &'static str,
    },

    #[error("filter `{filter}` expected {expected} for argument {index}, got {found}")]
    InvalidArgument {
        filter: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("filter `{filter}` takes at most {max} arguments, got {found}")]
    TooManyArguments {
        filter: &'static str,
        max: usize,
        found: usize,
    },
}

impl FilterError {
    pub(crate) fn invalid_date_time<R>(reason: R) -> Self
    where
        R: Into<String>,
    {
        FilterError::InvalidDateTime {
            reason: reason.into(),
        }
    }
}
