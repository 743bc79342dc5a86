use std::collections::BTreeMap;

use tracing::{Level, event};

use crate::date::{DateFormatOptions, format_rfc3339};
use crate::error::FilterError;
use crate::sort::sort_by_attribute;
use crate::value::Value;

pub const SORTBY: &str = "sortby";
pub const XML_DATE: &str = "xml_date";

/// A filter gets the piped value and the arguments the template passed, in order.
pub type Filter = Box<dyn Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync>;

/// Maps filter names to filters, handed to the template engine once set up.
#[derive(Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, Filter>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FilterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_builtin_filters(options: DateFormatOptions) -> Self {
        let mut registry = FilterRegistry::new();

        register_builtin_filters(&mut registry, options);

        registry
    }

    /// Registers `filter` under `name`, handing back the filter it replaces, if any.
    pub fn register<N, F>(&mut self, name: N, filter: F) -> Option<Filter>
    where
        N: Into<String>,
        F: Fn(&Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        let name = name.into();

        event!(Level::DEBUG, filter = %name, "Registering filter");

        let previous = self.filters.insert(name.clone(), Box::new(filter));

        if previous.is_some() {
            event!(Level::WARN, filter = %name, "Filter was already registered, replaced it");
        }

        previous
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the filter registered under `name`.
    ///
    /// # Errors
    /// * `FilterError::UnknownFilter` when nothing is registered under `name`
    /// * Whatever the filter itself fails with
    pub fn apply(&self, name: &str, value: &Value, args: &[Value]) -> Result<Value, FilterError> {
        let filter = self.get(name).ok_or_else(|| FilterError::UnknownFilter {
            name: name.to_owned(),
        })?;

        event!(
            Level::TRACE,
            filter = name,
            value = value.type_name(),
            args = args.len(),
            "Applying filter"
        );

        filter(value, args)
    }
}

/// Registers `sortby` and `xml_date`.
///
/// * `sortby(seq, key, reverse = false)`
/// * `xml_date(date, utc = options.utc)`, naive datetimes are handled per `options.naive`
pub fn register_builtin_filters(registry: &mut FilterRegistry, options: DateFormatOptions) {
    registry.register(SORTBY, sortby);
    registry.register(XML_DATE, move |value: &Value, args: &[Value]| {
        xml_date(value, args, options)
    });
}

fn sortby(value: &Value, args: &[Value]) -> Result<Value, FilterError> {
    let arguments = Arguments::new(SORTBY, args, 2)?;

    let key = arguments.required_str(0, "key")?;
    let reverse = arguments.optional_bool(1, false)?;

    let Value::Seq(ref items) = *value else {
        return Err(FilterError::InvalidArgument {
            filter: SORTBY,
            index: 0,
            expected: "a sequence",
            found: value.type_name(),
        });
    };

    sort_by_attribute(items, key, reverse).map(Value::Seq)
}

fn xml_date(value: &Value, args: &[Value], options: DateFormatOptions) -> Result<Value, FilterError> {
    let arguments = Arguments::new(XML_DATE, args, 1)?;

    let options = DateFormatOptions {
        utc: arguments.optional_bool(0, options.utc)?,
        ..options
    };

    format_rfc3339(value, &options).map(Value::String)
}

/// Positional arguments of one filter call.
///
/// Indices passed in are 0-based into the arguments, the ones reported in errors
/// count the piped value as argument 0.
struct Arguments<'a> {
    filter: &'static str,
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    fn new(filter: &'static str, values: &'a [Value], max: usize) -> Result<Self, FilterError> {
        if values.len() > max {
            return Err(FilterError::TooManyArguments {
                filter,
                max,
                found: values.len(),
            });
        }

        Ok(Self { filter, values })
    }

    fn required_str(&self, index: usize, name: &'static str) -> Result<&'a str, FilterError> {
        match self.values.get(index) {
            Some(&Value::String(ref value)) => Ok(value.as_str()),
            Some(other) => Err(self.invalid(index, "a string", other)),
            None => Err(FilterError::MissingArgument {
                filter: self.filter,
                name,
            }),
        }
    }

    fn optional_bool(&self, index: usize, default: bool) -> Result<bool, FilterError> {
        match self.values.get(index) {
            Some(&Value::Bool(value)) => Ok(value),
            Some(other) => Err(self.invalid(index, "a boolean", other)),
            None => Ok(default),
        }
    }

    fn invalid(&self, index: usize, expected: &'static str, found: &Value) -> FilterError {
        FilterError::InvalidArgument {
            filter: self.filter,
            index: index + 1,
            expected,
            found: found.type_name(),
        }
    }
}
