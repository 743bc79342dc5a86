use std::cmp::Ordering;

use crate::attributes::Attributes;
use crate::error::FilterError;
use crate::value::Value;

/// Sorts template values by the attribute (or dotted attribute path) `attribute`.
///
/// See [`sort_by_named`].
///
/// # Errors
/// * `FilterError::MissingAttribute` when an item lacks the attribute
/// * `FilterError::Incomparable` when two attribute values cannot be ordered
pub fn sort_by_attribute(
    items: &[Value],
    attribute: &str,
    reverse: bool,
) -> Result<Vec<Value>, FilterError> {
    sort_by_named(items, attribute, reverse)
}

/// Returns a sorted copy of `items`, ordered by the value of the named attribute.
///
/// The sort is stable in both directions: items with equal keys keep their input order,
/// `reverse` only flips the comparison.
///
/// Every key is resolved before anything is compared, so the first item (in input order)
/// lacking the attribute is the one reported. Keys that don't order against each other
/// are reported once sorted, for the first such pair of neighbours.
///
/// # Errors
/// * `FilterError::MissingAttribute` when an item lacks the attribute
/// * `FilterError::Incomparable` when two attribute values cannot be ordered
pub fn sort_by_named<T>(items: &[T], attribute: &str, reverse: bool) -> Result<Vec<T>, FilterError>
where
    T: Attributes + Clone,
{
    let mut keyed = items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.lookup(attribute) {
            Some(key) => Ok((key, item)),
            None => Err(FilterError::MissingAttribute {
                attribute: attribute.to_owned(),
                index,
            }),
        })
        .collect::<Result<Vec<(Value, &T)>, FilterError>>()?;

    keyed.sort_by(|left, right| directed(left.0.total_cmp(&right.0), reverse));

    // `total_cmp` agrees with `compare` wherever that succeeds, so checking neighbours is enough
    for pair in keyed.windows(2) {
        if let [(ref left, _), (ref right, _)] = *pair {
            left.compare(right)?;
        }
    }

    Ok(keyed.into_iter().map(|(_, item)| item.clone()).collect())
}

/// Returns a sorted copy of `items`, ordered by `key`. Stable in both directions.
pub fn sort_by_key<T, K, F>(items: &[T], mut key: F, reverse: bool) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut keyed = items
        .iter()
        .map(|item| (key(item), item))
        .collect::<Vec<(K, &T)>>();

    keyed.sort_by(|left, right| directed(left.0.cmp(&right.0), reverse));

    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse { ordering.reverse() } else { ordering }
}
