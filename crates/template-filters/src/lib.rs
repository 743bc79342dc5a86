//! `sortby` and `xml_date`, two filters for template engines, and the registry that
//! hands them to one.

pub mod attributes;
pub mod date;
pub mod error;
pub mod registry;
pub mod sort;
pub mod value;
