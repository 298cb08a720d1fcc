//! Parameters, cells and rows.

use serde::{Deserialize, Serialize};

/// One cell of a test row: a value index into the column's domain, or `None`
/// for a don't-care that matches any value.
pub type Cell = Option<usize>;

/// A test row, one cell per parameter in the caller's parameter order.
pub type Row = Vec<Cell>;

/// Textual rendering of a don't-care cell.
pub const DONT_CARE_SYMBOL: char = '*';

/// A named parameter (also called factor) with an ordered domain of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Alphabet size of this parameter.
    #[inline]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Append a value to the domain. Only meaningful while assembling a
    /// configuration; a finished covering array is not revalidated.
    pub fn add_value(&mut self, value: impl ToString) {
        self.values.push(value.to_string());
    }

    /// Value at `index`, if it is inside the domain.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: [{}]", self.name, self.values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_values() {
        let mut jre = Parameter::new("JRE", [8, 11, 17]);
        assert_eq!(jre.size(), 3);
        assert_eq!(jre.value(1), Some("11"));
        assert_eq!(jre.value(3), None);
        jre.add_value(21);
        assert_eq!(jre.size(), 4);
        assert_eq!(jre.to_string(), "JRE: [8, 11, 17, 21]");
    }
}
