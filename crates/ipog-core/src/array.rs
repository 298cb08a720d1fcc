//! The finished covering array.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::{Cell, IpogError, Parameter, Result, Row, DONT_CARE_SYMBOL};

/// Read-only result of a generation run: the parameters and one row per test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoveringArray {
    parameters: Vec<Parameter>,
    rows: Vec<Row>,
    columns_by_name: HashMap<String, usize>,
}

impl CoveringArray {
    /// Fails with [`IpogError::WrongLength`] if a row does not have one cell
    /// per parameter.
    pub fn new(parameters: Vec<Parameter>, rows: Vec<Row>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != parameters.len()) {
            return Err(IpogError::WrongLength {
                expected: parameters.len(),
                actual: row.len(),
            });
        }
        let columns_by_name = parameters
            .iter()
            .enumerate()
            .map(|(column, p)| (p.name.clone(), column))
            .collect();
        Ok(Self {
            parameters,
            rows,
            columns_by_name,
        })
    }

    #[inline]
    pub fn number_of_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn number_of_columns(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, column: usize) -> &Parameter {
        &self.parameters[column]
    }

    pub fn parameter_name(&self, column: usize) -> &str {
        &self.parameters[column].name
    }

    /// Column of the parameter called `name`.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.columns_by_name.get(name).copied()
    }

    /// Raw cells, one row per test.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.rows[row][column]
    }

    /// Value of a cell, `None` for a don't-care.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.cell(row, column).and_then(|v| self.parameters[column].value(v))
    }

    pub fn value_by_name(&self, row: usize, name: &str) -> Option<&str> {
        self.column_of(name).and_then(|column| self.value(row, column))
    }

    /// Value of a cell; a don't-care becomes a uniformly random value of the
    /// column's domain.
    pub fn value_or_random<R: Rng + ?Sized>(&self, row: usize, column: usize, rng: &mut R) -> &str {
        let parameter = &self.parameters[column];
        let index = match self.cell(row, column) {
            Some(v) => v,
            None => rng.gen_range(0..parameter.size()),
        };
        &parameter.values[index]
    }

    /// Rendered text of a cell: the value, or the don't-care symbol.
    fn text(&self, row: usize, column: usize) -> String {
        self.value(row, column)
            .map_or_else(|| DONT_CARE_SYMBOL.to_string(), str::to_string)
    }

    /// Every row as ordered (parameter name, value) pairs. With an `rng`,
    /// don't-cares are randomized; otherwise they render as the symbol.
    pub fn records<R: Rng + ?Sized>(&self, mut rng: Option<&mut R>) -> Vec<Vec<(String, String)>> {
        (0..self.number_of_rows())
            .map(|row| {
                (0..self.number_of_columns())
                    .map(|column| {
                        let value = match rng.as_deref_mut() {
                            Some(rng) => self.value_or_random(row, column, rng).to_string(),
                            None => self.text(row, column),
                        };
                        (self.parameter_name(column).to_string(), value)
                    })
                    .collect()
            })
            .collect()
    }

    /// Header line of parameter names, then one line per test. Don't-cares
    /// are written as `*`.
    pub fn to_csv(&self) -> String {
        self.csv_with(|row, column| self.text(row, column))
    }

    /// Like [`CoveringArray::to_csv`], with don't-cares replaced by random
    /// values.
    pub fn to_csv_randomized<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.csv_with(|row, column| self.value_or_random(row, column, rng).to_string())
    }

    fn csv_with(&self, mut cell: impl FnMut(usize, usize) -> String) -> String {
        let mut out = String::new();
        let header: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in 0..self.number_of_rows() {
            let line: Vec<String> = (0..self.number_of_columns()).map(|column| cell(row, column)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CoveringArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..self.number_of_rows() {
            write!(f, "[")?;
            for column in 0..self.number_of_columns() {
                if column > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{{\"{}\"=\"{}\"}}", self.parameter_name(column), self.text(row, column))?;
            }
            write!(f, "]")?;
            if row + 1 < self.number_of_rows() {
                writeln!(f, ",")?;
            }
        }
        write!(f, "]")
    }
}

impl Serialize for CoveringArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CoveringArray", 2)?;
        state.serialize_field("parameters", &self.parameters)?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> CoveringArray {
        CoveringArray::new(
            vec![
                Parameter::new("os", ["linux", "mac"]),
                Parameter::new("jre", [11, 17, 21]),
            ],
            vec![vec![Some(0), Some(2)], vec![Some(1), None]],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = CoveringArray::new(
            vec![Parameter::new("os", ["linux", "mac"]), Parameter::new("jre", [11, 17])],
            vec![vec![Some(0), Some(1)], vec![Some(1)]],
        )
        .unwrap_err();
        assert_eq!(err, IpogError::WrongLength { expected: 2, actual: 1 });
    }

    #[test]
    fn test_lookup() {
        let array = sample();
        assert_eq!(array.number_of_rows(), 2);
        assert_eq!(array.number_of_columns(), 2);
        assert_eq!(array.value(0, 1), Some("21"));
        assert_eq!(array.value(1, 1), None);
        assert_eq!(array.value_by_name(1, "os"), Some("mac"));
        assert_eq!(array.value_by_name(1, "ide"), None);
        assert_eq!(array.column_of("jre"), Some(1));
        assert_eq!(array.parameter(1).size(), 3);
    }

    #[test]
    fn test_csv() {
        let array = sample();
        assert_eq!(array.to_csv(), "os,jre\nlinux,21\nmac,*\n");
        let mut rng = StdRng::seed_from_u64(3);
        let randomized = array.to_csv_randomized(&mut rng);
        let last = randomized.lines().nth(2).unwrap();
        assert!(["mac,11", "mac,17", "mac,21"].contains(&last));
    }

    #[test]
    fn test_records() {
        let array = sample();
        let records = array.records::<StdRng>(None);
        assert_eq!(records[1][1], ("jre".to_string(), "*".to_string()));
        let mut rng = StdRng::seed_from_u64(5);
        let records = array.records(Some(&mut rng));
        assert_ne!(records[1][1].1, "*");
        assert_eq!(records[0][0], ("os".to_string(), "linux".to_string()));
    }

    #[test]
    fn test_display_and_json() {
        let array = sample();
        assert_eq!(
            array.to_string(),
            "[[{\"os\"=\"linux\"}, {\"jre\"=\"21\"}],\n[{\"os\"=\"mac\"}, {\"jre\"=\"*\"}]]"
        );
        let json = serde_json::to_value(&array).unwrap();
        assert_eq!(json["rows"][1][1], serde_json::Value::Null);
        assert_eq!(json["parameters"][0]["name"], "os");
    }
}
