//! Covering array generation with the In-Parameter-Order (IPOG) family of
//! strategies.
//!
//! A covering array of strength `t` is a set of test rows in which every
//! combination of values of any `t` parameters occurs at least once. The
//! [`Generator`] builds one column at a time: a horizontal step fills the new
//! parameter into existing rows, an optional annealing pass perturbs the
//! result, and a vertical step reuses or appends rows for whatever is still
//! uncovered.
//!
//! ```no_run
//! use ipog_core::{BaseAlgorithm, Generator, Parameter, RunConfiguration};
//!
//! let parameters = vec![
//!     Parameter::new("os", ["linux", "mac", "windows"]),
//!     Parameter::new("jre", [11, 17, 21]),
//!     Parameter::new("debug", [true, false]),
//! ];
//! let config = RunConfiguration::builder(parameters, 2, BaseAlgorithm::IpogF)
//!     .adapt_vertical()
//!     .build();
//! let array = Generator::new(config)?.generate()?;
//! print!("{}", array.to_csv());
//! # Ok::<(), ipog_core::IpogError>(())
//! ```

pub mod annealing;
pub mod array;
pub mod bitset;
pub mod combinatorics;
pub mod config;
pub mod coverage;
pub mod error;
pub mod generator;
pub mod graph;
pub mod parameter;
pub mod parser;
pub mod strategy;
pub mod table;
pub mod verify;
pub mod vertical;

pub use array::CoveringArray;
pub use config::{BaseAlgorithm, RunConfiguration, RunConfigurationBuilder};
pub use error::{ErrorKind, IpogError, Result};
pub use generator::Generator;
pub use parameter::{Cell, Parameter, Row, DONT_CARE_SYMBOL};
pub use parser::{parse_domain_sizes, ParseError};
