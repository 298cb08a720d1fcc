//! End-to-end generation across algorithms and options.

use ipog_core::verify::{compute_strength, is_strength_covered};
use ipog_core::{parse_domain_sizes, BaseAlgorithm, Generator, Parameter, RunConfiguration};

fn build(parameters: Vec<Parameter>, strength: usize, algorithm: BaseAlgorithm, annealing: Option<bool>, coloring: bool) -> RunConfiguration {
    let mut builder = RunConfiguration::builder(parameters, strength, algorithm).seed(17);
    if let Some(full) = annealing {
        builder = builder.enhance_horizontal(full);
    }
    if coloring {
        builder = builder.adapt_vertical();
    }
    builder.build()
}

#[test]
fn test_binary_pairwise_baseline() {
    let parameters = parse_domain_sizes("2^4").unwrap();
    let config = build(parameters, 2, BaseAlgorithm::Ipog, None, false);
    let array = Generator::new(config).unwrap().generate().unwrap();
    assert!(array.number_of_rows() >= 4);
    assert!(array.number_of_rows() <= 16);
    assert!(is_strength_covered(&array, 2));
}

#[test]
fn test_every_option_combination_covers() {
    let annealing_options = [None, Some(false), Some(true)];
    for algorithm in BaseAlgorithm::ALL {
        for annealing in annealing_options {
            for coloring in [false, true] {
                for (expression, strength) in [("3^3,2^3", 2), ("2^5,3^1", 3)] {
                    let parameters = parse_domain_sizes(expression).unwrap();
                    let config = build(parameters, strength, algorithm, annealing, coloring);
                    let array = Generator::new(config).unwrap().generate().unwrap();
                    assert!(
                        is_strength_covered(&array, strength),
                        "{algorithm} annealing={annealing:?} coloring={coloring} {expression} t={strength}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_strength_one() {
    let parameters = parse_domain_sizes("4^1,3^2").unwrap();
    for algorithm in BaseAlgorithm::ALL {
        let config = build(parameters.clone(), 1, algorithm, Some(false), false);
        let array = Generator::new(config).unwrap().generate().unwrap();
        assert!(is_strength_covered(&array, 1), "{algorithm}");
        assert!(array.number_of_rows() >= 4);
    }
}

#[test]
fn test_mixed_order_keeps_parameter_positions() {
    let parameters = vec![
        Parameter::new("JRE", [7, 8, 11, 17]),
        Parameter::new("OS", ["linux", "mac", "windows"]),
        Parameter::new("JDK", ["oracle", "openjdk", "corretto", "graalvm"]),
        Parameter::new("Build", ["ant", "maven", "gradle"]),
        Parameter::new("IDE", ["intellij", "eclipse", "vsc", "netbeans"]),
        Parameter::new("JUnit", ["3.1.3", "4.3.1", "5.8.2"]),
        Parameter::new("Dev Mode", [true, false]),
    ];
    let config = build(parameters.clone(), 3, BaseAlgorithm::IpogF, Some(true), true);
    let array = Generator::new(config).unwrap().generate().unwrap();
    assert_eq!(array.parameters(), parameters.as_slice());
    assert!(is_strength_covered(&array, 3));
    // 4 * 4 * 4 is the floor for the three largest domains
    assert!(array.number_of_rows() >= 64);
    for row in 0..array.number_of_rows() {
        if let Some(value) = array.value_by_name(row, "Dev Mode") {
            assert!(value == "true" || value == "false");
        }
    }
}

#[test]
fn test_seeded_annealing_is_reproducible() {
    let run = || {
        let parameters = parse_domain_sizes("3^4,2^2").unwrap();
        let config = build(parameters, 2, BaseAlgorithm::Ipog, Some(true), false);
        Generator::new(config).unwrap().generate().unwrap()
    };
    assert_eq!(run().rows(), run().rows());
}

#[test]
fn test_deterministic_without_annealing() {
    let parameters = parse_domain_sizes("4^2,3^3,2^4").unwrap();
    let config = RunConfiguration::builder(parameters, 2, BaseAlgorithm::IpogF2).build();
    let first = Generator::new(config.clone()).unwrap().generate().unwrap();
    let second = Generator::new(config).unwrap().generate().unwrap();
    assert_eq!(first.rows(), second.rows());
}

#[test]
fn test_generated_array_strength() {
    let parameters = parse_domain_sizes("2^6").unwrap();
    let config = build(parameters, 3, BaseAlgorithm::IpogF, None, true);
    let array = Generator::new(config).unwrap().generate().unwrap();
    assert!(compute_strength(&array) >= 3);
}

#[test]
fn test_csv_export_shape() {
    let parameters = parse_domain_sizes("3^2,2^2").unwrap();
    let config = build(parameters, 2, BaseAlgorithm::Ipog, None, false);
    let array = Generator::new(config).unwrap().generate().unwrap();
    let csv = array.to_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("p0,p1,p2,p3"));
    assert_eq!(lines.count(), array.number_of_rows());
    for line in csv.lines().skip(1) {
        assert_eq!(line.split(',').count(), 4);
    }
}
