//! Basic example of using the covering array engine

use std::time::Instant;

use ipog_core::verify::is_strength_covered;
use ipog_core::{BaseAlgorithm, Generator, IpogError, Parameter, RunConfiguration};
use rand::thread_rng;

fn main() -> Result<(), IpogError> {
    let parameters = vec![
        Parameter::new("JRE", [7, 8, 11, 17]),
        Parameter::new("OS", ["linux", "mac", "windows"]),
        Parameter::new("JDK", ["oracle", "openjdk", "corretto", "graalvm"]),
        Parameter::new("Build", ["ant", "maven", "gradle"]),
        Parameter::new("IDE", ["intellij", "eclipse", "vsc", "netbeans"]),
        Parameter::new("JUnit", ["3.1.3", "4.3.1", "5.8.2"]),
        Parameter::new("Dev Mode", [true, false]),
    ];
    let config = RunConfiguration::builder(parameters, 3, BaseAlgorithm::IpogF)
        .enhance_horizontal(true)
        .adapt_vertical()
        .build();

    println!("Generating a 3-way covering array...\n");
    let started = Instant::now();
    let array = Generator::new(config)?.generate()?;
    println!("Runtime: {} ms", started.elapsed().as_millis());
    println!("Rows: {}", array.number_of_rows());
    println!("Covers strength 3: {}\n", is_strength_covered(&array, 3));

    print!("{}", array.to_csv_randomized(&mut thread_rng()));
    Ok(())
}
