use anyhow::Result;
use day5::Inventory;
use util::{init_tracing, read_input_file};

const INPUT_PATH: &str = "input/input.txt";

fn main() -> Result<()> {
    init_tracing();

    println!("AOC 2025 - Day 5");

    let inventory: Inventory = read_input_file(INPUT_PATH)?.parse()?;

    println!("{}", inventory.report());

    Ok(())
}
