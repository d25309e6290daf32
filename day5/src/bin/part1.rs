use anyhow::Result;
use day5::Inventory;
use util::{init_tracing, read_input_as_string};

fn main() -> Result<()> {
    init_tracing();

    let inventory: Inventory = read_input_as_string()?.parse()?;

    println!("{}", inventory.count_fresh());

    Ok(())
}
