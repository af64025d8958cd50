pub mod analyze;
pub mod batch;
pub mod nodes;

/// Serialize a value as pretty-printed JSON and print it to stdout.
fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
