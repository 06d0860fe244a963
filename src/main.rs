use std::env;

use log::debug;

use chefai::{generate_recipe, Recipe};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get the ingredient list from command-line arguments
    let args: Vec<String> = env::args().collect();
    let ingredients = args
        .get(1)
        .ok_or("Please provide a comma-separated ingredient list as an argument")?;

    let recipe: Recipe = generate_recipe(ingredients).await;
    debug!("{:#?}", recipe);

    println!("{}", serde_json::to_string_pretty(&recipe)?);

    Ok(())
}
