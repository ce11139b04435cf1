//! Example running the full dream pipeline over an image file.
//!
//! Usage: `cargo run --example dream -- <input> [weights] [output] [config]`
//!
//! When no weights file is given, a randomly initialised backbone is used;
//! the output is still a valid dream, just an untrained one.

use std::time::Instant;

use burn::backend::{Autodiff, NdArray};
use image::DynamicImage;

use deep_dream::{DreamEngine, DreamParams, GoogleNet, GoogleNetConfig};

type Backend = Autodiff<NdArray>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let input_path = args.get(1).map(String::as_str).unwrap_or("test_assets/input.png");
    let weights_path = args.get(2).map(String::as_str);
    let output_path = args.get(3).map(String::as_str).unwrap_or("dream.png");

    let params = match args.get(4) {
        Some(config_path) => DreamParams::load_from_file(config_path)?,
        None => DreamParams::default(),
    };

    let image: DynamicImage = image::open(input_path)?;
    println!(
        "Loaded {} ({}x{})",
        input_path,
        image.width(),
        image.height()
    );

    let device = Default::default();
    let net: GoogleNet<Backend> = match weights_path {
        Some(path) => GoogleNet::load_file(path, &device)?,
        None => {
            println!("No weights file given, using a randomly initialised backbone");
            GoogleNetConfig::new().init(&device)
        }
    };

    let mut engine = DreamEngine::new(net, &params.layers, device)?;

    let start_time = Instant::now();
    let dream = engine.run(&image, &params)?;
    let elapsed_time = start_time.elapsed();

    dream.save(output_path)?;
    println!(
        "Dreamed {} levels x {} epochs in {:.2?}, saved to {}",
        params.inception_count, params.epochs, elapsed_time, output_path
    );

    Ok(())
}
