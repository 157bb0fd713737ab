//! Two-stage lesion prediction example.
//!
//! Loads both models, runs the cascade on one or more images, and prints each
//! result as pretty JSON.
//!
//! ```bash
//! cargo run --example predict -- \
//!     --category-model models/lesion_category.onnx \
//!     --species-checkpoint models/insect_species/checkpoint.json \
//!     photo1.jpg photo2.jpg
//! ```

use clap::Parser;
use skin_triage::core::{init_tracing, OrtSessionOptions};
use skin_triage::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-stage skin lesion classification")]
struct Args {
    /// Path to the category classifier ONNX model
    #[arg(long)]
    category_model: PathBuf,

    /// Path to the species checkpoint JSON manifest
    #[arg(long)]
    species_checkpoint: PathBuf,

    /// Number of intra-op threads for ONNX Runtime
    #[arg(long)]
    threads: Option<usize>,

    /// Image files to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut options = OrtSessionOptions::new();
    if let Some(threads) = args.threads {
        options = options.with_intra_threads(threads);
    }

    let registry = ModelRegistryBuilder::new()
        .category_model_path(&args.category_model)
        .species_checkpoint_path(&args.species_checkpoint)
        .ort_options(options)
        .build()?;
    let cascade = PredictionCascade::new(std::sync::Arc::new(registry));

    for image in &args.images {
        let report = cascade.predict(image);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
