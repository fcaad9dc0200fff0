//! Build script for the listenlens dashboard.
//!
//! Copies the `.env.example` configuration template into the user's local data
//! directory (`<data_local_dir>/listenlens/.env.example`) so a fresh install has
//! a ready-to-edit template next to the place where `config::load_env` looks for
//! the real `.env` file.
//!
//! A missing template only produces a cargo warning; directory or write failures
//! abort the build.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("listenlens");
    fs::create_dir_all(&out_dir)?;

    if template.is_file() {
        fs::copy(&template, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
    }

    Ok(())
}
