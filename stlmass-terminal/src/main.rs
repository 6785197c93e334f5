/// stlmass - estimate the printed volume and weight of a binary STL
///
/// Prints the estimate, then shows the mesh in the terminal.
/// Controls:
///   - WASD / Arrow Keys: Orbit
///   - E/R: Roll
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use stlmass_core::{estimate_buffer, EstimatorConfig, HeaderCheck, Mesh, StlBuffer};
use stlmass_terminal::TerminalApp;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stlmass", version, about = "Estimate print volume and weight of a binary STL")]
struct Args {
    /// Binary STL file (millimeter units)
    file: Option<PathBuf>,

    /// Material density in g/cm³ [default: 1.24, PLA]
    #[arg(long)]
    density: Option<f64>,

    /// TOML file with estimator settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trust the file length when the header triangle count disagrees
    #[arg(long)]
    ignore_header_count: bool,

    /// Print the estimate without opening the viewer
    #[arg(long)]
    no_view: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let Some(path) = args.file.as_deref() else {
        println!("No STL file given, nothing to estimate. Usage: stlmass <file.stl>");
        return Ok(());
    };

    let config = load_config(&args)?;
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let buffer = StlBuffer::new(&data, config.header_check)
        .with_context(|| format!("{} is not a valid binary STL", path.display()))?;
    let estimate = estimate_buffer(&buffer, &config)
        .with_context(|| format!("{} is not a valid binary STL", path.display()))?;

    println!("{}: {} triangles", path.display(), estimate.triangle_count);
    println!("Volume: {} cm³", estimate.volume_text());
    println!("Weight: {} g", estimate.weight_text());

    if args.no_view {
        return Ok(());
    }

    let mesh = Mesh::from_triangles(buffer.triangles())?;

    let mut app = TerminalApp::new(mesh, estimate, file_title(path))?;
    app.run()?;

    Ok(())
}

/// Config file first, then command-line overrides
fn load_config(args: &Args) -> Result<EstimatorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EstimatorConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EstimatorConfig::default(),
    };

    if let Some(density) = args.density {
        config = config.with_density(density)?;
    }
    if args.ignore_header_count {
        config = config.with_header_check(HeaderCheck::Ignore);
    }

    tracing::debug!(?config, "loaded estimator config");
    Ok(config)
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::parse_from(["stlmass", "part.stl", "--density", "1.04", "--ignore-header-count"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.density_g_per_cm3, 1.04);
        assert_eq!(config.header_check, HeaderCheck::Ignore);
    }

    #[test]
    fn test_negative_density_rejected() {
        let args = Args::parse_from(["stlmass", "part.stl", "--density=-2"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_file_title() {
        assert_eq!(file_title(Path::new("/tmp/parts/bracket.stl")), "bracket.stl");
    }
}
