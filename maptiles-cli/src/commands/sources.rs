//! Sources command - list configured map sources.

use maptiles::source::MapSourceConfig;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the sources command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("sources");
    let sources = runner.load_sources()?;

    println!("Map sources from {}:", runner.maps_conf().display());
    println!();
    if sources.is_empty() {
        println!("  (none)");
    }
    for source in &sources {
        print!("{}", describe(source));
    }
    Ok(())
}

/// Multi-line description of one source.
fn describe(source: &MapSourceConfig) -> String {
    let mut out = format!("  {:<10} {}\n", source.name, source.title);
    out.push_str(&format!(
        "             zoom {}-{}, {}x{} px, {} thread(s)\n",
        source.zoom_min, source.zoom_max, source.tile_size_x, source.tile_size_y, source.threads
    ));
    out.push_str(&format!("             {}\n", source.download_url));
    if !source.attribution.is_empty() {
        out.push_str(&format!("             {}\n", source.attribution));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_source() {
        let text = describe(&MapSourceConfig::opentopomap());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0].split_whitespace().collect::<Vec<_>>(),
            vec!["otm", "OpenTopoMap"]
        );
        assert!(lines[1].contains("zoom 0-17"));
        assert!(lines[1].contains("3 thread(s)"));
        assert!(lines[2].contains("{s}.tile.opentopomap.org"));
    }
}
