//! Locales command - list selectable locales and the current preferred set

use anyhow::Result;
use console::{style, Term};
use polyscribe_core::{locale, Config, WhisperRecognizer};

pub fn list(config: &Config) -> Result<()> {
    let term = Term::stdout();

    let mut supported = WhisperRecognizer::locale_catalog();
    supported.sort();

    let options = locale::common_options(&supported);
    if options.is_empty() {
        term.write_line("No selectable locales available.")?;
        return Ok(());
    }

    let preferred = if config.preferred_locales.is_empty() {
        locale::default_preferred_set(&supported)
    } else {
        config.preferred_locales.clone()
    };

    term.write_line(&format!("{}", style("Selectable Locales").bold()))?;
    term.write_line("")?;

    for option in &options {
        let selected = if preferred.contains(&option.identifier) {
            style("✓").green()
        } else {
            style("○").dim()
        };

        term.write_line(&format!(
            "  {} {:8} {}",
            selected,
            style(&option.identifier).dim(),
            option.display_name
        ))?;
    }

    term.write_line("")?;
    if config.preferred_locales.is_empty() {
        term.write_line(&format!(
            "{} No preferred locales configured; showing defaults.",
            style("ℹ").blue()
        ))?;
    }
    term.write_line(&format!(
        "Run {} to change the preferred set",
        style("polyscribe config add-locale <id>").cyan()
    ))?;

    Ok(())
}
