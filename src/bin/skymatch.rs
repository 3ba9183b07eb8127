use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{ArgMatches, Command};
use skymatch::{cmdline, records, Engine};

fn main() -> Result<(), anyhow::Error> {
    #[cfg(feature = "cli-logging")]
    env_logger::init();

    let cmd = Command::new("skymatch")
        .about("Spherical point-catalog radius matching engine")
        .version("0.1.0");

    let cmd = cmdline::add_primary_arg(cmd);
    let cmd = cmdline::add_secondary_arg(cmd);
    let cmd = cmdline::add_nside_arg(cmd);
    let cmd = cmdline::add_max_match_arg(cmd);
    let cmd = cmdline::add_matching_self_arg(cmd);

    let match_subcmd = Command::new("match").about("Match and print records to stdout");
    let match_to_file_subcmd = Command::new("match-to-file").about("Match and write records to a file");
    let match_to_file_subcmd = cmdline::add_output_arg(match_to_file_subcmd);

    let cmd = cmd.subcommand(match_subcmd);
    let cmd = cmd.subcommand(match_to_file_subcmd);

    let matches = cmd.get_matches();

    let primary_filename: PathBuf = cmdline::primary(&matches).into();
    let secondary_filename: PathBuf = cmdline::secondary(&matches).into();
    let nside = cmdline::nside(&matches);
    let max_match = cmdline::max_match(&matches);
    let matching_self = cmdline::matching_self(&matches);

    let (ra1, dec1, radius1) = load_primary(&primary_filename)?;
    let (ra2, dec2) = load_secondary(&secondary_filename)?;

    let mut engine = Engine::new(nside, &ra1, &dec1, &radius1)
        .with_context(|| format!("building catalog from {}", primary_filename.display()))?;

    match matches.subcommand() {
        Some(("match-to-file", sub_matches)) => {
            match_to_file(&mut engine, max_match, matching_self, &ra2, &dec2, sub_matches)?;
        }
        Some(("match", _)) | None => {
            print_match(&mut engine, max_match, matching_self, &ra2, &dec2)?;
        }
        _ => return Err(anyhow!("unknown subcommand")),
    }
    Ok(())
}

fn print_match(
    engine: &mut Engine,
    max_match: i64,
    matching_self: bool,
    ra2: &[f64],
    dec2: &[f64],
) -> Result<(), anyhow::Error> {
    engine.match_(max_match, matching_self, ra2, dec2)?;
    let mut out = Vec::new();
    engine.copy_matches(&mut out);
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    let stdout_path = Path::new("<stdout>");
    for m in &out {
        records::write_record(&mut writer, m, stdout_path)?;
    }
    eprintln!("{} matches", engine.nmatches());
    Ok(())
}

fn match_to_file(
    engine: &mut Engine,
    max_match: i64,
    matching_self: bool,
    ra2: &[f64],
    dec2: &[f64],
    matches: &ArgMatches,
) -> Result<(), anyhow::Error> {
    let output_filename: PathBuf = cmdline::output(matches).into();
    engine.match_to_file(max_match, matching_self, ra2, dec2, &output_filename)?;
    eprintln!(
        "{} matches written to {}",
        engine.nmatches(),
        output_filename.display()
    );
    Ok(())
}

//fp load_primary
/// Load a primary catalog file: one `id ra_deg dec_deg radius_deg` per line
///
/// The leading `id` column is consumed and discarded; the engine indexes
/// primary entries positionally (0-based), not by this column.
fn load_primary(path: &std::path::Path) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading primary catalog {}", path.display()))?;
    let mut ra = Vec::new();
    let mut dec = Vec::new();
    let mut radius = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(_id), Some(r), Some(d), Some(rad)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(anyhow!(
                "{}:{}: expected 'id ra dec radius'",
                path.display(),
                lineno + 1
            ));
        };
        ra.push(r.parse::<f64>()?);
        dec.push(d.parse::<f64>()?);
        radius.push(rad.parse::<f64>()?);
    }
    Ok((ra, dec, radius))
}

//fp load_secondary
/// Load a secondary catalog file: one `id ra_deg dec_deg` per line
///
/// The leading `id` column is consumed and discarded; the engine indexes
/// secondary entries positionally (0-based), not by this column.
fn load_secondary(path: &std::path::Path) -> Result<(Vec<f64>, Vec<f64>), anyhow::Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading secondary catalog {}", path.display()))?;
    let mut ra = Vec::new();
    let mut dec = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(_id), Some(r), Some(d)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(anyhow!(
                "{}:{}: expected 'id ra dec'",
                path.display(),
                lineno + 1
            ));
        };
        ra.push(r.parse::<f64>()?);
        dec.push(d.parse::<f64>()?);
    }
    Ok((ra, dec))
}
