//! Line-oriented match record I/O: the exact `<primary> <secondary> <cosdist>`
//! grammar of §6, plus the line-counting utility used to size a read buffer
//! before loading matches back in.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::{Error, Match};

//fp write_record
/// Write one match record as `%ld %ld %.16g\n`
///
/// Rust's `{:e}`/`{}` formatters don't reproduce glibc's `%.16g` directly,
/// so the shortest-representation choice `%g` makes is reproduced by hand:
/// 16 significant digits, falling back to the plain decimal form unless
/// the magnitude calls for scientific notation.
pub fn write_record<W: Write>(w: &mut W, m: &Match, path: &Path) -> Result<(), Error> {
    writeln!(
        w,
        "{} {} {}",
        m.primary_index,
        m.secondary_index,
        format_g16(m.cosdist)
    )
    .map_err(|e| Error::io(path, e))
}

//fp format_g16
/// Format `v` the way glibc's `printf("%.16g", v)` would: 16 significant
/// digits, in whichever of fixed or exponential notation is shorter, with
/// no trailing zeros
fn format_g16(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    let s = if !(-4..16).contains(&exp) {
        let mut s = format!("{v:.15e}");
        // Rust renders `1.234e5`; glibc renders `1.234e+05`
        if let Some(epos) = s.find('e') {
            let (mantissa, exp_part) = s.split_at(epos);
            let exp_val: i32 = exp_part[1..].parse().unwrap_or(0);
            let mantissa = trim_trailing_zeros(mantissa);
            s = format!("{mantissa}e{:+03}", exp_val);
        }
        s
    } else {
        let decimals = (15 - exp).max(0) as usize;
        let s = format!("{v:.decimals$}");
        trim_trailing_zeros(&s)
    };
    s
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

//fp read_record
/// Parse one `<primary> <secondary> <cosdist>` line
///
/// A short (fewer than 3 whitespace-separated fields) or unparsable line
/// surfaces as [Error::IoError] (see §7: a short scan in `load_matches` is
/// an I/O error, not a distinct kind).
fn read_record(line: &str, path: &Path, lineno: usize) -> Result<Match, Error> {
    let mut fields = line.split_whitespace();
    let primary_index = fields.next();
    let secondary_index = fields.next();
    let cosdist = fields.next();
    let (Some(p), Some(s), Some(c)) = (primary_index, secondary_index, cosdist) else {
        let got = [primary_index, secondary_index, cosdist]
            .iter()
            .filter(|x| x.is_some())
            .count();
        return Err(Error::short_read(path, lineno, got));
    };
    let primary_index: i64 = p
        .parse()
        .map_err(|_| Error::short_read(path, lineno, 1))?;
    let secondary_index: i64 = s
        .parse()
        .map_err(|_| Error::short_read(path, lineno, 2))?;
    let cosdist: f64 = c
        .parse()
        .map_err(|_| Error::short_read(path, lineno, 3))?;
    Ok(Match {
        primary_index,
        secondary_index,
        cosdist,
    })
}

//fp load_matches
/// Read every match record from `path`, in order
pub fn load_matches(path: impl AsRef<Path>) -> Result<Vec<Match>, Error> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = std::io::BufReader::new(file);
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(read_record(&line, path, i + 1)?);
    }
    Ok(out)
}

//fp count_lines
/// Count the `\n` bytes in `path`
///
/// A trailing line with no terminating newline is not counted, matching
/// the original `count_lines`'s byte-scan semantics.
pub fn count_lines(path: impl AsRef<Path>) -> Result<i64, Error> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(data.iter().filter(|&&b| b == b'\n').count() as i64)
}

//fp write_json
/// Write match records as pretty-printed JSON, an alternative to the §6
/// line grammar for callers that want a self-describing, structured dump
pub fn write_json(path: impl AsRef<Path>, records: &[Match]) -> Result<(), Error> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(records)
        .map_err(|e| Error::InternalError(format!("serializing match records: {e}")))?;
    std::fs::write(path, s).map_err(|e| Error::io(path, e))
}

//fp read_json
/// Read match records back from the JSON form written by [write_json]
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<Match>, Error> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&s)
        .map_err(|e| Error::InternalError(format!("parsing match records: {e}")))
}
