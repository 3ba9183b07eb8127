//! Flag declarations for the `skymatch` demonstration binary, in the
//! teacher's one-function-pair-per-flag style: `add_x_arg` registers the
//! flag on a [Command], `x` pulls its value back out of the [ArgMatches].

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

//fp add_primary_arg
pub fn add_primary_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("primary")
            .long("primary")
            .short('p')
            .required(true)
            .help("Primary catalog file: one 'id ra_deg dec_deg radius_deg' per line")
            .action(ArgAction::Set),
    )
}
pub fn primary(matches: &ArgMatches) -> String {
    matches.get_one::<String>("primary").unwrap().to_string()
}

//fp add_secondary_arg
pub fn add_secondary_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("secondary")
            .long("secondary")
            .short('s')
            .required(true)
            .help("Secondary catalog file: one 'id ra_deg dec_deg' per line")
            .action(ArgAction::Set),
    )
}
pub fn secondary(matches: &ArgMatches) -> String {
    matches.get_one::<String>("secondary").unwrap().to_string()
}

//fp add_nside_arg
pub fn add_nside_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("nside")
            .long("nside")
            .short('n')
            .help("HEALPix nside (must be a positive power of two)")
            .value_parser(value_parser!(i64))
            .action(ArgAction::Set),
    )
}
pub fn nside(matches: &ArgMatches) -> i64 {
    *matches.get_one::<i64>("nside").unwrap_or(&4096)
}

//fp add_max_match_arg
pub fn add_max_match_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("max_match")
            .long("max-match")
            .short('m')
            .help("Maximum matches retained per primary point (<=0 means unbounded)")
            .value_parser(value_parser!(i64))
            .action(ArgAction::Set),
    )
}
pub fn max_match(matches: &ArgMatches) -> i64 {
    *matches.get_one::<i64>("max_match").unwrap_or(&0)
}

//fp add_matching_self_arg
pub fn add_matching_self_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("matching_self")
            .long("matching-self")
            .help("Skip a candidate whose secondary index equals the primary index")
            .action(ArgAction::SetTrue),
    )
}
pub fn matching_self(matches: &ArgMatches) -> bool {
    matches.get_flag("matching_self")
}

//fp add_output_arg
pub fn add_output_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("output")
            .long("output")
            .short('o')
            .required(true)
            .help("Output file for the match records")
            .action(ArgAction::Set),
    )
}
pub fn output(matches: &ArgMatches) -> String {
    matches.get_one::<String>("output").unwrap().to_string()
}
