use std::path::PathBuf;
use std::process;

use getopts::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write an iCalendar document.
    File,
    /// Create events on a Google calendar.
    Remote,
    /// Print the extraction result only.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub mode: Mode,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub calendar_id: Option<String>,
    pub form_encoded: bool,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "o",
        "output",
        "Write the calendar file here instead of stdout",
        "FILE",
    );
    opts.optflag(
        "r",
        "remote",
        "Create events on Google Calendar instead of writing a file",
    );
    opts.optopt(
        "c",
        "calendar",
        "Target calendar for --remote [Default: $CALENDAR_ID or primary]",
        "ID",
    );
    opts.optflag("", "raw", "Only print the extracted dates as JSON");
    opts.optflag(
        "f",
        "form-encoded",
        "Decode '+' and %XX escapes in the outline before prompting",
    );
    opts
}

fn usage(opts: &Options) -> String {
    let brief = format!("Usage: {} [options] [OUTLINE_FILE]", env!("CARGO_PKG_NAME"));
    opts.usage(&brief)
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args.iter().skip(1)) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", usage(&opts));
        process::exit(0);
    }

    let mode = match (matches.opt_present("remote"), matches.opt_present("raw")) {
        (true, true) => {
            eprintln!("Options 'remote' and 'raw' cannot be combined");
            process::exit(1);
        }
        (true, false) => Mode::Remote,
        (false, true) => Mode::Raw,
        (false, false) => Mode::File,
    };

    if matches.free.len() > 1 {
        eprintln!("{}", usage(&opts));
        process::exit(1);
    }

    Args {
        mode,
        input: matches.free.first().map(PathBuf::from),
        output: matches.opt_str("output").map(PathBuf::from),
        calendar_id: matches.opt_str("calendar"),
        form_encoded: matches.opt_present("form-encoded"),
    }
}
