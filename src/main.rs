use clap::Parser;
use iplogic::Ipv4Cidr;
use log::{info, warn, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process;

/// Describes IPv4 CIDR blocks: netmask, bounds, size and reverse zone.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Blocks such as `10.0.1/24` or `10.0.0.0/255.0.0.0`. Read from stdin, one per line, when empty.
    blocks: Vec<String>,

    /// Print every address of each block after its summary
    #[arg(short, long)]
    list: bool,

    /// Raise log verbosity, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn describe(out: &mut impl Write, net: &Ipv4Cidr, list: bool) -> io::Result<()> {
    writeln!(out, "{}", net)?;
    writeln!(out, "  netmask {}", net.netmask())?;
    writeln!(out, "  min     {}", net.min())?;
    writeln!(out, "  max     {}", net.max())?;
    writeln!(out, "  size    {}", net.size())?;
    writeln!(out, "  rest    {}", net.rest_field())?;
    writeln!(out, "  zone    {}", net.zone())?;
    if list {
        for addr in net {
            writeln!(out, "{}", addr)?;
        }
    }
    Ok(())
}

/// Describes each non-blank line as a block, skipping and logging the ones
/// that cannot be read or parsed. Returns whether any line was skipped.
fn describe_lines<I>(lines: I, out: &mut impl Write, list: bool) -> io::Result<bool>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut failed = false;
    for (n, line) in lines.into_iter().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("skipping line {}: {}", n + 1, e);
                failed = true;
                continue;
            }
            Err(e) => return Err(e),
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match text.parse::<Ipv4Cidr>() {
            Ok(net) => describe(out, &net, list)?,
            Err(e) => {
                warn!("skipping {:?}: {}", text, e);
                failed = true;
            }
        }
    }
    Ok(failed)
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::parse();
    init_logging(opts.verbose)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failed = if opts.blocks.is_empty() {
        info!("reading blocks from stdin");
        describe_lines(io::stdin().lock().lines(), &mut out, opts.list)?
    } else {
        describe_lines(opts.blocks.into_iter().map(Ok), &mut out, opts.list)?
    };
    out.flush()?;

    if failed {
        process::exit(1);
    }
    Ok(())
}
