use anyhow::Result;
use is_terminal::IsTerminal;
use std::io;
use setwise::operations::calculate;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = setwise::args::parsed()?;

    let stdout = io::stdout();
    if stdout.is_terminal() {
        calculate(args.op, &args.files, &args.output, stdout.lock())?;
    } else {
        calculate(args.op, &args.files, &args.output, io::BufWriter::new(stdout.lock()))?;
    };
    Ok(())
}
