mod cli;
mod walkthrough;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = cli::parse_args(&args)?;
    walkthrough::run(&options)
}
