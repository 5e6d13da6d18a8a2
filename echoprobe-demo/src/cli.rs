use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq)]
pub struct DemoOptions {
    pub seed: Option<u64>,
    pub seconds: f32,
    pub tick_rate: f32,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            seed: None,
            seconds: 8.0,
            tick_rate: 60.0,
        }
    }
}

pub fn parse_args(args: &[String]) -> Result<DemoOptions> {
    let mut options = DemoOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().context("--seed needs a value")?;
                options.seed = Some(value.parse().with_context(|| format!("bad seed {value:?}"))?);
            }
            "--seconds" => {
                let value = iter.next().context("--seconds needs a value")?;
                options.seconds = value
                    .parse()
                    .with_context(|| format!("bad duration {value:?}"))?;
                if !(options.seconds > 0.0) {
                    bail!("--seconds must be positive");
                }
            }
            "-h" | "--help" => {
                println!("usage: echoprobe-demo [--seed <n>] [--seconds <n>]");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other:?}"),
        }
    }

    Ok(options)
}
