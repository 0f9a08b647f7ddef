use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, HeatPump, VerifyAction, params::Registry, serial::PortConfig};
use std::{error::Error, fs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query parameters of a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Parameter names to query (all parameters if omitted)
    names: Vec<String>,

    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Use a fast bulk query (measured values only)
    #[arg(short, long)]
    fast: bool,

    /// Parameter definitions to use instead of the built-in catalog (CSV)
    #[arg(long)]
    params: Option<String>,

    /// Parts of the responses to verify, e.g. `Name | Min | Max`
    #[arg(long, value_parser = parse_verify, default_value = "Name")]
    verify: VerifyAction,

    /// Refresh parameter limits from the heat pump after login
    #[arg(long)]
    update_limits: bool,
}

fn parse_verify(s: &str) -> Result<VerifyAction, String> {
    s.parse().map_err(|err| format!("{err}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let registry = match &args.params {
        Some(path) => Registry::from_csv(&fs::read_to_string(path)?)?,
        None => Registry::new(),
    };
    let mut config = PortConfig::new(&args.device);

    config.baud_rate = args.baudrate;

    let port = htheatpump::serial::open_with(config)?;
    let mut hp = HeatPump::with_registry(port, registry);

    hp.set_verify_action(args.verify);
    hp.login(DEFAULT_LOGIN_RETRIES).await?;

    if args.update_limits {
        hp.update_param_limits().await?;
    }

    let names: Vec<&str> = args.names.iter().map(String::as_str).collect();
    let res = if args.fast {
        hp.fast_query(&names).await
    } else {
        hp.query(&names).await
    };

    hp.logout().await;

    let values = res?;
    let width = values.keys().map(String::len).max().unwrap_or_default();

    for (name, val) in &values {
        println!("{name:width$}: {val}");
    }

    Ok(())
}
