use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, HeatPump, VerifyAction, serial::PortConfig};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Set a parameter of a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Parameter name, e.g. `HKR Soll_Raum`
    name: String,

    /// New value, e.g. `21.5`
    value: String,

    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Write the value even if it lies outside of the parameter's limits
    #[arg(long)]
    ignore_limits: bool,

    /// Parts of the response to verify, e.g. `Name | Value`
    #[arg(long, value_parser = parse_verify, default_value = "Name")]
    verify: VerifyAction,
}

fn parse_verify(s: &str) -> Result<VerifyAction, String> {
    s.parse().map_err(|err| format!("{err}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut config = PortConfig::new(&args.device);

    config.baud_rate = args.baudrate;

    let port = htheatpump::serial::open_with(config)?;
    let mut hp = HeatPump::new(port);
    let param = hp
        .params()
        .get(&args.name)
        .ok_or_else(|| format!("Unknown parameter: {:?}", args.name))?;

    if !param.access().is_writable() {
        return Err(format!("Parameter {:?} is read-only", args.name).into());
    }

    let value = param.parse(&args.value, false)?;

    hp.set_verify_action(args.verify);
    hp.set_verify_error(true);
    hp.login(DEFAULT_LOGIN_RETRIES).await?;

    let res = hp.set_param(&args.name, value, args.ignore_limits).await;

    hp.logout().await;

    println!("{}: {}", args.name, res?);

    Ok(())
}
