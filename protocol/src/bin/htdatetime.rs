use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, HeatPump, datetime::DateTime, serial::PortConfig};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Get or set the clock of a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// New date and time (e.g. `2024-03-01T06:30:00`)
    #[arg(short, long)]
    set: Option<DateTime>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut config = PortConfig::new(&args.device);

    config.baud_rate = args.baudrate;

    let port = htheatpump::serial::open_with(config)?;
    let mut hp = HeatPump::new(port);

    hp.login(DEFAULT_LOGIN_RETRIES).await?;

    let res = match args.set {
        Some(dt) => hp.set_date_time(dt).await,
        None => hp.get_date_time().await,
    };

    hp.logout().await;

    let (dt, weekday) = res?;

    println!("{dt} (weekday {weekday})");

    Ok(())
}
