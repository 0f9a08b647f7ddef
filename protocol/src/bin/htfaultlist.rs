use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, FaultEntry, HeatPump, serial::PortConfig};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the fault list of a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Indices of the entries to show (all entries if omitted)
    indices: Vec<u32>,

    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Only show the most recent entry
    #[arg(short, long, conflicts_with = "indices")]
    last: bool,
}

fn print_fault(fault: &FaultEntry) {
    println!(
        "#{:03} [{}]: {:05}, {}",
        fault.index, fault.datetime, fault.error, fault.message
    );
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

    let res = if args.last {
        hp.get_last_fault().await.map(|fault| vec![fault])
    } else {
        hp.get_fault_list(&args.indices).await
    };

    hp.logout().await;

    let faults = res?;

    if faults.is_empty() {
        println!("Fault list is empty");
    }

    for fault in &faults {
        print_fault(fault);
    }

    Ok(())
}
