use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, HeatPump, serial::PortConfig, timeprog::TimeProgram};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the time programs of a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Index of the time program to show (overview of all programs if omitted)
    index: Option<u8>,

    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Don't query the entries of the time program
    #[arg(short, long)]
    without_entries: bool,
}

fn print_entries(prog: &TimeProgram) -> Result<(), Box<dyn Error>> {
    for day in 0..prog.number_of_days().into() {
        println!("Day {day}:");

        for (num, entry) in prog.entries_for_day(day)?.iter().enumerate() {
            match entry {
                Some(entry) => println!("  #{num}: {entry}"),
                None => println!("  #{num}: -"),
            }
        }
    }

    Ok(())
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

    let res = match args.index {
        Some(idx) => hp
            .get_time_prog(idx, !args.without_entries)
            .await
            .map(|prog| vec![prog]),
        None => hp.get_time_progs().await,
    };

    hp.logout().await;

    for prog in res? {
        println!("{prog}");

        if args.index.is_some() && !args.without_entries {
            print_entries(&prog)?;
        }
    }

    Ok(())
}
