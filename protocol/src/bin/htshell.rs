use clap::Parser;
use htheatpump::{DEFAULT_LOGIN_RETRIES, HeatPump, serial::PortConfig};
use std::error::Error;
use tokio::io::{self, AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send raw commands to a Heliotherm heat pump", long_about = None)]
struct Args {
    /// Serial port path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Baud rate of the serial connection
    #[arg(short, long, default_value_t = htheatpump::serial::DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Number of responses to read per command
    #[arg(short, long, default_value_t = 1)]
    responses: usize,

    /// Don't log in before sending commands
    #[arg(long)]
    no_login: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut config = PortConfig::new(&args.device);

    config.baud_rate = args.baudrate;

    let port = htheatpump::serial::open_with(config)?;
    let mut hp = HeatPump::new(port);

    if !args.no_login {
        hp.login(DEFAULT_LOGIN_RETRIES).await?;
    }

    let mut lines = BufReader::new(io::stdin()).lines();

    // One command per line, e.g. `SP,NR=13` or `MR,0,1,2`
    while let Some(line) = lines.next_line().await? {
        let cmd = line.trim();

        if cmd.is_empty() {
            continue;
        }

        if let Err(err) = hp.send_request(cmd).await {
            eprintln!("Error: {err}");
            continue;
        }

        for _ in 0..args.responses {
            match hp.read_response().await {
                Ok(resp) => println!("{resp}"),
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }
    }

    if !args.no_login {
        hp.logout().await;
    }

    Ok(())
}
