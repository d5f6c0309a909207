mod commands;
mod terminal;

use commands::{CommandLine, Commands, bind, find, interfaces, rcvbuf};
use terminal::{logging, print};

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose);

    let cfg = commands.config();

    match commands.command {
        Commands::Interfaces { fake_loopback } => {
            print::header("network interfaces");
            interfaces::interfaces(fake_loopback);
            Ok(())
        }
        Commands::Find { name, address } => {
            print::header("interface lookup");
            find::find(name, address)
        }
        Commands::Bind {
            address,
            port,
            count,
        } => {
            print::header("port allocation");
            bind::bind(address, port, count, &cfg)
        }
        Commands::Rcvbuf { size } => {
            print::header("receive buffer");
            rcvbuf::rcvbuf(size, &cfg)
        }
    }
}
