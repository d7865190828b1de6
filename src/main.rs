use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;

use rsourcectl::config::{DEFAULT_CONSOLE_PORT, DEFAULT_QUERY_PORT};
use rsourcectl::{A2sClient, ConsoleClient, ConsoleConfig, QueryConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server host name or IP address
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print server information (A2S_INFO)
    Info {
        #[clap(short, long, default_value_t = DEFAULT_QUERY_PORT)]
        port: u16,
    },
    /// Print connected players (A2S_PLAYER)
    Players {
        #[clap(short, long, default_value_t = DEFAULT_QUERY_PORT)]
        port: u16,
    },
    /// Print server rules (A2S_RULES)
    Rules {
        #[clap(short, long, default_value_t = DEFAULT_QUERY_PORT)]
        port: u16,
    },
    /// Send a command to the telnet console and print its output
    Console {
        #[clap(short, long, default_value_t = DEFAULT_CONSOLE_PORT)]
        port: u16,
        /// Console command, words are joined with spaces
        #[clap(required = true)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let host = args.host.as_str();
    let client = A2sClient::new(QueryConfig::from_env());

    match args.command {
        Command::Info { port } => match client.info(host, port).await {
            Some(info) => {
                println!("Name: {}", info.name);
                println!("Map: {}", info.map);
                println!("Current players: {}/{}", info.current_players, info.max_players);
                println!("Type: {:?}", info.server_type);
                println!("OS: {:?}", info.operating_system);
                println!("Password: {}", info.passworded);
                println!("Version: {}", info.version);
            }
            None => return unavailable(),
        },
        Command::Players { port } => match client.players(host, port).await {
            Some(players) if players.is_empty() => println!("No players are online."),
            Some(players) => {
                for player in players {
                    let name = if player.name.is_empty() { "Unknown" } else { player.name.as_str() };
                    println!("  • {} - {}", name, player.duration);
                }
            }
            None => return unavailable(),
        },
        Command::Rules { port } => match client.rules(host, port).await {
            Some(rules) => {
                for (name, value) in rules {
                    println!("{}: {}", name, value);
                }
            }
            None => return unavailable(),
        },
        Command::Console { port, command } => {
            let command = command.join(" ");
            info!("sending {:?} to {}:{}", command, host, port);
            let output = ConsoleClient::new(ConsoleConfig::from_env())
                .send_command(host, port, &command)
                .await;
            let output = output.trim();
            if output.is_empty() {
                println!("No response.");
            } else {
                println!("{}", output);
            }
        }
    }

    ExitCode::SUCCESS
}

fn unavailable() -> ExitCode {
    eprintln!("No server info is currently known.");
    ExitCode::FAILURE
}
