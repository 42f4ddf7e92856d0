//! memtext CLI Client
//!
//! Command-line interface for talking to a memcached server.

use clap::{Parser, Subcommand};
use memtext::{Config, MemtextError, TcpConnection};
use tracing_subscriber::{fmt, EnvFilter};

/// memtext CLI
#[derive(Parser, Debug)]
#[command(name = "memtext-cli")]
#[command(about = "CLI for memcached servers (text protocol)")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = memtext::config::DEFAULT_ADDR)]
    server: String,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Get several values with their CAS tokens
    Gets {
        /// The keys to get
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store a value
    Set(StoreArgs),

    /// Store a value only if the key is absent
    Add(StoreArgs),

    /// Store a value only if the key is present
    Replace(StoreArgs),

    /// Append data to an existing value
    Append {
        key: String,
        value: String,
    },

    /// Prepend data to an existing value
    Prepend {
        key: String,
        value: String,
    },

    /// Store a value only if its CAS token still matches
    Cas {
        #[command(flatten)]
        store: StoreArgs,

        /// CAS token from a previous `gets`
        #[arg(long)]
        cas: u64,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        #[arg(default_value = "1")]
        amount: u64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        #[arg(default_value = "1")]
        amount: u64,
    },

    /// Update a key's expiration time
    Touch {
        key: String,
        exptime: i64,
    },

    /// Print server statistics
    Stats {
        /// Statistics group (items, slabs, ...)
        arg: Option<String>,
    },

    /// Invalidate all items
    FlushAll {
        /// Delay in seconds
        #[arg(long)]
        delay: Option<u32>,
    },

    /// Print the server version
    Version,
}

#[derive(clap::Args, Debug)]
struct StoreArgs {
    /// The key to store
    key: String,

    /// The value to store
    value: String,

    /// Opaque flags stored with the value
    #[arg(short, long, default_value = "0")]
    flags: u32,

    /// Expiration time in seconds (0 = never)
    #[arg(short, long, default_value = "0")]
    exptime: i64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,memtext=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .addr(&args.server)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut conn = match TcpConnection::connect(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let result = execute(&mut conn, args.command);
    let _ = conn.close();

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Run one subcommand and print its result
fn execute(conn: &mut TcpConnection, command: Commands) -> Result<(), MemtextError> {
    match command {
        Commands::Get { key } => {
            let item = conn.get(&key)?;
            println!("{}", String::from_utf8_lossy(&item.value));
            println!("flags: {}", item.flags);
        }
        Commands::Gets { keys } => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            let items = conn.gets(&keys)?;
            for key in keys {
                match items.get(key) {
                    Some(item) => println!(
                        "{} = {} (flags: {}, cas: {})",
                        key,
                        String::from_utf8_lossy(&item.value),
                        item.flags,
                        item.cas.unwrap_or_default()
                    ),
                    None => println!("{} (miss)", key),
                }
            }
        }
        Commands::Set(s) => {
            conn.set(&s.key, s.value.as_bytes(), s.flags, s.exptime, false)?;
            println!("STORED");
        }
        Commands::Add(s) => {
            conn.add(&s.key, s.value.as_bytes(), s.flags, s.exptime, false)?;
            println!("STORED");
        }
        Commands::Replace(s) => {
            conn.replace(&s.key, s.value.as_bytes(), s.flags, s.exptime, false)?;
            println!("STORED");
        }
        Commands::Append { key, value } => {
            conn.append(&key, value.as_bytes(), false)?;
            println!("STORED");
        }
        Commands::Prepend { key, value } => {
            conn.prepend(&key, value.as_bytes(), false)?;
            println!("STORED");
        }
        Commands::Cas { store, cas } => {
            conn.cas(&store.key, store.value.as_bytes(), cas, store.flags, store.exptime, false)?;
            println!("STORED");
        }
        Commands::Del { key } => {
            conn.delete(&key, false)?;
            println!("DELETED");
        }
        Commands::Incr { key, amount } => println!("{}", conn.incr(&key, amount, false)?),
        Commands::Decr { key, amount } => println!("{}", conn.decr(&key, amount, false)?),
        Commands::Touch { key, exptime } => {
            conn.touch(&key, exptime, false)?;
            println!("TOUCHED");
        }
        Commands::Stats { arg } => {
            let stats = match arg {
                Some(arg) => conn.stats_arg(&arg)?,
                None => conn.stats()?,
            };
            for (name, value) in stats.iter() {
                println!("{} {}", name, value);
            }
        }
        Commands::FlushAll { delay } => {
            conn.flush_all(delay, false)?;
            println!("OK");
        }
        Commands::Version => println!("{}", conn.version()?),
    }

    Ok(())
}
