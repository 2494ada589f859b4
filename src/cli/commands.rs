use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skychat")]
#[command(author, version, about = "Chat gateway with schema-driven LLM tool calling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP chat service
    Serve {
        /// Bind address (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single prompt through the gateway with tools enabled
    Chat {
        prompt: String,

        #[arg(short = 's', long)]
        system: Option<String>,
    },

    /// Print the generated operation catalog
    Operations,
}
