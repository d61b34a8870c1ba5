use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-relay")]
#[command(about = "Contact form relay with per-client rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // Webhook destination for forwarded submissions; startup fails without it
    #[arg(short, long, env = "WEBHOOK_URL")]
    pub webhook_url: String,

    // Outbound webhook timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub webhook_timeout: u64,

    // How often to evict expired rate-limit entries, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,
}
