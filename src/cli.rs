use crate::providers::ProviderKind;
use crate::render::OutputFormat;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "iploc", author, version)]
#[command(
  about = "Locate an IP address using public geolocation services.",
  long_about = "Resolve an IP address to an approximate geographic location through ip-api.com, ipinfo.io or ipstack.com. Without an address, your own public IP is detected first. Private, loopback and link-local addresses are described locally without any network call.",
  after_help = "Examples:
  iploc                                  Detect your public IP location
  iploc -i 8.8.8.8                       Locate a specific IP
  iploc -i 1.1.1.1 -f json               JSON output
  iploc -i 8.8.8.8 -f table              Table output
  iploc -i 8.8.8.8 -p ipinfo -t TOKEN    Use ipinfo.io with a token"
)]
pub struct Cli {
  /// IP address to locate. Detects your public IP when omitted.
  #[arg(short = 'i', long = "ip-address", value_name = "ADDR")]
  pub ip_address: Option<String>,

  /// Geolocation provider [default: ipapi].
  #[arg(short, long, value_enum)]
  pub provider: Option<ProviderKind>,

  /// Output format [default: simple].
  #[arg(short, long, value_enum)]
  pub format: Option<OutputFormat>,

  /// API token for ipinfo or ipstack.
  /// Overrides `IPINFO_TOKEN` / `IPSTACK_TOKEN` and the config file.
  #[arg(short, long, value_name = "TOKEN")]
  pub token: Option<String>,

  /// Disable colored output.
  #[arg(long)]
  pub no_color: bool,

  /// Log requests and decisions to stderr.
  #[arg(short, long)]
  pub verbose: bool,

  /// Print the current merged configuration and exit.
  #[arg(long)]
  pub config_show: bool,
}
