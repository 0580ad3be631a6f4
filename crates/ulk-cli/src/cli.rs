use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ulk",
    about = "Unlock Registry — pay once, reveal the gated reference",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Session file holding registry and bank state
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List a new item in the catalog
    Create(CreateArgs),
    /// Pay an item's price to unlock it
    Unlock(UnlockArgs),
    /// Show an item's public reference
    Public(ItemArgs),
    /// Reveal an item's gated reference to a caller who unlocked it
    Gated(CallerItemArgs),
    /// Check whether a caller has unlocked an item
    Status(CallerItemArgs),
    /// Show an item's listing and unlock count
    Show(ItemArgs),
    /// List catalog items
    List(ListArgs),
    /// Credit an account in the session bank
    Deposit(DepositArgs),
    /// Show an account's bank balance and earnings
    Balance(AccountArgs),
    /// Verify journal integrity
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Creating account (name or acct: hex id)
    #[arg(long)]
    pub creator: String,
    #[arg(long = "public")]
    pub public_ref: String,
    #[arg(long = "gated")]
    pub gated_ref: String,
    #[arg(long)]
    pub price: u64,
}

#[derive(Args)]
pub struct UnlockArgs {
    pub item: String,
    #[arg(long)]
    pub caller: String,
    #[arg(long)]
    pub amount: u64,
}

#[derive(Args)]
pub struct ItemArgs {
    pub item: String,
}

#[derive(Args)]
pub struct CallerItemArgs {
    pub item: String,
    #[arg(long)]
    pub caller: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct DepositArgs {
    pub account: String,
    pub amount: u64,
}

#[derive(Args)]
pub struct AccountArgs {
    pub account: String,
}

#[derive(Args)]
pub struct VerifyArgs {}
