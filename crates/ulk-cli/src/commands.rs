use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use ulk_registry::{CatalogReader, CatalogWriter, UnlockLedger};
use ulk_types::{AccountId, ItemId};

use crate::cli::*;
use crate::config::CliConfig;
use crate::session::Session;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(cli.config.as_deref())?;
    let path = cli.session.clone().unwrap_or_else(|| config.session_path.clone());
    let session = Session::open(&path, &config)?;
    let out = Output { format: cli.format };

    match cli.command {
        Command::Create(args) => {
            cmd_create(&session, &out, args)?;
            session.persist()
        }
        Command::Unlock(args) => {
            cmd_unlock(&session, &out, args)?;
            session.persist()
        }
        Command::Deposit(args) => {
            cmd_deposit(&session, &out, args)?;
            session.persist()
        }
        Command::Public(args) => cmd_public(&session, &out, args),
        Command::Gated(args) => cmd_gated(&session, &out, args),
        Command::Status(args) => cmd_status(&session, &out, args),
        Command::Show(args) => cmd_show(&session, &out, args),
        Command::List(args) => cmd_list(&session, &out, args),
        Command::Balance(args) => cmd_balance(&session, &out, args),
        Command::Verify(_) => cmd_verify(&session, &out),
    }
}

struct Output {
    format: OutputFormat,
}

impl Output {
    /// Print `value` as JSON, or run `text` for human output.
    fn emit(&self, value: serde_json::Value, text: impl FnOnce()) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
            OutputFormat::Text => text(),
        }
        Ok(())
    }
}

fn parse_account(input: &str) -> anyhow::Result<AccountId> {
    AccountId::resolve(input).with_context(|| format!("invalid account {input}"))
}

fn parse_item(input: &str) -> anyhow::Result<ItemId> {
    input
        .parse::<ItemId>()
        .with_context(|| format!("invalid item id {input}"))
}

fn cmd_create(session: &Session, out: &Output, args: CreateArgs) -> anyhow::Result<()> {
    let creator = parse_account(&args.creator)?;
    let id = session
        .registry
        .create_item(&args.public_ref, &args.gated_ref, args.price, creator)?;
    out.emit(
        json!({ "item": id, "creator": creator, "price": args.price }),
        || {
            println!("{} Created item {}", "✓".green().bold(), id.to_string().yellow());
            println!("  Public: {}", args.public_ref.blue());
            println!("  Price: {}", args.price.to_string().bold());
            println!("  Creator: {}", creator.to_string().cyan());
        },
    )
}

fn cmd_unlock(session: &Session, out: &Output, args: UnlockArgs) -> anyhow::Result<()> {
    let item = parse_item(&args.item)?;
    let caller = parse_account(&args.caller)?;
    let receipt = session.registry.unlock(item, caller, args.amount)?;
    out.emit(serde_json::to_value(&receipt)?, || {
        println!(
            "{} Unlocked {} for {}",
            "✓".green().bold(),
            item.to_string().yellow(),
            caller.to_string().cyan()
        );
        println!(
            "  Paid {} to {}",
            receipt.amount.to_string().bold(),
            receipt.beneficiary.to_string().cyan()
        );
    })
}

fn cmd_deposit(session: &Session, out: &Output, args: DepositArgs) -> anyhow::Result<()> {
    let account = parse_account(&args.account)?;
    let balance = session.bank.deposit(account, args.amount)?;
    out.emit(json!({ "account": account, "balance": balance }), || {
        println!(
            "{} Deposited {} to {} (balance {})",
            "✓".green().bold(),
            args.amount,
            account.to_string().cyan(),
            balance.to_string().bold()
        );
    })
}

fn cmd_public(session: &Session, out: &Output, args: ItemArgs) -> anyhow::Result<()> {
    let item = parse_item(&args.item)?;
    let public_ref = session.registry.get_public_ref(item)?;
    out.emit(json!({ "item": item, "public_ref": public_ref }), || {
        println!("{public_ref}");
    })
}

fn cmd_gated(session: &Session, out: &Output, args: CallerItemArgs) -> anyhow::Result<()> {
    let item = parse_item(&args.item)?;
    let caller = parse_account(&args.caller)?;
    let gated_ref = session.registry.get_gated_ref(item, &caller)?;
    out.emit(json!({ "item": item, "gated_ref": gated_ref }), || {
        println!("{gated_ref}");
    })
}

fn cmd_status(session: &Session, out: &Output, args: CallerItemArgs) -> anyhow::Result<()> {
    let item = parse_item(&args.item)?;
    let caller = parse_account(&args.caller)?;
    let unlocked = session.registry.is_unlocked(item, &caller)?;
    out.emit(
        json!({ "item": item, "caller": caller, "unlocked": unlocked }),
        || {
            let state = if unlocked { "unlocked".green() } else { "locked".red() };
            println!(
                "{} is {} for {}",
                item.to_string().yellow(),
                state,
                caller.to_string().cyan()
            );
        },
    )
}

fn cmd_show(session: &Session, out: &Output, args: ItemArgs) -> anyhow::Result<()> {
    let item = parse_item(&args.item)?;
    let listing = session.registry.get_item(item)?;
    let unlocks = session.registry.unlock_count(item)?;
    out.emit(json!({ "listing": listing, "unlocks": unlocks }), || {
        println!("Item {}", listing.id.to_string().yellow().bold());
        println!("  Public: {}", listing.public_ref.blue());
        println!("  Price: {}", listing.price.to_string().bold());
        println!("  Creator: {}", listing.creator.to_string().cyan());
        println!("  Unlocks: {unlocks}");
    })
}

fn cmd_list(session: &Session, out: &Output, args: ListArgs) -> anyhow::Result<()> {
    let ids: Vec<ItemId> = match &args.creator {
        Some(creator) => session.registry.items_by_creator(&parse_account(creator)?)?,
        None => (0..session.registry.item_count()?).map(ItemId::new).collect(),
    };
    let listings = ids
        .into_iter()
        .map(|id| session.registry.get_item(id))
        .collect::<Result<Vec<_>, _>>()?;
    out.emit(json!(listings), || {
        if listings.is_empty() {
            println!("No items.");
        }
        for listing in &listings {
            println!(
                "{} {} {}",
                listing.id.to_string().yellow(),
                listing.public_ref,
                format!("({})", listing.price).dimmed()
            );
        }
    })
}

fn cmd_balance(session: &Session, out: &Output, args: AccountArgs) -> anyhow::Result<()> {
    let account = parse_account(&args.account)?;
    let balance = session.bank.balance(&account)?;
    let earnings = session.registry.earnings(&account)?;
    out.emit(
        json!({ "account": account, "balance": balance, "earnings": earnings }),
        || {
            println!("Account {}", account.to_string().cyan().bold());
            println!("  Balance: {}", balance.to_string().bold());
            println!("  Earned from unlocks: {}", earnings.to_string().green());
        },
    )
}

fn cmd_verify(session: &Session, out: &Output) -> anyhow::Result<()> {
    let report = session.registry.validate_journal()?;
    let violations: Vec<_> = report
        .violations
        .iter()
        .map(|v| {
            json!({
                "seq": v.seq,
                "kind": format!("{:?}", v.kind),
                "description": v.description,
            })
        })
        .collect();
    out.emit(
        json!({
            "valid": report.is_valid(),
            "entries": report.entry_count,
            "items": report.item_count,
            "unlocks": report.unlock_count,
            "violations": violations,
        }),
        || {
            if report.is_valid() {
                println!("{} Journal integrity verified", "✓".green().bold());
            } else {
                println!("{} Journal integrity violated", "✗".red().bold());
                for v in &report.violations {
                    println!("  seq {}: {:?}: {}", v.seq, v.kind, v.description);
                }
            }
            println!("  Entries: {}", report.entry_count);
            println!("  Items: {}", report.item_count);
            println!("  Unlocks: {}", report.unlock_count);
        },
    )?;
    if !report.is_valid() {
        anyhow::bail!("journal has {} violation(s)", report.violations.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_account_by_name_and_id() {
        let alice = AccountId::from_name("alice");
        assert_eq!(parse_account("alice").unwrap(), alice);
        assert_eq!(parse_account(&alice.to_hex()).unwrap(), alice);
        assert_eq!(parse_account(&format!("acct:{}", alice.to_hex())).unwrap(), alice);
        assert!(parse_account("acct:zz").is_err());
    }

    #[test]
    fn parse_item_accepts_hash_prefix() {
        assert_eq!(parse_item("#3").unwrap(), ItemId::new(3));
        assert!(parse_item("three").is_err());
    }

    fn run(session: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
        use clap::Parser;
        let mut argv = vec!["ulk", "--session", session.to_str().unwrap()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn create_unlock_reveal_flow() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("s.json");

        run(&session, &["deposit", "buyer", "1000"]).unwrap();
        let create = [
            "create",
            "--creator",
            "owner",
            "--public",
            "publicUrl1",
            "--gated",
            "privateUrl1",
            "--price",
            "1000",
        ];
        run(&session, &create).unwrap();

        let pay = |amount: &'static str| ["unlock", "0", "--caller", "buyer", "--amount", amount];
        assert!(run(&session, &["gated", "0", "--caller", "buyer"]).is_err());
        assert!(run(&session, &pay("100")).is_err());
        run(&session, &pay("1000")).unwrap();
        run(&session, &["gated", "0", "--caller", "buyer"]).unwrap();
        assert!(run(&session, &["gated", "0", "--caller", "user"]).is_err());
        assert!(run(&session, &pay("1000")).is_err());
        run(&session, &["verify"]).unwrap();

        let reopened = Session::open(&session, &CliConfig::default()).unwrap();
        let owner = AccountId::from_name("owner");
        assert_eq!(reopened.bank.balance(&owner).unwrap(), 1000);
        assert_eq!(reopened.registry.earnings(&owner).unwrap(), 1000);
    }

    #[test]
    fn failed_mutation_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("s.json");
        let unlock = ["unlock", "0", "--caller", "buyer", "--amount", "1"];
        assert!(run(&session, &unlock).is_err());
        assert!(!session.exists());
    }
}
