//! Command-line demonstrations of the Selkie sealing protocol.
//!
//! Each subcommand walks one protocol flow end to end and prints the
//! capabilities it produced, either human-readable or as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use selkie_core::{seal, unseal, Capability, Otype, Perms};
use selkie_seal::{
    AuditLog, AuditOp, CodeRegion, DataRegion, ObjectCap, RootAuthority, SyntheticRoot,
    TypeAllocator,
};

/// Selkie capability-sealing demonstrations
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Emit machine-readable JSON instead of the human rendering
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the user object-type namespace
    Otypes,

    /// Build two sealed code/data object pairs and describe them
    Demo,

    /// Seal one data window and unseal it again, step by step
    #[clap(name = "seal-roundtrip")]
    SealRoundtrip,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Otypes => cmd_otypes(cli.json),
        Commands::Demo => cmd_demo(cli.json),
        Commands::SealRoundtrip => cmd_seal_roundtrip(cli.json),
    }
}

fn print_cap(label: &str, cap: &Capability, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({ "label": label, "cap": cap.summary() });
        println!("{}", value);
    } else {
        println!("{:<24} {}", label, cap);
    }
    Ok(())
}

fn user_allocator() -> Result<TypeAllocator> {
    let root = SyntheticRoot::user()
        .fetch_root()
        .context("cannot obtain the root sealing authority")?;
    let allocator = TypeAllocator::new(root)?;
    Ok(allocator)
}

fn cmd_otypes(json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "user_min": Otype::USER_MIN.value(),
            "user_max": Otype::USER_MAX.value(),
        });
        println!("{}", value);
    } else {
        println!("user otype min: {}", Otype::USER_MIN);
        println!("user otype max: {}", Otype::USER_MAX);
    }
    Ok(())
}

fn cmd_demo(json: bool) -> Result<()> {
    let allocator = user_allocator()?;
    let audit = AuditLog::new(32);

    // Object 1: a 3-slot authority, the original example's "type size".
    let sealcap_1 = allocator.allocate(3)?;
    audit.record(AuditOp::Allocate { size: 3 }, None, true);
    let obj_1 = ObjectCap::build(
        CodeRegion { entry: 0x1000, end: 0x1400 },
        DataRegion { base: 0x2000, end: 0x2400 },
        &sealcap_1,
    )?;
    audit.record(AuditOp::Seal, Some(obj_1.otype()), true);

    // Object 2: a 4-slot authority; its type lands right behind object 1's
    // claimed range.
    let sealcap_2 = allocator.allocate(4)?;
    audit.record(AuditOp::Allocate { size: 4 }, None, true);
    let obj_2 = ObjectCap::build(
        CodeRegion { entry: 0x5000, end: 0x5400 },
        DataRegion { base: 0x6000, end: 0x6400 },
        &sealcap_2,
    )?;
    audit.record(AuditOp::Seal, Some(obj_2.otype()), true);

    print_cap("sealcap_1", &sealcap_1, json)?;
    print_cap("object_1 code", obj_1.code(), json)?;
    print_cap("object_1 data", obj_1.data(), json)?;
    print_cap("sealcap_2", &sealcap_2, json)?;
    print_cap("object_2 code", obj_2.code(), json)?;
    print_cap("object_2 data", obj_2.data(), json)?;

    if !json {
        println!();
        println!(
            "object types: {} and {} (distinct: {})",
            obj_1.otype(),
            obj_2.otype(),
            obj_1.otype() != obj_2.otype()
        );
        println!("audit entries recorded: {}", audit.entries().len());
    }
    Ok(())
}

fn cmd_seal_roundtrip(json: bool) -> Result<()> {
    let allocator = user_allocator()?;

    let authority = allocator.allocate(1)?;
    let data = Capability::new(0x2000, 64, Perms::DATA);

    let sealed = seal(&data, &authority)?;
    let unsealer = allocator.unsealer_for(&authority)?;
    let restored = unseal(&sealed, &unsealer)?;

    print_cap("authority", &authority, json)?;
    print_cap("data before", &data, json)?;
    print_cap("data sealed", &sealed, json)?;
    print_cap("data restored", &restored, json)?;

    if !json {
        println!();
        println!("round trip exact: {}", restored == data);
    }
    Ok(())
}
