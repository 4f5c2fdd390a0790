//! `desk phone`: normalise a Saudi number and build its WhatsApp link.

use anyhow::{Context, Result};
use clap::Args;
use desk_core::{normalize_saudi_phone, whatsapp_link};

use crate::output;
use crate::GlobalOpts;

#[derive(Args, Debug)]
pub struct PhoneArgs {
    /// Phone number as typed, e.g. `0551234567` or `+966 55 123 4567`.
    pub number: String,
    /// Prefilled WhatsApp message.
    #[arg(long, short)]
    pub message: Option<String>,
}

pub fn run_phone(args: &PhoneArgs, opts: &GlobalOpts) -> Result<u8> {
    let normalized = normalize_saudi_phone(&args.number)
        .with_context(|| format!("cannot use {:?} as a phone number", args.number))?;
    let link = whatsapp_link(&normalized, args.message.as_deref())?;

    if opts.json {
        output::print_json(&serde_json::json!({
            "input": args.number,
            "normalized": normalized,
            "whatsapp": link,
        }))?;
    } else {
        println!("{normalized}");
        println!("{link}");
    }
    Ok(0)
}
