//! Usage: `cargo run --example sign_message --features pcsc -- <PIN> [pss]`

use eid_card::{CardProfile, EidCard, PcscTransport, PinStatus};

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(pin) = args.next() else {
        eprintln!("usage: sign_message <PIN> [pss]");
        std::process::exit(2);
    };
    let profile = match args.next().as_deref() {
        Some("pss") => CardProfile::pss(),
        _ => CardProfile::pkcs1v15(),
    };

    let ctx = pcsc::Context::establish(pcsc::Scope::User).unwrap_or_else(|e| {
        eprintln!("no PC/SC service: {e}");
        std::process::exit(1);
    });
    let readers = ctx.list_readers_owned().unwrap_or_default();
    let Some(reader) = readers.first() else {
        eprintln!("no card reader found");
        std::process::exit(1);
    };
    let card = ctx
        .connect(reader, pcsc::ShareMode::Shared, pcsc::Protocols::ANY)
        .unwrap_or_else(|e| {
            eprintln!("failed to connect to {reader:?}: {e}");
            std::process::exit(1);
        });

    let mut eid = EidCard::with_profile(Box::new(PcscTransport::new(card)), profile);

    let cert = eid.read_certificate().unwrap_or_else(|e| {
        eprintln!("certificate read failed: {e}");
        std::process::exit(1);
    });

    match eid.verify_pin(&pin) {
        Ok(PinStatus::Verified) => {}
        Ok(PinStatus::Rejected { retries_remaining }) => {
            eprintln!("wrong PIN, {retries_remaining} attempts left");
            std::process::exit(1);
        }
        Ok(PinStatus::Blocked) => {
            eprintln!("PIN is blocked");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("PIN verification failed: {e}");
            std::process::exit(1);
        }
    }

    let message = b"Hi, this is my signature";
    match eid.sign_and_verify(message, &cert) {
        Ok(material) => {
            println!("digest:    {}", hex::encode(material.digest));
            println!("signature: {}", hex::encode(&material.signature));
            println!("verified against card certificate");
        }
        Err(e) => eprintln!("signing failed: {e}"),
    }
}
