use eid_card::{EidCard, PcscTransport};

fn main() {
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

    let mut eid = EidCard::new(Box::new(PcscTransport::new(card)));

    match eid.read_citizen_record() {
        Ok(record) => println!("{record}"),
        Err(e) => eprintln!("identity read failed: {e}"),
    }

    match eid.read_certificate() {
        Ok(cert) => println!(
            "certificate {} valid {} .. {}",
            hex::encode_upper(&cert.serial_number),
            cert.not_before,
            cert.not_after
        ),
        Err(e) => eprintln!("certificate read failed: {e}"),
    }
}
