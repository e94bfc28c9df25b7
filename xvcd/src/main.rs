use std::error::Error;

use clap::Parser;
use env_logger::Env;

use jtag_core::parts::PartTable;
use jtag_core::{CableKind, Jtag};
use xvc_bridge::server::{Builder, bind_listener};
use xvc_proto::XVC_BUFSIZE;
use xvcd::bridge::JtagXvcBackend;
use xvcd::{cables, xilinx, zynqmp};

#[derive(Parser)]
#[command(about = "Xilinx Virtual Cable (XVC) daemon for local JTAG cables", long_about = None)]
struct Args {
    /// Interface address to bind; a leading '-' binds all interfaces
    #[arg(short, long, default_value = "-")]
    interface: String,

    #[arg(short, long, default_value = "2542")]
    port: u16,

    /// Cable to open (e.g. ftdi, jlink, dirtyjtag, loopback, sim)
    #[arg(short, long, default_value = "sim")]
    cable: String,

    /// Fixed TCK frequency the cable is driven at, in Hz
    #[arg(short, long, default_value = "6000000")]
    freq: u32,

    /// How many 32-bit words to read when scanning the chain
    #[arg(long, default_value = "5")]
    scan_depth: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let kind: CableKind = args.cable.parse()?;
    let probe = cables::open(kind)?;

    let mut jtag = Jtag::new(probe, PartTable::default());
    let found = jtag.detect_chain(args.scan_depth)?;
    for (index, device) in jtag.devices().iter().enumerate() {
        log::info!(
            "chain[{}]: idcode 0x{:08x} (irlen {})",
            index,
            device.idcode,
            device.irlen
        );
    }

    if found == 0 {
        log::warn!("no devices on the chain; serving raw shifts only");
    } else {
        jtag.device_select(0)?;
        match xilinx::family(&jtag) {
            Some(family) => {
                log::info!("connected product family: {}", family);
                if family.starts_with("zynqmp") {
                    zynqmp::init(&mut jtag, family)?;
                }
            }
            None => log::info!("chain head is not an FPGA the part tables know"),
        }
    }

    let listener = bind_listener(&args.interface, args.port)?;
    log::info!(
        "serving JTAG over XVC on {} at a fixed {} Hz",
        listener.local_addr()?,
        args.freq
    );

    let backend = JtagXvcBackend::new(jtag, args.freq);
    let mut server = Builder::new().max_vector_size(XVC_BUFSIZE as u32).build(backend);
    server.serve(listener)?;
    Ok(())
}
