//! Static device reference data.
//!
//! Chain enumeration resolves IDCODEs to instruction-register lengths
//! through a [`PartTable`]. The built-in tables carry the devices the
//! daemon is normally pointed at; integrators with exotic chains inject
//! their own tables at construction instead of patching these.

use bitfield::bitfield;

/// IDCODEs are looked up with the version nibble masked off first, since
/// most vendors revise it freely.
pub const IDCODE_VERSION_MASK: u32 = 0x0FFF_FFFF;

/// Cologne Chip GateMate. Its full IDCODE collides, once masked, with the
/// Efinix Trion T4/T8, so lookup must skip the masked pass for it.
pub const GATEMATE_IDCODE: u32 = 0x2000_0001;

bitfield! {
    /// A 32-bit JTAG IDCODE as shifted out of the DR after a TAP reset.
    #[derive(Copy, Clone, Eq, PartialEq)]
    pub struct IdCode(u32);
    impl Debug;

    u8;
    /// Vendor-assigned revision of the part.
    pub version, set_version: 31, 28;

    u16;
    /// Vendor-assigned part number.
    pub part, set_part: 27, 12;

    /// JEDEC JEP-106 manufacturer identifier.
    pub manufacturer, set_manufacturer: 11, 1;
}

/// An FPGA entry of the reference table.
#[derive(Debug)]
pub struct FpgaPart {
    pub name: &'static str,
    pub family: &'static str,
    pub irlen: u16,
}

/// A non-FPGA device (debug access ports, reserved TAPs, ...).
#[derive(Debug)]
pub struct MiscPart {
    pub name: &'static str,
    pub irlen: u16,
}

/// The outcome of resolving a raw IDCODE against the tables.
#[derive(Debug, Copy, Clone)]
pub struct PartMatch {
    /// The table key that matched; masked or full depending on the entry.
    pub idcode: u32,
    pub irlen: u16,
    pub name: &'static str,
    /// `None` for non-FPGA devices.
    pub family: Option<&'static str>,
}

/// FPGA devices, keyed by masked IDCODE unless the vendor encodes meaning
/// in the top nibble.
pub static FPGA_PARTS: &[(u32, FpgaPart)] = &[
    // Efinix Trion; full code collides with GateMate once unmasked codes
    // are considered, see GATEMATE_IDCODE.
    (0x0000_0001, FpgaPart { name: "t4/t8", family: "trion", irlen: 4 }),
    (0x0362_D093, FpgaPart { name: "xc7a35t", family: "artix7", irlen: 6 }),
    (0x0362_F093, FpgaPart { name: "xc7a35t", family: "artix7", irlen: 6 }),
    (0x1363_1093, FpgaPart { name: "xc7a100t", family: "artix7", irlen: 6 }),
    (0x0364_7093, FpgaPart { name: "xc7k70t", family: "kintex7", irlen: 6 }),
    (0x037C_4093, FpgaPart { name: "xc7s50", family: "spartan7", irlen: 6 }),
    (0x0372_7093, FpgaPart { name: "xc7z020", family: "zynq", irlen: 6 }),
    (0x1471_0093, FpgaPart { name: "xczu2", family: "zynqmp", irlen: 12 }),
    (0x1472_2093, FpgaPart { name: "xczu3", family: "zynqmp", irlen: 12 }),
    (0x2000_0001, FpgaPart { name: "ccgm1a1", family: "gatemate", irlen: 6 }),
];

/// Devices that show up on scan chains without being FPGAs.
pub static MISC_PARTS: &[(u32, MiscPart)] = &[
    // ARM DAPs keep the full 32-bit code; the top nibble is not a version.
    (0x4BA0_0477, MiscPart { name: "arm cortex-a9 dap", irlen: 4 }),
    (0x5BA0_0477, MiscPart { name: "arm cortex-a53 dap", irlen: 4 }),
    // ZynqMP PS reserved TAP, visible before the PL is enabled.
    (0x00FF_FFFE, MiscPart { name: "zynqmp ps tap", irlen: 12 }),
];

/// JEP-106 manufacturer identifiers.
pub static MANUFACTURERS: &[(u16, &str)] = &[
    (0x021, "lattice"),
    (0x049, "xilinx"),
    (0x06E, "altera"),
    (0x0C1, "cologne chip"),
    (0x23B, "arm"),
    (0x281, "anlogic"),
];

/// Handle over the reference tables, injected into the chain manager.
#[derive(Copy, Clone)]
pub struct PartTable {
    pub fpga: &'static [(u32, FpgaPart)],
    pub misc: &'static [(u32, MiscPart)],
    pub manufacturers: &'static [(u16, &'static str)],
}

impl Default for PartTable {
    fn default() -> PartTable {
        PartTable {
            fpga: FPGA_PARTS,
            misc: MISC_PARTS,
            manufacturers: MANUFACTURERS,
        }
    }
}

impl PartTable {
    /// Resolves a raw IDCODE as read off the chain.
    ///
    /// The masked code is tried first (FPGA table, then misc), falling back
    /// to the full code; GateMate goes straight to the full-code pass.
    pub fn lookup(&self, raw: u32) -> Option<PartMatch> {
        if raw != GATEMATE_IDCODE {
            if let Some(found) = self.lookup_exact(raw & IDCODE_VERSION_MASK) {
                return Some(found);
            }
        }
        self.lookup_exact(raw)
    }

    fn lookup_exact(&self, idcode: u32) -> Option<PartMatch> {
        if let Some((key, part)) = self.fpga.iter().find(|(key, _)| *key == idcode) {
            return Some(PartMatch {
                idcode: *key,
                irlen: part.irlen,
                name: part.name,
                family: Some(part.family),
            });
        }
        self.misc.iter().find(|(key, _)| *key == idcode).map(|(key, part)| PartMatch {
            idcode: *key,
            irlen: part.irlen,
            name: part.name,
            family: None,
        })
    }

    /// Family of the FPGA behind `idcode`, if the tables know one.
    pub fn fpga_family(&self, idcode: u32) -> Option<&'static str> {
        self.lookup(idcode).and_then(|found| found.family)
    }

    /// Human-readable JEP-106 manufacturer name.
    pub fn manufacturer_name(&self, id: u16) -> &'static str {
        self.manufacturers
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn idcode_fields_decompose() {
        let id = IdCode(0x0362_F093);
        assert_eq!(id.version(), 0x0);
        assert_eq!(id.part(), 0x362F);
        assert_eq!(id.manufacturer(), 0x049);
    }

    #[test]
    fn masked_lookup_strips_the_version_nibble() {
        let table = PartTable::default();
        let found = table.lookup(0x5362_F093).expect("revision should not matter");
        assert_eq!(found.idcode, 0x0362_F093);
        assert_eq!(found.irlen, 6);
        assert_eq!(found.family, Some("artix7"));
    }

    #[test]
    fn arm_dap_matches_on_the_full_code() {
        let table = PartTable::default();
        let found = table.lookup(0x5BA0_0477).expect("full-code entry");
        assert_eq!(found.idcode, 0x5BA0_0477);
        assert_eq!(found.irlen, 4);
        assert_eq!(found.family, None);
    }

    #[test]
    fn gatemate_skips_the_masked_pass() {
        let table = PartTable::default();
        // Masked, 0x20000001 would alias to the Efinix Trion T4/T8.
        let found = table.lookup(GATEMATE_IDCODE).expect("gatemate entry");
        assert_eq!(found.family, Some("gatemate"));
        assert_eq!(found.irlen, 6);
        // The Efinix part still resolves through the masked pass.
        let trion = table.lookup(0x1000_0001).expect("trion entry");
        assert_eq!(trion.family, Some("trion"));
        assert_eq!(trion.irlen, 4);
    }

    #[test]
    fn unknown_manufacturers_have_a_fallback_name() {
        let table = PartTable::default();
        assert_eq!(table.manufacturer_name(0x049), "xilinx");
        assert_eq!(table.manufacturer_name(0x777), "unknown");
    }
}
