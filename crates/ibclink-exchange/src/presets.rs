//! Named request frames.
//!
//! A preset table maps an operator-facing name to a ready-made
//! [`ControlFrame`]. Menus and CLIs resolve names here; the codec knows
//! nothing about them.

use bytes::Bytes;
use ibclink_frame::ControlFrame;

/// Attention value addressing the register-file target.
const ATTN_TARGET: u8 = 0xF;

const SET_REG_A: u8 = 0x04;
const SET_REG_B: u8 = 0x05;
const SET_OP: u8 = 0x0C;
const CLK_EDGE: u8 = 0x0F;

/// One named request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub frame: ControlFrame,
}

impl Preset {
    pub fn new(name: &'static str, frame: ControlFrame) -> Self {
        Self { name, frame }
    }
}

/// Ordered lookup table of presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Find a preset by name (ASCII case-insensitive) or by its index.
    pub fn find(&self, key: &str) -> Option<&Preset> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return self.get(index);
        }
        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(key))
    }
}

impl Default for PresetTable {
    /// The register/ALU/clock commands understood by the reference device.
    fn default() -> Self {
        Self::new(vec![
            Preset::new("Set regA=5", word_write(SET_REG_A, 0x05)),
            Preset::new("Set regA=33", word_write(SET_REG_A, 0x21)),
            Preset::new("Set regB=0", word_write(SET_REG_B, 0x00)),
            Preset::new("Set regB=37", word_write(SET_REG_B, 0x25)),
            Preset::new("Set op rs1 + rs2", single_byte(2, SET_OP, 0x00)),
            Preset::new("Set op rs1 - rs2", single_byte(2, SET_OP, 0x20)),
            Preset::new("Set op rs1 ^ rs2", single_byte(2, SET_OP, 0x10)),
            Preset::new("Set op rs1 | rs2", single_byte(2, SET_OP, 0x18)),
            Preset::new("Set op rs1 & rs2", single_byte(2, SET_OP, 0x1C)),
            Preset::new("CLK EDGE", single_byte(3, CLK_EDGE, 0x00)),
        ])
    }
}

impl<'a> IntoIterator for &'a PresetTable {
    type Item = &'a Preset;
    type IntoIter = std::slice::Iter<'a, Preset>;

    fn into_iter(self) -> Self::IntoIter {
        self.presets.iter()
    }
}

/// Four-byte big-endian register write.
fn word_write(packet_id: u8, value: u8) -> ControlFrame {
    ControlFrame::new(
        ATTN_TARGET,
        2,
        4,
        packet_id,
        Bytes::copy_from_slice(&[0x00, 0x00, 0x00, value]),
    )
}

fn single_byte(ttl: u8, packet_id: u8, value: u8) -> ControlFrame {
    ControlFrame::new(ATTN_TARGET, ttl, 1, packet_id, Bytes::copy_from_slice(&[value]))
}

#[cfg(test)]
mod tests {
    use ibclink_frame::encode;

    use super::*;

    #[test]
    fn default_table_has_ten_presets() {
        let table = PresetTable::default();
        assert_eq!(table.len(), 10);
        assert!(!table.is_empty());
        assert_eq!(table.get(0).unwrap().name, "Set regA=5");
        assert_eq!(table.get(9).unwrap().name, "CLK EDGE");
        assert!(table.get(10).is_none());
    }

    #[test]
    fn first_preset_encodes_to_known_bytes() {
        let table = PresetTable::default();
        let wire = encode(&table.get(0).unwrap().frame);
        assert_eq!(wire.as_ref(), &[0xF2, 0x84, 0x00, 0x00, 0x00, 0x05]);
    }

    #[test]
    fn clock_edge_frame() {
        let table = PresetTable::default();
        let preset = table.find("clk edge").unwrap();
        assert_eq!(encode(&preset.frame).as_ref(), &[0xF3, 0x2F, 0x00]);
    }

    #[test]
    fn find_by_name_or_index() {
        let table = PresetTable::default();
        assert_eq!(table.find("SET REGB=37").unwrap().frame.payload.as_ref(), &[0, 0, 0, 0x25]);
        assert_eq!(table.find(" 4 ").unwrap().name, "Set op rs1 + rs2");
        assert!(table.find("nope").is_none());
        assert!(table.find("42").is_none());
    }

    #[test]
    fn every_preset_declares_its_payload_length() {
        for preset in &PresetTable::default() {
            assert!(preset.frame.declared_length_matches(), "{}", preset.name);
        }
    }
}
