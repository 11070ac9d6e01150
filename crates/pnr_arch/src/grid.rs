//! `GridCatalog` — a synthetic, rectangular-grid [`ArchCatalog`] implementation.
//!
//! Stands in for the out-of-scope per-architecture device database (§1). It
//! is deliberately simple (a regular grid rather than a real chipdb) but
//! exercises every corner of the trait: typed bels at real `(x, y, z)`
//! locations, a resource-sharing exclusion pair (two `BRAM18` bels aliasing
//! one physical `BRAM36`), a region-based clock limit for
//! `is_valid_bel_for_cell`, and a small synthetic wire/pip fabric.
//!
//! Builds a concrete resource table once at construction and answers every
//! query from it, the way a real per-family device module would, but fills
//! in real grid topology rather than just resource counts, because the
//! placement core needs bel coordinates, not just totals.

use std::collections::HashMap;

use pnr_common::{fold_bytes, mix32, Delay, DelayInfo, Id, Interner};
use serde::{Deserialize, Serialize};

use crate::catalog::ArchCatalog;
use crate::ids::{BelId, PipId, WireId};

/// Parameters for [`GridCatalog::new`].
///
/// Serializable so a device's grid parameters can be read from a project's
/// configuration file instead of hardcoded at the call site (the CLI's
/// `[device]` table).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid width, in tile columns.
    pub width: i32,
    /// Grid height, in tile rows.
    pub height: i32,
    /// Number of `LUT` bels per interior tile.
    pub luts_per_tile: i32,
    /// Number of `DFF` bels per interior tile.
    pub ffs_per_tile: i32,
    /// Every tile whose column is a multiple of this stride also gets a
    /// `BRAM` tile: two `BRAM18`-sized bels that alias one physical resource.
    pub bram_column_stride: i32,
    /// Every tile whose column is a multiple of this stride also gets one
    /// `DSP` bel.
    pub dsp_column_stride: i32,
    /// Grid tiles that each carry one `PLL` bel.
    pub pll_tiles: Vec<(i32, i32)>,
    /// Side length, in tiles, of a square clock region for the
    /// distinct-clocks-per-region rule.
    pub clock_region_size: i32,
    /// Maximum number of distinct clock nets `is_valid_bel_for_cell` allows
    /// bound within one clock region.
    pub max_clocks_per_region: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            luts_per_tile: 4,
            ffs_per_tile: 4,
            bram_column_stride: 4,
            dsp_column_stride: 8,
            pll_tiles: vec![(0, 0)],
            clock_region_size: 4,
            max_clocks_per_region: 1,
        }
    }
}

#[derive(Clone, Debug)]
struct BelRecord {
    name: String,
    bel_type: Id,
    x: i32,
    y: i32,
    z: i32,
    pins: Vec<Id>,
    pin_wires: Vec<WireId>,
    global_buf: bool,
    exclusive: Vec<BelId>,
}

#[derive(Clone, Copy, Debug)]
struct PipRecord {
    src: WireId,
    dst: WireId,
}

/// The built-in cell type names this catalog registers with the shared
/// interner at construction, via `initializeAdd` (§4.1).
#[derive(Clone, Copy, Debug)]
pub struct CellTypeIds {
    /// Interned id for `"LUT"`.
    pub lut: Id,
    /// Interned id for `"DFF"`.
    pub dff: Id,
    /// Interned id for `"CARRY"`.
    pub carry: Id,
    /// Interned id for `"BRAM"`.
    pub bram: Id,
    /// Interned id for `"DSP"`.
    pub dsp: Id,
    /// Interned id for `"IOBUF"`.
    pub iobuf: Id,
    /// Interned id for `"PLL"`.
    pub pll: Id,
}

/// A synthetic rectangular-grid architecture catalog.
#[derive(Debug)]
pub struct GridCatalog {
    config: GridConfig,
    bel_ids: Vec<BelId>,
    bels: Vec<BelRecord>,
    name_to_bel: HashMap<String, BelId>,
    wire_ids: Vec<WireId>,
    pips: HashMap<PipId, PipRecord>,
    pip_ids: Vec<PipId>,
    uphill: HashMap<WireId, Vec<PipId>>,
    downhill: HashMap<WireId, Vec<PipId>>,
    cell_types: CellTypeIds,
    in_pin: Id,
    out_pin: Id,
    clk_pin: Id,
}

impl GridCatalog {
    /// Builds a grid catalog, registering its built-in cell type and pin
    /// names in `interner` via `initializeAdd`.
    ///
    /// `interner` must be freshly constructed (only the reserved null slot
    /// interned) so the built-in names land at the expected indices; this
    /// mirrors how a real architecture's built-in string table is checked
    /// against runtime numbering (§4.1).
    pub fn new(interner: &mut Interner, config: GridConfig) -> Self {
        let cell_types = CellTypeIds {
            lut: interner.initialize_add("LUT", 1).expect("LUT registers first"),
            dff: interner.initialize_add("DFF", 2).expect("DFF registers second"),
            carry: interner
                .initialize_add("CARRY", 3)
                .expect("CARRY registers third"),
            bram: interner.initialize_add("BRAM", 4).expect("BRAM registers fourth"),
            dsp: interner.initialize_add("DSP", 5).expect("DSP registers fifth"),
            iobuf: interner
                .initialize_add("IOBUF", 6)
                .expect("IOBUF registers sixth"),
            pll: interner.initialize_add("PLL", 7).expect("PLL registers seventh"),
        };
        let in_pin = interner.intern("I");
        let out_pin = interner.intern("O");
        let clk_pin = interner.intern("CLK");

        let mut bels = Vec::new();
        let mut name_to_bel = HashMap::new();
        let mut wire_ids = Vec::new();
        let mut next_wire = 0u32;

        let mut alloc_wire = |wire_ids: &mut Vec<WireId>, next_wire: &mut u32| -> WireId {
            let w = WireId::from_raw(*next_wire);
            *next_wire += 1;
            wire_ids.push(w);
            w
        };

        for y in 0..config.height {
            for x in 0..config.width {
                for i in 0..config.luts_per_tile {
                    let name = format!("X{x}Y{y}/LUT{i}");
                    let pins = vec![in_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.lut,
                        x,
                        y,
                        z: i,
                        pins,
                        pin_wires,
                        global_buf: false,
                        exclusive: Vec::new(),
                    });
                }
                for i in 0..config.ffs_per_tile {
                    let name = format!("X{x}Y{y}/FF{i}");
                    let pins = vec![in_pin, clk_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.dff,
                        x,
                        y,
                        z: config.luts_per_tile + i,
                        pins,
                        pin_wires,
                        global_buf: false,
                        exclusive: Vec::new(),
                    });
                }
                {
                    let name = format!("X{x}Y{y}/CARRY");
                    let pins = vec![in_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.carry,
                        x,
                        y,
                        z: config.luts_per_tile + config.ffs_per_tile,
                        pins,
                        pin_wires,
                        global_buf: false,
                        exclusive: Vec::new(),
                    });
                }
                if x == 0 || y == 0 || x == config.width - 1 || y == config.height - 1 {
                    let name = format!("X{x}Y{y}/IOBUF");
                    let pins = vec![in_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.iobuf,
                        x,
                        y,
                        z: 0,
                        pins,
                        pin_wires,
                        global_buf: false,
                        exclusive: Vec::new(),
                    });
                }
                if config.bram_column_stride > 0 && x % config.bram_column_stride == 0 {
                    let lo_idx = bels.len();
                    let hi_idx = lo_idx + 1;
                    for half in 0..2 {
                        let name = format!("X{x}Y{y}/BRAM18_{half}");
                        let pins = vec![in_pin, out_pin];
                        let pin_wires = vec![
                            alloc_wire(&mut wire_ids, &mut next_wire),
                            alloc_wire(&mut wire_ids, &mut next_wire),
                        ];
                        bels.push(BelRecord {
                            name,
                            bel_type: cell_types.bram,
                            x,
                            y,
                            z: 100 + half,
                            pins,
                            pin_wires,
                            global_buf: false,
                            exclusive: Vec::new(),
                        });
                    }
                    let lo = BelId::from_raw(lo_idx as u32);
                    let hi = BelId::from_raw(hi_idx as u32);
                    bels[lo_idx].exclusive.push(hi);
                    bels[hi_idx].exclusive.push(lo);
                }
                if config.dsp_column_stride > 0 && x % config.dsp_column_stride == 0 {
                    let name = format!("X{x}Y{y}/DSP");
                    let pins = vec![in_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.dsp,
                        x,
                        y,
                        z: 200,
                        pins,
                        pin_wires,
                        global_buf: false,
                        exclusive: Vec::new(),
                    });
                }
                if config.pll_tiles.contains(&(x, y)) {
                    let name = format!("X{x}Y{y}/PLL");
                    let pins = vec![in_pin, out_pin];
                    let pin_wires = vec![
                        alloc_wire(&mut wire_ids, &mut next_wire),
                        alloc_wire(&mut wire_ids, &mut next_wire),
                    ];
                    bels.push(BelRecord {
                        name,
                        bel_type: cell_types.pll,
                        x,
                        y,
                        z: 300,
                        pins,
                        pin_wires,
                        global_buf: true,
                        exclusive: Vec::new(),
                    });
                }
            }
        }

        let mut pips = HashMap::new();
        let mut pip_ids = Vec::new();
        let mut uphill: HashMap<WireId, Vec<PipId>> = HashMap::new();
        let mut downhill: HashMap<WireId, Vec<PipId>> = HashMap::new();
        let mut next_pip = 0u32;
        for record in &bels {
            for pair in record.pin_wires.windows(2) {
                let (src, dst) = (pair[0], pair[1]);
                let pip = PipId::from_raw(next_pip);
                next_pip += 1;
                pips.insert(pip, PipRecord { src, dst });
                pip_ids.push(pip);
                downhill.entry(src).or_default().push(pip);
                uphill.entry(dst).or_default().push(pip);
            }
        }

        for (idx, record) in bels.iter().enumerate() {
            name_to_bel.insert(record.name.clone(), BelId::from_raw(idx as u32));
        }
        let bel_ids: Vec<BelId> = (0..bels.len() as u32).map(BelId::from_raw).collect();

        Self {
            config,
            bel_ids,
            bels,
            name_to_bel,
            wire_ids,
            pips,
            pip_ids,
            uphill,
            downhill,
            cell_types,
            in_pin,
            out_pin,
            clk_pin,
        }
    }

    /// The built-in cell type ids this catalog registered at construction.
    pub fn cell_types(&self) -> CellTypeIds {
        self.cell_types
    }

    /// The `"I"` / `"O"` / `"CLK"` pin name ids shared by every bel kind this
    /// catalog generates.
    pub fn pin_names(&self) -> (Id, Id, Id) {
        (self.in_pin, self.out_pin, self.clk_pin)
    }

    /// The clock region containing `bel`, as `(region_x, region_y)`.
    pub fn region_of(&self, bel: BelId) -> (i32, i32) {
        let r = &self.bels[bel.as_raw() as usize];
        let size = self.config.clock_region_size.max(1);
        (r.x / size, r.y / size)
    }

    fn record(&self, bel: BelId) -> &BelRecord {
        &self.bels[bel.as_raw() as usize]
    }
}

impl ArchCatalog for GridCatalog {
    fn bels(&self) -> &[BelId] {
        &self.bel_ids
    }

    fn bels_by_tile(&self, x: i32, y: i32) -> Vec<BelId> {
        self.bel_ids
            .iter()
            .copied()
            .filter(|&b| {
                let r = self.record(b);
                r.x == x && r.y == y
            })
            .collect()
    }

    fn bel_type(&self, bel: BelId) -> Id {
        self.record(bel).bel_type
    }

    fn bel_name(&self, bel: BelId) -> &str {
        &self.record(bel).name
    }

    fn get_bel_by_name(&self, name: &str) -> Option<BelId> {
        self.name_to_bel.get(name).copied()
    }

    fn bel_location(&self, bel: BelId) -> (i32, i32, i32) {
        let r = self.record(bel);
        (r.x, r.y, r.z)
    }

    fn estimate_position(&self, bel: BelId) -> (f64, f64) {
        let r = self.record(bel);
        (r.x as f64 + 0.5, r.y as f64 + 0.5)
    }

    fn bel_pins(&self, bel: BelId) -> &[Id] {
        &self.record(bel).pins
    }

    fn bel_pin_wire(&self, bel: BelId, pin: Id) -> Option<WireId> {
        let r = self.record(bel);
        r.pins
            .iter()
            .position(|&p| p == pin)
            .map(|idx| r.pin_wires[idx])
    }

    fn bel_global_buf(&self, bel: BelId) -> bool {
        self.record(bel).global_buf
    }

    fn is_bel_location_valid(&self, bel: BelId) -> bool {
        (bel.as_raw() as usize) < self.bels.len()
    }

    fn exclusive_bels(&self, bel: BelId) -> &[BelId] {
        &self.record(bel).exclusive
    }

    fn bel_region(&self, bel: BelId) -> u64 {
        let (rx, ry) = self.region_of(bel);
        (rx as u64) << 32 | ry as u64
    }

    fn is_valid_bel_for_cell(&self, cell_type: Id, bel: BelId, clocks_in_region: &[Id]) -> bool {
        if !self.is_bel_location_valid(bel) {
            return false;
        }
        if cell_type == self.cell_types.dff {
            let distinct: std::collections::HashSet<Id> = clocks_in_region.iter().copied().collect();
            if distinct.len() > self.config.max_clocks_per_region {
                return false;
            }
        }
        true
    }

    fn wires(&self) -> &[WireId] {
        &self.wire_ids
    }

    fn pips(&self) -> &[PipId] {
        &self.pip_ids
    }

    fn pip_src(&self, pip: PipId) -> WireId {
        self.pips[&pip].src
    }

    fn pip_dst(&self, pip: PipId) -> WireId {
        self.pips[&pip].dst
    }

    fn pips_uphill(&self, wire: WireId) -> Vec<PipId> {
        self.uphill.get(&wire).cloned().unwrap_or_default()
    }

    fn pips_downhill(&self, wire: WireId) -> Vec<PipId> {
        self.downhill.get(&wire).cloned().unwrap_or_default()
    }

    fn bel_checksum(&self, bel: BelId) -> u32 {
        let r = self.record(bel);
        let mut h = mix32(bel.as_raw());
        h = mix32(h ^ r.bel_type.as_raw());
        h ^ fold_bytes(r.name.as_bytes())
    }

    fn wire_checksum(&self, wire: WireId) -> u32 {
        mix32(wire.as_raw() ^ 0x5151_5151)
    }

    fn pip_checksum(&self, pip: PipId) -> u32 {
        let r = &self.pips[&pip];
        let mut h = mix32(pip.as_raw());
        h = mix32(h ^ self.wire_checksum(r.src));
        mix32(h ^ self.wire_checksum(r.dst))
    }

    fn wire_delay(&self, _wire: WireId) -> Delay {
        Delay::from_picos(20)
    }

    fn pip_delay(&self, _pip: PipId) -> Delay {
        Delay::from_picos(80)
    }

    fn estimate_delay(&self, src: WireId, dst: WireId) -> Delay {
        if src == dst {
            Delay::ZERO
        } else {
            Delay::from_picos(100)
        }
    }

    fn get_cell_delay(&self, cell_type: Id, from_pin: Id, to_pin: Id) -> Option<DelayInfo> {
        if from_pin == to_pin {
            return None;
        }
        if cell_type == self.cell_types.lut {
            Some(DelayInfo::uniform(Delay::from_picos(300)))
        } else if cell_type == self.cell_types.dff {
            Some(DelayInfo::uniform(Delay::from_picos(50)))
        } else {
            None
        }
    }

    fn get_port_clock(&self, cell_type: Id, port: Id) -> Option<Id> {
        if cell_type == self.cell_types.dff && port == self.out_pin {
            Some(self.clk_pin)
        } else {
            None
        }
    }

    fn is_clock_port(&self, cell_type: Id, port: Id) -> bool {
        cell_type == self.cell_types.dff && port == self.clk_pin
    }
}
