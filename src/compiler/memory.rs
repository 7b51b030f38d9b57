//! The flat memory image programs compile into and execute against.
//!
//! Memory is a fixed run of cells plus a small register bank. Cells are
//! handed out by a first-fit allocator and never reclaimed; one memory
//! image lives exactly as long as one program run. Pointer 0 is reserved
//! as the "no allocation" sentinel, so usable addresses start at 1.

/// 2^16 - 1 cells.
pub const MEM_SIZE: usize = 65535;
/// 16 standard registers + 4 system registers. Present for future opcodes;
/// no current instruction touches them.
pub const REG_COUNT: usize = 16;
pub const SYS_REG_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemCell {
    pub occupied: bool,
    pub value: i32,
}

pub struct Memory {
    // Fixed length for the lifetime of the image; heap-backed.
    cells: Vec<MemCell>,
    pub regs: [i32; REG_COUNT],
    pub sys_regs: [i32; SYS_REG_COUNT],
}

impl Memory {
    pub fn new() -> Self {
        Memory::with_capacity(MEM_SIZE)
    }

    /// A smaller image, for exercising the allocator near its boundary.
    pub fn with_capacity(cells: usize) -> Self {
        Memory {
            cells: vec![MemCell::default(); cells],
            regs: [0; REG_COUNT],
            sys_regs: [0; SYS_REG_COUNT],
        }
    }

    /// Resets every cell to free/zero and clears the registers. Called at
    /// the top of each compilation so recompiling on one image never
    /// double-allocates.
    pub fn init(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = MemCell::default();
        }
        self.regs = [0; REG_COUNT];
        self.sys_regs = [0; SYS_REG_COUNT];
    }

    /// First-fit scan for a free run of `size` cells, starting at pointer 1.
    /// On hitting an occupied cell the candidate advances by `size`, not
    /// by 1, so the probe can stride over smaller free gaps. Downstream
    /// layout (contiguous string buffers in particular) relies on this
    /// exact placement.
    fn find_run(&self, size: usize) -> u16 {
        if size == 0 {
            return 0;
        }
        let mut ptr = 1usize;
        while ptr + size <= self.cells.len() {
            if (ptr..ptr + size).any(|i| self.cells[i].occupied) {
                ptr += size;
            } else {
                return ptr as u16;
            }
        }
        0
    }

    /// Claims `size` zeroed cells. Returns the run's start pointer, or 0 if
    /// no free run fits before the array boundary.
    pub fn allocate(&mut self, size: usize) -> u16 {
        let ptr = self.find_run(size);
        if ptr != 0 {
            for cell in &mut self.cells[ptr as usize..ptr as usize + size] {
                *cell = MemCell {
                    occupied: true,
                    value: 0,
                };
            }
        }
        ptr
    }

    /// Claims a run sized to `values` and writes the values into it.
    pub fn allocate_and_fill(&mut self, values: &[i32]) -> u16 {
        let ptr = self.find_run(values.len());
        if ptr != 0 {
            for (cell, &value) in self.cells[ptr as usize..].iter_mut().zip(values) {
                *cell = MemCell {
                    occupied: true,
                    value,
                };
            }
        }
        ptr
    }

    /// Overwrites one cell, occupied or not. Pointers come from variable
    /// resolution and always denote allocated cells; writes past the end
    /// are ignored.
    pub fn write(&mut self, ptr: u16, value: i32) {
        if let Some(cell) = self.cells.get_mut(ptr as usize) {
            cell.value = value;
        }
    }

    /// Reads one cell's value. Out-of-range pointers read as 0, which also
    /// terminates any string scan that walks off the end of the image.
    pub fn read(&self, ptr: u16) -> i32 {
        self.cells.get(ptr as usize).map(|c| c.value).unwrap_or(0)
    }

    /// The first `count` cells, for the debug dump.
    pub fn snapshot(&self, count: usize) -> &[MemCell] {
        &self.cells[..count.min(self.cells.len())]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}
