/// A memory-mapped device the MMU forwards accesses to.
///
/// Reads and writes arrive with the full 16-bit address, not an offset.
pub trait Peripheral {
    fn name(&self) -> &'static str;
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
    fn reset(&mut self);
}

/// Routing tag naming the peripheral that owns an address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Port {
    Apu,
    Gpu,
    Keypad,
    Timer,
}

impl Port {
    pub const ALL: [Port; 4] = [Port::Apu, Port::Gpu, Port::Keypad, Port::Timer];
}
