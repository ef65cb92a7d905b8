use crate::gb::bus::InterruptRegister;
use crate::gb::cpu::CPU;
use crate::gb::timer::Cycles::M;
use crate::gb::Bus;

const VBLANK_IRQ_ADDRESS: u16 = 0x40;
const LCD_IRQ_ADDRESS: u16 = 0x48;
const TIMER_IRQ_ADDRESS: u16 = 0x50;
const JOYPAD_IRQ_ADDRESS: u16 = 0x60;

/// Handles pending interrupt requests and returns the number of T-cycles
/// consumed by the dispatch. At most one interrupt is serviced per step;
/// the serial bit is present in IE/IF but never requested by this machine.
pub fn handle<T: Bus>(cpu: &mut CPU, bus: &mut T) -> u16 {
    if !bus.has_irq() {
        return 0;
    }

    // CPU should always be woken up from HALT if there is a pending interrupt
    cpu.is_halted = false;

    if !cpu.ime {
        return 0;
    }

    let requests = [
        (InterruptRegister::VBLANK, VBLANK_IRQ_ADDRESS),
        (InterruptRegister::STAT, LCD_IRQ_ADDRESS),
        (InterruptRegister::TIMER, TIMER_IRQ_ADDRESS),
        (InterruptRegister::JOYPAD, JOYPAD_IRQ_ADDRESS),
    ];
    for (irq, address) in requests {
        if bus.get_ie().contains(irq) && bus.get_if().contains(irq) {
            return service(cpu, bus, irq, address);
        }
    }
    0
}

/// Jumps to the interrupt vector after acknowledging the request.
fn service<T: Bus>(cpu: &mut CPU, bus: &mut T, irq: InterruptRegister, address: u16) -> u16 {
    cpu.ime = false;
    let mut flags = bus.get_if();
    flags.remove(irq);
    bus.set_if(flags);

    // Save the current execution address by pushing it onto the stack
    cpu.sp = cpu.sp.wrapping_sub(1);
    bus.write(cpu.sp, (cpu.pc >> 8) as u8);
    cpu.sp = cpu.sp.wrapping_sub(1);
    bus.write(cpu.sp, cpu.pc as u8);
    cpu.pc = address;
    M(5).ticks()
}
