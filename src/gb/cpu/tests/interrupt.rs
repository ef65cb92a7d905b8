use crate::gb::bus::InterruptRegister;
use crate::gb::cpu::tests::MockBus;
use crate::gb::cpu::CPU;
use crate::gb::interrupt;
use crate::gb::Bus;

#[test]
fn test_no_pending_interrupt_is_a_noop() {
    let mut cpu = CPU::default();
    cpu.ime = true;
    let mut bus = MockBus::new(vec![0x00; 0x100]);
    let cycles = interrupt::handle(&mut cpu, &mut bus);
    assert_eq!(cycles, 0);
    assert_eq!(cpu.pc, 0);
    assert!(cpu.ime);
}

#[test]
fn test_pending_interrupt_wakes_halted_cpu() {
    let mut cpu = CPU {
        is_halted: true,
        ..Default::default()
    };
    let mut bus = MockBus::new(vec![0x00; 0x100]);
    bus.set_ie(InterruptRegister::VBLANK);
    bus.set_if(InterruptRegister::VBLANK);

    let cycles = interrupt::handle(&mut cpu, &mut bus);
    assert!(
        !cpu.is_halted,
        "CPU should always wake up from HALT if an interrupt is pending"
    );
    assert_eq!(cycles, 0, "With IME disabled nothing is dispatched");
    assert_eq!(cpu.pc, 0);
    assert_eq!(
        bus.get_if(),
        InterruptRegister::VBLANK,
        "IF should be untouched without dispatch"
    );
}

#[test]
fn test_interrupt_dispatch_vectors() {
    let data = [
        (InterruptRegister::VBLANK, 0x0040),
        (InterruptRegister::STAT, 0x0048),
        (InterruptRegister::TIMER, 0x0050),
        (InterruptRegister::JOYPAD, 0x0060),
    ];

    for (irq, address) in data {
        let mut cpu = CPU {
            ime: true,
            ..Default::default()
        };
        cpu.sp = 0x0002;
        cpu.pc = 0x1234;
        let mut bus = MockBus::new(vec![0x00; 0x100]);
        bus.set_ie(irq);
        bus.set_if(irq);

        let cycles = interrupt::handle(&mut cpu, &mut bus);

        assert_eq!(cpu.pc, address, "PC should be set to {address:#06x}");
        assert_eq!(
            bus.get_if(),
            InterruptRegister::empty(),
            "IF should be cleared"
        );
        assert_eq!(bus.get_ie(), irq, "IE should remain unchanged");
        assert!(!cpu.ime, "IME should be disabled");
        assert_eq!(bus.data[0], 0x34, "Should contain low bits of old PC");
        assert_eq!(bus.data[1], 0x12, "Should contain high bits of old PC");
        assert_eq!(cpu.sp, 0x0000, "SP should be decremented by 2");
        assert_eq!(cycles, 20);
    }
}

#[test]
fn test_interrupt_priority() {
    let mut cpu = CPU {
        ime: true,
        ..Default::default()
    };
    cpu.sp = 0x0004;
    let mut bus = MockBus::new(vec![0x00; 0x100]);
    bus.set_ie(InterruptRegister::VBLANK | InterruptRegister::TIMER);
    bus.set_if(InterruptRegister::VBLANK | InterruptRegister::TIMER);

    // V-Blank wins, only one interrupt is serviced per step
    interrupt::handle(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0040);
    assert_eq!(bus.get_if(), InterruptRegister::TIMER);

    // The next dispatch takes the timer, once IME is enabled again
    cpu.ime = true;
    interrupt::handle(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x0050);
    assert_eq!(bus.get_if(), InterruptRegister::empty());
}

#[test]
fn test_serial_is_never_serviced() {
    let mut cpu = CPU {
        ime: true,
        ..Default::default()
    };
    let mut bus = MockBus::new(vec![0x00; 0x100]);
    bus.set_ie(InterruptRegister::SERIAL);
    bus.set_if(InterruptRegister::SERIAL);

    let cycles = interrupt::handle(&mut cpu, &mut bus);
    assert_eq!(cycles, 0);
    assert_eq!(cpu.pc, 0);
    assert_eq!(bus.get_if(), InterruptRegister::SERIAL);
}

#[test]
fn test_halt_resumes_after_wakeup_without_ime() {
    // HALT, then a pending interrupt with IME disabled:
    // execution simply continues behind the HALT.
    let mut bus = MockBus::new(vec![0x76, 0x3C, 0x00]);
    let mut cpu = CPU::default();
    cpu.step(&mut bus);
    assert!(cpu.is_halted);

    bus.set_ie(InterruptRegister::VBLANK);
    bus.set_if(InterruptRegister::VBLANK);
    interrupt::handle(&mut cpu, &mut bus);
    assert!(!cpu.is_halted);

    // INC A executes normally
    cpu.step(&mut bus);
    assert_eq!(cpu.r.a, 0x01);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn test_ei_interrupt_window() {
    // EI; NOP; the interrupt is taken only after the instruction
    // following EI has executed.
    let mut program = vec![0u8; 0x81];
    program[0] = 0xFB;
    let mut bus = MockBus::new(program);
    let mut cpu = CPU::default();
    bus.set_ie(InterruptRegister::VBLANK);
    bus.set_if(InterruptRegister::VBLANK);
    cpu.sp = 0x0080;

    cpu.step(&mut bus);
    assert_eq!(interrupt::handle(&mut cpu, &mut bus), 0, "IME is still off");

    cpu.step(&mut bus);
    assert_eq!(interrupt::handle(&mut cpu, &mut bus), 20);
    assert_eq!(cpu.pc, 0x0040);
}
