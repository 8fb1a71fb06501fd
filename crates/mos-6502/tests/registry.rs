//! Opcode coverage and cycle timing.

use emu_core::{Memory, Ticks};
use mos_6502::{CpuError, EngineState, Mos6502, Opcode, Operation, registry};

fn cpu_at(pc: u16, program: &[u8]) -> (Mos6502, Memory) {
    let memory = Memory::from_image(pc, program).expect("program fits");
    let mut cpu = Mos6502::new();
    cpu.regs.pc = pc;
    (cpu, memory)
}

#[test]
fn every_opcode_decodes_or_faults() {
    let mut documented = 0;
    for code in 0..=0xFF_u8 {
        let opcode = Opcode::lookup(code);
        assert_eq!(opcode.code, code);
        if opcode.is_documented() {
            documented += 1;
            assert!(opcode.cycles >= 2, "${code:02X}");
            continue;
        }

        let (mut cpu, mut memory) = cpu_at(0x0200, &[code]);
        cpu.regs.a = 0x11;
        cpu.regs.x = 0x22;
        let before = cpu.regs;

        let result = cpu.step(&mut memory);
        assert_eq!(
            result.state,
            EngineState::Faulted(CpuError::IllegalOpcode {
                opcode: code,
                pc: 0x0200
            })
        );
        assert_eq!(result.cycles, 0);
        assert_eq!(cpu.regs, before, "${code:02X} changed registers");
    }
    assert_eq!(documented, 151);
}

#[test]
fn registry_is_shared() {
    assert!(std::ptr::eq(registry(), registry()));
    assert_eq!(registry()[0xEA].operation, Operation::Nop);
}

fn cycles_for(pc: u16, program: &[u8], setup: impl FnOnce(&mut Mos6502, &mut Memory)) -> u32 {
    let (mut cpu, mut memory) = cpu_at(pc, program);
    setup(&mut cpu, &mut memory);
    let result = cpu.step(&mut memory);
    assert_eq!(result.state, EngineState::Ready);
    result.cycles
}

#[test]
fn absolute_x_read_page_cross_costs_one() {
    // LDA $12F0,X
    let program = [0xBD, 0xF0, 0x12];
    assert_eq!(cycles_for(0x0200, &program, |cpu, _| cpu.regs.x = 0x01), 4);
    assert_eq!(cycles_for(0x0200, &program, |cpu, _| cpu.regs.x = 0x20), 5);
}

#[test]
fn absolute_y_read_page_cross_costs_one() {
    // LDX $12F0,Y
    let program = [0xBE, 0xF0, 0x12];
    assert_eq!(cycles_for(0x0200, &program, |cpu, _| cpu.regs.y = 0x0F), 4);
    assert_eq!(cycles_for(0x0200, &program, |cpu, _| cpu.regs.y = 0x10), 5);
}

#[test]
fn indirect_indexed_read_page_cross_costs_one() {
    // LDA ($10),Y with pointer $12F0
    let program = [0xB1, 0x10];
    let pointer = |memory: &mut Memory| {
        memory.poke(0x0010, 0xF0);
        memory.poke(0x0011, 0x12);
    };
    assert_eq!(
        cycles_for(0x0200, &program, |cpu, memory| {
            pointer(memory);
            cpu.regs.y = 0x01;
        }),
        5
    );
    assert_eq!(
        cycles_for(0x0200, &program, |cpu, memory| {
            pointer(memory);
            cpu.regs.y = 0x20;
        }),
        6
    );
}

#[test]
fn stores_and_rmw_ignore_page_cross() {
    // STA $12F0,X
    assert_eq!(cycles_for(0x0200, &[0x9D, 0xF0, 0x12], |cpu, _| cpu.regs.x = 0x20), 5);
    // INC $12F0,X
    assert_eq!(cycles_for(0x0200, &[0xFE, 0xF0, 0x12], |cpu, _| cpu.regs.x = 0x20), 7);
    // STA ($10),Y
    assert_eq!(
        cycles_for(0x0200, &[0x91, 0x10], |cpu, memory| {
            memory.poke(0x0010, 0xF0);
            memory.poke(0x0011, 0x12);
            cpu.regs.y = 0x20;
        }),
        6
    );
}

#[test]
fn branch_cycles() {
    // BNE +$10
    let program = [0xD0, 0x10];
    // Not taken
    assert_eq!(cycles_for(0x0200, &program, |cpu, _| cpu.regs.p.zero = true), 2);
    // Taken, same page
    assert_eq!(cycles_for(0x0200, &program, |_, _| {}), 3);
    // Taken, $02F2 -> $0302
    assert_eq!(cycles_for(0x02F0, &program, |_, _| {}), 4);
}

#[test]
fn total_cycles_accumulate_penalties() {
    // LDA $12F0,X (5 with cross); BNE back across no page (3)
    let (mut cpu, mut memory) = cpu_at(0x0200, &[0xBD, 0xF0, 0x12, 0xD0, 0xFB]);
    cpu.regs.x = 0x20;
    memory.poke(0x1310, 0x01);
    cpu.step(&mut memory);
    cpu.step(&mut memory);
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.total_cycles(), Ticks::new(8));
}

#[test]
fn instruction_sizes() {
    assert_eq!(Opcode::lookup(0xEA).size(), 1);
    assert_eq!(Opcode::lookup(0xA9).size(), 2);
    assert_eq!(Opcode::lookup(0x20).size(), 3);
    assert_eq!(Opcode::lookup(0x6C).size(), 3);
}

fn faults_at(pc: u16, program: &[u8], setup: impl FnOnce(&mut Mos6502, &mut Memory)) -> i32 {
    let (mut cpu, mut memory) = cpu_at(pc, program);
    setup(&mut cpu, &mut memory);
    let before = cpu.regs;
    let result = cpu.step(&mut memory);
    assert_eq!(result.cycles, 0);
    assert_eq!(cpu.regs, before, "registers rolled back");
    assert_eq!(cpu.total_cycles(), Ticks::ZERO);
    match result.state {
        EngineState::Faulted(CpuError::OutOfRangeAddress(address)) => address,
        other => panic!("expected an out-of-range fault, got {other:?}"),
    }
}

#[test]
fn branch_forward_past_top_of_memory_faults() {
    // BNE +$7F at $FFF0: next instruction $FFF2, target $10071
    assert_eq!(faults_at(0xFFF0, &[0xD0, 0x7F], |_, _| {}), 0x1_0071);
}

#[test]
fn branch_backward_below_zero_faults() {
    // BNE -128 at $0000: next instruction $0002, target -126
    assert_eq!(faults_at(0x0000, &[0xD0, 0x80], |_, _| {}), -126);
}

#[test]
fn untaken_branch_near_the_edge_runs() {
    // BEQ +$7F at $FFF0 with Z clear falls through to $FFF2
    let (mut cpu, mut memory) = cpu_at(0xFFF0, &[0xF0, 0x7F]);
    let result = cpu.step(&mut memory);
    assert_eq!(result.state, EngineState::Ready);
    assert_eq!(cpu.regs.pc, 0xFFF2);
}

#[test]
fn operand_fetch_past_top_of_memory_faults() {
    // LDA $nnnn at $FFFE: high operand byte would come from $10000
    assert_eq!(faults_at(0xFFFE, &[0xAD, 0x00], |_, _| {}), 0x1_0000);
}

#[test]
fn pc_advance_past_top_of_memory_faults() {
    // NOP at $FFFF
    assert_eq!(faults_at(0xFFFF, &[0xEA], |_, _| {}), 0x1_0000);
}

#[test]
fn rts_to_top_of_memory_faults() {
    // Pulled return address $FFFF resumes at $10000
    let address = faults_at(0x0200, &[0x60], |cpu, memory| {
        cpu.regs.s = 0xFD;
        memory.poke(0x01FE, 0xFF);
        memory.poke(0x01FF, 0xFF);
    });
    assert_eq!(address, 0x1_0000);
}

#[test]
fn brk_return_address_past_top_of_memory_faults_before_pushing() {
    // BRK at $FFFE: the pushed return address would be $10000
    let (mut cpu, mut memory) = cpu_at(0xFFFE, &[0x00]);
    cpu.regs.s = 0xFF;
    let before = cpu.regs;
    let result = cpu.step(&mut memory);
    assert_eq!(
        result.state,
        EngineState::Faulted(CpuError::OutOfRangeAddress(0x1_0000))
    );
    assert_eq!(cpu.regs, before);
    assert_eq!(memory.peek(0x01FF), 0x00);
    assert_eq!(memory.peek(0x01FE), 0x00);
    assert_eq!(memory.peek(0x01FD), 0x00);
}
