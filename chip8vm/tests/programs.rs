use chip8vm::{
    Builder, Chip8, Context, CycleOutcome, Driver, ExecState, Fault, FixedClock, FrameView,
    KeypadState, StopReason, HEIGHT, WIDTH,
};

struct HeadlessContext {
    keypad: KeypadState,
    sound: bool,
    sound_switches: usize,
}

impl HeadlessContext {
    fn new() -> Self {
        Self {
            keypad: KeypadState::new(),
            sound: false,
            sound_switches: 0,
        }
    }
}

impl Context for HeadlessContext {
    fn is_key_down(&self, key: u8) -> bool {
        self.keypad.is_key_down(key)
    }

    fn poll_key_press_event(&mut self) -> Option<u8> {
        self.keypad.poll_key_press_event()
    }

    fn gen_random(&mut self) -> u8 {
        rand::random::<u8>()
    }

    fn sound_on(&mut self) {
        self.sound = true;
        self.sound_switches += 1;
    }

    fn sound_off(&mut self) {
        self.sound = false;
        self.sound_switches += 1;
    }
}

fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn driver_for(words: &[u16], hz: u32) -> Driver<HeadlessContext, FixedClock> {
    let _ = env_logger::builder().is_test(true).try_init();
    let prog = assemble(words);
    let chip = Builder::new()
        .with_context(HeadlessContext::new())
        .with_program(&prog)
        .build()
        .unwrap();
    Driver::new(chip, FixedClock::from_hz(hz))
}

fn formatted(frame: FrameView<'_>) -> Vec<String> {
    (0..HEIGHT)
        .map(|y| {
            (0..WIDTH)
                .map(|x| match frame.get_bit(x, y) {
                    Some(true) => '#',
                    _ => '.',
                })
                .collect()
        })
        .collect()
}

#[test]
fn prints_decimal_digits() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0x60EA, // LD   V0, 234
        0xA300, // LD   I, 0x300
        0xF033, // LD   B, V0
        0xF265, // LD   V2, [I]
        0x6300, // LD   V3, 0
        0x6400, // LD   V4, 0
        0xF029, // LD   F, V0
        0xD345, // DRW  V3, V4, 5
        0x7305, // ADD  V3, 5
        0xF129, // LD   F, V1
        0xD345, // DRW  V3, V4, 5
        0x7305, // ADD  V3, 5
        0xF229, // LD   F, V2
        0xD345, // DRW  V3, V4, 5
    ], 500);
    assert_eq!(driver.run(1000), StopReason::Halted);
    assert_eq!(driver.cycles(), 15);
    assert_eq!(&driver.chip().registers()[..3], &[2, 3, 4]);
    assert_eq!(driver.chip().registers()[0xF], 0);

    let rows = formatted(driver.chip().frame());
    let expected = [
        "####.####.#..#",
        "...#....#.#..#",
        "####.####.####",
        "#.......#....#",
        "####.####....#",
    ];
    for (row, expected) in rows.iter().zip(expected.iter()) {
        assert_eq!(&row[..expected.len()], *expected, "\n{}", rows.join("\n"));
        assert!(row[expected.len()..].chars().all(|c| c == '.'));
    }
    assert!(rows[5..].iter().all(|row| row.chars().all(|c| c == '.')));
}

#[test]
fn counts_through_subroutine() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0x6000, // 0x200: LD   V0, 0
        0x220C, // 0x202: CALL 0x20C
        0x3010, // 0x204: SE   V0, 16
        0x1202, // 0x206: JP   0x202
        0x0000, // 0x208: halt
        0x0000,
        0x7001, // 0x20C: ADD  V0, 1
        0x00EE, // 0x20E: RET
    ], 500);
    assert_eq!(driver.run(10_000), StopReason::Halted);
    assert_eq!(driver.chip().registers()[0], 16);
    assert_eq!(driver.chip().sp(), 0);
    assert_eq!(driver.chip().pc(), 0x208);
    assert_eq!(driver.cycles(), 1 + 16 * 4 + 15 + 1);
}

#[test]
fn detects_collision() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0xA000, // LD   I, 0x000
        0xD005, // DRW  V0, V0, 5
        0x85F0, // LD   V5, VF
        0xD005, // DRW  V0, V0, 5
        0x86F0, // LD   V6, VF
    ], 500);
    assert_eq!(driver.run(100), StopReason::Halted);
    assert_eq!(driver.chip().registers()[5], 0);
    assert_eq!(driver.chip().registers()[6], 1);
    assert_eq!(driver.chip().frame().count_lit(), 0);
}

#[test]
fn delay_timer_lasts_one_second() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0x603C, // 0x200: LD   V0, 60
        0xF015, // 0x202: LD   DT, V0
        0xF107, // 0x204: LD   V1, DT
        0x3100, // 0x206: SE   V1, 0
        0x1204, // 0x208: JP   0x204
    ], 500);
    assert_eq!(driver.run(10_000), StopReason::Halted);
    let cycles = driver.cycles();
    assert!((495..=515).contains(&cycles), "halted after {} cycles", cycles);
}

#[test]
fn buzzer_follows_sound_timer() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0x6006, // 0x200: LD   V0, 6
        0xF018, // 0x202: LD   ST, V0
        0x1204, // 0x204: JP   0x204
    ], 60);
    driver.run(2);
    assert!(driver.chip().ctx.sound);
    assert!(driver.chip().is_sound_on());
    driver.run(6);
    assert!(!driver.chip().ctx.sound);
    assert_eq!(driver.chip().sound_timer(), 0);
    driver.run(100);
    assert_eq!(driver.chip().ctx.sound_switches, 2);
}

#[test]
fn waits_for_key_between_steps() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0xF30A, // LD   V3, K
        0x610F, // LD   V1, 0x0F
    ], 500);
    assert_eq!(driver.run(20), StopReason::CycleLimit);
    assert_eq!(driver.chip().state(), ExecState::WaitingForKey { x: 3 });
    assert_eq!(driver.chip().pc(), 0x200);

    driver.chip_mut().ctx.keypad.press(0xE);
    assert_eq!(driver.step(), CycleOutcome::Continue);
    assert_eq!(driver.chip().state(), ExecState::Running);
    assert_eq!(driver.run(10), StopReason::Halted);
    assert_eq!(driver.chip().registers()[3], 0xE);
    assert_eq!(driver.chip().registers()[1], 0x0F);
}

#[test]
fn polls_held_key() {
    #[rustfmt::skip]
    let mut driver = driver_for(&[
        0x620A, // 0x200: LD   V2, 0xA
        0xE2A1, // 0x202: SKNP V2
        0x1208, // 0x204: JP   0x208
        0x1202, // 0x206: JP   0x202
    ], 500);
    let reason = driver.run_with(1000, |chip, cycle| {
        if cycle == 50 {
            chip.ctx.keypad.press(0xA);
        }
    });
    assert_eq!(reason, StopReason::Halted);
    assert!(driver.cycles() > 50 && driver.cycles() < 56);
}

#[test]
fn masked_random() {
    let mut driver = driver_for(&[0xC500, 0xC60F, 0x1204], 500);
    for _ in 0..100 {
        driver.chip_mut().reset();
        driver.run(3);
        let v = driver.chip().registers();
        assert_eq!(v[5], 0);
        assert!(v[6] <= 0x0F);
    }
}

#[test]
fn faults_are_reported_repeatedly() {
    let mut driver = driver_for(&[0x2200], 500);
    assert_eq!(driver.run(100), StopReason::Fault(Fault::StackOverflow));
    assert_eq!(driver.cycles(), 17);
    assert_eq!(
        driver.step(),
        CycleOutcome::Fault(Fault::StackOverflow)
    );
    assert_eq!(driver.chip().sp(), 16);
}

#[test]
fn reset_runs_program_again() {
    let mut driver = driver_for(&[0x7001, 0xA300, 0xF055], 500);
    assert_eq!(driver.run(10), StopReason::Halted);
    driver.chip_mut().reset();
    assert_eq!(driver.run(10), StopReason::Halted);
    assert_eq!(driver.chip().registers()[0], 1);
    assert_eq!(driver.chip().memory().read(0x300), Ok(1));
}

#[test]
fn unknown_instructions_do_not_stop_program() {
    let mut driver = driver_for(&[0x8AB8, 0xE1FF, 0x6A07], 500);
    assert_eq!(driver.run(10), StopReason::Halted);
    assert_eq!(driver.chip().registers()[0xA], 0x07);
}

#[test]
fn chip_without_builder() {
    let prog = assemble(&[0x00E0, 0x6001]);
    let mut chip = Chip8::load(HeadlessContext::new(), &prog).unwrap();
    assert_eq!(chip.step(0.0), CycleOutcome::Continue);
    assert_eq!(chip.step(0.0), CycleOutcome::Continue);
    assert_eq!(chip.step(0.0), CycleOutcome::Halted);
    assert_eq!(chip.registers()[0], 1);
}
