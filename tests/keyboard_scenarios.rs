use std::{cell::Cell, rc::Rc};

use tonegrid::{
    config::KeyboardConfig,
    engine::{offline::OfflineEngine, EngineCommand, EngineStatus},
    error::EngineResult,
    keyboard::{Direction, GainStep, Keyboard},
    tuning::{FrequencyTable, KeyIndex, KeyNames, NameStyle, KEY_COUNT},
};

const SR: f32 = 48_000.0;

fn key(i: usize) -> KeyIndex {
    KeyIndex::new(i).unwrap()
}

fn counting_keyboard(
    created: Rc<Cell<u32>>,
) -> Keyboard<impl FnMut() -> EngineResult<OfflineEngine>> {
    Keyboard::new(KeyboardConfig::default(), move || {
        created.set(created.get() + 1);
        EngineResult::Ok(OfflineEngine::new(SR))
    })
}

fn set_targets(journal: &[EngineCommand]) -> Vec<f32> {
    journal
        .iter()
        .filter_map(|cmd| match cmd {
            EngineCommand::SetTarget { target, .. } => Some(*target),
            _ => None,
        })
        .collect()
}

fn peak(buf: &[f32]) -> f32 {
    buf.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

#[test]
fn a440_table() {
    let table = FrequencyTable::equal_tempered(440.0);
    assert_eq!(table.get(key(57)), 440.0);
    assert_eq!(table.get(key(45)), 220.0);
    assert_eq!(table.get(key(69)), 880.0);
    assert_eq!(table.len(), KEY_COUNT);
}

#[test]
fn names_do_not_depend_on_pitch() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    let before: Vec<String> = KeyIndex::all()
        .map(|k| keyboard.name(k, NameStyle::Long).to_owned())
        .collect();
    keyboard.set_reference_pitch(415.0);
    let after: Vec<String> = KeyIndex::all()
        .map(|k| keyboard.name(k, NameStyle::Long).to_owned())
        .collect();
    assert_eq!(before, after);
    assert_eq!(KeyNames::new().name(key(49), NameStyle::Short), "#4");
}

#[test]
fn engine_is_created_once_across_toggles() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created.clone());
    assert_eq!(keyboard.engine_status(), EngineStatus::NotCreated);

    assert!(keyboard.toggle(key(0)));
    assert!(keyboard.is_playing(key(0)));
    assert_eq!(created.get(), 1);

    keyboard.toggle(key(1));
    keyboard.toggle(key(0));
    assert_eq!(created.get(), 1);
    assert_eq!(keyboard.engine_status(), EngineStatus::Running);
}

#[test]
fn gain_change_retargets_live_voice_once() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    keyboard.toggle(key(60));
    let voice = *keyboard.voices().voice(key(60)).unwrap();
    keyboard.engine_mut().unwrap().clear_journal();

    keyboard.set_gain(0.5);

    let journal = keyboard.engine().unwrap().journal();
    assert_eq!(
        journal,
        &[EngineCommand::SetTarget {
            gain: voice.gain,
            target: 0.5,
            start_time: 0.0,
            time_constant: 0.2,
        }]
    );
    assert_eq!(keyboard.voices().voice(key(60)), Some(&voice));
}

#[test]
fn release_ramps_once_and_stops_after_one_second() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    keyboard.toggle(key(33));
    let voice = *keyboard.voices().voice(key(33)).unwrap();
    keyboard.engine_mut().unwrap().clear_journal();

    keyboard.toggle(key(33));
    assert_eq!(set_targets(keyboard.engine().unwrap().journal()), vec![0.0]);
    assert_eq!(keyboard.voices().next_stop(), Some(1.0));

    // Ticks inside the fade window do nothing
    for _ in 0..9 {
        keyboard.engine_mut().unwrap().advance(0.1);
        assert_eq!(keyboard.tick(), 0);
    }
    keyboard.engine_mut().unwrap().advance(0.1);
    assert_eq!(keyboard.tick(), 1);

    let journal = keyboard.engine().unwrap().journal();
    assert_eq!(set_targets(journal), vec![0.0]);
    assert_eq!(
        &journal[1..],
        &[
            EngineCommand::Stop { tone: voice.tone },
            EngineCommand::Disconnect { node: voice.gain },
        ]
    );
    assert_eq!(keyboard.tick(), 0);
}

#[test]
fn mute_round_trip() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    keyboard.adjust_gain(GainStep::Coarse, Direction::Up);
    keyboard.adjust_gain(GainStep::Fine, Direction::Up);
    let before = keyboard.gain();
    keyboard.toggle_mute();
    assert_eq!(keyboard.gain(), 0.0);
    keyboard.toggle_mute();
    assert_eq!(keyboard.gain(), before);
}

#[test]
fn pause_all_from_any_state() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    for i in (0..KEY_COUNT).step_by(5) {
        keyboard.toggle(key(i));
    }
    keyboard.pause_all();
    assert!(keyboard.playing().iter().all(|&p| !p));
    keyboard.pause_all();
    assert!(keyboard.playing().iter().all(|&p| !p));
    assert_eq!(keyboard.live_voices(), 0);
}

#[test]
fn rendered_tone_fades_in_and_out() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    keyboard.toggle(KeyIndex::REFERENCE);

    let engine = keyboard.engine_mut().unwrap();
    let attack = engine.render(256);
    assert!(peak(&attack) < 0.01, "onset should be soft");
    let held = engine.render(SR as usize);
    let tail = peak(&held[held.len() - 1024..]);
    assert!((tail - 0.2).abs() < 0.01, "settles on master gain, got {tail}");

    keyboard.toggle(KeyIndex::REFERENCE);
    let engine = keyboard.engine_mut().unwrap();
    let release = engine.render(SR as usize + 64);
    assert!(peak(&release[..256]) > 0.15, "release starts from current level");
    assert!(peak(&release[release.len() - 1024..]) < 0.002);

    assert_eq!(keyboard.tick(), 1);
    let engine = keyboard.engine_mut().unwrap();
    assert_eq!(peak(&engine.render(1024)), 0.0);
}

#[test]
fn shutdown_drains_then_goes_quiet() {
    let created = Rc::new(Cell::new(0));
    let mut keyboard = counting_keyboard(created);
    keyboard.toggle(key(10));
    keyboard.toggle(key(70));
    keyboard.shutdown();
    keyboard.toggle(key(80));
    assert_eq!(keyboard.live_voices(), 0);

    keyboard.engine_mut().unwrap().advance(1.0);
    keyboard.tick();
    assert!(keyboard.is_idle());
    let engine = keyboard.into_engine().unwrap();
    assert_eq!(engine.renderer().tone_count(), 0);
    assert_eq!(engine.renderer().gain_count(), 0);
}
