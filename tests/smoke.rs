use gridgrab_core::{ItemType, SimTick};
use gridgrab_testkit::{run_ticks, single_source_world, JsonlSink, TransferRecord};
use gridgrab_world::{GrabberConfig, GrabberEvent, TilePos};

#[test]
fn grabber_drains_source_over_repeated_cycles() {
    // Instant arm, short cooldown: scan + grab + drop + 2 cooldown = 5 ticks per unit.
    let cfg = GrabberConfig {
        grab_speed: 1.0,
        operation_time: 2,
        ..GrabberConfig::default()
    };
    let (mut grid, grabber_pos) = single_source_world(cfg, 2, &[(ItemType::Copper, 3)]);

    let events = run_ticks(&mut grid, 15);

    let stored: Vec<_> = events
        .iter()
        .filter(|(_, _, event)| matches!(event, GrabberEvent::Stored(_)))
        .collect();
    assert_eq!(stored.len(), 3);

    let state = grid.grabber(grabber_pos).expect("grabber still placed");
    assert_eq!(state.inventory.count_of(ItemType::Copper), 3);

    let source_pos = TilePos::new(2, 0);
    let source = grid.tile(source_pos).expect("source still placed");
    assert_eq!(source.entity.as_ref().unwrap().inventory().total(), 0);
}

#[test]
fn overflow_beyond_capacity_is_discarded() {
    let cfg = GrabberConfig {
        grab_speed: 1.0,
        operation_time: 0,
        item_capacity: 2,
        ..GrabberConfig::default()
    };
    let (mut grid, grabber_pos) = single_source_world(cfg, 1, &[(ItemType::Silicon, 4)]);

    let events = run_ticks(&mut grid, 20);

    let discarded = events
        .iter()
        .filter(|(_, _, event)| matches!(event, GrabberEvent::Discarded(_)))
        .count();
    assert_eq!(discarded, 2);
    assert_eq!(grid.grabber(grabber_pos).unwrap().inventory.total(), 2);
}

#[test]
fn transfer_event_stream_can_be_written() {
    let mut sink = JsonlSink::create(std::env::temp_dir().join("gridgrab-events.jsonl"))
        .expect("can create temp log");
    let record = TransferRecord::from_event(
        SimTick::ZERO.advance(1),
        TilePos::new(0, 0),
        GrabberEvent::Stored(ItemType::Copper),
    );
    sink.write(&record).expect("can write event");
}
