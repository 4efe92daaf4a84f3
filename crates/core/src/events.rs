//! Observers notified when a generated floor is handed to the rest of the game.
//!
//! Subscribers are wired explicitly at startup through an [`ObserverSet`]. Publishing a layout
//! reports every room, then every door-connected pair, then a single completion event.

use crate::mapgen::{Layout, PlacedRoom};
use crate::types::{Direction, Pos};

pub trait GenerationObserver {
    /// One call per placed room, in position order.
    fn room_placed(&mut self, _room: &PlacedRoom) {}

    /// One call per pair of rooms sharing a door. `direction` points from `from` to `to`.
    fn doors_connected(&mut self, _from: Pos, _direction: Direction, _to: Pos) {}

    /// Fired exactly once per published layout, after all rooms and doors.
    fn generation_complete(&mut self, _layout: &Layout) {}
}

#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn GenerationObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl GenerationObserver for ObserverSet {
    fn room_placed(&mut self, room: &PlacedRoom) {
        for observer in &mut self.observers {
            observer.room_placed(room);
        }
    }

    fn doors_connected(&mut self, from: Pos, direction: Direction, to: Pos) {
        for observer in &mut self.observers {
            observer.doors_connected(from, direction, to);
        }
    }

    fn generation_complete(&mut self, layout: &Layout) {
        for observer in &mut self.observers {
            observer.generation_complete(layout);
        }
    }
}

pub fn publish_layout(layout: &Layout, observer: &mut dyn GenerationObserver) {
    for room in &layout.rooms {
        observer.room_placed(room);
    }
    for (from, direction, to) in layout.door_pairs() {
        observer.doors_connected(from, direction, to);
    }
    observer.generation_complete(layout);
}
