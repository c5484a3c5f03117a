//! Host-owned animation scheduling.
//!
//! Components never reschedule themselves: whatever is mounted in a [`FrameLoop`]
//! gets exactly one frame per [`FrameLoop::tick`], and unmounting removes it
//! before the call returns.

use crate::ui::input::PointerEvent;
use image::RgbaImage;
use log::info;
use std::time::Duration;

/// Nominal display refresh interval (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Timing information handed to every component on each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Zero-based frame counter since the loop was created.
    pub index: u64,
    /// Time elapsed since the previous frame.
    pub delta: Duration,
    /// Time elapsed since the loop was created.
    pub elapsed: Duration,
}

/// A component driven by the frame loop.
pub trait Animated {
    fn name(&self) -> &'static str;

    /// Advances state by one frame and redraws.
    fn frame(&mut self, tick: &FrameTick);

    fn pointer(&mut self, _event: PointerEvent) {}

    /// The host container changed size.
    fn resize(&mut self, _width: usize, _height: usize) {}

    /// Releases resources. Called once, synchronously, on unmount.
    fn teardown(&mut self) {}

    /// The most recently rendered frame.
    fn image(&self) -> Option<RgbaImage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountId(u64);

pub struct FrameLoop {
    components: Vec<(MountId, Box<dyn Animated>)>,
    next_id: u64,
    frame_index: u64,
    elapsed: Duration,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            next_id: 0,
            frame_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn mount(&mut self, component: Box<dyn Animated>) -> MountId {
        let id = MountId(self.next_id);
        self.next_id += 1;
        info!("Mounted {} ({:?})", component.name(), id);
        self.components.push((id, component));
        id
    }

    /// Removes a component and tears it down. Unknown ids are ignored.
    pub fn unmount(&mut self, id: MountId) -> bool {
        let Some(pos) = self.components.iter().position(|(mid, _)| *mid == id) else {
            return false;
        };
        let (_, mut component) = self.components.remove(pos);
        component.teardown();
        info!("Unmounted {} ({:?})", component.name(), id);
        true
    }

    /// Number of components that will receive a frame on the next tick.
    pub fn pending(&self) -> usize {
        self.components.len()
    }

    /// Advances by the nominal refresh interval.
    pub fn tick(&mut self) {
        self.tick_with(FRAME_INTERVAL);
    }

    /// Advances by a measured interval (used by the windowed host).
    pub fn tick_with(&mut self, delta: Duration) {
        self.elapsed += delta;
        let tick = FrameTick {
            index: self.frame_index,
            delta,
            elapsed: self.elapsed,
        };
        for (_, component) in &mut self.components {
            component.frame(&tick);
        }
        self.frame_index += 1;
    }

    pub fn dispatch_pointer(&mut self, id: MountId, event: PointerEvent) {
        if let Some(component) = self.get_mut(id) {
            component.pointer(event);
        }
    }

    pub fn resize(&mut self, id: MountId, width: usize, height: usize) {
        if let Some(component) = self.get_mut(id) {
            component.resize(width, height);
        }
    }

    pub fn image(&self, id: MountId) -> Option<RgbaImage> {
        self.components
            .iter()
            .find(|(mid, _)| *mid == id)
            .and_then(|(_, c)| c.image())
    }

    pub fn mounted(&self) -> impl Iterator<Item = (MountId, &'static str)> + '_ {
        self.components.iter().map(|(id, c)| (*id, c.name()))
    }

    fn get_mut(&mut self, id: MountId) -> Option<&mut Box<dyn Animated>> {
        self.components
            .iter_mut()
            .find(|(mid, _)| *mid == id)
            .map(|(_, c)| c)
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        for (_, component) in &mut self.components {
            component.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Seen {
        frames: Vec<u64>,
        pointers: usize,
        torn_down: bool,
    }

    struct Counter(Rc<RefCell<Seen>>);

    impl Animated for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn frame(&mut self, tick: &FrameTick) {
            self.0.borrow_mut().frames.push(tick.index);
        }

        fn pointer(&mut self, _event: PointerEvent) {
            self.0.borrow_mut().pointers += 1;
        }

        fn teardown(&mut self) {
            self.0.borrow_mut().torn_down = true;
        }

        fn image(&self) -> Option<RgbaImage> {
            None
        }
    }

    #[test]
    fn each_tick_reaches_each_component_once() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let mut frames = FrameLoop::new();
        frames.mount(Box::new(Counter(seen.clone())));
        for _ in 0..3 {
            frames.tick();
        }
        assert_eq!(seen.borrow().frames, vec![0, 1, 2]);
    }

    #[test]
    fn unmount_stops_frames_and_tears_down() {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let mut frames = FrameLoop::new();
        let id = frames.mount(Box::new(Counter(seen.clone())));
        frames.tick();
        assert!(frames.unmount(id));
        assert!(seen.borrow().torn_down);
        assert_eq!(frames.pending(), 0);

        frames.tick();
        frames.dispatch_pointer(id, PointerEvent::Up);
        assert_eq!(seen.borrow().frames.len(), 1);
        assert_eq!(seen.borrow().pointers, 0);
        assert!(!frames.unmount(id));
    }

    #[test]
    fn elapsed_accumulates() {
        let mut frames = FrameLoop::new();
        frames.tick_with(Duration::from_millis(10));
        frames.tick_with(Duration::from_millis(15));
        assert_eq!(frames.elapsed, Duration::from_millis(25));
        assert_eq!(frames.frame_index, 2);
    }
}
