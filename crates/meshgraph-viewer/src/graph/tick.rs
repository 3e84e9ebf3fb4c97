/// Elapsed time handed to the layout engine by whatever drives redraws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub dt: f32,
}

pub trait TickSource {
    fn next_tick(&mut self) -> Option<Tick>;
}

/// One tick per display frame.
pub struct FrameTick(Option<Tick>);

impl FrameTick {
    pub fn new(dt: f32) -> Self {
        Self(Some(Tick { dt }))
    }
}

impl TickSource for FrameTick {
    fn next_tick(&mut self) -> Option<Tick> {
        self.0.take()
    }
}

/// A fixed number of identical ticks, for driving the layout headlessly.
pub struct FixedTicks {
    remaining: usize,
    dt: f32,
}

impl FixedTicks {
    pub fn new(count: usize, dt: f32) -> Self {
        Self {
            remaining: count,
            dt,
        }
    }
}

impl TickSource for FixedTicks {
    fn next_tick(&mut self) -> Option<Tick> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(Tick { dt: self.dt })
    }
}
