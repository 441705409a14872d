use crate::foundation::core::{FrameIndex, Viewport};

/// Where the driver learns the viewport size and hears about resizes.
pub trait ViewportSource {
    /// Size used for the first layout.
    fn initial(&self) -> Viewport;

    /// New size to apply before drawing `frame`, if the viewport changed.
    fn poll_resize(&mut self, frame: FrameIndex) -> Option<Viewport>;
}

/// A viewport that never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedViewport(pub Viewport);

impl ViewportSource for FixedViewport {
    fn initial(&self) -> Viewport {
        self.0
    }

    fn poll_resize(&mut self, _frame: FrameIndex) -> Option<Viewport> {
        None
    }
}

/// Replays a fixed list of resizes at given frames.
#[derive(Clone, Debug)]
pub struct ScriptedViewport {
    initial: Viewport,
    events: Vec<(FrameIndex, Viewport)>,
    next: usize,
}

impl ScriptedViewport {
    /// Events may come in any order; they are applied by frame.
    pub fn new(initial: Viewport, mut events: Vec<(FrameIndex, Viewport)>) -> Self {
        events.sort_by_key(|(frame, _)| *frame);
        Self {
            initial,
            events,
            next: 0,
        }
    }

    /// Resizes not yet delivered.
    pub fn pending(&self) -> usize {
        self.events.len() - self.next
    }
}

impl ViewportSource for ScriptedViewport {
    fn initial(&self) -> Viewport {
        self.initial
    }

    fn poll_resize(&mut self, frame: FrameIndex) -> Option<Viewport> {
        let mut latest = None;
        while let Some((at, viewport)) = self.events.get(self.next)
            && *at <= frame
        {
            latest = Some(*viewport);
            self.next += 1;
        }
        latest
    }
}

impl<V: ViewportSource + ?Sized> ViewportSource for Box<V> {
    fn initial(&self) -> Viewport {
        (**self).initial()
    }

    fn poll_resize(&mut self, frame: FrameIndex) -> Option<Viewport> {
        (**self).poll_resize(frame)
    }
}
