//! Press tracking: down, move, up and cancel over a laid-out [`Text`].

use core::ops::Range;

use crate::entity::{Entity, SpoilerSpan};
use crate::layout::text_layout::Invalidation;
use crate::layout::{DrawOrigin, Part, Point, Text, TextFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A resolved click or long press.
#[derive(Debug, Clone, Copy)]
pub struct Click<'a> {
    pub part_index: usize,
    pub part: &'a Part,
    pub entity: Option<&'a Entity>,
    /// Text of the pressed part.
    pub text: &'a str,
}

/// Receives clicks on parts. Click semantics (open a link, copy code) are up
/// to the host and keyed by the entity.
pub trait ClickCallback {
    /// Returns whether the click was handled.
    fn on_click(&mut self, click: &Click<'_>) -> bool;

    fn on_long_press(&mut self, _click: &Click<'_>) -> bool {
        false
    }
}

impl<F> ClickCallback for F
where
    F: FnMut(&Click<'_>) -> bool,
{
    fn on_click(&mut self, click: &Click<'_>) -> bool {
        self(click)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PressState {
    pub part: usize,
    /// Parts highlighted while pressed.
    pub range: Range<usize>,
    pub spoiler: Option<SpoilerSpan>,
    pub down: Point,
}

impl Text {
    pub fn set_click_callback(&mut self, callback: impl ClickCallback + 'static) {
        self.click = Some(Box::new(callback));
    }

    /// Parts highlighted by the current press.
    pub fn pressed_range(&self) -> Option<Range<usize>> {
        self.press
            .as_ref()
            .filter(|p| p.spoiler.is_none())
            .map(|p| p.range.clone())
    }

    /// Feed a touch event for the text drawn at `origin`.
    ///
    /// Returns whether the event was consumed.
    pub fn on_touch_event(&mut self, point: Point, phase: TouchPhase, origin: DrawOrigin) -> bool {
        match phase {
            TouchPhase::Down => self.press_down(point, origin),
            TouchPhase::Move => {
                let Some(press) = &self.press else {
                    return false;
                };
                if press.down.distance_to(point) > self.dimensions().touch_slop {
                    self.cancel_press();
                    return false;
                }
                true
            }
            TouchPhase::Up => self.release(),
            TouchPhase::Cancel => self.cancel_press(),
        }
    }

    fn press_down(&mut self, point: Point, origin: DrawOrigin) -> bool {
        self.press = None;
        if self.flags().contains(TextFlags::NO_CLICKABLE) || self.parts().is_empty() {
            return false;
        }
        let only_clickable = !self.flags().contains(TextFlags::ALL_CLICKABLE);
        let Some(index) = self.find_part(point, origin, only_clickable) else {
            return false;
        };
        let part = &self.parts()[index];
        let hidden_spoiler = self
            .entity_of(part)
            .and_then(|e| e.spoiler)
            .filter(|span| !self.is_revealed(*span));
        let range = match hidden_spoiler {
            Some(span) => self
                .spoiler_part_range(span)
                .unwrap_or(index..index + 1),
            None => self.press_range(index),
        };
        log::trace!("press on part {index}, highlighting {range:?}");
        self.press = Some(PressState {
            part: index,
            range,
            spoiler: hidden_spoiler,
            down: point,
        });
        self.notify(Invalidation::Redraw);
        true
    }

    fn release(&mut self) -> bool {
        let Some(press) = self.press.take() else {
            return false;
        };
        if let Some(span) = press.spoiler {
            self.regions.set_reveal_progress(span, 1.0);
            self.notify(Invalidation::Redraw);
            return true;
        }
        let handled = self.dispatch(press.part, false);
        self.notify(Invalidation::Redraw);
        handled
    }

    fn cancel_press(&mut self) -> bool {
        if self.press.take().is_none() {
            return false;
        }
        self.notify(Invalidation::Redraw);
        true
    }

    /// Deliver a long press for the current press, after the host's
    /// long-press timeout. Spoiler presses ignore long presses.
    pub fn perform_long_press(&mut self) -> bool {
        let Some(press) = self.press.as_ref().filter(|p| p.spoiler.is_none()) else {
            return false;
        };
        let part = press.part;
        self.press = None;
        let handled = self.dispatch(part, true);
        self.notify(Invalidation::Redraw);
        handled
    }

    fn dispatch(&mut self, index: usize, long_press: bool) -> bool {
        let Some(mut callback) = self.click.take() else {
            return false;
        };
        let handled = match self.parts().get(index) {
            Some(part) => {
                let click = Click {
                    part_index: index,
                    part,
                    entity: self.entity_of(part),
                    text: part.text(self.source()),
                };
                if long_press {
                    callback.on_long_press(&click)
                } else {
                    callback.on_click(&click)
                }
            }
            None => false,
        };
        self.click = Some(callback);
        handled
    }

    /// Parts covered by the spoiler `span`, whitespace bridges included.
    fn spoiler_part_range(&self, span: SpoilerSpan) -> Option<Range<usize>> {
        let built = self
            .regions
            .spoilers
            .iter()
            .find(|r| r.span.offset <= span.offset && span.end() <= r.span.end());
        if let Some(region) = built {
            return Some(region.parts.clone());
        }
        let parts = self.parts();
        let member = |p: &Part| self.entity_of(p).and_then(|e| e.spoiler) == Some(span);
        let start = parts.iter().position(member)?;
        let end = parts.iter().rposition(member)? + 1;
        Some(start..end)
    }
}
