use crate::coords::ScreenPoint;
use crate::interaction::PlotEvent;
use crate::plot::ComplexpPlot;
use iced::widget::canvas;
use iced::{Event, Rectangle, Renderer, Theme, mouse, touch, window};

/// Wheel line scrolls are converted to pixels at this rate.
const PIXELS_PER_LINE: f64 = 100.0;

/// Canvas program drawing a [`ComplexpPlot`] and translating raw input into
/// [`PlotEvent`]s. All state lives in the plot itself.
pub struct PlotCanvas<'a> {
    plot: &'a ComplexpPlot,
}

impl<'a> PlotCanvas<'a> {
    pub fn new(plot: &'a ComplexpPlot) -> Self {
        Self { plot }
    }

    fn resize_event(&self, bounds: Rectangle) -> Option<PlotEvent> {
        let size = (f64::from(bounds.width), f64::from(bounds.height));
        (self.plot.surface_size() != Some(size)).then_some(PlotEvent::SurfaceResized {
            width: size.0,
            height: size.1,
        })
    }
}

fn relative(position: iced::Point, bounds: Rectangle) -> ScreenPoint {
    ScreenPoint::new(
        f64::from(position.x - bounds.x),
        f64::from(position.y - bounds.y),
    )
}

impl canvas::Program<PlotEvent> for PlotCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<PlotEvent>> {
        let publish = |event: PlotEvent| Some(canvas::Action::publish(event).and_capture());

        match event {
            // the surface is measured whenever the window redraws
            Event::Window(window::Event::RedrawRequested(_) | window::Event::Resized(_)) => self
                .resize_event(bounds)
                .map(canvas::Action::publish),

            // ---- Mouse ----
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                publish(PlotEvent::PointerPressed(position.into()))
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) if self.plot.is_dragging() => {
                publish(PlotEvent::PointerMoved(relative(*position, bounds)))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if self.plot.is_dragging() =>
            {
                publish(PlotEvent::PointerReleased)
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let position = cursor.position_in(bounds)?;
                let delta_y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => -f64::from(*y) * PIXELS_PER_LINE,
                    mouse::ScrollDelta::Pixels { y, .. } => -f64::from(*y),
                };
                publish(PlotEvent::WheelScrolled {
                    delta_y,
                    position: position.into(),
                })
            }

            // ---- Touch ----
            Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if !bounds.contains(*position) {
                    return None;
                }
                publish(PlotEvent::FingerPressed {
                    id: id.0,
                    position: relative(*position, bounds),
                })
            }
            Event::Touch(touch::Event::FingerMoved { id, position }) => {
                publish(PlotEvent::FingerMoved {
                    id: id.0,
                    position: relative(*position, bounds),
                })
            }
            Event::Touch(
                touch::Event::FingerLifted { id, .. } | touch::Event::FingerLost { id, .. },
            ) => publish(PlotEvent::FingerLifted { id: id.0 }),

            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        self.plot.draw(renderer, bounds)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.plot.is_dragging() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) && self.plot.config().is_translation_active {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
