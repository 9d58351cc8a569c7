use std::time::Instant;

use iced::alignment::{Horizontal, Vertical};
use iced::widget::{Column, button, column, container, row, slider, stack, text};
use iced::{Element, Length, Subscription, Theme, window};
use iced_complexp::{
    ComplexpPlot, ParameterConfig, Parameters, PlotConfig, PlotEvent, PlotRegistry,
    PointDescriptor,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const PLOT_ID: &str = "complexp";

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading plot config");
            PlotConfig::load(path)?
        }
        None => default_config(),
    };
    config.validate()?;

    iced::application(
        move || ComplexpDemo::new(&config),
        ComplexpDemo::update,
        ComplexpDemo::view,
    )
    .subscription(ComplexpDemo::subscription)
    .theme(Theme::Light)
    .run()?;
    Ok(())
}

fn default_config() -> PlotConfig {
    PlotConfig {
        real_color: "#c21f3a".to_string(),
        imaginary_color: "#1484e6".to_string(),
        vector_width: 5.0,
        arrow_size: 20.0,
        geometric_aid_color: "#666666".to_string(),
        geometric_aid_width: 4.0,
        background_color: "#f4f8fc".to_string(),
        axis_color: "#3c3c3c".to_string(),
        axis_line_width: 3.0,
        grid_color: "#3c3c3c".to_string(),
        secondary_grid_color: "#3c3c3c40".to_string(),
        parameters: vec![
            ParameterConfig::new("x", -15.0, 15.0, 0.01, 1.0),
            ParameterConfig::new("r", 0.0, 5.0, 0.01, 1.0),
        ],
        ..PlotConfig::default()
    }
}

fn build_plot(config: &PlotConfig) -> iced_complexp::Result<ComplexpPlot> {
    let point = PointDescriptor::builder()
        .x(|p: &Parameters| p.value("r") * p.value("x").cos())
        .y(|p: &Parameters| p.value("r") * p.value("x").sin())
        .color("#000000")
        .size(5.0)
        .build()?;

    ComplexpPlot::builder()
        .config(config.clone())
        .points(vec![point])
        .build()
}

#[derive(Debug, Clone)]
enum Message {
    Plot(PlotEvent),
    Frame(Instant),
}

struct ComplexpDemo {
    registry: PlotRegistry,
    error: Option<String>,
}

impl ComplexpDemo {
    fn new(config: &PlotConfig) -> Self {
        let mut registry = PlotRegistry::new();
        let error = match build_plot(config) {
            Ok(plot) => {
                registry.insert(PLOT_ID, plot);
                None
            }
            Err(err) => {
                error!(%err, "failed to build plot");
                Some(err.to_string())
            }
        };
        Self { registry, error }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.registry.is_animating() {
            window::frames().map(Message::Frame)
        } else {
            Subscription::none()
        }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::Plot(event) => {
                self.registry.dispatch(PLOT_ID, event, Instant::now());
            }
            Message::Frame(now) => self.registry.tick(now),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let Some(plot) = self.registry.get(PLOT_ID) else {
            let message = self.error.as_deref().unwrap_or("no plot");
            return container(text(message)).padding(20).into();
        };

        let canvas = plot.view().map(Message::Plot);
        let panel = column![toolbar(plot), sliders(plot)].spacing(15);

        if plot.is_fullscreen() {
            // controls float over the top-left corner of the plot
            stack![
                canvas,
                container(container(panel).padding(10).style(container::rounded_box))
                    .padding(20)
                    .align_x(Horizontal::Left)
                    .align_y(Vertical::Top),
            ]
            .into()
        } else {
            row![
                container(canvas)
                    .width(Length::FillPortion(3))
                    .height(Length::Fill),
                container(panel)
                    .width(Length::FillPortion(1))
                    .height(Length::Fill)
                    .padding(20),
            ]
            .into()
        }
    }
}

fn toolbar(plot: &ComplexpPlot) -> Element<'_, Message> {
    let options = plot.config();
    let action = |label: &'static str, event: PlotEvent, enabled: bool| {
        button(text(label)).on_press_maybe(enabled.then_some(Message::Plot(event)))
    };

    row![
        action("Zoom in", PlotEvent::ZoomIn, options.is_zoom_active),
        action("Zoom out", PlotEvent::ZoomOut, options.is_zoom_active),
        action("Reset", PlotEvent::Refresh, options.is_refresh_active),
        action("Grid", PlotEvent::ToggleGrid, options.is_grid_toggle_active),
        action("Aid", PlotEvent::ToggleGeometricAid, true),
        action(
            if plot.is_fullscreen() { "Exit" } else { "Fullscreen" },
            PlotEvent::ToggleFullscreen,
            options.is_fullscreen_toggle_active,
        ),
    ]
    .spacing(5)
    .wrap()
    .into()
}

fn sliders(plot: &ComplexpPlot) -> Element<'_, Message> {
    Column::with_children(plot.controls().iter().map(|control| {
        let id = control.id.clone();
        let value = plot.parameters().value(&control.id);
        let bounds = control.bounds;

        row![
            text(plot.label(&control.id).unwrap_or_default()).width(Length::Fixed(80.0)),
            slider(bounds.min..=bounds.max, value, move |v| {
                Message::Plot(PlotEvent::ParameterChanged(id.clone(), v))
            })
            .step(bounds.step),
            button(text(if control.sweep.is_playing { "Pause" } else { "Play" }))
                .on_press(Message::Plot(PlotEvent::TogglePlay(control.id.clone()))),
        ]
        .spacing(10)
        .align_y(Vertical::Center)
        .into()
    }))
    .spacing(10)
    .into()
}
