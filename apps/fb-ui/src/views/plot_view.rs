use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use fb_app::ChartDef;
use fb_controls::SimulationResult;

#[derive(Default)]
pub struct PlotView;

impl PlotView {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        chart: &ChartDef,
        result: Option<&SimulationResult>,
    ) {
        ui.heading(&chart.title);
        ui.separator();

        let Some(result) = result else {
            ui.label("Waiting for the first evaluation...");
            return;
        };

        let Some([x_min, x_max]) = chart.x_bounds(result) else {
            ui.label("No samples to plot.");
            return;
        };
        let [y_min, y_max] = chart.y_range;

        let open: PlotPoints = result
            .iter()
            .map(|s| [s.time, s.y_open_loop])
            .collect::<Vec<_>>()
            .into();
        let closed: PlotPoints = result
            .iter()
            .map(|s| [s.time, s.y_closed_loop])
            .collect::<Vec<_>>()
            .into();

        Plot::new("feedback_plot")
            .legend(Legend::default())
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
                plot_ui.line(Line::new(open).name("open loop"));
                plot_ui.line(Line::new(closed).name("closed loop"));
            });
    }
}
